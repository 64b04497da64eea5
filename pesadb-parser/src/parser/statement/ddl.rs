#[cfg(not(feature = "std"))]
use alloc::format;

use pesadb_ast::statement::*;
use pesadb_core::{DataType, Keyword};
use pesadb_lexer::Token;

use crate::{error::ParserError, parser::Parser};

impl Parser {
    /// Parses a `CREATE DATABASE` or `CREATE TABLE` statement.
    pub(crate) fn parse_create_stmt(&mut self) -> Result<Stmt, ParserError> {
        self.expect_keyword(Keyword::CREATE)?;
        if self.parse_keyword(Keyword::DATABASE) {
            let name = self.parse_identifier()?;
            Ok(Stmt::CreateDatabase(CreateDatabaseStmt { name }))
        } else if self.parse_keyword(Keyword::TABLE) {
            Ok(Stmt::CreateTable(self.parse_create_table_stmt()?))
        } else {
            let found = self.peek_token().cloned();
            self.expected("DATABASE or TABLE after CREATE", found)
        }
    }

    /// Parses a `CREATE TABLE` statement, assuming `CREATE TABLE` has
    /// already been consumed.
    fn parse_create_table_stmt(&mut self) -> Result<CreateTableStmt, ParserError> {
        let name = self.parse_identifier()?;
        self.expect_token(&Token::LeftParen)?;
        let columns = self.parse_comma_separated(Parser::parse_column_def)?;
        self.expect_token(&Token::RightParen)?;
        Ok(CreateTableStmt { name, columns })
    }

    /// Parses a column definition.
    fn parse_column_def(&mut self) -> Result<ColumnDef, ParserError> {
        let name = self.parse_identifier()?;

        let data_type = match self.next_token() {
            Some(token) => match token
                .is_one_of_keywords(&[
                    Keyword::INT,
                    Keyword::FLOAT,
                    Keyword::REAL,
                    Keyword::DOUBLE,
                    Keyword::DECIMAL,
                    Keyword::STRING,
                    Keyword::BOOL,
                    Keyword::DATE,
                    Keyword::TIME,
                    Keyword::DATETIME,
                    Keyword::TIMESTAMP,
                ])
                .and_then(DataType::from_keyword)
            {
                Some(data_type) => data_type,
                None => {
                    return Err(ParserError::ParseError(format!(
                        "Invalid data type '{}'. Supported types: INT, FLOAT, STRING, BOOL, DATE, TIME, DATETIME",
                        token
                    )))
                }
            },
            None => return self.expected("a data type", Option::<Token>::None),
        };

        let primary_key = self.parse_keywords(&[Keyword::PRIMARY, Keyword::KEY]);
        let unique = !primary_key && self.parse_keyword(Keyword::UNIQUE);

        let references = if self.parse_keyword(Keyword::REFERENCES) {
            let table = self.parse_identifier()?;
            self.expect_token(&Token::LeftParen)?;
            let column = self.parse_identifier()?;
            self.expect_token(&Token::RightParen)?;

            let mut on_delete = ReferentialAction::default();
            let mut on_update = ReferentialAction::default();
            loop {
                if self.parse_keywords(&[Keyword::ON, Keyword::DELETE]) {
                    on_delete = self.parse_referential_action()?;
                } else if self.parse_keywords(&[Keyword::ON, Keyword::UPDATE]) {
                    on_update = self.parse_referential_action()?;
                } else {
                    break;
                }
            }
            Some(ForeignKeyRef {
                table,
                column,
                on_delete,
                on_update,
            })
        } else {
            None
        };

        Ok(ColumnDef {
            name,
            data_type,
            primary_key,
            unique,
            references,
        })
    }

    fn parse_referential_action(&mut self) -> Result<ReferentialAction, ParserError> {
        if self.parse_keyword(Keyword::CASCADE) {
            Ok(ReferentialAction::Cascade)
        } else if self.parse_keyword(Keyword::RESTRICT) {
            Ok(ReferentialAction::Restrict)
        } else if self.parse_keywords(&[Keyword::SET, Keyword::NULL]) {
            Ok(ReferentialAction::SetNull)
        } else if self.parse_keywords(&[Keyword::NO, Keyword::ACTION]) {
            Ok(ReferentialAction::NoAction)
        } else {
            let found = self.peek_token().cloned();
            self.expected("CASCADE, RESTRICT, SET NULL or NO ACTION", found)
        }
    }

    /// Parses a `DROP DATABASE` or `DROP TABLE` statement.
    pub(crate) fn parse_drop_stmt(&mut self) -> Result<Stmt, ParserError> {
        self.expect_keyword(Keyword::DROP)?;
        if self.parse_keyword(Keyword::DATABASE) {
            let name = self.parse_identifier()?;
            Ok(Stmt::DropDatabase(DropDatabaseStmt { name }))
        } else if self.parse_keyword(Keyword::TABLE) {
            let name = self.parse_identifier()?;
            Ok(Stmt::DropTable(DropTableStmt { name }))
        } else {
            let found = self.peek_token().cloned();
            self.expected("DATABASE or TABLE after DROP", found)
        }
    }

    /// Parses a `USE` statement.
    pub(crate) fn parse_use_stmt(&mut self) -> Result<Stmt, ParserError> {
        self.expect_keyword(Keyword::USE)?;
        let name = self.parse_identifier()?;
        Ok(Stmt::UseDatabase(UseDatabaseStmt { name }))
    }

    /// Parses a `SHOW DATABASES` or `SHOW TABLES` statement.
    pub(crate) fn parse_show_stmt(&mut self) -> Result<Stmt, ParserError> {
        self.expect_keyword(Keyword::SHOW)?;
        if self.parse_keyword(Keyword::DATABASES) {
            Ok(Stmt::ShowDatabases)
        } else if self.parse_keyword(Keyword::TABLES) {
            Ok(Stmt::ShowTables)
        } else {
            let found = self.peek_token().cloned();
            self.expected("DATABASES or TABLES after SHOW", found)
        }
    }

    /// Parses a `DESCRIBE` / `DESC` statement.
    pub(crate) fn parse_describe_stmt(&mut self) -> Result<Stmt, ParserError> {
        if self.parse_one_of_keywords(&[Keyword::DESCRIBE, Keyword::DESC]).is_none() {
            let found = self.peek_token().cloned();
            return self.expected("DESCRIBE or DESC", found);
        }
        let name = self.parse_identifier()?;
        Ok(Stmt::Describe(DescribeStmt { name }))
    }
}
