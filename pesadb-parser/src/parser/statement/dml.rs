#[cfg(not(feature = "std"))]
use alloc::vec;

use pesadb_ast::{expression::Expr, statement::*};
use pesadb_core::Keyword;
use pesadb_lexer::Token;

use crate::{error::ParserError, parser::Parser};

impl Parser {
    /// Parses an `INSERT INTO` statement.
    pub(crate) fn parse_insert_stmt(&mut self) -> Result<InsertStmt, ParserError> {
        self.expect_keywords(&[Keyword::INSERT, Keyword::INTO])?;
        let table = self.parse_identifier()?;

        // An optional explicit column list precedes VALUES.
        let columns = if self.next_token_if_is(&Token::LeftParen) {
            let columns = self.parse_comma_separated(Parser::parse_identifier)?;
            self.expect_token(&Token::RightParen)?;
            columns
        } else {
            vec![]
        };

        self.expect_keyword(Keyword::VALUES)?;
        self.expect_token(&Token::LeftParen)?;
        let values = self.parse_comma_separated(Parser::parse_literal)?;
        self.expect_token(&Token::RightParen)?;

        Ok(InsertStmt {
            table,
            columns,
            values,
        })
    }

    /// Parses an `UPDATE ... SET ...` statement.
    pub(crate) fn parse_update_stmt(&mut self) -> Result<UpdateStmt, ParserError> {
        self.expect_keyword(Keyword::UPDATE)?;
        let table = self.parse_identifier()?;
        self.expect_keyword(Keyword::SET)?;
        let column = self.parse_identifier()?;
        self.expect_token(&Token::Equal)?;
        let value = self.parse_literal()?;
        let selection = self.parse_where_clause()?;
        Ok(UpdateStmt {
            table,
            column,
            value,
            selection,
        })
    }

    /// Parses a `DELETE FROM` statement.
    pub(crate) fn parse_delete_stmt(&mut self) -> Result<DeleteStmt, ParserError> {
        self.expect_keywords(&[Keyword::DELETE, Keyword::FROM])?;
        let table = self.parse_identifier()?;
        let selection = self.parse_where_clause()?;
        Ok(DeleteStmt { table, selection })
    }

    /// Parses an optional `WHERE` clause.
    pub(crate) fn parse_where_clause(&mut self) -> Result<Option<Expr>, ParserError> {
        if self.parse_keyword(Keyword::WHERE) {
            Ok(Some(self.parse_expr()?))
        } else {
            Ok(None)
        }
    }
}
