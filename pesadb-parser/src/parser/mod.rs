mod expression;
mod statement;

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, format, string::String, vec, vec::Vec};
use core::fmt::Display;

use pesadb_ast::statement::Stmt;
use pesadb_core::Keyword;
use pesadb_lexer::{Lexer, Token, Word};

use crate::error::{parse_error, ParserError};

/// Query parser.
///
/// Consumes a token sequence and produces a single command tree value,
/// dispatching on the first keyword.
pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

impl Parser {
    /// Creates a new parser with the given tokens.
    pub fn new_with_tokens(tokens: Vec<Token>) -> Self {
        Self { tokens, index: 0 }
    }

    /// Creates a new parser for the given query string.
    pub fn new_with_query(query: &str) -> Result<Self, ParserError> {
        let tokens = Lexer::new(query).tokenize()?;
        Ok(Self::new_with_tokens(tokens))
    }

    /// Parses a single statement, consuming an optional trailing semicolon.
    ///
    /// Anything left over after the statement is a parse error.
    pub fn parse_statement(&mut self) -> Result<Stmt, ParserError> {
        let command = match self.peek_token() {
            Some(token) => token.is_one_of_keywords(&[
                Keyword::CREATE,
                Keyword::DROP,
                Keyword::USE,
                Keyword::SHOW,
                Keyword::DESCRIBE,
                Keyword::DESC,
                Keyword::INSERT,
                Keyword::SELECT,
                Keyword::UPDATE,
                Keyword::DELETE,
            ]),
            None => return parse_error("Empty query"),
        };
        let stmt = match command {
            Some(Keyword::CREATE) => self.parse_create_stmt()?,
            Some(Keyword::DROP) => self.parse_drop_stmt()?,
            Some(Keyword::USE) => self.parse_use_stmt()?,
            Some(Keyword::SHOW) => self.parse_show_stmt()?,
            Some(Keyword::DESCRIBE) | Some(Keyword::DESC) => self.parse_describe_stmt()?,
            Some(Keyword::INSERT) => Stmt::Insert(self.parse_insert_stmt()?),
            Some(Keyword::SELECT) => Stmt::Select(Box::new(self.parse_select_stmt()?)),
            Some(Keyword::UPDATE) => Stmt::Update(self.parse_update_stmt()?),
            Some(Keyword::DELETE) => Stmt::Delete(self.parse_delete_stmt()?),
            _ => {
                let found = self.peek_token().cloned().expect("peeked a token above");
                return parse_error(format!("Unexpected command: {}", found));
            }
        };
        self.next_token_if_is(&Token::SemiColon);
        if let Some(found) = self.peek_token() {
            let found = found.clone();
            return self.expected("end of statement", Some(found));
        }
        Ok(stmt)
    }

    /// Parses a comma-separated list of 1+ items accepted by `F`.
    pub fn parse_comma_separated<T, F>(&mut self, mut f: F) -> Result<Vec<T>, ParserError>
    where
        F: FnMut(&mut Parser) -> Result<T, ParserError>,
    {
        let mut values = vec![];
        loop {
            values.push(f(self)?);
            if !self.next_token_if_is(&Token::Comma) {
                break;
            }
        }
        Ok(values)
    }

    /// Reports an unexpected token.
    pub fn expected<R>(
        &self,
        expected: impl Display,
        found: Option<impl Display>,
    ) -> Result<R, ParserError> {
        if let Some(found) = found {
            parse_error(format!("Expected: {}, found: {}", expected, found))
        } else {
            parse_error(format!("Expected: {}, but not found", expected))
        }
    }

    /// Consumes the next keyword token and returns ok if it matches the
    /// expected keyword, otherwise returns an error.
    pub fn expect_keyword(&mut self, expected: Keyword) -> Result<(), ParserError> {
        if self.parse_keyword(expected) {
            Ok(())
        } else {
            let found = self.peek_token().cloned();
            self.expected(expected, found)
        }
    }

    /// Consumes the next keyword tokens if they match the expected keywords,
    /// otherwise returns an error.
    pub fn expect_keywords(&mut self, expected: &[Keyword]) -> Result<(), ParserError> {
        for &keyword in expected {
            self.expect_keyword(keyword)?;
        }
        Ok(())
    }

    /// Consumes the next keyword token and returns true if it matches the
    /// expected keyword, otherwise returns false.
    pub fn parse_keyword(&mut self, keyword: Keyword) -> bool {
        self.next_token_if(|token| token.is_keyword(keyword)).is_some()
    }

    /// Consumes the next multiple keyword tokens and returns true if they
    /// all match the expected keywords, otherwise consumes nothing.
    pub fn parse_keywords(&mut self, keywords: &[Keyword]) -> bool {
        for (offset, &keyword) in keywords.iter().enumerate() {
            match self.peek_nth_token(offset) {
                Some(token) if token.is_keyword(keyword) => {}
                _ => return false,
            }
        }
        self.index += keywords.len();
        true
    }

    /// Consumes the next keyword token if the token is one of the expected keywords.
    pub fn parse_one_of_keywords(&mut self, keywords: &[Keyword]) -> Option<Keyword> {
        match self.peek_token() {
            Some(token) => {
                let keyword = token.is_one_of_keywords(keywords)?;
                self.next_token();
                Some(keyword)
            }
            None => None,
        }
    }

    /// Consumes the next token and returns ok if it matches the expected
    /// token, otherwise returns an error.
    pub fn expect_token(&mut self, expected: &Token) -> Result<(), ParserError> {
        if self.next_token_if_is(expected) {
            Ok(())
        } else {
            let found = self.peek_token().cloned();
            self.expected(expected, found)
        }
    }

    /// Returns a reference to the next token without advancing.
    pub fn peek_token(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    /// Returns a reference to the token `offset` positions ahead without advancing.
    pub fn peek_nth_token(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.index + offset)
    }

    /// Consumes the next token and returns it.
    pub fn next_token(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    /// Consumes the next token and returns it if `func` returns true.
    pub fn next_token_if(&mut self, func: impl FnOnce(&Token) -> bool) -> Option<Token> {
        match self.peek_token() {
            Some(token) if func(token) => self.next_token(),
            _ => None,
        }
    }

    /// Consumes the next token and returns true if it matches `expected`.
    pub fn next_token_if_is(&mut self, expected: &Token) -> bool {
        self.next_token_if(|token| token == expected).is_some()
    }

    /// Parses an identifier (a word that is not a keyword).
    pub fn parse_identifier(&mut self) -> Result<String, ParserError> {
        match self.next_token_if(|token| {
            matches!(token, Token::Word(Word { keyword: None, .. }))
        }) {
            Some(Token::Word(word)) => Ok(word.value),
            _ => {
                let found = self.peek_token().cloned();
                self.expected("an identifier", found)
            }
        }
    }

    /// Parses a non-negative integer, as used by `LIMIT` and `OFFSET`.
    pub fn parse_row_count(&mut self, clause: Keyword) -> Result<u64, ParserError> {
        match self.next_token_if(|token| matches!(token, Token::Number(_))) {
            Some(Token::Number(number)) => number
                .parse::<u64>()
                .map_err(|_| ParserError::ParseError(format!("{} must be a non-negative integer", clause))),
            _ => {
                let found = self.peek_token().cloned();
                self.expected(format!("a row count after {}", clause), found)
            }
        }
    }
}
