//! # pesadb-parser
//!
//! pesadb-parser turns a token sequence into a single command tree.

#![deny(missing_docs)]
#![deny(unused_imports)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

mod error;
mod parser;

pub use self::{
    error::ParserError,
    parser::Parser,
};

use pesadb_ast::statement::Stmt;

/// Parses a single statement out of the given query string.
pub fn parse_query(query: &str) -> Result<Stmt, ParserError> {
    Parser::new_with_query(query)?.parse_statement()
}
