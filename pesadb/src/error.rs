use thiserror::Error;

use pesadb_engine::EngineError;
use pesadb_lexer::LexerError;
use pesadb_parser::ParserError;

/// Any error a query can produce, from lexing through persistence.
#[derive(Debug, Error)]
pub enum Error {
    /// The query text could not be tokenized.
    #[error("{0}")]
    Lex(#[from] LexerError),

    /// The token stream is not a valid statement.
    #[error("{0}")]
    Parse(#[from] ParserError),

    /// Schema, constraint, lookup, execution or IO failure in the engine.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A malformed connection URL.
    #[error("{0}")]
    Connection(String),
}
