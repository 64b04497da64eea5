//! # pesadb
//!
//! A small, self-contained relational database engine: an SQL-like query
//! language in front of typed in-memory tables with full constraint
//! enforcement, persisted as one JSON snapshot per database.
//!
//! ```no_run
//! use pesadb::connect;
//!
//! let mut conn = connect("pesadb://localhost/myapp")?;
//! conn.execute("CREATE TABLE t (id INT PRIMARY KEY, name STRING UNIQUE)")?;
//! conn.execute("INSERT INTO t VALUES (1, 'a')")?;
//! let rows = conn.execute("SELECT * FROM t")?;
//! # let _ = rows;
//! # Ok::<(), pesadb::Error>(())
//! ```

#![deny(unused_imports)]

mod connection;
mod error;
mod eval;
mod executor;

pub use pesadb_ast as ast;
pub use pesadb_core::{DataType, Keyword, Value};
pub use pesadb_engine::{Catalog, Column, Database, EngineError, Index, Row, RowMap, Table};
pub use pesadb_lexer::{Lexer, LexerError, Token};
pub use pesadb_parser::{parse_query, Parser, ParserError};

pub use self::{
    connection::{connect, parse_connection_url, Connection, ConnectionInfo},
    error::Error,
    eval::{evaluate, literal_to_value},
    executor::{ExecuteResult, Executor},
};
