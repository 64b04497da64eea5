//! # pesadb-engine
//!
//! The pesadb storage engine: typed rows, equality indexes, tables with
//! constraint enforcement, databases with referential integrity, and the
//! catalog that persists every database to an atomic JSON snapshot.

#![deny(unused_imports)]

mod catalog;
mod database;
mod error;
mod index;
mod row;
mod table;

pub use self::{
    catalog::Catalog,
    database::Database,
    error::EngineError,
    index::Index,
    row::{Row, RowMap},
    table::{Column, Table},
};
