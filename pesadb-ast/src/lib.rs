//! # pesadb-ast
//!
//! pesadb-ast defines the command tree produced by the parser and
//! consumed by the executor: statements, expressions and literals.

#![deny(missing_docs)]
#![deny(unused_imports)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

/// Expression nodes used in `WHERE`, `HAVING` and projections.
pub mod expression;
/// Statement nodes.
pub mod statement;
/// Shared leaf types: column references and literals.
pub mod types;

mod utils;
