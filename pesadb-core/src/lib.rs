//! # pesadb-core
//!
//! pesadb-core is a core library that includes the keyword vocabulary,
//! the supported data types and the scalar value model of pesadb.

#![deny(missing_docs)]
#![deny(unused_imports)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[macro_use]
mod macros;

mod data_type;
mod datetime;
mod keyword;
mod value;

pub use self::{
    data_type::DataType,
    datetime::{parse_date, parse_datetime, parse_time},
    keyword::{Keyword, ALL_KEYWORDS, ALL_KEYWORD_STRINGS},
    value::{Value, ValueError},
};
