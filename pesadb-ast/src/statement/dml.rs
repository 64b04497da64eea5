#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    expression::Expr,
    types::Literal,
    utils::display_comma_separated,
};

/// The `INSERT INTO ...` statement.
///
/// ```txt
/// INSERT INTO <table name> [ ( column1, column2, ... ) ] VALUES ( literal1, literal2, ... )
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InsertStmt {
    /// Table name.
    pub table: String,
    /// Column list; empty means positional insertion over all columns.
    pub columns: Vec<String>,
    /// The literal values to insert.
    pub values: Vec<Literal>,
}

impl fmt::Display for InsertStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "INSERT INTO {}", self.table)?;
        if !self.columns.is_empty() {
            write!(f, " ({})", display_comma_separated(&self.columns))?;
        }
        write!(f, " VALUES ({})", display_comma_separated(&self.values))
    }
}

/// The `UPDATE ... SET ...` statement.
///
/// ```txt
/// UPDATE <table> SET <column> = <literal> [ WHERE <search condition> ]
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UpdateStmt {
    /// Table name.
    pub table: String,
    /// The column being assigned.
    pub column: String,
    /// The assigned value.
    pub value: Literal,
    /// Search condition.
    pub selection: Option<Expr>,
}

impl fmt::Display for UpdateStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UPDATE {} SET {} = {}", self.table, self.column, self.value)?;
        if let Some(selection) = &self.selection {
            write!(f, " WHERE {}", selection)?;
        }
        Ok(())
    }
}

/// The `DELETE FROM ...` statement.
///
/// ```txt
/// DELETE FROM <table> [ WHERE <search condition> ]
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeleteStmt {
    /// Table name.
    pub table: String,
    /// Search condition.
    pub selection: Option<Expr>,
}

impl fmt::Display for DeleteStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DELETE FROM {}", self.table)?;
        if let Some(selection) = &self.selection {
            write!(f, " WHERE {}", selection)?;
        }
        Ok(())
    }
}
