#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use pesadb_core::DataType;

use crate::utils::display_comma_separated;

/// The `CREATE TABLE` statement.
///
/// ```txt
/// CREATE TABLE <table name> ( <column def> { , <column def> } )
/// ```
///
/// The parser does not require a `PRIMARY KEY` column; its absence is a
/// schema validation error raised when the table is built.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CreateTableStmt {
    /// Table name.
    pub name: String,
    /// Column definitions.
    pub columns: Vec<ColumnDef>,
}

impl fmt::Display for CreateTableStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CREATE TABLE {} ({})",
            self.name,
            display_comma_separated(&self.columns)
        )
    }
}

/// A column definition.
///
/// ```txt
/// <column name> <type> [ PRIMARY KEY | UNIQUE ]
///     [ REFERENCES <table> (<column>) [ ON DELETE <action> ] [ ON UPDATE <action> ] ]
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Column type.
    pub data_type: DataType,
    /// `PRIMARY KEY` flag.
    pub primary_key: bool,
    /// `UNIQUE` flag.
    pub unique: bool,
    /// `REFERENCES` clause.
    pub references: Option<ForeignKeyRef>,
}

impl fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.data_type)?;
        if self.primary_key {
            f.write_str(" PRIMARY KEY")?;
        }
        if self.unique {
            f.write_str(" UNIQUE")?;
        }
        if let Some(references) = &self.references {
            write!(f, " {}", references)?;
        }
        Ok(())
    }
}

/// The `REFERENCES` clause of a column definition.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ForeignKeyRef {
    /// Referenced table name.
    pub table: String,
    /// Referenced column name.
    pub column: String,
    /// `ON DELETE` referential action.
    pub on_delete: ReferentialAction,
    /// `ON UPDATE` referential action.
    pub on_update: ReferentialAction,
}

impl fmt::Display for ForeignKeyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "REFERENCES {}({})", self.table, self.column)?;
        if self.on_delete != ReferentialAction::Restrict {
            write!(f, " ON DELETE {}", self.on_delete)?;
        }
        if self.on_update != ReferentialAction::Restrict {
            write!(f, " ON UPDATE {}", self.on_update)?;
        }
        Ok(())
    }
}

/// The action applied to referencing rows when a referenced row is
/// deleted or its key updated. The default is `RESTRICT`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ReferentialAction {
    /// Reject the operation.
    #[default]
    Restrict,
    /// Propagate the delete / the new key value.
    Cascade,
    /// Set the referencing column to NULL.
    SetNull,
    /// Same as `RESTRICT` here: reject the operation.
    NoAction,
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::NoAction => "NO ACTION",
        })
    }
}

/// The `DROP TABLE` statement.
///
/// ```txt
/// DROP TABLE <table name>
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DropTableStmt {
    /// Table name.
    pub name: String,
}

impl fmt::Display for DropTableStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DROP TABLE {}", self.name)
    }
}

/// The `DESCRIBE` statement.
///
/// ```txt
/// DESCRIBE <table name>
/// DESC <table name>
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DescribeStmt {
    /// Table name.
    pub name: String,
}

impl fmt::Display for DescribeStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DESCRIBE {}", self.name)
    }
}
