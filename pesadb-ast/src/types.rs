#[cfg(not(feature = "std"))]
use alloc::string::String;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A column reference, optionally qualified with a table name
/// (`column` or `table.column`).
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColumnRef {
    /// The qualifying table name, if any.
    pub table: Option<String>,
    /// The column name.
    pub column: String,
}

impl ColumnRef {
    /// Creates an unqualified column reference.
    pub fn unqualified(column: impl Into<String>) -> Self {
        Self {
            table: None,
            column: column.into(),
        }
    }

    /// Creates a table-qualified column reference.
    pub fn qualified(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            column: column.into(),
        }
    }

    /// The key this reference resolves against in a row map:
    /// `table.column` when qualified, the bare column name otherwise.
    pub fn key(&self) -> String {
        match &self.table {
            Some(table) => {
                let mut key = table.clone();
                key.push('.');
                key.push_str(&self.column);
                key
            }
            None => self.column.clone(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(table) = &self.table {
            write!(f, "{}.", table)?;
        }
        f.write_str(&self.column)
    }
}

/// A literal value as written in the query text.
///
/// Numbers keep their spelling: whether `1` becomes an `INT` or a `FLOAT`
/// is decided later, against the column it meets.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Literal {
    /// `NULL`
    Null,
    /// Boolean literal, `TRUE` or `FALSE`.
    Boolean(bool),
    /// Numeric literal.
    Number(String),
    /// String literal (single quoted), e.g. `'string'`.
    String(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Boolean(v) => f.write_str(if *v { "TRUE" } else { "FALSE" }),
            Self::Number(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "'{}'", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_ref_keys() {
        assert_eq!(ColumnRef::unqualified("id").key(), "id");
        assert_eq!(ColumnRef::qualified("users", "id").key(), "users.id");
        assert_eq!(ColumnRef::qualified("users", "id").to_string(), "users.id");
    }

    #[test]
    fn literal_display() {
        assert_eq!(Literal::Null.to_string(), "NULL");
        assert_eq!(Literal::Boolean(true).to_string(), "TRUE");
        assert_eq!(Literal::Number("1.5".into()).to_string(), "1.5");
        assert_eq!(Literal::String("abc".into()).to_string(), "'abc'");
    }
}
