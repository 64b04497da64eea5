#[cfg(not(feature = "std"))]
use alloc::format;
use core::{fmt, str::FromStr};

use crate::{value::ValueError, Keyword};

/// The data type of a table column.
///
/// The lexer additionally accepts the aliases `REAL`, `DOUBLE` and `DECIMAL`
/// for [`DataType::Float`], and `TIMESTAMP` for [`DataType::DateTime`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum DataType {
    /// 64-bit signed integer.
    Int,
    /// IEEE-754 double precision number.
    Float,
    /// UTF-8 string.
    String,
    /// Boolean.
    Bool,
    /// Calendar date (ISO-8601 `YYYY-MM-DD`).
    Date,
    /// Time of day (`HH:MM:SS[.fff]`).
    Time,
    /// Date and time (ISO-8601, optionally with a timezone offset on input).
    DateTime,
}

impl DataType {
    /// Converts a type keyword into the data type it names, resolving aliases.
    pub fn from_keyword(keyword: Keyword) -> Option<Self> {
        match keyword {
            Keyword::INT => Some(Self::Int),
            Keyword::FLOAT | Keyword::REAL | Keyword::DOUBLE | Keyword::DECIMAL => {
                Some(Self::Float)
            }
            Keyword::STRING => Some(Self::String),
            Keyword::BOOL => Some(Self::Bool),
            Keyword::DATE => Some(Self::Date),
            Keyword::TIME => Some(Self::Time),
            Keyword::DATETIME | Keyword::TIMESTAMP => Some(Self::DateTime),
            _ => None,
        }
    }

    /// Returns the canonical (uppercase) name of the data type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "INT",
            Self::Float => "FLOAT",
            Self::String => "STRING",
            Self::Bool => "BOOL",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::DateTime => "DATETIME",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "INT" => Ok(Self::Int),
            "FLOAT" | "REAL" | "DOUBLE" | "DECIMAL" => Ok(Self::Float),
            "STRING" => Ok(Self::String),
            "BOOL" => Ok(Self::Bool),
            "DATE" => Ok(Self::Date),
            "TIME" => Ok(Self::Time),
            "DATETIME" | "TIMESTAMP" => Ok(Self::DateTime),
            other => Err(ValueError::new(format!(
                "Unsupported data type: {}. Supported types: INT, FLOAT, STRING, BOOL, DATE, TIME, DATETIME",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve() {
        assert_eq!("REAL".parse::<DataType>().unwrap(), DataType::Float);
        assert_eq!("double".parse::<DataType>().unwrap(), DataType::Float);
        assert_eq!("decimal".parse::<DataType>().unwrap(), DataType::Float);
        assert_eq!("timestamp".parse::<DataType>().unwrap(), DataType::DateTime);
        assert_eq!(
            DataType::from_keyword(Keyword::TIMESTAMP),
            Some(DataType::DateTime)
        );
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!("BLOB".parse::<DataType>().is_err());
        assert_eq!(DataType::from_keyword(Keyword::SELECT), None);
    }
}
