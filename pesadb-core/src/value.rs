#[cfg(not(feature = "std"))]
use alloc::{
    format,
    string::{String, ToString},
};
use core::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::{
    datetime::{parse_date, parse_datetime, parse_time},
    DataType,
};

/// A typed scalar value.
///
/// `Null` is a first-class absent-value marker orthogonal to type: any
/// column may hold it, and it never equals anything under the SQL `=`
/// operator (see [`Value::compare`] for the comparison rules the
/// evaluator uses).
#[derive(Clone, Debug)]
pub enum Value {
    /// The absent value.
    Null,
    /// 64-bit signed integer.
    Int(i64),
    /// IEEE-754 double precision number.
    Float(f64),
    /// UTF-8 string.
    Str(String),
    /// Boolean.
    Bool(bool),
    /// Calendar date.
    Date(NaiveDate),
    /// Time of day.
    Time(NaiveTime),
    /// Date and time without timezone.
    DateTime(NaiveDateTime),
}

impl Value {
    /// Returns true if this is the `Null` marker.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the data type of the value, or `None` for `Null`.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Int(_) => Some(DataType::Int),
            Value::Float(_) => Some(DataType::Float),
            Value::Str(_) => Some(DataType::String),
            Value::Bool(_) => Some(DataType::Bool),
            Value::Date(_) => Some(DataType::Date),
            Value::Time(_) => Some(DataType::Time),
            Value::DateTime(_) => Some(DataType::DateTime),
        }
    }

    /// Returns the numeric interpretation of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Coerces the value into the given column type.
    ///
    /// `Null` coerces to every type unchanged; whether a column admits it
    /// is a constraint question, not a typing one. The conversions mirror
    /// literal typing: numbers narrow to `INT` when integral, strings
    /// parse into numeric, boolean and temporal types.
    pub fn coerce_to(self, data_type: DataType) -> Result<Value, ValueError> {
        if self.is_null() {
            return Ok(Value::Null);
        }
        let incompatible = |value: &Value| {
            ValueError::new(format!(
                "expected {}, got {}",
                data_type,
                value.describe()
            ))
        };
        match data_type {
            DataType::Int => match self {
                Value::Int(i) => Ok(Value::Int(i)),
                Value::Float(f) => Ok(Value::Int(f as i64)),
                Value::Str(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|_| incompatible(&Value::Str(s))),
                other => Err(incompatible(&other)),
            },
            DataType::Float => match self {
                Value::Int(i) => Ok(Value::Float(i as f64)),
                Value::Float(f) => Ok(Value::Float(f)),
                Value::Str(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(Value::Float)
                    .map_err(|_| incompatible(&Value::Str(s))),
                other => Err(incompatible(&other)),
            },
            DataType::String => match self {
                Value::Str(s) => Ok(Value::Str(s)),
                other => Err(incompatible(&other)),
            },
            DataType::Bool => match self {
                Value::Bool(b) => Ok(Value::Bool(b)),
                Value::Str(s) => match s.to_lowercase().as_str() {
                    "true" | "1" | "yes" => Ok(Value::Bool(true)),
                    "false" | "0" | "no" => Ok(Value::Bool(false)),
                    _ => Err(incompatible(&Value::Str(s))),
                },
                other => Err(incompatible(&other)),
            },
            DataType::Date => match self {
                Value::Date(d) => Ok(Value::Date(d)),
                Value::Str(s) => parse_date(&s).map(Value::Date),
                other => Err(incompatible(&other)),
            },
            DataType::Time => match self {
                Value::Time(t) => Ok(Value::Time(t)),
                Value::Str(s) => parse_time(&s).map(Value::Time),
                other => Err(incompatible(&other)),
            },
            DataType::DateTime => match self {
                Value::DateTime(dt) => Ok(Value::DateTime(dt)),
                Value::Str(s) => parse_datetime(&s).map(Value::DateTime),
                other => Err(incompatible(&other)),
            },
        }
    }

    /// Compares two values under the query comparison rules.
    ///
    /// Returns `None` when either side is `Null` (so `=` and `<` alike come
    /// out false) or when a float comparison is undefined. A numeric pair
    /// compares numerically regardless of `INT`/`FLOAT` mix; two values of
    /// the same type compare naturally; any other mix coerces both sides
    /// to their string rendering.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => None,
            (left, right) if left.as_f64().is_some() && right.as_f64().is_some() => {
                left.as_f64()?.partial_cmp(&right.as_f64()?)
            }
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::Time(a), Value::Time(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (left, right) => Some(left.to_string().cmp(&right.to_string())),
        }
    }

    /// A short rendering used in error messages: strings come quoted.
    pub fn describe(&self) -> String {
        match self {
            Value::Str(s) => format!("'{}'", s),
            other => other.to_string(),
        }
    }

    fn canonical_int(f: f64) -> Option<i64> {
        if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
            Some(f as i64)
        } else {
            None
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Time(t) => {
                if t.nanosecond() == 0 {
                    write!(f, "{}", t.format("%H:%M:%S"))
                } else {
                    write!(f, "{}", t.format("%H:%M:%S%.f"))
                }
            }
            Value::DateTime(dt) => {
                if dt.time().nanosecond() == 0 {
                    write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S"))
                } else {
                    write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f"))
                }
            }
        }
    }
}

/// Storage equality, used by indexes and row maps.
///
/// `Int` and `Float` holding the same number are equal; everything else is
/// structural. `Null == Null` is true here (a hash map needs a reflexive
/// key), which is why indexes never store `Null` and the evaluator handles
/// it before comparing.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            _ => false,
        }
    }
}

// Values holding NaN never occur: every float originates from a numeric
// literal or a coercion of one, and the lexer cannot produce NaN.
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => state.write_u8(0),
            Value::Int(i) => {
                state.write_u8(1);
                i.hash(state);
            }
            Value::Float(f) => {
                // Keep the hash consistent with Int/Float cross-equality.
                state.write_u8(1);
                match Value::canonical_int(*f) {
                    Some(i) => i.hash(state),
                    None => f.to_bits().hash(state),
                }
            }
            Value::Str(s) => {
                state.write_u8(2);
                s.hash(state);
            }
            Value::Bool(b) => {
                state.write_u8(3);
                b.hash(state);
            }
            Value::Date(d) => {
                state.write_u8(4);
                d.hash(state);
            }
            Value::Time(t) => {
                state.write_u8(5);
                t.hash(state);
            }
            Value::DateTime(dt) => {
                state.write_u8(6);
                dt.hash(state);
            }
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Bool(b) => serializer.serialize_bool(*b),
            // Temporal values are encoded as their ISO-8601 rendering; the
            // column type re-types them on load.
            Value::Date(_) | Value::Time(_) | Value::DateTime(_) => {
                serializer.serialize_str(&self.to_string())
            }
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Value {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValueVisitor;

        impl<'de> serde::de::Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON scalar (null, number, string or boolean)")
            }

            fn visit_bool<E: serde::de::Error>(self, v: bool) -> Result<Value, E> {
                Ok(Value::Bool(v))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Value, E> {
                Ok(Value::Int(v))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Value, E> {
                if v <= i64::MAX as u64 {
                    Ok(Value::Int(v as i64))
                } else {
                    Ok(Value::Float(v as f64))
                }
            }

            fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Value, E> {
                Ok(Value::Float(v))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Value, E> {
                Ok(Value::Str(v.into()))
            }

            fn visit_string<E: serde::de::Error>(self, v: String) -> Result<Value, E> {
                Ok(Value::Str(v))
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E: serde::de::Error>(self) -> Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D2: serde::Deserializer<'de>>(
                self,
                deserializer: D2,
            ) -> Result<Value, D2::Error> {
                deserializer.deserialize_any(ValueVisitor)
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

/// Error produced by value parsing and coercion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueError {
    message: String,
}

impl ValueError {
    /// Creates a new value error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ValueError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_cross_type_equality() {
        assert_eq!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::Int(1), Value::Float(1.5));
        assert_ne!(Value::Int(1), Value::Str("1".into()));
    }

    #[test]
    fn numeric_cross_type_hash_agrees_with_equality() {
        fn hash_of(value: &Value) -> u64 {
            use core::hash::Hasher as _;
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            value.hash(&mut hasher);
            hasher.finish()
        }
        assert_eq!(hash_of(&Value::Int(7)), hash_of(&Value::Float(7.0)));
        assert_ne!(hash_of(&Value::Int(7)), hash_of(&Value::Float(7.5)));
    }

    #[test]
    fn comparison_rules() {
        assert_eq!(
            Value::Int(2).compare(&Value::Float(2.5)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::Str("a".into()).compare(&Value::Str("b".into())),
            Some(Ordering::Less)
        );
        // Mixed non-numeric types coerce to string.
        assert_eq!(
            Value::Int(1).compare(&Value::Str("1".into())),
            Some(Ordering::Equal)
        );
        // NULL compares as unknown.
        assert_eq!(Value::Null.compare(&Value::Int(1)), None);
        assert_eq!(Value::Null.compare(&Value::Null), None);
    }

    #[test]
    fn coercion_narrowest_fit() {
        assert_eq!(
            Value::Str("42".into()).coerce_to(DataType::Int).unwrap(),
            Value::Int(42)
        );
        assert_eq!(
            Value::Int(3).coerce_to(DataType::Float).unwrap(),
            Value::Float(3.0)
        );
        assert_eq!(
            Value::Str("yes".into()).coerce_to(DataType::Bool).unwrap(),
            Value::Bool(true)
        );
        assert!(Value::Bool(true).coerce_to(DataType::Int).is_err());
        assert!(Value::Str("abc".into()).coerce_to(DataType::Int).is_err());
        // NULL coerces to anything.
        assert_eq!(Value::Null.coerce_to(DataType::Date).unwrap(), Value::Null);
    }

    #[test]
    fn temporal_coercion_parses_iso() {
        let date = Value::Str("2024-01-15".into())
            .coerce_to(DataType::Date)
            .unwrap();
        assert_eq!(date.to_string(), "2024-01-15");
        let datetime = Value::Str("2024-01-15T10:30:00Z".into())
            .coerce_to(DataType::DateTime)
            .unwrap();
        assert_eq!(datetime.to_string(), "2024-01-15T10:30:00");
        assert!(Value::Str("junk".into()).coerce_to(DataType::Date).is_err());
    }
}
