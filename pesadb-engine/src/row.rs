use indexmap::IndexMap;

use pesadb_core::{parse_datetime, DataType, Value};

use crate::{error::EngineError, table::Column};

/// An ordered mapping from column name to value, as returned by queries.
pub type RowMap = IndexMap<String, Value>;

/// A single stored row: an ordered, named, typed tuple.
///
/// A row is only ever constructed against a schema, which fixes the entry
/// order and coerces every value to its column type.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    values: RowMap,
}

impl Row {
    /// Builds a row against `columns`, coercing each value.
    ///
    /// Every declared column must be present in `values` (use an explicit
    /// `Value::Null` for absent data); entries for unknown columns are
    /// ignored.
    pub fn new(columns: &[Column], mut values: RowMap) -> Result<Self, EngineError> {
        let mut row = RowMap::with_capacity(columns.len());
        for column in columns {
            let value = values
                .swap_remove(&column.name)
                .ok_or_else(|| {
                    EngineError::schema(format!("Missing value for column: {}", column.name))
                })?;
            let value = value.coerce_to(column.data_type).map_err(|err| {
                EngineError::schema(format!("Column '{}': {}", column.name, err))
            })?;
            validate_timestamp_string(column, &value)?;
            row.insert(column.name.clone(), value);
        }
        Ok(Self { values: row })
    }

    /// Returns the value of the named column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Overwrites the value of an existing column.
    ///
    /// The caller is responsible for having coerced `value` to the column
    /// type; rows never change shape after construction.
    pub(crate) fn set(&mut self, column: &str, value: Value) {
        if let Some(slot) = self.values.get_mut(column) {
            *slot = value;
        }
    }

    /// The row as an ordered column-to-value map.
    pub fn to_map(&self) -> RowMap {
        self.values.clone()
    }

    /// Iterates over `(column, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

/// STRING columns whose name marks them as temporal (`*_at`, `*_date`, or
/// containing `timestamp`) must hold ISO-8601 text. Legacy rule kept for
/// data written before the dedicated temporal types existed.
fn validate_timestamp_string(column: &Column, value: &Value) -> Result<(), EngineError> {
    if column.data_type != DataType::String {
        return Ok(());
    }
    let name = column.name.to_lowercase();
    if !(name.ends_with("_at") || name.ends_with("_date") || name.contains("timestamp")) {
        return Ok(());
    }
    if let Value::Str(text) = value {
        parse_datetime(text).map_err(|_| {
            EngineError::schema(format!(
                "Column '{}': invalid datetime format: {}. Expected ISO-8601 (e.g., '2024-01-15T10:30:00Z')",
                column.name, text
            ))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<Column> {
        vec![
            Column::primary_key("id", DataType::Int),
            Column::plain("name", DataType::String),
            Column::plain("active", DataType::Bool),
        ]
    }

    fn values(entries: &[(&str, Value)]) -> RowMap {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn construction_orders_and_coerces() {
        // Values arrive in arbitrary order; the row follows the schema.
        let row = Row::new(
            &columns(),
            values(&[
                ("active", Value::Str("yes".into())),
                ("id", Value::Str("7".into())),
                ("name", Value::Str("a".into())),
            ]),
        )
        .unwrap();
        let keys: Vec<_> = row.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["id", "name", "active"]);
        assert_eq!(row.get("id"), Some(&Value::Int(7)));
        assert_eq!(row.get("active"), Some(&Value::Bool(true)));
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let err = Row::new(&columns(), values(&[("id", Value::Int(1))])).unwrap_err();
        assert!(err.to_string().contains("Missing value for column: name"));
    }

    #[test]
    fn incoercible_value_is_a_schema_error() {
        let err = Row::new(
            &columns(),
            values(&[
                ("id", Value::Str("abc".into())),
                ("name", Value::Str("a".into())),
                ("active", Value::Bool(false)),
            ]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Column 'id'"));
    }

    #[test]
    fn timestamp_named_string_columns_require_iso() {
        let columns = vec![
            Column::primary_key("id", DataType::Int),
            Column::plain("created_at", DataType::String),
        ];
        let ok = Row::new(
            &columns,
            values(&[
                ("id", Value::Int(1)),
                ("created_at", Value::Str("2024-01-15T10:30:00Z".into())),
            ]),
        );
        assert!(ok.is_ok());

        let err = Row::new(
            &columns,
            values(&[
                ("id", Value::Int(1)),
                ("created_at", Value::Str("yesterday".into())),
            ]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("created_at"));
    }
}
