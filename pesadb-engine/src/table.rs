use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use pesadb_ast::statement::ReferentialAction;
use pesadb_core::{DataType, Value};

use crate::{
    error::EngineError,
    index::Index,
    row::{Row, RowMap},
};

/// The definition of one table column, including its constraints and
/// foreign-key metadata. This is also the shape persisted in snapshots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Column type.
    #[serde(rename = "type")]
    pub data_type: DataType,
    /// Whether this is the table's primary key.
    #[serde(default)]
    pub is_primary_key: bool,
    /// Whether the column carries a UNIQUE constraint.
    #[serde(default)]
    pub is_unique: bool,
    /// Referenced table, when the column is a foreign key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key_table: Option<String>,
    /// Referenced column, when the column is a foreign key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key_column: Option<String>,
    /// Action applied to referencing rows when a referenced row is deleted.
    #[serde(default, skip_serializing_if = "is_restrict")]
    pub on_delete: ReferentialAction,
    /// Action applied to referencing rows when a referenced key changes.
    #[serde(default, skip_serializing_if = "is_restrict")]
    pub on_update: ReferentialAction,
}

fn is_restrict(action: &ReferentialAction) -> bool {
    *action == ReferentialAction::Restrict
}

impl Column {
    /// A plain column with no constraints.
    pub fn plain(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            is_primary_key: false,
            is_unique: false,
            foreign_key_table: None,
            foreign_key_column: None,
            on_delete: ReferentialAction::default(),
            on_update: ReferentialAction::default(),
        }
    }

    /// A primary-key column.
    pub fn primary_key(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            is_primary_key: true,
            ..Self::plain(name, data_type)
        }
    }

    /// A column carrying a UNIQUE constraint.
    pub fn unique(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            is_unique: true,
            ..Self::plain(name, data_type)
        }
    }

    /// Makes the column a foreign key referencing `table.column`.
    pub fn with_reference(
        mut self,
        table: impl Into<String>,
        column: impl Into<String>,
        on_delete: ReferentialAction,
        on_update: ReferentialAction,
    ) -> Self {
        self.foreign_key_table = Some(table.into());
        self.foreign_key_column = Some(column.into());
        self.on_delete = on_delete;
        self.on_update = on_update;
        self
    }

    /// The `(table, column)` this column references, if it is a foreign key.
    pub fn references(&self) -> Option<(&str, &str)> {
        match (&self.foreign_key_table, &self.foreign_key_column) {
            (Some(table), Some(column)) => Some((table.as_str(), column.as_str())),
            _ => None,
        }
    }
}

/// A table: an ordered row list plus the indexes that enforce its
/// constraints and accelerate equality lookups.
///
/// Row identifiers are dense positions into the row list; deletions
/// rebuild every index so identifiers stay in `[0, N)`.
#[derive(Clone, Debug)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Row>,
    indexes: IndexMap<String, Index>,
}

impl Table {
    /// Creates an empty table, validating the schema.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Self, EngineError> {
        let name = name.into();
        validate_schema(&columns)?;

        let mut indexes = IndexMap::new();
        for column in &columns {
            if column.is_primary_key || column.is_unique {
                indexes.insert(column.name.clone(), Index::new(&column.name, true));
            }
        }
        // Foreign-key columns get a non-unique index for join and cascade
        // lookups, unless a unique one already covers them.
        for column in &columns {
            if column.references().is_some() && !indexes.contains_key(&column.name) {
                indexes.insert(column.name.clone(), Index::new(&column.name, false));
            }
        }

        Ok(Self {
            name,
            columns,
            rows: Vec::new(),
            indexes,
        })
    }

    /// The table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The column definitions, in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Looks up a column definition by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// The primary-key column.
    pub fn primary_key(&self) -> &Column {
        self.columns
            .iter()
            .find(|column| column.is_primary_key)
            .expect("schema validation guarantees a primary key")
    }

    /// The column names, in declaration order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.name.clone()).collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The stored rows, in insertion order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Whether `column` has an index.
    pub fn is_indexed(&self, column: &str) -> bool {
        self.indexes.contains_key(column)
    }

    /// Inserts a row, returning its position.
    ///
    /// The row is validated first, then offered to every index (where the
    /// unique checks happen) and only then appended. If any index rejects
    /// it, entries already made are rolled back and nothing is stored.
    pub fn insert(&mut self, values: RowMap) -> Result<usize, EngineError> {
        let row = Row::new(&self.columns, values)?;

        let primary_key = self.primary_key().name.clone();
        if row.get(&primary_key).map(Value::is_null).unwrap_or(true) {
            return Err(EngineError::constraint(format!(
                "PRIMARY KEY column '{}' cannot be NULL",
                primary_key
            )));
        }

        let row_id = self.rows.len();
        let index_columns: Vec<String> = self.indexes.keys().cloned().collect();
        let mut inserted: Vec<String> = Vec::with_capacity(index_columns.len());
        for column in index_columns {
            let value = row.get(&column).cloned().unwrap_or(Value::Null);
            let index = self
                .indexes
                .get_mut(&column)
                .expect("index listed a moment ago");
            if let Err(err) = index.insert(&value, row_id) {
                for done in &inserted {
                    let value = row.get(done).cloned().unwrap_or(Value::Null);
                    self.indexes
                        .get_mut(done)
                        .expect("rollback of a just-written index")
                        .remove(&value, row_id);
                }
                return Err(err);
            }
            inserted.push(column);
        }

        self.rows.push(row);
        Ok(row_id)
    }

    /// Finds the positions of rows where `column` equals `value`, using
    /// the column's index when it has one.
    pub fn locate(&self, column: &str, value: &Value) -> Result<Vec<usize>, EngineError> {
        self.require_column(column)?;
        if let Some(index) = self.indexes.get(column) {
            return Ok(index.lookup(value).to_vec());
        }
        Ok(self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.get(column) == Some(value))
            .map(|(id, _)| id)
            .collect())
    }

    /// Selects rows as maps, optionally filtered by a single equality and
    /// projected to the requested columns.
    pub fn select(
        &self,
        columns: Option<&[String]>,
        filter: Option<(&str, &Value)>,
    ) -> Result<Vec<RowMap>, EngineError> {
        if let Some(columns) = columns {
            for column in columns {
                self.require_column(column)?;
            }
        }

        let row_ids: Vec<usize> = match filter {
            Some((column, value)) => self.locate(column, value)?,
            None => (0..self.rows.len()).collect(),
        };

        Ok(row_ids
            .into_iter()
            .map(|id| {
                let row = &self.rows[id];
                match columns {
                    Some(columns) => columns
                        .iter()
                        .map(|column| {
                            let value = row.get(column).cloned().unwrap_or(Value::Null);
                            (column.clone(), value)
                        })
                        .collect(),
                    None => row.to_map(),
                }
            })
            .collect())
    }

    /// Coerces `value` to the type of `column`.
    pub fn coerce_value(&self, column: &str, value: Value) -> Result<Value, EngineError> {
        let column = self
            .column(column)
            .ok_or_else(|| self.no_such_column(column))?;
        value
            .coerce_to(column.data_type)
            .map_err(|err| EngineError::schema(format!("Column '{}': {}", column.name, err)))
    }

    /// Writes `value` (already coerced) into `column` of the given rows,
    /// keeping the column's index in step. Returns the affected count.
    pub fn update_rows(
        &mut self,
        column: &str,
        value: &Value,
        row_ids: &[usize],
    ) -> Result<usize, EngineError> {
        self.require_column(column)?;
        if self.column(column).map(|c| c.is_primary_key).unwrap_or(false) && value.is_null() {
            return Err(EngineError::constraint(format!(
                "PRIMARY KEY column '{}' cannot be NULL",
                column
            )));
        }
        for &row_id in row_ids {
            self.set_value(row_id, column, value.clone())?;
        }
        Ok(row_ids.len())
    }

    /// Writes one value into one row, updating the column's index.
    pub(crate) fn set_value(
        &mut self,
        row_id: usize,
        column: &str,
        value: Value,
    ) -> Result<(), EngineError> {
        let old = self.rows[row_id]
            .get(column)
            .cloned()
            .unwrap_or(Value::Null);
        if let Some(index) = self.indexes.get_mut(column) {
            index.update(&old, &value, row_id)?;
        }
        self.rows[row_id].set(column, value);
        Ok(())
    }

    /// Deletes the given rows and reindexes. Returns the deleted count.
    pub fn delete_rows(&mut self, row_ids: &[usize]) -> usize {
        let mut ids: Vec<usize> = row_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        // Remove in reverse order so earlier positions stay valid.
        for &row_id in ids.iter().rev() {
            let row = self.rows.remove(row_id);
            for (column, index) in self.indexes.iter_mut() {
                let value = row.get(column).cloned().unwrap_or(Value::Null);
                index.remove(&value, row_id);
            }
        }

        // Positions have shifted; rebuild from scratch.
        if !ids.is_empty() {
            self.rebuild_indexes();
        }
        ids.len()
    }

    /// Appends a row without constraint checks, for snapshot loading.
    pub(crate) fn load_row(&mut self, values: RowMap) -> Result<(), EngineError> {
        let row = Row::new(&self.columns, values)?;
        self.rows.push(row);
        Ok(())
    }

    /// Rebuilds every index from the current rows.
    pub(crate) fn rebuild_indexes(&mut self) {
        for index in self.indexes.values_mut() {
            index.clear();
        }
        let columns: Vec<String> = self.indexes.keys().cloned().collect();
        for column in columns {
            for (row_id, row) in self.rows.iter().enumerate() {
                let value = row.get(&column).cloned().unwrap_or(Value::Null);
                self.indexes
                    .get_mut(&column)
                    .expect("rebuilding a listed index")
                    .insert_unchecked(&value, row_id);
            }
        }
    }

    fn require_column(&self, column: &str) -> Result<(), EngineError> {
        if self.column(column).is_none() {
            return Err(self.no_such_column(column));
        }
        Ok(())
    }

    fn no_such_column(&self, column: &str) -> EngineError {
        EngineError::lookup(format!(
            "Column '{}' does not exist in table '{}'",
            column, self.name
        ))
    }
}

fn validate_schema(columns: &[Column]) -> Result<(), EngineError> {
    if columns.is_empty() {
        return Err(EngineError::schema("Table must have at least one column"));
    }

    let mut seen = std::collections::HashSet::new();
    for column in columns {
        if !seen.insert(column.name.as_str()) {
            return Err(EngineError::schema(format!(
                "Duplicate column name: '{}'",
                column.name
            )));
        }
    }

    match columns.iter().filter(|column| column.is_primary_key).count() {
        0 => Err(EngineError::schema(
            "Table must have exactly one PRIMARY KEY column",
        )),
        1 => Ok(()),
        _ => Err(EngineError::schema(
            "Table can have only one PRIMARY KEY column",
        )),
    }
}
