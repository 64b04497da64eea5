use std::collections::HashMap;

use pesadb_core::Value;

use crate::error::EngineError;

/// An equality hash index over one column: value to row positions.
///
/// `Null` is never indexed. A unique index therefore admits any number of
/// NULLs in its column, and looking up `Null` finds nothing; this matches
/// the comparison rule that `NULL = NULL` is false.
#[derive(Clone, Debug, Default)]
pub struct Index {
    column: String,
    unique: bool,
    entries: HashMap<Value, Vec<usize>>,
}

impl Index {
    /// Creates an empty index over `column`.
    pub fn new(column: impl Into<String>, unique: bool) -> Self {
        Self {
            column: column.into(),
            unique,
            entries: HashMap::new(),
        }
    }

    /// Whether this index enforces uniqueness.
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Inserts a value, rejecting duplicates on unique indexes.
    pub fn insert(&mut self, value: &Value, row_id: usize) -> Result<(), EngineError> {
        if value.is_null() {
            return Ok(());
        }
        if self.unique && self.entries.contains_key(value) {
            return Err(EngineError::constraint(format!(
                "UNIQUE constraint violation: Value '{}' already exists in column '{}'",
                value, self.column
            )));
        }
        self.entries.entry(value.clone()).or_default().push(row_id);
        Ok(())
    }

    /// Inserts a value without the uniqueness check, for rebuilds from
    /// already-validated rows.
    pub fn insert_unchecked(&mut self, value: &Value, row_id: usize) {
        if value.is_null() {
            return;
        }
        self.entries.entry(value.clone()).or_default().push(row_id);
    }

    /// The row positions holding `value`.
    pub fn lookup(&self, value: &Value) -> &[usize] {
        self.entries.get(value).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Removes one `(value, row_id)` entry.
    pub fn remove(&mut self, value: &Value, row_id: usize) {
        if let Some(ids) = self.entries.get_mut(value) {
            ids.retain(|&id| id != row_id);
            if ids.is_empty() {
                self.entries.remove(value);
            }
        }
    }

    /// Moves a row from `old` to `new`, enforcing uniqueness of `new`.
    pub fn update(&mut self, old: &Value, new: &Value, row_id: usize) -> Result<(), EngineError> {
        if old == new {
            return Ok(());
        }
        if self.unique && !new.is_null() && self.entries.contains_key(new) {
            return Err(EngineError::constraint(format!(
                "UNIQUE constraint violation: Value '{}' already exists in column '{}'",
                new, self.column
            )));
        }
        self.remove(old, row_id);
        self.insert_unchecked(new, row_id);
        Ok(())
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
