use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use pesadb_ast::statement::ReferentialAction;
use pesadb_core::Value;

use crate::{
    error::EngineError,
    row::RowMap,
    table::{Column, Table},
};

/// A named collection of tables.
///
/// The database owns every table and is the place where cross-table
/// concerns live: foreign-key validation on insert and update, and the
/// referential actions (RESTRICT, CASCADE, SET NULL) that deletes and key
/// updates trigger in referencing tables.
#[derive(Clone, Debug)]
pub struct Database {
    name: String,
    tables: IndexMap<String, Table>,
}

impl Database {
    /// Creates an empty database.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: IndexMap::new(),
        }
    }

    /// The database name, used for persistence.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a table.
    pub fn create_table(&mut self, table: Table) -> Result<(), EngineError> {
        if self.tables.contains_key(table.name()) {
            return Err(EngineError::schema(format!(
                "Table '{}' already exists",
                table.name()
            )));
        }
        debug!(database = %self.name, table = %table.name(), "created table");
        self.tables.insert(table.name().to_string(), table);
        Ok(())
    }

    /// Looks up a table.
    pub fn table(&self, name: &str) -> Result<&Table, EngineError> {
        self.tables
            .get(name)
            .ok_or_else(|| EngineError::lookup(format!("Table '{}' does not exist", name)))
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut Table, EngineError> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| EngineError::lookup(format!("Table '{}' does not exist", name)))
    }

    /// Removes a table. The caller is responsible for any tables that
    /// reference it; no cross-table check happens here.
    pub fn drop_table(&mut self, name: &str) -> Result<(), EngineError> {
        if self.tables.shift_remove(name).is_none() {
            return Err(EngineError::lookup(format!(
                "Table '{}' does not exist",
                name
            )));
        }
        debug!(database = %self.name, table = %name, "dropped table");
        Ok(())
    }

    /// The table names, in creation order.
    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    /// Inserts a row, validating foreign keys against sibling tables
    /// before the table enforces its own constraints.
    pub fn insert_into(&mut self, table_name: &str, values: RowMap) -> Result<usize, EngineError> {
        let table = self.table(table_name)?;
        for column in table.columns() {
            let Some((fk_table, fk_column)) = column.references() else {
                continue;
            };
            let Some(value) = values.get(&column.name) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            self.check_foreign_key(&column.name, value, fk_table, fk_column)?;
        }
        self.table_mut(table_name)?.insert(values)
    }

    fn check_foreign_key(
        &self,
        column: &str,
        value: &Value,
        fk_table: &str,
        fk_column: &str,
    ) -> Result<(), EngineError> {
        let referenced = self.tables.get(fk_table).ok_or_else(|| {
            EngineError::lookup(format!(
                "Referenced table '{}' does not exist",
                fk_table
            ))
        })?;
        if referenced.column(fk_column).is_none() {
            return Err(EngineError::lookup(format!(
                "Referenced column '{}' does not exist in table '{}'",
                fk_column, fk_table
            )));
        }
        let value = referenced.coerce_value(fk_column, value.clone())?;
        if referenced.locate(fk_column, &value)?.is_empty() {
            return Err(EngineError::constraint(format!(
                "FOREIGN KEY constraint violation on column '{}': value {} does not exist in {}({})",
                column,
                value.describe(),
                fk_table,
                fk_column
            )));
        }
        Ok(())
    }

    /// Deletes the given rows, applying `ON DELETE` actions in referencing
    /// tables. The whole operation is planned first: a RESTRICT anywhere in
    /// the cascade aborts before anything is touched.
    ///
    /// Returns the number of rows deleted from the named table itself.
    pub fn delete_rows(
        &mut self,
        table_name: &str,
        row_ids: &[usize],
    ) -> Result<usize, EngineError> {
        let plan = self.plan_delete(table_name, row_ids)?;

        // Clear referencing columns first, while row positions are stable.
        for (table, column, ids) in &plan.set_nulls {
            let doomed = plan.deletes.get(table);
            for &row_id in ids {
                if doomed.map(|set| set.contains(&row_id)).unwrap_or(false) {
                    continue;
                }
                self.table_mut(table)?.set_value(row_id, column, Value::Null)?;
            }
        }

        let mut origin_count = 0;
        for (table, ids) in &plan.deletes {
            let ids: Vec<usize> = ids.iter().copied().collect();
            let count = self.table_mut(table)?.delete_rows(&ids);
            if table == table_name {
                origin_count = count;
            }
            debug!(database = %self.name, table = %table, count, "deleted rows");
        }
        Ok(origin_count)
    }

    fn plan_delete(&self, origin: &str, row_ids: &[usize]) -> Result<DeletePlan, EngineError> {
        self.table(origin)?;

        let mut plan = DeletePlan::default();
        let mut visited: HashSet<(String, usize)> = HashSet::new();
        let mut stack: Vec<(String, Vec<usize>)> = vec![(origin.to_string(), row_ids.to_vec())];

        while let Some((table_name, ids)) = stack.pop() {
            let fresh: Vec<usize> = ids
                .into_iter()
                .filter(|&id| visited.insert((table_name.clone(), id)))
                .collect();
            if fresh.is_empty() {
                continue;
            }
            plan.deletes
                .entry(table_name.clone())
                .or_default()
                .extend(&fresh);

            let table = self.table(&table_name)?;
            for (referencing_name, referencing) in &self.tables {
                for column in referencing.columns() {
                    let Some((fk_table, fk_column)) = column.references() else {
                        continue;
                    };
                    if fk_table != table_name {
                        continue;
                    }
                    for &row_id in &fresh {
                        let value = table.rows()[row_id]
                            .get(fk_column)
                            .cloned()
                            .unwrap_or(Value::Null);
                        if value.is_null() {
                            continue;
                        }
                        let hits: Vec<usize> = referencing
                            .locate(&column.name, &value)?
                            .into_iter()
                            .filter(|&id| !visited.contains(&(referencing_name.clone(), id)))
                            .collect();
                        if hits.is_empty() {
                            continue;
                        }
                        match column.on_delete {
                            ReferentialAction::Restrict | ReferentialAction::NoAction => {
                                return Err(EngineError::constraint(format!(
                                    "Cannot delete from '{}': value {} is referenced by '{}.{}' (ON DELETE {})",
                                    table_name,
                                    value.describe(),
                                    referencing_name,
                                    column.name,
                                    column.on_delete
                                )));
                            }
                            ReferentialAction::Cascade => {
                                stack.push((referencing_name.clone(), hits));
                            }
                            ReferentialAction::SetNull => {
                                plan.set_nulls.push((
                                    referencing_name.clone(),
                                    column.name.clone(),
                                    hits,
                                ));
                            }
                        }
                    }
                }
            }
        }
        Ok(plan)
    }

    /// Updates one column of the given rows, validating foreign keys and
    /// applying `ON UPDATE` actions when a primary-key or unique value that
    /// other tables reference is changed.
    ///
    /// Returns the number of rows updated in the named table itself.
    pub fn update_rows(
        &mut self,
        table_name: &str,
        column_name: &str,
        value: Value,
        row_ids: &[usize],
    ) -> Result<usize, EngineError> {
        let table = self.table(table_name)?;
        let new_value = table.coerce_value(column_name, value)?;
        let column = table
            .column(column_name)
            .expect("coerce_value checked the column");

        // A foreign-key column must keep pointing at an existing row.
        if let Some((fk_table, fk_column)) = column.references() {
            if !new_value.is_null() {
                self.check_foreign_key(column_name, &new_value, fk_table, fk_column)?;
            }
        }

        let writes = if column.is_primary_key || column.is_unique {
            self.plan_key_update(table_name, column_name, &new_value, row_ids)?
        } else {
            Vec::new()
        };

        let count = self
            .table_mut(table_name)?
            .update_rows(column_name, &new_value, row_ids)?;

        for write in writes {
            self.table_mut(&write.table)?
                .set_value(write.row_id, &write.column, write.value)?;
        }
        Ok(count)
    }

    /// Plans the writes `ON UPDATE` actions require in referencing tables
    /// when a referenced key changes. RESTRICT aborts here, before any
    /// mutation.
    fn plan_key_update(
        &self,
        table_name: &str,
        column_name: &str,
        new_value: &Value,
        row_ids: &[usize],
    ) -> Result<Vec<PlannedWrite>, EngineError> {
        let mut writes = Vec::new();
        let mut visited: HashSet<(String, String, Value)> = HashSet::new();
        let mut stack: Vec<(String, String, Value, Value)> = Vec::new();

        let table = self.table(table_name)?;
        for &row_id in row_ids {
            let old = table.rows()[row_id]
                .get(column_name)
                .cloned()
                .unwrap_or(Value::Null);
            if old.is_null() || old == *new_value {
                continue;
            }
            stack.push((
                table_name.to_string(),
                column_name.to_string(),
                old,
                new_value.clone(),
            ));
        }

        while let Some((referenced_table, referenced_column, old, new)) = stack.pop() {
            if !visited.insert((referenced_table.clone(), referenced_column.clone(), old.clone()))
            {
                continue;
            }
            for (referencing_name, referencing) in &self.tables {
                for column in referencing.columns() {
                    let Some((fk_table, fk_column)) = column.references() else {
                        continue;
                    };
                    if fk_table != referenced_table || fk_column != referenced_column {
                        continue;
                    }
                    let hits = referencing.locate(&column.name, &old)?;
                    if hits.is_empty() {
                        continue;
                    }
                    match column.on_update {
                        ReferentialAction::Restrict | ReferentialAction::NoAction => {
                            return Err(EngineError::constraint(format!(
                                "Cannot update '{}.{}': value {} is referenced by '{}.{}' (ON UPDATE {})",
                                referenced_table,
                                referenced_column,
                                old.describe(),
                                referencing_name,
                                column.name,
                                column.on_update
                            )));
                        }
                        ReferentialAction::Cascade => {
                            let propagated =
                                referencing.coerce_value(&column.name, new.clone())?;
                            for &row_id in &hits {
                                writes.push(PlannedWrite {
                                    table: referencing_name.clone(),
                                    row_id,
                                    column: column.name.clone(),
                                    value: propagated.clone(),
                                });
                            }
                            // The referencing column may itself be a key
                            // someone references.
                            if column.is_primary_key || column.is_unique {
                                stack.push((
                                    referencing_name.clone(),
                                    column.name.clone(),
                                    old.clone(),
                                    propagated,
                                ));
                            }
                        }
                        ReferentialAction::SetNull => {
                            for &row_id in &hits {
                                writes.push(PlannedWrite {
                                    table: referencing_name.clone(),
                                    row_id,
                                    column: column.name.clone(),
                                    value: Value::Null,
                                });
                            }
                        }
                    }
                }
            }
        }
        Ok(writes)
    }

    pub(crate) fn to_snapshot(&self) -> DatabaseSnapshot {
        DatabaseSnapshot {
            name: self.name.clone(),
            tables: self
                .tables
                .iter()
                .map(|(name, table)| {
                    (
                        name.clone(),
                        TableSnapshot {
                            columns: table.columns().to_vec(),
                            rows: table.rows().iter().map(|row| row.to_map()).collect(),
                        },
                    )
                })
                .collect(),
        }
    }

    pub(crate) fn from_snapshot(snapshot: DatabaseSnapshot) -> Result<Self, EngineError> {
        let mut database = Database::new(snapshot.name);
        for (name, table_snapshot) in snapshot.tables {
            let mut table = Table::new(name.clone(), table_snapshot.columns)?;
            // The snapshot is assumed consistent: rows go in without
            // uniqueness checks and the indexes are rebuilt at the end.
            for row in table_snapshot.rows {
                table.load_row(row)?;
            }
            table.rebuild_indexes();
            database.tables.insert(name, table);
        }
        Ok(database)
    }
}

/// One write a planned cascade will perform.
struct PlannedWrite {
    table: String,
    row_id: usize,
    column: String,
    value: Value,
}

#[derive(Default)]
struct DeletePlan {
    deletes: IndexMap<String, HashSet<usize>>,
    set_nulls: Vec<(String, String, Vec<usize>)>,
}

/// The self-describing on-disk form of a database.
#[derive(Serialize, Deserialize)]
pub(crate) struct DatabaseSnapshot {
    pub(crate) name: String,
    pub(crate) tables: IndexMap<String, TableSnapshot>,
}

#[derive(Serialize, Deserialize)]
pub(crate) struct TableSnapshot {
    columns: Vec<Column>,
    rows: Vec<RowMap>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pesadb_core::DataType;

    fn users_orders(on_delete: ReferentialAction, on_update: ReferentialAction) -> Database {
        let mut db = Database::new("shop");
        db.create_table(
            Table::new(
                "users",
                vec![Column::primary_key("id", DataType::Int)],
            )
            .unwrap(),
        )
        .unwrap();
        db.create_table(
            Table::new(
                "orders",
                vec![
                    Column::primary_key("oid", DataType::Int),
                    Column::plain("uid", DataType::Int).with_reference(
                        "users",
                        "id",
                        on_delete,
                        on_update,
                    ),
                ],
            )
            .unwrap(),
        )
        .unwrap();
        db
    }

    fn values(entries: &[(&str, Value)]) -> RowMap {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    fn seed(db: &mut Database) {
        db.insert_into("users", values(&[("id", Value::Int(1))])).unwrap();
        db.insert_into("users", values(&[("id", Value::Int(2))])).unwrap();
        for (oid, uid) in [(10, 1), (11, 1), (12, 2)] {
            db.insert_into(
                "orders",
                values(&[("oid", Value::Int(oid)), ("uid", Value::Int(uid))]),
            )
            .unwrap();
        }
    }

    #[test]
    fn insert_validates_foreign_keys() {
        let mut db = users_orders(ReferentialAction::Restrict, ReferentialAction::Restrict);
        db.insert_into("users", values(&[("id", Value::Int(1))])).unwrap();

        let err = db
            .insert_into(
                "orders",
                values(&[("oid", Value::Int(10)), ("uid", Value::Int(99))]),
            )
            .unwrap_err();
        assert!(err.to_string().contains("FOREIGN KEY constraint violation"));

        // NULL foreign keys are always admissible.
        db.insert_into(
            "orders",
            values(&[("oid", Value::Int(10)), ("uid", Value::Null)]),
        )
        .unwrap();
    }

    #[test]
    fn delete_restrict_aborts_untouched() {
        let mut db = users_orders(ReferentialAction::Restrict, ReferentialAction::Restrict);
        seed(&mut db);

        let ids = db.table("users").unwrap().locate("id", &Value::Int(1)).unwrap();
        let err = db.delete_rows("users", &ids).unwrap_err();
        assert!(err.to_string().contains("ON DELETE RESTRICT"));
        assert_eq!(db.table("users").unwrap().len(), 2);
        assert_eq!(db.table("orders").unwrap().len(), 3);
    }

    #[test]
    fn delete_cascade_removes_referencing_rows() {
        let mut db = users_orders(ReferentialAction::Cascade, ReferentialAction::Restrict);
        seed(&mut db);

        let ids = db.table("users").unwrap().locate("id", &Value::Int(1)).unwrap();
        assert_eq!(db.delete_rows("users", &ids).unwrap(), 1);

        let orders = db.table("orders").unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders.rows()[0].get("oid"), Some(&Value::Int(12)));
    }

    #[test]
    fn delete_set_null_clears_referencing_column() {
        let mut db = users_orders(ReferentialAction::SetNull, ReferentialAction::Restrict);
        seed(&mut db);

        let ids = db.table("users").unwrap().locate("id", &Value::Int(1)).unwrap();
        db.delete_rows("users", &ids).unwrap();

        let orders = db.table("orders").unwrap();
        assert_eq!(orders.len(), 3);
        let nulls = orders
            .rows()
            .iter()
            .filter(|row| row.get("uid") == Some(&Value::Null))
            .count();
        assert_eq!(nulls, 2);
    }

    #[test]
    fn delete_cascades_through_a_chain() {
        // users <- orders <- items, all cascading.
        let mut db = users_orders(ReferentialAction::Cascade, ReferentialAction::Restrict);
        db.create_table(
            Table::new(
                "items",
                vec![
                    Column::primary_key("iid", DataType::Int),
                    Column::plain("oid", DataType::Int).with_reference(
                        "orders",
                        "oid",
                        ReferentialAction::Cascade,
                        ReferentialAction::Restrict,
                    ),
                ],
            )
            .unwrap(),
        )
        .unwrap();
        seed(&mut db);
        for (iid, oid) in [(100, 10), (101, 11), (102, 12)] {
            db.insert_into(
                "items",
                values(&[("iid", Value::Int(iid)), ("oid", Value::Int(oid))]),
            )
            .unwrap();
        }

        let ids = db.table("users").unwrap().locate("id", &Value::Int(1)).unwrap();
        db.delete_rows("users", &ids).unwrap();

        assert_eq!(db.table("orders").unwrap().len(), 1);
        let items = db.table("items").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items.rows()[0].get("iid"), Some(&Value::Int(102)));
    }

    #[test]
    fn restrict_deep_in_a_chain_aborts_everything() {
        // users <- orders (cascade) <- items (restrict).
        let mut db = users_orders(ReferentialAction::Cascade, ReferentialAction::Restrict);
        db.create_table(
            Table::new(
                "items",
                vec![
                    Column::primary_key("iid", DataType::Int),
                    Column::plain("oid", DataType::Int).with_reference(
                        "orders",
                        "oid",
                        ReferentialAction::Restrict,
                        ReferentialAction::Restrict,
                    ),
                ],
            )
            .unwrap(),
        )
        .unwrap();
        seed(&mut db);
        db.insert_into(
            "items",
            values(&[("iid", Value::Int(100)), ("oid", Value::Int(10))]),
        )
        .unwrap();

        let ids = db.table("users").unwrap().locate("id", &Value::Int(1)).unwrap();
        let err = db.delete_rows("users", &ids).unwrap_err();
        assert!(err.to_string().contains("ON DELETE RESTRICT"));

        // Nothing moved anywhere in the chain.
        assert_eq!(db.table("users").unwrap().len(), 2);
        assert_eq!(db.table("orders").unwrap().len(), 3);
        assert_eq!(db.table("items").unwrap().len(), 1);
    }

    #[test]
    fn key_update_cascades_to_referencing_rows() {
        let mut db = users_orders(ReferentialAction::Restrict, ReferentialAction::Cascade);
        seed(&mut db);

        let ids = db.table("users").unwrap().locate("id", &Value::Int(1)).unwrap();
        db.update_rows("users", "id", Value::Int(7), &ids).unwrap();

        let orders = db.table("orders").unwrap();
        let sevens = orders
            .rows()
            .iter()
            .filter(|row| row.get("uid") == Some(&Value::Int(7)))
            .count();
        assert_eq!(sevens, 2);
    }

    #[test]
    fn key_update_restrict_blocks() {
        let mut db = users_orders(ReferentialAction::Restrict, ReferentialAction::Restrict);
        seed(&mut db);

        let ids = db.table("users").unwrap().locate("id", &Value::Int(1)).unwrap();
        let err = db.update_rows("users", "id", Value::Int(7), &ids).unwrap_err();
        assert!(err.to_string().contains("ON UPDATE RESTRICT"));
        assert!(!db
            .table("users")
            .unwrap()
            .locate("id", &Value::Int(1))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn update_of_fk_column_validates_target() {
        let mut db = users_orders(ReferentialAction::Restrict, ReferentialAction::Restrict);
        seed(&mut db);

        let ids = db.table("orders").unwrap().locate("oid", &Value::Int(10)).unwrap();
        let err = db
            .update_rows("orders", "uid", Value::Int(99), &ids)
            .unwrap_err();
        assert!(err.to_string().contains("FOREIGN KEY constraint violation"));

        db.update_rows("orders", "uid", Value::Int(2), &ids).unwrap();
    }

    #[test]
    fn snapshot_round_trip_preserves_everything() {
        let mut db = users_orders(ReferentialAction::Cascade, ReferentialAction::SetNull);
        seed(&mut db);

        let snapshot = db.to_snapshot();
        let text = serde_json::to_string_pretty(&snapshot).unwrap();
        let parsed: DatabaseSnapshot = serde_json::from_str(&text).unwrap();
        let restored = Database::from_snapshot(parsed).unwrap();

        assert_eq!(restored.name(), "shop");
        assert_eq!(restored.table_names(), vec!["users", "orders"]);
        let orders = restored.table("orders").unwrap();
        assert_eq!(orders.len(), 3);
        assert_eq!(
            orders.columns()[1].references(),
            Some(("users", "id"))
        );
        assert_eq!(orders.columns()[1].on_delete, ReferentialAction::Cascade);
        assert_eq!(orders.columns()[1].on_update, ReferentialAction::SetNull);
        // Indexes were rebuilt and answer lookups.
        assert_eq!(orders.locate("uid", &Value::Int(1)).unwrap().len(), 2);
    }
}
