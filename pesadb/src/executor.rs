use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::debug;

use pesadb_ast::{
    expression::{AggregateExpr, AggregateFunction, ComparisonOp, Expr},
    statement::*,
    types::ColumnRef,
};
use pesadb_core::Value;
use pesadb_engine::{Catalog, Column, EngineError, RowMap, Table};
use pesadb_parser::parse_query;

use crate::{
    error::Error,
    eval::{evaluate, is_truthy, literal_to_value},
};

/// The outcome of one executed command.
#[derive(Clone, Debug, PartialEq)]
pub enum ExecuteResult {
    /// Result rows, for `SELECT` and the metadata queries.
    Rows(Vec<RowMap>),
    /// A human-readable status line, for DDL and DML mutators.
    Message(String),
}

impl ExecuteResult {
    /// The rows of a `Rows` result, or an empty slice for messages.
    pub fn rows(&self) -> &[RowMap] {
        match self {
            Self::Rows(rows) => rows,
            Self::Message(_) => &[],
        }
    }
}

/// Executes command trees against a catalog.
///
/// The executor holds the one piece of session state the language needs:
/// the currently selected database (`USE` sets it). Catalog-level commands
/// work without a selection; everything else requires one. Every mutating
/// command persists the affected database before returning.
pub struct Executor {
    catalog: Catalog,
    current_database: Option<String>,
}

impl Executor {
    /// Creates an executor over an opened catalog, with no database selected.
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            current_database: None,
        }
    }

    /// The underlying catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Mutable access to the underlying catalog.
    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    /// The currently selected database, if any.
    pub fn current_database(&self) -> Option<&str> {
        self.current_database.as_deref()
    }

    /// Selects a database without going through a `USE` statement.
    pub fn use_database(&mut self, name: &str) -> Result<(), EngineError> {
        self.catalog.database(name)?;
        self.current_database = Some(name.to_string());
        Ok(())
    }

    /// Lexes, parses and executes one query string.
    pub fn execute_query(&mut self, query: &str) -> Result<ExecuteResult, Error> {
        let stmt = parse_query(query)?;
        self.execute(&stmt)
    }

    /// Executes one parsed command.
    pub fn execute(&mut self, stmt: &Stmt) -> Result<ExecuteResult, Error> {
        debug!(command = %stmt, "executing");
        match stmt {
            Stmt::CreateDatabase(stmt) => {
                self.catalog.create_database(&stmt.name)?;
                Ok(message(format!(
                    "Database '{}' created successfully.",
                    stmt.name
                )))
            }
            Stmt::DropDatabase(stmt) => {
                self.catalog.drop_database(&stmt.name)?;
                if self.current_database.as_deref() == Some(stmt.name.as_str()) {
                    self.current_database = None;
                }
                Ok(message(format!(
                    "Database '{}' dropped successfully.",
                    stmt.name
                )))
            }
            Stmt::UseDatabase(stmt) => {
                self.use_database(&stmt.name)?;
                Ok(message(format!("Using database '{}'.", stmt.name)))
            }
            Stmt::ShowDatabases => Ok(ExecuteResult::Rows(
                self.catalog
                    .database_names()
                    .into_iter()
                    .map(|name| single("database", Value::Str(name)))
                    .collect(),
            )),
            Stmt::ShowTables => {
                let database = self.catalog.database(self.require_database()?)?;
                Ok(ExecuteResult::Rows(
                    database
                        .table_names()
                        .into_iter()
                        .map(|name| single("table", Value::Str(name)))
                        .collect(),
                ))
            }
            Stmt::Describe(stmt) => {
                let database = self.catalog.database(self.require_database()?)?;
                let table = database.table(&stmt.name)?;
                Ok(ExecuteResult::Rows(
                    table.columns().iter().map(describe_column).collect(),
                ))
            }
            Stmt::CreateTable(stmt) => {
                let name = self.require_database()?.to_string();
                let columns: Vec<Column> = stmt.columns.iter().map(column_from_def).collect();
                let table = Table::new(&stmt.name, columns)?;
                self.catalog.database_mut(&name)?.create_table(table)?;
                self.catalog.save_database(&name)?;
                Ok(message(format!(
                    "Table '{}' created successfully.",
                    stmt.name
                )))
            }
            Stmt::DropTable(stmt) => {
                let name = self.require_database()?.to_string();
                self.catalog.database_mut(&name)?.drop_table(&stmt.name)?;
                self.catalog.save_database(&name)?;
                Ok(message(format!(
                    "Table '{}' dropped successfully.",
                    stmt.name
                )))
            }
            Stmt::Insert(stmt) => {
                let name = self.require_database()?.to_string();
                let values = self.insert_values(&name, stmt)?;
                self.catalog
                    .database_mut(&name)?
                    .insert_into(&stmt.table, values)?;
                self.catalog.save_database(&name)?;
                Ok(message(format!("1 row(s) inserted into '{}'.", stmt.table)))
            }
            Stmt::Update(stmt) => {
                let name = self.require_database()?.to_string();
                let row_ids = self.matching_rows(&name, &stmt.table, stmt.selection.as_ref())?;
                let value = literal_to_value(&stmt.value)?;
                let count = self.catalog.database_mut(&name)?.update_rows(
                    &stmt.table,
                    &stmt.column,
                    value,
                    &row_ids,
                )?;
                self.catalog.save_database(&name)?;
                Ok(message(format!(
                    "{} row(s) updated in '{}'.",
                    count, stmt.table
                )))
            }
            Stmt::Delete(stmt) => {
                let name = self.require_database()?.to_string();
                let row_ids = self.matching_rows(&name, &stmt.table, stmt.selection.as_ref())?;
                let count = self
                    .catalog
                    .database_mut(&name)?
                    .delete_rows(&stmt.table, &row_ids)?;
                self.catalog.save_database(&name)?;
                Ok(message(format!(
                    "{} row(s) deleted from '{}'.",
                    count, stmt.table
                )))
            }
            Stmt::Select(stmt) => Ok(ExecuteResult::Rows(self.execute_select(stmt)?)),
        }
    }

    fn require_database(&self) -> Result<&str, EngineError> {
        self.current_database.as_deref().ok_or_else(|| {
            EngineError::Execution("No database selected. Run 'USE <database>' first".into())
        })
    }

    /// Builds the column-to-value map for an INSERT, resolving positional
    /// and named forms.
    fn insert_values(&self, database: &str, stmt: &InsertStmt) -> Result<RowMap, Error> {
        let table = self.catalog.database(database)?.table(&stmt.table)?;
        let column_names = table.column_names();

        let mut values = RowMap::new();
        if stmt.columns.is_empty() {
            if stmt.values.len() != column_names.len() {
                return Err(EngineError::Schema(format!(
                    "Value count mismatch: expected {} values for columns {:?}, got {}",
                    column_names.len(),
                    column_names,
                    stmt.values.len()
                ))
                .into());
            }
            for (column, literal) in column_names.iter().zip(&stmt.values) {
                values.insert(column.clone(), literal_to_value(literal)?);
            }
        } else {
            if stmt.values.len() != stmt.columns.len() {
                return Err(EngineError::Schema(format!(
                    "Value count mismatch: {} columns but {} values",
                    stmt.columns.len(),
                    stmt.values.len()
                ))
                .into());
            }
            for column in &stmt.columns {
                if table.column(column).is_none() {
                    return Err(EngineError::Lookup(format!(
                        "Column '{}' does not exist in table '{}'",
                        column, stmt.table
                    ))
                    .into());
                }
            }
            for (column, literal) in stmt.columns.iter().zip(&stmt.values) {
                values.insert(column.clone(), literal_to_value(literal)?);
            }
            // Unnamed columns are inserted as NULL; constraints decide
            // whether that is acceptable.
            for column in &column_names {
                values.entry(column.clone()).or_insert(Value::Null);
            }
        }
        Ok(values)
    }

    /// The positions of rows matching an optional WHERE expression.
    fn matching_rows(
        &self,
        database: &str,
        table_name: &str,
        selection: Option<&Expr>,
    ) -> Result<Vec<usize>, Error> {
        let table = self.catalog.database(database)?.table(table_name)?;
        let mut row_ids = Vec::new();
        for (row_id, row) in table.rows().iter().enumerate() {
            let keep = match selection {
                Some(expr) => is_truthy(&evaluate(expr, &row.to_map())?),
                None => true,
            };
            if keep {
                row_ids.push(row_id);
            }
        }
        Ok(row_ids)
    }

    /// The SELECT pipeline: source (with join), WHERE, grouping and
    /// aggregation, HAVING, ORDER BY, projection, DISTINCT, OFFSET/LIMIT.
    ///
    /// Ordering runs on the widest row form, while qualified join keys and
    /// materialized aggregate columns are still present, so sort keys like
    /// `users.id` or an aggregate alias resolve; projection renames after.
    fn execute_select(&self, stmt: &SelectStmt) -> Result<Vec<RowMap>, Error> {
        let database = self.catalog.database(self.require_database()?)?;

        let mut aggregates: Vec<AggregateExpr> = Vec::new();
        for item in &stmt.projection {
            if let SelectItem::Expr { expr, .. } = item {
                collect_aggregates(expr, &mut aggregates);
            }
        }
        if let Some(having) = &stmt.having {
            collect_aggregates(having, &mut aggregates);
        }
        dedup_aggregates(&mut aggregates);

        let grouped_query = !aggregates.is_empty() || !stmt.group_by.is_empty();
        if stmt.join.is_some() && grouped_query {
            return Err(EngineError::Execution(
                "Aggregate functions combined with JOIN are not supported".into(),
            )
            .into());
        }

        // 1. Source rows.
        let mut rows = match &stmt.join {
            Some(join) => join_rows(database.table(&stmt.from)?, database.table(&join.table)?, join)?,
            None => {
                let table = database.table(&stmt.from)?;
                match equality_pushdown(table, &stmt.from, stmt.selection.as_ref()) {
                    Some((column, value)) => table.select(None, Some((&column, &value)))?,
                    None => table.select(None, None)?,
                }
            }
        };

        // 2. WHERE.
        if let Some(selection) = &stmt.selection {
            let mut kept = Vec::with_capacity(rows.len());
            for row in rows {
                if is_truthy(&evaluate(selection, &row)?) {
                    kept.push(row);
                }
            }
            rows = kept;
        }

        // 3. Grouping and aggregation.
        if grouped_query {
            validate_grouped_projection(&stmt.projection, &stmt.group_by)?;
            rows = aggregate_rows(rows, stmt, &aggregates)?;
        }

        // 4. HAVING.
        if let Some(having) = &stmt.having {
            let mut kept = Vec::with_capacity(rows.len());
            for row in rows {
                if is_truthy(&evaluate(having, &row)?) {
                    kept.push(row);
                }
            }
            rows = kept;
        }

        // 5. ORDER BY, most significant key last (stable sorts compose).
        for order in stmt.order_by.iter().rev() {
            let mut keyed: Vec<(Value, RowMap)> = Vec::with_capacity(rows.len());
            for row in rows {
                let key = order_key(&order.column, &row)?;
                keyed.push((key, row));
            }
            keyed.sort_by(|(a, _), (b, _)| compare_for_sort(a, b, order.descending));
            rows = keyed.into_iter().map(|(_, row)| row).collect();
        }

        // 6. Projection.
        let wildcard = matches!(stmt.projection.as_slice(), [SelectItem::Wildcard]);
        if !wildcard {
            let mut projected = Vec::with_capacity(rows.len());
            for row in &rows {
                projected.push(project_row(&stmt.projection, row)?);
            }
            rows = projected;
        }

        // 7. DISTINCT.
        if stmt.distinct {
            let mut seen: HashSet<Vec<(String, Value)>> = HashSet::new();
            rows.retain(|row| {
                let mut key: Vec<(String, Value)> =
                    row.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                key.sort_by(|(a, _), (b, _)| a.cmp(b));
                seen.insert(key)
            });
        }

        // 8. OFFSET, then LIMIT.
        let offset = stmt.offset.unwrap_or(0) as usize;
        let rows: Vec<RowMap> = match stmt.limit {
            Some(limit) => rows.into_iter().skip(offset).take(limit as usize).collect(),
            None => rows.into_iter().skip(offset).collect(),
        };

        Ok(rows)
    }
}

fn message(text: String) -> ExecuteResult {
    ExecuteResult::Message(text)
}

fn single(key: &str, value: Value) -> RowMap {
    let mut row = RowMap::new();
    row.insert(key.to_string(), value);
    row
}

fn describe_column(column: &Column) -> RowMap {
    let mut row = RowMap::new();
    row.insert("column".into(), Value::Str(column.name.clone()));
    row.insert("type".into(), Value::Str(column.data_type.to_string()));
    row.insert("primary_key".into(), Value::Bool(column.is_primary_key));
    row.insert("unique".into(), Value::Bool(column.is_unique));
    match column.references() {
        Some((table, referenced)) => {
            row.insert(
                "references".into(),
                Value::Str(format!("{}({})", table, referenced)),
            );
            row.insert("on_delete".into(), Value::Str(column.on_delete.to_string()));
            row.insert("on_update".into(), Value::Str(column.on_update.to_string()));
        }
        None => {
            row.insert("references".into(), Value::Null);
            row.insert("on_delete".into(), Value::Null);
            row.insert("on_update".into(), Value::Null);
        }
    }
    row
}

fn column_from_def(def: &ColumnDef) -> Column {
    let mut column = Column::plain(&def.name, def.data_type);
    column.is_primary_key = def.primary_key;
    column.is_unique = def.unique;
    if let Some(reference) = &def.references {
        column = column.with_reference(
            &reference.table,
            &reference.column,
            reference.on_delete,
            reference.on_update,
        );
    }
    column
}

/// Collects every aggregate call in an expression tree.
fn collect_aggregates(expr: &Expr, out: &mut Vec<AggregateExpr>) {
    match expr {
        Expr::Aggregate(aggregate) => out.push(aggregate.clone()),
        Expr::Comparison(cmp) => {
            collect_aggregates(&cmp.left, out);
            collect_aggregates(&cmp.right, out);
        }
        Expr::Logical(logical) => {
            for operand in &logical.operands {
                collect_aggregates(operand, out);
            }
        }
        Expr::IsNull(inner) => collect_aggregates(&inner.expr, out),
        Expr::Between(between) => {
            collect_aggregates(&between.expr, out);
            collect_aggregates(&between.low, out);
            collect_aggregates(&between.high, out);
        }
        Expr::InList(in_list) => {
            collect_aggregates(&in_list.expr, out);
            for item in &in_list.list {
                collect_aggregates(item, out);
            }
        }
        Expr::Like(like) => collect_aggregates(&like.expr, out),
        Expr::DateTimeFn(call) => {
            for arg in &call.args {
                collect_aggregates(arg, out);
            }
        }
        Expr::Literal(_) | Expr::Column(_) => {}
    }
}

fn dedup_aggregates(aggregates: &mut Vec<AggregateExpr>) {
    let mut seen = HashSet::new();
    aggregates.retain(|aggregate| seen.insert(aggregate.to_string()));
}

/// A projection over grouped rows may only name aggregates and GROUP BY
/// columns.
fn validate_grouped_projection(
    projection: &[SelectItem],
    group_by: &[ColumnRef],
) -> Result<(), EngineError> {
    for item in projection {
        match item {
            SelectItem::Wildcard => {
                return Err(EngineError::Schema(
                    "SELECT * cannot be combined with aggregate functions; name the GROUP BY columns explicitly".into(),
                ))
            }
            SelectItem::Expr { expr, .. } => {
                if let Expr::Column(column) = expr {
                    let grouped = group_by
                        .iter()
                        .any(|g| g.column == column.column || g.key() == column.key());
                    if !grouped {
                        return Err(EngineError::Schema(format!(
                            "Column '{}' must appear in the GROUP BY clause or be used in an aggregate function",
                            column
                        )));
                    }
                }
            }
        }
    }
    Ok(())
}

/// Partitions filtered rows into groups (all rows form one group without
/// GROUP BY) and materializes one output row per group: the grouping
/// columns, then each aggregate under its canonical name and, where the
/// projection aliases it, under the alias too.
fn aggregate_rows(
    rows: Vec<RowMap>,
    stmt: &SelectStmt,
    aggregates: &[AggregateExpr],
) -> Result<Vec<RowMap>, EngineError> {
    let mut groups: IndexMap<Vec<Value>, Vec<RowMap>> = IndexMap::new();
    if stmt.group_by.is_empty() {
        groups.insert(Vec::new(), rows);
    } else {
        for row in rows {
            let mut key = Vec::with_capacity(stmt.group_by.len());
            for column in &stmt.group_by {
                let value = row
                    .get(&column.key())
                    .or_else(|| row.get(&column.column))
                    .cloned()
                    .ok_or_else(|| {
                        EngineError::Lookup(format!(
                            "GROUP BY column '{}' not found in result rows",
                            column
                        ))
                    })?;
                key.push(value);
            }
            groups.entry(key).or_default().push(row);
        }
    }

    let aliases: Vec<(String, Option<&str>)> = stmt
        .projection
        .iter()
        .filter_map(|item| match item {
            SelectItem::Expr {
                expr: Expr::Aggregate(aggregate),
                alias,
            } => Some((aggregate.to_string(), alias.as_deref())),
            _ => None,
        })
        .collect();

    let mut out = Vec::with_capacity(groups.len());
    for (key, members) in groups {
        let mut row = RowMap::new();
        for (column, value) in stmt.group_by.iter().zip(key) {
            row.insert(column.column.clone(), value);
        }
        for aggregate in aggregates {
            let value = compute_aggregate(aggregate, &members)?;
            row.insert(aggregate.to_string(), value);
        }
        for (canonical, alias) in &aliases {
            if let Some(alias) = alias {
                let value = row
                    .get(canonical.as_str())
                    .cloned()
                    .expect("every projected aggregate was computed");
                row.insert((*alias).to_string(), value);
            }
        }
        out.push(row);
    }
    Ok(out)
}

/// Computes one aggregate over the rows of a group.
fn compute_aggregate(
    aggregate: &AggregateExpr,
    rows: &[RowMap],
) -> Result<Value, EngineError> {
    // COUNT(*) counts rows, including NULLs.
    let Some(arg) = &aggregate.arg else {
        return Ok(Value::Int(rows.len() as i64));
    };

    // Non-NULL argument values; rows where the argument cannot be
    // evaluated (e.g. a column absent from this row shape) are skipped.
    let mut values = Vec::new();
    for row in rows {
        match evaluate(arg, row) {
            Ok(value) if !value.is_null() => values.push(value),
            Ok(_) => {}
            Err(EngineError::Lookup(_)) => {}
            Err(err) => return Err(err),
        }
    }

    match aggregate.func {
        AggregateFunction::Count => Ok(Value::Int(values.len() as i64)),
        AggregateFunction::Sum | AggregateFunction::Avg => {
            if values.is_empty() {
                return Ok(Value::Null);
            }
            let mut all_int = true;
            let mut sum = 0.0;
            for value in &values {
                match value.as_f64() {
                    Some(number) => {
                        all_int &= matches!(value, Value::Int(_));
                        sum += number;
                    }
                    None => {
                        return Err(EngineError::Execution(format!(
                            "{} requires numeric values, got {}",
                            aggregate.func,
                            value.describe()
                        )))
                    }
                }
            }
            if aggregate.func == AggregateFunction::Avg {
                Ok(Value::Float(sum / values.len() as f64))
            } else if all_int {
                Ok(Value::Int(sum as i64))
            } else {
                Ok(Value::Float(sum))
            }
        }
        AggregateFunction::Min | AggregateFunction::Max => {
            let mut best: Option<Value> = None;
            for value in values {
                best = match best {
                    None => Some(value),
                    Some(current) => {
                        let replace = match value.compare(&current) {
                            Some(ordering) => {
                                if aggregate.func == AggregateFunction::Min {
                                    ordering == std::cmp::Ordering::Less
                                } else {
                                    ordering == std::cmp::Ordering::Greater
                                }
                            }
                            None => false,
                        };
                        Some(if replace { value } else { current })
                    }
                };
            }
            Ok(best.unwrap_or(Value::Null))
        }
    }
}

/// Detects a WHERE of the form `column = literal` over an indexed column
/// of the queried table, so the scan can start from the index instead of
/// the full row list. The general WHERE filter still runs afterwards.
fn equality_pushdown(
    table: &Table,
    from: &str,
    selection: Option<&Expr>,
) -> Option<(String, Value)> {
    let Expr::Comparison(cmp) = selection? else {
        return None;
    };
    if cmp.op != ComparisonOp::Equal {
        return None;
    }
    let (column, literal) = match (cmp.left.as_ref(), cmp.right.as_ref()) {
        (Expr::Column(column), Expr::Literal(literal)) => (column, literal),
        (Expr::Literal(literal), Expr::Column(column)) => (column, literal),
        _ => return None,
    };
    if column.table.as_deref().is_some_and(|table| table != from) {
        return None;
    }
    if !table.is_indexed(&column.column) {
        return None;
    }
    let value = literal_to_value(literal).ok()?;
    let value = table.coerce_value(&column.column, value).ok()?;
    Some((column.column.clone(), value))
}

/// Computes the join of two tables per the equality condition, emitting
/// rows keyed `table.column`. Unmatched rows of the preserved sides come
/// out padded with NULLs: left ones in place, right ones appended.
fn join_rows(
    left_table: &Table,
    right_table: &Table,
    join: &JoinClause,
) -> Result<Vec<RowMap>, Error> {
    let left_name = left_table.name().to_string();
    let right_name = right_table.name().to_string();

    let (left_key, right_key) = join_columns(&left_name, &right_name, join)?;
    if left_table.column(&left_key).is_none() {
        return Err(EngineError::Lookup(format!(
            "Column '{}' does not exist in table '{}'",
            left_key, left_name
        ))
        .into());
    }
    if right_table.column(&right_key).is_none() {
        return Err(EngineError::Lookup(format!(
            "Column '{}' does not exist in table '{}'",
            right_key, right_name
        ))
        .into());
    }

    let left_rows = left_table.select(None, None)?;
    let right_rows = right_table.select(None, None)?;

    let keep_left = matches!(join.join_type, JoinType::LeftOuter | JoinType::FullOuter);
    let keep_right = matches!(join.join_type, JoinType::RightOuter | JoinType::FullOuter);

    let mut out = Vec::new();
    let mut right_matched = vec![false; right_rows.len()];

    for left_row in &left_rows {
        let left_value = left_row.get(&left_key).cloned().unwrap_or(Value::Null);
        let mut matched = false;
        for (right_id, right_row) in right_rows.iter().enumerate() {
            let right_value = right_row.get(&right_key).cloned().unwrap_or(Value::Null);
            // NULL keys never join.
            if left_value.compare(&right_value) == Some(std::cmp::Ordering::Equal) {
                matched = true;
                right_matched[right_id] = true;
                out.push(merge_joined(
                    &left_name,
                    Some(left_row),
                    left_table,
                    &right_name,
                    Some(right_row),
                    right_table,
                ));
            }
        }
        if !matched && keep_left {
            out.push(merge_joined(
                &left_name,
                Some(left_row),
                left_table,
                &right_name,
                None,
                right_table,
            ));
        }
    }

    if keep_right {
        for (right_id, right_row) in right_rows.iter().enumerate() {
            if !right_matched[right_id] {
                out.push(merge_joined(
                    &left_name,
                    None,
                    left_table,
                    &right_name,
                    Some(right_row),
                    right_table,
                ));
            }
        }
    }

    Ok(out)
}

/// Maps the ON condition onto (left column, right column), whichever way
/// round it was written.
fn join_columns(
    left_name: &str,
    right_name: &str,
    join: &JoinClause,
) -> Result<(String, String), Error> {
    let left_side = join
        .left
        .table
        .as_deref()
        .expect("the parser requires qualified join columns");
    let right_side = join
        .right
        .table
        .as_deref()
        .expect("the parser requires qualified join columns");

    if left_side == left_name && right_side == right_name {
        Ok((join.left.column.clone(), join.right.column.clone()))
    } else if left_side == right_name && right_side == left_name {
        Ok((join.right.column.clone(), join.left.column.clone()))
    } else {
        Err(EngineError::Execution(format!(
            "JOIN condition references '{}' and '{}', expected '{}' and '{}'",
            left_side, right_side, left_name, right_name
        ))
        .into())
    }
}

/// Merges one joined row, prefixing keys with their table name and
/// padding the absent side with NULLs.
fn merge_joined(
    left_name: &str,
    left_row: Option<&RowMap>,
    left_table: &Table,
    right_name: &str,
    right_row: Option<&RowMap>,
    right_table: &Table,
) -> RowMap {
    let mut merged = RowMap::new();
    for (name, table, row) in [
        (left_name, left_table, left_row),
        (right_name, right_table, right_row),
    ] {
        match row {
            Some(row) => {
                for (column, value) in row.iter() {
                    merged.insert(format!("{}.{}", name, column), value.clone());
                }
            }
            None => {
                for column in table.columns() {
                    merged.insert(format!("{}.{}", name, column.name), Value::Null);
                }
            }
        }
    }
    merged
}

/// Resolves an ORDER BY key against the widest row form.
fn order_key(column: &ColumnRef, row: &RowMap) -> Result<Value, EngineError> {
    if let Some(value) = row.get(&column.key()) {
        return Ok(value.clone());
    }
    if column.table.is_some() {
        if let Some(value) = row.get(&column.column) {
            return Ok(value.clone());
        }
    }
    Err(EngineError::Lookup(format!(
        "ORDER BY column '{}' not found in result rows",
        column
    )))
}

/// NULLs sort last in both directions; the direction only flips the
/// ordering of present values.
fn compare_for_sort(a: &Value, b: &Value, descending: bool) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ordering = a.compare(b).unwrap_or(Ordering::Equal);
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        }
    }
}

/// Projects one row to the requested items, applying aliases.
fn project_row(projection: &[SelectItem], row: &RowMap) -> Result<RowMap, EngineError> {
    let mut out = RowMap::new();
    for item in projection {
        match item {
            SelectItem::Wildcard => {
                for (key, value) in row.iter() {
                    out.insert(key.clone(), value.clone());
                }
            }
            SelectItem::Expr { expr, alias } => {
                let (key, value) = match expr {
                    Expr::Column(column) => {
                        let value = projection_column(column, row)?;
                        (column.column.clone(), value)
                    }
                    Expr::Aggregate(aggregate) => {
                        let canonical = aggregate.to_string();
                        let value = row.get(&canonical).cloned().ok_or_else(|| {
                            EngineError::Execution(format!(
                                "Aggregate function {} cannot be evaluated on a single row",
                                canonical
                            ))
                        })?;
                        (canonical, value)
                    }
                    other => (other.to_string(), evaluate(other, row)?),
                };
                out.insert(alias.clone().unwrap_or(key), value);
            }
        }
    }
    Ok(out)
}

/// Column resolution for projections: exact key, then the unqualified
/// tail, then (for bare names over join rows) any `table.column` match.
fn projection_column(column: &ColumnRef, row: &RowMap) -> Result<Value, EngineError> {
    if let Some(value) = row.get(&column.key()) {
        return Ok(value.clone());
    }
    if column.table.is_some() {
        if let Some(value) = row.get(&column.column) {
            return Ok(value.clone());
        }
    } else {
        let suffix = format!(".{}", column.column);
        if let Some((_, value)) = row.iter().find(|(key, _)| key.ends_with(&suffix)) {
            return Ok(value.clone());
        }
    }
    Err(EngineError::Lookup(format!(
        "Column '{}' not found in result rows",
        column
    )))
}
