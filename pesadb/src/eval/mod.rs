mod datetime;

use std::cmp::Ordering;

use regex::RegexBuilder;

use pesadb_ast::{
    expression::{ComparisonOp, Expr, LogicalOp},
    types::{ColumnRef, Literal},
};
use pesadb_core::Value;
use pesadb_engine::{EngineError, RowMap};

/// Evaluates an expression against one row.
///
/// Aggregate nodes are the one exception to row-by-row evaluation: they
/// resolve by looking their canonical name up in the row, which is how
/// `HAVING` sees the values the executor materialized per group. An
/// aggregate that has not been materialized is an execution error.
pub fn evaluate(expr: &Expr, row: &RowMap) -> Result<Value, EngineError> {
    match expr {
        Expr::Literal(literal) => literal_to_value(literal),
        Expr::Column(column) => resolve_column(column, row),
        Expr::Comparison(cmp) => {
            let left = evaluate(&cmp.left, row)?;
            let right = evaluate(&cmp.right, row)?;
            Ok(Value::Bool(compare_values(cmp.op, &left, &right)))
        }
        Expr::Logical(logical) => match logical.op {
            LogicalOp::Not => {
                let value = evaluate(&logical.operands[0], row)?;
                Ok(Value::Bool(!is_truthy(&value)))
            }
            LogicalOp::And => {
                for operand in &logical.operands {
                    if !is_truthy(&evaluate(operand, row)?) {
                        return Ok(Value::Bool(false));
                    }
                }
                Ok(Value::Bool(true))
            }
            LogicalOp::Or => {
                for operand in &logical.operands {
                    if is_truthy(&evaluate(operand, row)?) {
                        return Ok(Value::Bool(true));
                    }
                }
                Ok(Value::Bool(false))
            }
        },
        Expr::IsNull(is_null) => {
            let value = evaluate(&is_null.expr, row)?;
            Ok(Value::Bool(value.is_null() != is_null.negated))
        }
        Expr::Between(between) => {
            let value = evaluate(&between.expr, row)?;
            let low = evaluate(&between.low, row)?;
            let high = evaluate(&between.high, row)?;
            // NULL anywhere makes the whole test false, negated or not.
            if value.is_null() || low.is_null() || high.is_null() {
                return Ok(Value::Bool(false));
            }
            let inside = matches!(
                low.compare(&value),
                Some(Ordering::Less) | Some(Ordering::Equal)
            ) && matches!(
                value.compare(&high),
                Some(Ordering::Less) | Some(Ordering::Equal)
            );
            Ok(Value::Bool(inside != between.negated))
        }
        Expr::InList(in_list) => {
            let value = evaluate(&in_list.expr, row)?;
            if value.is_null() {
                return Ok(Value::Bool(false));
            }
            let mut found = false;
            for candidate in &in_list.list {
                let candidate = evaluate(candidate, row)?;
                if value.compare(&candidate) == Some(Ordering::Equal) {
                    found = true;
                    break;
                }
            }
            Ok(Value::Bool(found != in_list.negated))
        }
        Expr::Like(like) => {
            let value = evaluate(&like.expr, row)?;
            if value.is_null() {
                return Ok(Value::Bool(false));
            }
            let matched = like_matches(&like.pattern, &value.to_string())?;
            Ok(Value::Bool(matched != like.negated))
        }
        Expr::Aggregate(aggregate) => {
            let canonical = aggregate.to_string();
            match row.get(&canonical) {
                Some(value) => Ok(value.clone()),
                None => Err(EngineError::Execution(format!(
                    "Aggregate function {} cannot be evaluated on a single row",
                    canonical
                ))),
            }
        }
        Expr::DateTimeFn(call) => {
            let mut args = Vec::with_capacity(call.args.len());
            for arg in &call.args {
                args.push(evaluate(arg, row)?);
            }
            // Any NULL argument short-circuits to NULL.
            if args.iter().any(Value::is_null) {
                return Ok(Value::Null);
            }
            datetime::evaluate(call.func, &args)
        }
    }
}

/// Converts a parsed literal into a value. Numbers take the narrowest
/// fit: integer when the spelling parses as one, float otherwise.
pub fn literal_to_value(literal: &Literal) -> Result<Value, EngineError> {
    match literal {
        Literal::Null => Ok(Value::Null),
        Literal::Boolean(value) => Ok(Value::Bool(*value)),
        Literal::String(value) => Ok(Value::Str(value.clone())),
        Literal::Number(text) => {
            if let Ok(int) = text.parse::<i64>() {
                return Ok(Value::Int(int));
            }
            text.parse::<f64>().map(Value::Float).map_err(|_| {
                EngineError::Schema(format!("Invalid numeric literal: {}", text))
            })
        }
    }
}

/// Resolves a column reference in a row map: the full key first, then the
/// unqualified tail for `table.column` references against single-table rows.
fn resolve_column(column: &ColumnRef, row: &RowMap) -> Result<Value, EngineError> {
    let key = column.key();
    if let Some(value) = row.get(&key) {
        return Ok(value.clone());
    }
    if column.table.is_some() {
        if let Some(value) = row.get(&column.column) {
            return Ok(value.clone());
        }
        return Err(EngineError::Lookup(format!(
            "Column '{}' not found. Try the unqualified column name '{}' when querying a single table",
            key, column.column
        )));
    }
    Err(EngineError::Lookup(format!(
        "Column '{}' not found in row",
        key
    )))
}

fn compare_values(op: ComparisonOp, left: &Value, right: &Value) -> bool {
    // NULL never compares to anything, including another NULL.
    match left.compare(right) {
        None => false,
        Some(ordering) => match op {
            ComparisonOp::Equal => ordering == Ordering::Equal,
            ComparisonOp::NotEqual => ordering != Ordering::Equal,
            ComparisonOp::Less => ordering == Ordering::Less,
            ComparisonOp::LessOrEqual => ordering != Ordering::Greater,
            ComparisonOp::Greater => ordering == Ordering::Greater,
            ComparisonOp::GreaterOrEqual => ordering != Ordering::Less,
        },
    }
}

/// The truthiness of a value in `WHERE`/`HAVING` position.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Int(i) => *i != 0,
        Value::Float(f) => *f != 0.0,
        Value::Str(s) => !s.is_empty(),
        Value::Date(_) | Value::Time(_) | Value::DateTime(_) => true,
    }
}

/// `%` matches any run of characters, `_` exactly one; matching is
/// case-insensitive and anchored at both ends.
fn like_matches(pattern: &str, text: &str) -> Result<bool, EngineError> {
    let mut regex = String::with_capacity(pattern.len() + 2);
    regex.push('^');
    for ch in pattern.chars() {
        match ch {
            '%' => regex.push_str(".*"),
            '_' => regex.push('.'),
            ch => regex.push_str(&regex::escape(&ch.to_string())),
        }
    }
    regex.push('$');
    let compiled = RegexBuilder::new(&regex)
        .case_insensitive(true)
        .build()
        .map_err(|err| EngineError::Execution(format!("Invalid LIKE pattern: {}", err)))?;
    Ok(compiled.is_match(text))
}
