//! End-to-end scenarios: parse, execute, persist, reload.

use pesadb::{Catalog, EngineError, Error, ExecuteResult, Executor, RowMap, Value};

fn executor(dir: &std::path::Path) -> Executor {
    Executor::new(Catalog::open(dir).unwrap())
}

fn run(executor: &mut Executor, query: &str) -> ExecuteResult {
    executor
        .execute_query(query)
        .unwrap_or_else(|err| panic!("query failed: {}\n  {}", query, err))
}

fn rows(executor: &mut Executor, query: &str) -> Vec<RowMap> {
    match run(executor, query) {
        ExecuteResult::Rows(rows) => rows,
        ExecuteResult::Message(message) => panic!("expected rows, got message: {}", message),
    }
}

fn fail(executor: &mut Executor, query: &str) -> Error {
    match executor.execute_query(query) {
        Err(err) => err,
        Ok(_) => panic!("expected failure: {}", query),
    }
}

fn get<'a>(row: &'a RowMap, key: &str) -> &'a Value {
    row.get(key)
        .unwrap_or_else(|| panic!("missing key '{}' in {:?}", key, row))
}

#[test]
fn s1_crud_basics() {
    let dir = tempfile::tempdir().unwrap();
    let mut exec = executor(dir.path());

    assert_eq!(
        run(&mut exec, "CREATE DATABASE d;"),
        ExecuteResult::Message("Database 'd' created successfully.".into())
    );
    run(&mut exec, "USE d;");
    assert_eq!(
        run(
            &mut exec,
            "CREATE TABLE t (id INT PRIMARY KEY, name STRING UNIQUE);"
        ),
        ExecuteResult::Message("Table 't' created successfully.".into())
    );
    assert_eq!(
        run(&mut exec, "INSERT INTO t VALUES (1, 'a');"),
        ExecuteResult::Message("1 row(s) inserted into 't'.".into())
    );
    run(&mut exec, "INSERT INTO t VALUES (2, 'b');");

    let all = rows(&mut exec, "SELECT * FROM t;");
    assert_eq!(all.len(), 2);
    assert_eq!(get(&all[0], "id"), &Value::Int(1));
    assert_eq!(get(&all[0], "name"), &Value::from("a"));
    assert_eq!(get(&all[1], "id"), &Value::Int(2));
    assert_eq!(get(&all[1], "name"), &Value::from("b"));

    // Duplicate unique value.
    let err = fail(&mut exec, "INSERT INTO t VALUES (3, 'a');");
    assert!(matches!(err, Error::Engine(EngineError::Constraint(_))));
    assert!(err.to_string().contains("UNIQUE constraint violation"));

    let counted = rows(&mut exec, "SELECT COUNT(*) FROM t;");
    assert_eq!(counted.len(), 1);
    assert_eq!(get(&counted[0], "COUNT(*)"), &Value::Int(2));
}

#[test]
fn s2_unique_update_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let mut exec = executor(dir.path());
    run(&mut exec, "CREATE DATABASE d");
    run(&mut exec, "USE d");
    run(
        &mut exec,
        "CREATE TABLE t (id INT PRIMARY KEY, name STRING UNIQUE)",
    );
    run(&mut exec, "INSERT INTO t VALUES (1, 'a')");
    run(&mut exec, "INSERT INTO t VALUES (2, 'b')");

    let err = fail(&mut exec, "UPDATE t SET name = 'a' WHERE id = 2");
    assert!(matches!(err, Error::Engine(EngineError::Constraint(_))));

    let row2 = rows(&mut exec, "SELECT * FROM t WHERE id = 2");
    assert_eq!(get(&row2[0], "name"), &Value::from("b"));
}

#[test]
fn s3_fk_cascade_delete() {
    let dir = tempfile::tempdir().unwrap();
    let mut exec = executor(dir.path());
    run(&mut exec, "CREATE DATABASE d");
    run(&mut exec, "USE d");
    run(&mut exec, "CREATE TABLE u (id INT PRIMARY KEY)");
    run(
        &mut exec,
        "CREATE TABLE o (oid INT PRIMARY KEY, uid INT REFERENCES u(id) ON DELETE CASCADE)",
    );
    run(&mut exec, "INSERT INTO u VALUES (1)");
    run(&mut exec, "INSERT INTO u VALUES (2)");
    run(&mut exec, "INSERT INTO o VALUES (10, 1)");
    run(&mut exec, "INSERT INTO o VALUES (11, 1)");
    run(&mut exec, "INSERT INTO o VALUES (12, 2)");

    assert_eq!(
        run(&mut exec, "DELETE FROM u WHERE id = 1"),
        ExecuteResult::Message("1 row(s) deleted from 'u'.".into())
    );

    let remaining = rows(&mut exec, "SELECT * FROM o");
    assert_eq!(remaining.len(), 1);
    assert_eq!(get(&remaining[0], "oid"), &Value::Int(12));
    assert_eq!(get(&remaining[0], "uid"), &Value::Int(2));
}

#[test]
fn s4_fk_restrict_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let mut exec = executor(dir.path());
    run(&mut exec, "CREATE DATABASE d");
    run(&mut exec, "USE d");
    run(&mut exec, "CREATE TABLE u (id INT PRIMARY KEY)");
    run(
        &mut exec,
        "CREATE TABLE o (oid INT PRIMARY KEY, uid INT REFERENCES u(id))",
    );
    run(&mut exec, "INSERT INTO u VALUES (1)");
    run(&mut exec, "INSERT INTO o VALUES (10, 1)");

    let err = fail(&mut exec, "DELETE FROM u WHERE id = 1");
    assert!(matches!(err, Error::Engine(EngineError::Constraint(_))));
    assert!(err.to_string().contains("o.uid"));

    assert_eq!(rows(&mut exec, "SELECT * FROM o").len(), 1);
    assert_eq!(rows(&mut exec, "SELECT * FROM u").len(), 1);
}

#[test]
fn s5_left_join_with_unmatched() {
    let dir = tempfile::tempdir().unwrap();
    let mut exec = executor(dir.path());
    run(&mut exec, "CREATE DATABASE d");
    run(&mut exec, "USE d");
    run(
        &mut exec,
        "CREATE TABLE users (id INT PRIMARY KEY, name STRING)",
    );
    run(
        &mut exec,
        "CREATE TABLE orders (oid INT PRIMARY KEY, uid INT)",
    );
    for (id, name) in [(1, "A"), (2, "B"), (3, "C")] {
        run(
            &mut exec,
            &format!("INSERT INTO users VALUES ({}, '{}')", id, name),
        );
    }
    run(&mut exec, "INSERT INTO orders VALUES (10, 1)");
    run(&mut exec, "INSERT INTO orders VALUES (11, 1)");

    let joined = rows(
        &mut exec,
        "SELECT users.name, orders.oid FROM users \
         LEFT JOIN orders ON users.id = orders.uid \
         ORDER BY users.id ASC, orders.oid ASC",
    );
    let summary: Vec<(Value, Value)> = joined
        .iter()
        .map(|row| (get(row, "name").clone(), get(row, "oid").clone()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (Value::from("A"), Value::Int(10)),
            (Value::from("A"), Value::Int(11)),
            (Value::from("B"), Value::Null),
            (Value::from("C"), Value::Null),
        ]
    );
}

#[test]
fn s6_group_by_having() {
    let dir = tempfile::tempdir().unwrap();
    let mut exec = executor(dir.path());
    run(&mut exec, "CREATE DATABASE d");
    run(&mut exec, "USE d");
    run(
        &mut exec,
        "CREATE TABLE emp (id INT PRIMARY KEY, dept STRING, salary INT)",
    );
    for (id, dept, salary) in [(1, "E", 80), (2, "E", 75), (3, "S", 70), (4, "S", 65)] {
        run(
            &mut exec,
            &format!("INSERT INTO emp VALUES ({}, '{}', {})", id, dept, salary),
        );
    }

    let grouped = rows(
        &mut exec,
        "SELECT dept, COUNT(*) AS n, AVG(salary) AS a FROM emp \
         GROUP BY dept HAVING COUNT(*) >= 2 ORDER BY dept ASC",
    );
    assert_eq!(grouped.len(), 2);
    assert_eq!(get(&grouped[0], "dept"), &Value::from("E"));
    assert_eq!(get(&grouped[0], "n"), &Value::Int(2));
    assert_eq!(get(&grouped[0], "a"), &Value::Float(77.5));
    assert_eq!(get(&grouped[1], "dept"), &Value::from("S"));
    assert_eq!(get(&grouped[1], "n"), &Value::Int(2));
    assert_eq!(get(&grouped[1], "a"), &Value::Float(67.5));

    // Keys are exactly the projected names.
    let keys: Vec<&String> = grouped[0].keys().collect();
    assert_eq!(keys, ["dept", "n", "a"]);
}

#[test]
fn s7_expression_rich_where() {
    let dir = tempfile::tempdir().unwrap();
    let mut exec = executor(dir.path());
    run(&mut exec, "CREATE DATABASE d");
    run(&mut exec, "USE d");
    run(
        &mut exec,
        "CREATE TABLE u (id INT PRIMARY KEY, age INT, active BOOL)",
    );
    for (id, age, active) in [
        (1, 30, true),
        (2, 30, false),
        (3, 50, true),
        (100, 80, false),
        (200, 25, false),
        (300, 35, true),
    ] {
        run(
            &mut exec,
            &format!("INSERT INTO u VALUES ({}, {}, {})", id, age, active),
        );
    }

    let matched = rows(
        &mut exec,
        "SELECT id FROM u \
         WHERE (age BETWEEN 25 AND 35 AND active = TRUE) OR id IN (100, 200) \
         ORDER BY id",
    );
    let ids: Vec<&Value> = matched.iter().map(|row| get(row, "id")).collect();
    assert_eq!(
        ids,
        [&Value::Int(1), &Value::Int(100), &Value::Int(200), &Value::Int(300)]
    );
}

#[test]
fn s8_snapshot_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut exec = executor(dir.path());
        run(&mut exec, "CREATE DATABASE d");
        run(&mut exec, "USE d");
        run(
            &mut exec,
            "CREATE TABLE t (id INT PRIMARY KEY, name STRING UNIQUE)",
        );
        run(&mut exec, "INSERT INTO t VALUES (1, 'a')");
        run(&mut exec, "INSERT INTO t VALUES (2, 'b')");
        run(&mut exec, "CREATE TABLE u (id INT PRIMARY KEY)");
        run(
            &mut exec,
            "CREATE TABLE o (oid INT PRIMARY KEY, uid INT REFERENCES u(id) ON DELETE CASCADE)",
        );
        run(&mut exec, "INSERT INTO u VALUES (1)");
        run(&mut exec, "INSERT INTO o VALUES (10, 1)");
    }

    // Reopen from the same data_dir: schemas, constraints and rows survive.
    let mut exec = executor(dir.path());
    run(&mut exec, "USE d");

    let all = rows(&mut exec, "SELECT * FROM t ORDER BY id");
    assert_eq!(all.len(), 2);
    assert_eq!(get(&all[0], "name"), &Value::from("a"));

    let described = rows(&mut exec, "DESCRIBE o");
    let uid = described
        .iter()
        .find(|row| get(row, "column") == &Value::from("uid"))
        .unwrap();
    assert_eq!(get(uid, "references"), &Value::from("u(id)"));
    assert_eq!(get(uid, "on_delete"), &Value::from("CASCADE"));

    // Constraints still bite after the reload.
    assert!(exec.execute_query("INSERT INTO t VALUES (3, 'a')").is_err());
    run(&mut exec, "DELETE FROM u WHERE id = 1");
    assert!(rows(&mut exec, "SELECT * FROM o").is_empty());
}

#[test]
fn aggregate_boundaries_on_empty_tables() {
    let dir = tempfile::tempdir().unwrap();
    let mut exec = executor(dir.path());
    run(&mut exec, "CREATE DATABASE d");
    run(&mut exec, "USE d");
    run(&mut exec, "CREATE TABLE t (id INT PRIMARY KEY, n INT)");

    let out = rows(
        &mut exec,
        "SELECT COUNT(*), COUNT(n), SUM(n), AVG(n), MIN(n), MAX(n) FROM t",
    );
    assert_eq!(out.len(), 1);
    assert_eq!(get(&out[0], "COUNT(*)"), &Value::Int(0));
    assert_eq!(get(&out[0], "COUNT(n)"), &Value::Int(0));
    assert_eq!(get(&out[0], "SUM(n)"), &Value::Null);
    assert_eq!(get(&out[0], "AVG(n)"), &Value::Null);
    assert_eq!(get(&out[0], "MIN(n)"), &Value::Null);
    assert_eq!(get(&out[0], "MAX(n)"), &Value::Null);
}

#[test]
fn aggregates_skip_nulls_and_reject_text() {
    let dir = tempfile::tempdir().unwrap();
    let mut exec = executor(dir.path());
    run(&mut exec, "CREATE DATABASE d");
    run(&mut exec, "USE d");
    run(
        &mut exec,
        "CREATE TABLE t (id INT PRIMARY KEY, n INT, s STRING)",
    );
    run(&mut exec, "INSERT INTO t VALUES (1, 10, 'x')");
    run(&mut exec, "INSERT INTO t VALUES (2, NULL, 'y')");
    run(&mut exec, "INSERT INTO t VALUES (3, 20, 'z')");

    let out = rows(&mut exec, "SELECT COUNT(n), SUM(n), AVG(n) FROM t");
    assert_eq!(get(&out[0], "COUNT(n)"), &Value::Int(2));
    assert_eq!(get(&out[0], "SUM(n)"), &Value::Int(30));
    assert_eq!(get(&out[0], "AVG(n)"), &Value::Float(15.0));

    let err = fail(&mut exec, "SELECT SUM(s) FROM t");
    assert!(matches!(err, Error::Engine(EngineError::Execution(_))));
}

#[test]
fn limit_offset_and_distinct() {
    let dir = tempfile::tempdir().unwrap();
    let mut exec = executor(dir.path());
    run(&mut exec, "CREATE DATABASE d");
    run(&mut exec, "USE d");
    run(&mut exec, "CREATE TABLE t (id INT PRIMARY KEY, g STRING)");
    for (id, g) in [(1, "a"), (2, "a"), (3, "b"), (4, "b"), (5, "c")] {
        run(&mut exec, &format!("INSERT INTO t VALUES ({}, '{}')", id, g));
    }

    assert!(rows(&mut exec, "SELECT * FROM t LIMIT 0").is_empty());
    assert!(rows(&mut exec, "SELECT * FROM t OFFSET 9").is_empty());
    assert_eq!(rows(&mut exec, "SELECT * FROM t LIMIT 2 OFFSET 4").len(), 1);

    let distinct = rows(&mut exec, "SELECT DISTINCT g FROM t ORDER BY g");
    let values: Vec<&Value> = distinct.iter().map(|row| get(row, "g")).collect();
    assert_eq!(values, [&Value::from("a"), &Value::from("b"), &Value::from("c")]);
}

#[test]
fn order_by_sorts_nulls_last_in_both_directions() {
    let dir = tempfile::tempdir().unwrap();
    let mut exec = executor(dir.path());
    run(&mut exec, "CREATE DATABASE d");
    run(&mut exec, "USE d");
    run(&mut exec, "CREATE TABLE t (id INT PRIMARY KEY, n INT)");
    run(&mut exec, "INSERT INTO t VALUES (1, 5)");
    run(&mut exec, "INSERT INTO t VALUES (2, NULL)");
    run(&mut exec, "INSERT INTO t VALUES (3, 1)");

    let ascending = rows(&mut exec, "SELECT id FROM t ORDER BY n ASC");
    let ids: Vec<&Value> = ascending.iter().map(|row| get(row, "id")).collect();
    assert_eq!(ids, [&Value::Int(3), &Value::Int(1), &Value::Int(2)]);

    let descending = rows(&mut exec, "SELECT id FROM t ORDER BY n DESC");
    let ids: Vec<&Value> = descending.iter().map(|row| get(row, "id")).collect();
    assert_eq!(ids, [&Value::Int(1), &Value::Int(3), &Value::Int(2)]);
}

#[test]
fn aggregates_over_joins_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut exec = executor(dir.path());
    run(&mut exec, "CREATE DATABASE d");
    run(&mut exec, "USE d");
    run(&mut exec, "CREATE TABLE a (id INT PRIMARY KEY)");
    run(&mut exec, "CREATE TABLE b (id INT PRIMARY KEY, aid INT)");

    let err = fail(
        &mut exec,
        "SELECT COUNT(*) FROM a INNER JOIN b ON a.id = b.aid",
    );
    assert!(matches!(err, Error::Engine(EngineError::Execution(_))));
    assert!(err.to_string().contains("JOIN"));
}

#[test]
fn commands_require_a_selected_database() {
    let dir = tempfile::tempdir().unwrap();
    let mut exec = executor(dir.path());
    run(&mut exec, "CREATE DATABASE d");

    let err = fail(&mut exec, "SELECT * FROM t");
    assert!(err.to_string().contains("No database selected"));

    // Catalog-level commands work without a selection.
    let listed = rows(&mut exec, "SHOW DATABASES");
    assert_eq!(get(&listed[0], "database"), &Value::from("d"));
}

#[test]
fn show_tables_and_describe() {
    let dir = tempfile::tempdir().unwrap();
    let mut exec = executor(dir.path());
    run(&mut exec, "CREATE DATABASE d");
    run(&mut exec, "USE d");
    run(
        &mut exec,
        "CREATE TABLE t (id INT PRIMARY KEY, name STRING UNIQUE)",
    );

    let tables = rows(&mut exec, "SHOW TABLES");
    assert_eq!(tables.len(), 1);
    assert_eq!(get(&tables[0], "table"), &Value::from("t"));

    let described = rows(&mut exec, "DESC t");
    assert_eq!(described.len(), 2);
    assert_eq!(get(&described[0], "column"), &Value::from("id"));
    assert_eq!(get(&described[0], "type"), &Value::from("INT"));
    assert_eq!(get(&described[0], "primary_key"), &Value::Bool(true));
    assert_eq!(get(&described[1], "unique"), &Value::Bool(true));
}

#[test]
fn missing_primary_key_is_a_schema_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut exec = executor(dir.path());
    run(&mut exec, "CREATE DATABASE d");
    run(&mut exec, "USE d");

    let err = fail(&mut exec, "CREATE TABLE t (id INT, name STRING)");
    assert!(matches!(err, Error::Engine(EngineError::Schema(_))));
    assert!(err.to_string().contains("PRIMARY KEY"));
}

#[test]
fn connection_auto_creates_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!(
        "pesadb://localhost/myapp?data_dir={}",
        dir.path().display()
    );

    {
        let mut conn = pesadb::connect(&url).unwrap();
        assert_eq!(conn.database_name(), "myapp");
        conn.execute("CREATE TABLE t (id INT PRIMARY KEY)").unwrap();
        conn.execute("INSERT INTO t VALUES (1)").unwrap();
    }

    let mut conn = pesadb::connect(&url).unwrap();
    let result = conn.execute("SELECT * FROM t").unwrap();
    assert_eq!(result.rows().len(), 1);
}

#[test]
fn typed_temporal_columns_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut exec = executor(dir.path());
    run(&mut exec, "CREATE DATABASE d");
    run(&mut exec, "USE d");
    run(
        &mut exec,
        "CREATE TABLE ev (id INT PRIMARY KEY, day DATE, at DATETIME)",
    );
    run(
        &mut exec,
        "INSERT INTO ev VALUES (1, '2024-01-15', '2024-01-15T10:30:00Z')",
    );
    let err = fail(&mut exec, "INSERT INTO ev VALUES (2, 'tomorrow', NULL)");
    assert!(matches!(err, Error::Engine(EngineError::Schema(_))));

    let out = rows(&mut exec, "SELECT YEAR(day), DATEDIFF(day, '2024-01-05') FROM ev");
    assert_eq!(get(&out[0], "YEAR(day)"), &Value::Int(2024));
    assert_eq!(get(&out[0], "DATEDIFF(day, '2024-01-05')"), &Value::Int(10));

    // Reload: temporal values come back typed.
    drop(exec);
    let mut exec = executor(dir.path());
    run(&mut exec, "USE d");
    let all = rows(&mut exec, "SELECT * FROM ev");
    assert_eq!(get(&all[0], "day"), &Value::from("2024-01-15").coerce_to(pesadb::DataType::Date).unwrap());
}
