#![cfg(feature = "sqlite")]

use sqlx_named_exec::{
    BatchExecutor, Dialect, Error, PlaceholderStyle, SqlType, SqliteConnector, SqliteDriver, TemplateSyntax,
    UpdateExecutor,
};

fn setup() -> SqliteDriver {
    let mut conn = SqliteDriver::connect("sqlite::memory:").unwrap();
    UpdateExecutor::new(
        &mut conn,
        "CREATE TABLE t (a INTEGER PRIMARY KEY, b TEXT, c INTEGER)",
        false,
    )
    .unwrap()
    .execute()
    .unwrap();
    conn
}

fn count_rows(conn: &mut SqliteDriver) -> u64 {
    UpdateExecutor::new(conn, "UPDATE t SET c = c", false)
        .unwrap()
        .execute()
        .unwrap()
}

#[test]
fn insert_then_update() {
    let mut conn = setup();

    let mut insert = UpdateExecutor::new(&mut conn, "INSERT INTO t(a, b) VALUES (:x, :y)", false).unwrap();
    insert.bind("x", 1).unwrap().bind("y", "one").unwrap();
    assert_eq!(insert.execute().unwrap(), 1);

    let mut update = UpdateExecutor::new(
        &mut conn,
        "UPDATE t SET b = :label || ' at 10:30', c = :c WHERE a = :id OR b = :label",
        false,
    )
    .unwrap();
    update
        .bind("label", "one")
        .unwrap()
        .bind_null("c", SqlType::Integer)
        .unwrap()
        .bind("id", 1)
        .unwrap();
    assert_eq!(update.execute().unwrap(), 1);
    assert!(conn.is_open());
}

#[test]
fn batch_insert_counts_each_row() {
    let mut conn = setup();

    let mut batch = BatchExecutor::new(&mut conn, "INSERT INTO t(a, b) VALUES (:x, :y)", false).unwrap();
    for (x, y) in [(1, "a"), (2, "b"), (3, "c")] {
        batch.bind("x", x).unwrap().bind("y", y).unwrap().add_row().unwrap();
    }
    assert_eq!(batch.execute_batch().unwrap(), [1, 1, 1]);
    assert_eq!(count_rows(&mut conn), 3);
}

#[test]
fn numbered_markers_work_on_sqlite() {
    let mut conn = setup();
    let syntax = TemplateSyntax::default().with_style(PlaceholderStyle::Numbered);

    let mut insert = UpdateExecutor::with_syntax(
        &mut conn,
        "INSERT INTO t(a, b, c) VALUES (:id, :label, :id)",
        syntax,
        false,
    )
    .unwrap();
    assert_eq!(
        insert.template().positional_sql(),
        "INSERT INTO t(a, b, c) VALUES (?1, ?2, ?3)"
    );
    insert.bind("id", 5).unwrap().bind_untyped_null("label").unwrap();
    assert_eq!(insert.execute().unwrap(), 1);
}

#[test]
fn constraint_violation_keeps_driver_code() {
    let mut conn = setup();

    let mut batch = BatchExecutor::new(&mut conn, "INSERT INTO t(a) VALUES (:x)", false).unwrap();
    batch.bind("x", 1).unwrap().add_row().unwrap();
    batch.bind("x", 1).unwrap().add_row().unwrap();

    let err = batch.execute_batch().unwrap_err();
    match &err {
        Error::Driver { sql, .. } => assert_eq!(sql, "INSERT INTO t(a) VALUES (?)"),
        other => panic!("expected Driver error, got {other:?}"),
    }
    assert!(err.sql_state().is_some());
    assert_eq!(count_rows(&mut conn), 1);
}

#[test]
fn prepare_rejects_unknown_table() {
    let mut conn = setup();

    let err = UpdateExecutor::new(&mut conn, "DELETE FROM missing WHERE id = :id", false)
        .err()
        .unwrap();
    assert!(matches!(err, Error::Driver { .. }));
    assert!(conn.is_open());
}

#[test]
fn owned_connection_is_closed() {
    let mut conn = setup();
    let mut insert = UpdateExecutor::new(&mut conn, "INSERT INTO t(a) VALUES (:x)", true).unwrap();
    insert.bind("x", 9).unwrap();
    insert.execute().unwrap();
    assert!(!conn.is_open());
}

#[test]
fn connector_opens_fresh_connection() {
    let connector = SqliteConnector::new("sqlite::memory:");
    let create = UpdateExecutor::open(
        &connector,
        "CREATE TABLE IF NOT EXISTS scratch (id INTEGER)",
        TemplateSyntax::default(),
    )
    .unwrap();
    assert_eq!(create.execute().unwrap(), 0);
}

#[test]
fn standard_dialect_keeps_trailing_backslash_literal() {
    let mut conn = setup();
    let syntax = TemplateSyntax::default().with_dialect(Dialect::Standard);

    let mut insert = UpdateExecutor::with_syntax(
        &mut conn,
        r"INSERT INTO t(b, a) VALUES ('C:\', :x)",
        syntax,
        false,
    )
    .unwrap();
    insert.bind("x", 1).unwrap();
    assert_eq!(insert.execute().unwrap(), 1);
}
