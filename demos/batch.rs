//! Batch example demonstrating BatchExecutor on SQLite
//!
//! Run with: cargo run --example batch
//!
//! Uses an in-memory database unless DATABASE_URL is set:
//! export DATABASE_URL="sqlite://accounts.db?mode=rwc"

use sqlx_named_exec::{BatchExecutor, SqliteConnector, SqliteDriver, TemplateSyntax, UpdateExecutor};

fn setup(conn: &mut SqliteDriver) -> Result<(), Box<dyn std::error::Error>> {
    UpdateExecutor::new(
        &mut *conn,
        "CREATE TABLE IF NOT EXISTS accounts (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            balance INTEGER NOT NULL
        )",
        false,
    )?
    .execute()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());

    let mut conn = SqliteDriver::connect(&database_url)?;
    setup(&mut conn)?;

    println!("--- Inserting accounts in one batch ---");
    let mut insert = BatchExecutor::new(
        &mut conn,
        "INSERT INTO accounts (id, name, balance) VALUES (:id, :name, :balance)",
        false,
    )?;
    for (id, name, balance) in [(1, "Alice", 1000), (2, "Bob", 500), (3, "Charlie", 0)] {
        insert
            .bind("id", id)?
            .bind("name", name)?
            .bind("balance", balance)?
            .add_row()?;
    }
    println!("Queued {} rows", insert.pending_rows());
    let counts = insert.execute_batch()?;
    println!("Per-row counts: {:?}", counts);

    println!("\n--- Transferring $100 from Alice to Bob ---");
    let mut transfer = BatchExecutor::new(
        &mut conn,
        "UPDATE accounts SET balance = balance + :delta WHERE id = :id",
        false,
    )?;
    transfer.bind("id", 1)?.bind("delta", -100)?.add_row()?;
    transfer.bind("id", 2)?.bind("delta", 100)?.add_row()?;
    let counts = transfer.execute_batch()?;
    println!("Updated {:?}", counts);

    println!("\n--- Duplicate id in a batch ---");
    let mut duplicate = BatchExecutor::new(
        &mut conn,
        "INSERT INTO accounts (id, name, balance) VALUES (:id, :name, 0)",
        true,
    )?;
    duplicate.bind("id", 4)?.bind("name", "Dana")?.add_row()?;
    duplicate.bind("id", 1)?.bind("name", "Alice Clone")?.add_row()?;
    match duplicate.execute_batch() {
        Ok(counts) => println!("Unexpectedly succeeded: {:?}", counts),
        Err(e) => println!("Failed: {}", e),
    }
    println!("Connection open after owned batch: {}", conn.is_open());

    println!("\n--- Statement on a connection from a connector ---");
    let connector = SqliteConnector::new("sqlite::memory:");
    let rows = UpdateExecutor::open(&connector, "CREATE TABLE scratch (id INTEGER)", TemplateSyntax::default())?
        .execute()?;
    println!("Created scratch table ({} rows affected)", rows);

    println!("\nExample completed successfully!");
    Ok(())
}
