//! # sqlx-named-exec
//!
//! Named-parameter statement execution for SQLx, with exactly-once cleanup of the
//! prepared statement on every exit path.
//!
//! ## Features
//!
//! - **Named Placeholders**: Write `:param_name` instead of `?`; a name used several
//!   times is bound once
//! - **Literal-Aware Parsing**: Placeholders inside quoted strings, quoted identifiers
//!   and comments are left alone
//! - **Strict Binding**: Unknown names, accidental double binds and missing values are
//!   errors, reported before anything reaches the database
//! - **Deterministic Cleanup**: `execute` and `execute_batch` consume the executor and
//!   close the statement (and optionally the connection) exactly once
//! - **Diagnostic Errors**: Driver failures carry the SQL and the bound values, with
//!   the driver's own SQLSTATE passed through
//! - **Pluggable Drivers**: The engine runs on the [`Connection`]/[`Statement`] traits;
//!   SQLx MySQL and SQLite adapters are included
//!
//! ## Quick Start
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! sqlx-named-exec = "0.1"
//! ```
//!
//! ## Examples
//!
//! ### Single Statement
//!
//! ```rust,no_run
//! use sqlx_named_exec::{MySqlDriver, UpdateExecutor};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut conn = MySqlDriver::connect("mysql://localhost/test")?;
//!
//! let mut insert = UpdateExecutor::new(
//!     &mut conn,
//!     "INSERT INTO users (id, name) VALUES (:id, :name)",
//!     false,
//! )?;
//! insert.bind("id", 42)?.bind("name", "John Doe")?;
//!
//! let rows = insert.execute()?;
//! println!("Inserted {rows} rows");
//! # Ok(())
//! # }
//! ```
//!
//! ### Batches
//!
//! ```rust,no_run
//! use sqlx_named_exec::{BatchExecutor, MySqlDriver};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let mut conn = MySqlDriver::connect("mysql://localhost/test")?;
//! let mut batch = BatchExecutor::new(
//!     &mut conn,
//!     "UPDATE accounts SET balance = balance + :amount WHERE id = :id",
//!     false,
//! )?;
//! for (id, amount) in [(1, 100), (2, -100)] {
//!     batch.bind("id", id)?.bind("amount", amount)?.add_row()?;
//! }
//!
//! let counts = batch.execute_batch()?;
//! assert_eq!(counts.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ### Typed Nulls
//!
//! ```rust,no_run
//! use sqlx_named_exec::{MySqlDriver, SqlType, UpdateExecutor};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let mut conn = MySqlDriver::connect("mysql://localhost/test")?;
//! let mut update = UpdateExecutor::new(
//!     &mut conn,
//!     "UPDATE users SET manager_id = :manager WHERE id = :id",
//!     false,
//! )?;
//! update.bind_null("manager", SqlType::Integer)?.bind("id", 7)?;
//! update.execute()?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Owned Connections
//!
//! ```rust,no_run
//! use sqlx_named_exec::{MySqlConnector, TemplateSyntax, UpdateExecutor};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let connector = MySqlConnector::new("mysql://localhost/test");
//!
//! // The connection is opened here and closed when `execute` returns.
//! let mut delete = UpdateExecutor::open(&connector, "DELETE FROM sessions WHERE user_id = :id", TemplateSyntax::default())?;
//! delete.bind("id", 42)?;
//! delete.execute()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## How It Works
//!
//! 1. **Parse**: The template is scanned once; each `:name` outside literals and
//!    comments becomes a positional marker and its position is recorded under `name`
//! 2. **Prepare**: The positional SQL is prepared on the connection immediately
//! 3. **Bind**: Values are tracked per position; binding a name fills all its positions
//! 4. **Execute**: Unbound names fail the call before the driver is contacted;
//!    otherwise values are sent by position, the statement runs, and it is released
//!    whatever the outcome
//!
//! ## Limitations
//!
//! - Placeholder names must match `[A-Za-z_][A-Za-z0-9_]*`
//! - Templates are lexed with MySQL's rules by default (backslash escapes, `#`
//!   comments); use [`Dialect::Standard`] for SQLite or PostgreSQL text that
//!   contains a literal backslash or a `#` operator
//! - Executors are synchronous and single-threaded; the SQLx adapter must not be used
//!   from inside an async runtime
//! - Row mapping for queries is not provided
//!
//! ## License
//!
//! Licensed under either of Apache License, Version 2.0 or MIT license at your option.

pub mod batch;
pub mod binding;
pub mod driver;
pub mod error;
pub mod query;
pub mod sqlx_driver;
pub mod statement;
pub mod template;
pub mod value;

pub use batch::BatchExecutor;
pub use driver::{Connection, ConnectionFactory, DriverError, Statement};
pub use error::{Error, NamedBinding, Result};
pub use query::UpdateExecutor;
pub use sqlx_driver::{SqlxConnection, SqlxConnector, SqlxStatement};
pub use template::{Dialect, ParsedTemplate, PlaceholderStyle, TemplateSyntax};
pub use value::{Binding, SqlType, Value};

#[cfg(feature = "mysql")]
pub use sqlx_driver::{MySqlConnector, MySqlDriver};
#[cfg(feature = "sqlite")]
pub use sqlx_driver::{SqliteConnector, SqliteDriver};

/// Convenience re-exports for common use cases
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::{BatchExecutor, UpdateExecutor};
    pub use crate::{Connection, Statement};
    pub use crate::{SqlType, TemplateSyntax, Value};
}
