//! Contracts the execution engine expects from a database driver.
//!
//! The engine never talks to a database directly. Anything that can prepare a
//! statement, accept positional parameters and run updates or batches can be
//! plugged in by implementing [`Connection`] and [`Statement`]; the SQLx adapter
//! in [`crate::sqlx_driver`] is one such implementation.

use std::error::Error as StdError;

use crate::value::Binding;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// A failure reported by the underlying driver.
///
/// The engine adds context around it but never reinterprets it: the message,
/// SQLSTATE and source error are exactly what the driver produced.
#[derive(Debug, thiserror::Error)]
#[error("{message}{}", sql_state_suffix(.sql_state))]
pub struct DriverError {
    message: String,
    sql_state: Option<String>,
    #[source]
    source: Option<BoxError>,
}

fn sql_state_suffix(sql_state: &Option<String>) -> String {
    sql_state
        .as_deref()
        .map(|state| format!(" (SQLSTATE {state})"))
        .unwrap_or_default()
}

impl DriverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            sql_state: None,
            source: None,
        }
    }

    /// Wraps an arbitrary driver error, using its `Display` output as the message.
    pub fn from_source<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: source.to_string(),
            sql_state: None,
            source: Some(Box::new(source)),
        }
    }

    #[must_use]
    pub fn with_sql_state(mut self, sql_state: impl Into<String>) -> Self {
        self.sql_state = Some(sql_state.into());
        self
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The SQLSTATE (or vendor code) the driver attached, if any.
    #[must_use]
    pub fn sql_state(&self) -> Option<&str> {
        self.sql_state.as_deref()
    }
}

/// A live database connection.
pub trait Connection {
    type Statement: Statement;

    /// Prepares `sql`, which already uses the driver's positional markers.
    fn prepare(&mut self, sql: &str) -> Result<Self::Statement, DriverError>;

    fn close(&mut self) -> Result<(), DriverError>;
}

/// A prepared statement produced by a [`Connection`].
///
/// Positions are 1-based.
pub trait Statement {
    fn set_parameter(&mut self, position: usize, binding: &Binding) -> Result<(), DriverError>;

    /// Executes with the current parameters and returns the affected row count.
    fn execute_update(&mut self) -> Result<u64, DriverError>;

    /// Queues the current parameters as one batch row.
    fn add_batch(&mut self) -> Result<(), DriverError>;

    /// Executes all queued rows, returning one count per row in queue order.
    fn execute_batch(&mut self) -> Result<Vec<u64>, DriverError>;

    fn close(&mut self) -> Result<(), DriverError>;
}

/// Lets a caller lend a connection to an executor while keeping ownership.
impl<C: Connection + ?Sized> Connection for &mut C {
    type Statement = C::Statement;

    fn prepare(&mut self, sql: &str) -> Result<Self::Statement, DriverError> {
        (**self).prepare(sql)
    }

    fn close(&mut self) -> Result<(), DriverError> {
        (**self).close()
    }
}

/// Produces fresh connections for executors that own their connection.
///
/// Passed explicitly by the caller; there is no global default.
pub trait ConnectionFactory {
    type Connection: Connection;

    fn connect(&self) -> Result<Self::Connection, DriverError>;
}

impl<F, C> ConnectionFactory for F
where
    F: Fn() -> Result<C, DriverError>,
    C: Connection,
{
    type Connection = C;

    fn connect(&self) -> Result<C, DriverError> {
        self()
    }
}
