//! The statement lifecycle shared by the executors.
//!
//! A [`NamedStatement`] is prepared as soon as it is built and is released
//! exactly once: when `execute_update` or `execute_batch` returns, whatever the
//! outcome, or when it is dropped unexecuted. Releasing closes the driver
//! statement and, if the statement owns it, the connection.
//!
//! Instances hold plain mutable state and must stay with one unit of work on
//! one thread. The `&mut Self` chaining on the executors is an ergonomic, not a
//! synchronization guarantee.

use crate::binding::BindingState;
use crate::driver::{Connection, ConnectionFactory, DriverError, Statement};
use crate::error::{translate, translate_with, Error, NamedBinding, Result};
use crate::template::{parse, ParsedTemplate, TemplateSyntax};
use crate::value::{SqlType, Value};

struct StatementHandle<C: Connection> {
    connection: C,
    statement: Option<C::Statement>,
    owns_connection: bool,
}

impl<C: Connection> StatementHandle<C> {
    fn statement(&mut self) -> std::result::Result<&mut C::Statement, DriverError> {
        self.statement
            .as_mut()
            .ok_or_else(|| DriverError::new("statement is already closed"))
    }

    /// Closes the statement, then the connection if owned. No-op once released.
    fn release(&mut self) -> std::result::Result<(), DriverError> {
        let Some(mut statement) = self.statement.take() else {
            return Ok(());
        };
        let closed = statement.close();
        let disconnected = if self.owns_connection {
            self.connection.close()
        } else {
            Ok(())
        };
        tracing::debug!(close_connection = self.owns_connection, "released statement");

        match (closed, disconnected) {
            (Ok(()), Ok(())) => Ok(()),
            (Err(err), Ok(())) | (Ok(()), Err(err)) => Err(err),
            (Err(err), Err(connection_err)) => {
                tracing::warn!(error = %connection_err, "connection close failed after statement close failed");
                Err(err)
            }
        }
    }
}

impl<C: Connection> Drop for StatementHandle<C> {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            tracing::warn!(error = %err, "failed to release statement on drop");
        }
    }
}

/// A prepared statement with named parameters.
pub struct NamedStatement<C: Connection> {
    bindings: BindingState,
    handle: StatementHandle<C>,
    committed: usize,
    /// Bindings of the most recently committed batch row.
    last_row: Option<Vec<NamedBinding>>,
}

impl<C: Connection> NamedStatement<C> {
    /// Parses `template` and prepares it on `connection`.
    ///
    /// With `owns_connection`, the connection is closed together with the
    /// statement, including when this constructor fails.
    ///
    /// # Errors
    ///
    /// [`Error::Parse`] for a malformed template, [`Error::Driver`] if the driver
    /// refuses to prepare it.
    pub fn new(
        mut connection: C,
        template: &str,
        syntax: TemplateSyntax,
        owns_connection: bool,
    ) -> Result<Self> {
        match parse(template, syntax) {
            Ok(parsed) => Self::prepare(connection, BindingState::new(parsed), owns_connection),
            Err(err) => {
                if owns_connection {
                    close_connection(&mut connection);
                }
                Err(err)
            }
        }
    }

    fn prepare(mut connection: C, bindings: BindingState, owns_connection: bool) -> Result<Self> {
        let statement = match connection.prepare(bindings.template().positional_sql()) {
            Ok(statement) => statement,
            Err(err) => {
                if owns_connection {
                    close_connection(&mut connection);
                }
                return Err(translate(err, &bindings));
            }
        };
        tracing::debug!(sql = bindings.template().positional_sql(), "prepared statement");

        Ok(Self {
            bindings,
            handle: StatementHandle {
                connection,
                statement: Some(statement),
                owns_connection,
            },
            committed: 0,
            last_row: None,
        })
    }

    /// # Errors
    ///
    /// As [`BindingState::bind`].
    pub fn bind(&mut self, name: &str, value: Value, allow_rebind: bool) -> Result<()> {
        self.bindings.bind(name, value, allow_rebind)
    }

    /// # Errors
    ///
    /// As [`BindingState::bind_null`].
    pub fn bind_null(&mut self, name: &str, ty: Option<SqlType>, allow_rebind: bool) -> Result<()> {
        self.bindings.bind_null(name, ty, allow_rebind)
    }

    #[must_use]
    pub fn template(&self) -> &ParsedTemplate {
        self.bindings.template()
    }

    #[must_use]
    pub fn bindings(&self) -> &BindingState {
        &self.bindings
    }

    /// Number of batch rows committed so far.
    #[must_use]
    pub fn pending_rows(&self) -> usize {
        self.committed
    }

    /// Executes once and releases the statement.
    ///
    /// # Errors
    ///
    /// [`Error::UnboundParameter`] without contacting the driver if any name is
    /// unbound; [`Error::Driver`] if execution or release fails.
    pub fn execute_update(mut self) -> Result<u64> {
        let outcome = self.run_update();
        let released = self.handle.release();
        self.finish(outcome, released, false)
    }

    /// Queues the current bindings as one batch row and clears them.
    ///
    /// The statement stays open.
    ///
    /// # Errors
    ///
    /// [`Error::UnboundParameter`] if the row is incomplete, [`Error::Driver`] if
    /// the driver rejects it.
    pub fn commit_batch_row(&mut self) -> Result<()> {
        self.bindings.ensure_complete()?;
        let Self { bindings, handle, .. } = self;
        let bindings: &BindingState = bindings;
        let statement = handle.statement().map_err(|err| translate(err, bindings))?;
        bindings
            .apply(statement)
            .and_then(|()| statement.add_batch())
            .map_err(|err| translate(err, bindings))?;

        self.last_row = Some(self.bindings.snapshot());
        self.committed += 1;
        self.bindings.reset();
        tracing::debug!(row = self.committed, "committed batch row");
        Ok(())
    }

    /// Executes every committed row and releases the statement.
    ///
    /// Bindings made after the last commit are not part of the batch and are
    /// dropped.
    ///
    /// # Errors
    ///
    /// [`Error::Driver`] if execution or release fails.
    pub fn execute_batch(mut self) -> Result<Vec<u64>> {
        if !self.bindings.is_empty() {
            tracing::warn!(
                bindings = ?self.bindings.snapshot(),
                "discarding bindings that were never committed as a batch row"
            );
        }
        let outcome = self.run_batch();
        let released = self.handle.release();
        self.finish(outcome, released, true)
    }

    fn run_update(&mut self) -> Result<u64> {
        self.bindings.ensure_complete()?;
        let Self { bindings, handle, .. } = self;
        let bindings: &BindingState = bindings;
        let statement = handle.statement().map_err(|err| translate(err, bindings))?;
        let count = bindings
            .apply(statement)
            .and_then(|()| statement.execute_update())
            .map_err(|err| translate(err, bindings))?;
        tracing::debug!(rows_affected = count, "executed statement");
        Ok(count)
    }

    fn run_batch(&mut self) -> Result<Vec<u64>> {
        let counts = self
            .handle
            .statement()
            .and_then(|statement| statement.execute_batch())
            .map_err(|err| self.translate_batch(err))?;
        tracing::debug!(rows = self.committed, results = counts.len(), "executed batch");
        Ok(counts)
    }

    fn translate_batch(&self, err: DriverError) -> Error {
        match &self.last_row {
            Some(row) => translate_with(err, &self.bindings, row.clone()),
            None => translate(err, &self.bindings),
        }
    }

    /// Combines the execution outcome with the release outcome.
    ///
    /// An execution error takes precedence over a release error.
    fn finish<T>(
        &self,
        outcome: Result<T>,
        released: std::result::Result<(), DriverError>,
        batch: bool,
    ) -> Result<T> {
        match (outcome, released) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(err)) if batch => Err(self.translate_batch(err)),
            (Ok(_), Err(err)) => Err(translate(err, &self.bindings)),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(release_err)) => {
                tracing::warn!(error = %release_err, "statement release failed after execution error");
                Err(err)
            }
        }
    }
}

impl<C: Connection> NamedStatement<C> {
    /// Parses `template`, obtains a connection from `factory` and prepares the
    /// template on it. The connection is closed together with the statement.
    ///
    /// The template is parsed before connecting, so a malformed template never
    /// opens a connection.
    ///
    /// # Errors
    ///
    /// [`Error::Parse`] for a malformed template, [`Error::Driver`] carrying the
    /// positional SQL if no connection can be obtained or the driver refuses to
    /// prepare the statement.
    pub fn open<F>(factory: &F, template: &str, syntax: TemplateSyntax) -> Result<Self>
    where
        F: ConnectionFactory<Connection = C>,
    {
        let bindings = BindingState::new(parse(template, syntax)?);
        let connection = factory
            .connect()
            .map_err(|err| translate(err, &bindings))?;
        Self::prepare(connection, bindings, true)
    }
}

fn close_connection<C: Connection>(connection: &mut C) {
    if let Err(err) = connection.close() {
        tracing::warn!(error = %err, "failed to close connection after statement setup failed");
    }
}
