use crate::driver::{Connection, ConnectionFactory};
use crate::statement::NamedStatement;
use crate::template::{ParsedTemplate, TemplateSyntax};
use crate::value::{SqlType, Value};

/// Executes one statement for many rows of named bindings.
///
/// Bind a row, commit it with [`add_row`](Self::add_row), and repeat; the
/// bindings are cleared after each commit so the next row starts empty.
/// [`execute_batch`](Self::execute_batch) runs all committed rows and returns
/// the affected-row counts in commit order. The statement, and the connection
/// when `close_connection` is set, is closed once when it returns.
///
/// # Examples
///
/// ```rust,no_run
/// use sqlx_named_exec::{BatchExecutor, SqliteDriver};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut conn = SqliteDriver::connect("sqlite::memory:")?;
/// let mut batch = BatchExecutor::new(&mut conn, "INSERT INTO t(a, b) VALUES (:x, :y)", false)?;
/// batch.bind("x", 1)?.bind("y", 2)?.add_row()?;
/// batch.bind("x", 3)?.bind("y", 4)?.add_row()?;
///
/// let counts = batch.execute_batch()?;
/// assert_eq!(counts, [1, 1]);
/// # Ok(())
/// # }
/// ```
pub struct BatchExecutor<C: Connection> {
    statement: NamedStatement<C>,
}

impl<C: Connection> BatchExecutor<C> {
    /// # Errors
    ///
    /// Returns an error if the template is malformed or cannot be prepared.
    pub fn new(connection: C, template: &str, close_connection: bool) -> crate::Result<Self> {
        Self::with_syntax(connection, template, TemplateSyntax::default(), close_connection)
    }

    /// # Errors
    ///
    /// As [`UpdateExecutor::with_syntax`](crate::UpdateExecutor::with_syntax).
    pub fn with_syntax(
        connection: C,
        template: &str,
        syntax: TemplateSyntax,
        close_connection: bool,
    ) -> crate::Result<Self> {
        let statement = NamedStatement::new(connection, template, syntax, close_connection)?;
        Ok(Self { statement })
    }

    /// Creates a batch on a fresh connection from `factory`, closed when the
    /// batch is executed or dropped.
    ///
    /// # Errors
    ///
    /// As [`UpdateExecutor::open`](crate::UpdateExecutor::open).
    pub fn open<F>(factory: &F, template: &str, syntax: TemplateSyntax) -> crate::Result<Self>
    where
        F: ConnectionFactory<Connection = C>,
    {
        let statement = NamedStatement::open(factory, template, syntax)?;
        Ok(Self { statement })
    }

    /// Binds `value` to every occurrence of `name` in the current row.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownParameter`](crate::Error::UnknownParameter) or
    /// [`Error::AlreadyBound`](crate::Error::AlreadyBound).
    pub fn bind(&mut self, name: &str, value: impl Into<Value>) -> crate::Result<&mut Self> {
        self.statement.bind(name, value.into(), false)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// [`Error::UnknownParameter`](crate::Error::UnknownParameter).
    pub fn rebind(&mut self, name: &str, value: impl Into<Value>) -> crate::Result<&mut Self> {
        self.statement.bind(name, value.into(), true)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// As [`bind`](Self::bind).
    pub fn bind_null(&mut self, name: &str, ty: SqlType) -> crate::Result<&mut Self> {
        self.statement.bind_null(name, Some(ty), false)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// As [`rebind`](Self::rebind).
    pub fn rebind_null(&mut self, name: &str, ty: SqlType) -> crate::Result<&mut Self> {
        self.statement.bind_null(name, Some(ty), true)?;
        Ok(self)
    }

    /// Binds a null tagged with the default [`SqlType::Varchar`].
    ///
    /// # Errors
    ///
    /// As [`bind`](Self::bind).
    pub fn bind_untyped_null(&mut self, name: &str) -> crate::Result<&mut Self> {
        self.statement.bind_null(name, None, false)?;
        Ok(self)
    }

    /// Commits the current bindings as one row.
    ///
    /// # Errors
    ///
    /// [`Error::UnboundParameter`](crate::Error::UnboundParameter) if the row
    /// is incomplete. The statement stays open on error.
    pub fn add_row(&mut self) -> crate::Result<&mut Self> {
        self.statement.commit_batch_row()?;
        Ok(self)
    }

    /// Rows committed and waiting for [`execute_batch`](Self::execute_batch).
    #[must_use]
    pub fn pending_rows(&self) -> usize {
        self.statement.pending_rows()
    }

    #[must_use]
    pub fn template(&self) -> &ParsedTemplate {
        self.statement.template()
    }

    #[must_use]
    pub fn unbound_names(&self) -> Vec<&str> {
        self.statement.bindings().unbound_names()
    }

    /// Runs every committed row; one count per row, in commit order.
    ///
    /// # Errors
    ///
    /// [`Error::Driver`](crate::Error::Driver) carrying the last committed
    /// row's bindings if the batch or the release fails.
    pub fn execute_batch(self) -> crate::Result<Vec<u64>> {
        self.statement.execute_batch()
    }
}
