use crate::driver::{Connection, ConnectionFactory};
use crate::statement::NamedStatement;
use crate::template::{ParsedTemplate, TemplateSyntax};
use crate::value::{SqlType, Value};

/// Executes one statement written with named placeholders.
///
/// `UpdateExecutor` parses the template once, prepares it immediately, and lets
/// you bind values by name. Binding a name that appears several times sets all
/// of its occurrences. [`execute`](Self::execute) consumes the executor: the
/// prepared statement is closed exactly once whether execution succeeds or
/// fails, and the connection is closed too when `close_connection` was set.
///
/// Binding is strict: binding a name twice is an error. Use
/// [`rebind`](Self::rebind) to replace a value on purpose.
///
/// An executor is single-owner state. Chaining `bind` calls is a convenience;
/// it does not make the executor safe to share between threads.
///
/// # Examples
///
/// ```rust,no_run
/// use sqlx_named_exec::{MySqlDriver, UpdateExecutor};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut conn = MySqlDriver::connect("mysql://localhost/test")?;
///
/// let mut insert = UpdateExecutor::new(
///     &mut conn,
///     "INSERT INTO users (user_id, name) VALUES (:user_id, :name)",
///     false,
/// )?;
/// insert.bind("user_id", 42)?.bind("name", "John Doe")?;
///
/// let rows = insert.execute()?;
/// println!("Inserted {rows} rows");
/// # Ok(())
/// # }
/// ```
pub struct UpdateExecutor<C: Connection> {
    statement: NamedStatement<C>,
}

impl<C: Connection> UpdateExecutor<C> {
    /// Creates an executor for `template` on `connection` with the default
    /// `:name` syntax and `?` markers.
    ///
    /// # Errors
    ///
    /// Returns an error if the template is malformed or cannot be prepared.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use sqlx_named_exec::{SqliteDriver, UpdateExecutor};
    ///
    /// let mut conn = SqliteDriver::connect("sqlite::memory:")?;
    /// let executor = UpdateExecutor::new(&mut conn, "DELETE FROM users WHERE id = :id", false)?;
    /// assert_eq!(executor.unbound_names(), ["id"]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(connection: C, template: &str, close_connection: bool) -> crate::Result<Self> {
        Self::with_syntax(connection, template, TemplateSyntax::default(), close_connection)
    }

    /// Like [`new`](Self::new) with an explicit prefix, marker style and dialect.
    ///
    /// # Errors
    ///
    /// [`Error::Parse`](crate::Error::Parse) if the template is malformed or the
    /// prefix is unusable, [`Error::Driver`](crate::Error::Driver) if the driver
    /// refuses to prepare it.
    pub fn with_syntax(
        connection: C,
        template: &str,
        syntax: TemplateSyntax,
        close_connection: bool,
    ) -> crate::Result<Self> {
        let statement = NamedStatement::new(connection, template, syntax, close_connection)?;
        Ok(Self { statement })
    }

    /// Creates an executor on a fresh connection from `factory`; the connection
    /// is closed together with the statement.
    ///
    /// # Errors
    ///
    /// [`Error::Parse`](crate::Error::Parse) if the template is malformed, in
    /// which case no connection is requested.
    /// [`Error::Driver`](crate::Error::Driver) if no connection can be obtained
    /// or the statement cannot be prepared.
    pub fn open<F>(factory: &F, template: &str, syntax: TemplateSyntax) -> crate::Result<Self>
    where
        F: ConnectionFactory<Connection = C>,
    {
        let statement = NamedStatement::open(factory, template, syntax)?;
        Ok(Self { statement })
    }

    /// Binds `value` to every occurrence of `name`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownParameter`](crate::Error::UnknownParameter) or
    /// [`Error::AlreadyBound`](crate::Error::AlreadyBound).
    pub fn bind(&mut self, name: &str, value: impl Into<Value>) -> crate::Result<&mut Self> {
        self.statement.bind(name, value.into(), false)?;
        Ok(self)
    }

    /// Binds `value`, replacing any earlier value for `name`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownParameter`](crate::Error::UnknownParameter).
    pub fn rebind(&mut self, name: &str, value: impl Into<Value>) -> crate::Result<&mut Self> {
        self.statement.bind(name, value.into(), true)?;
        Ok(self)
    }

    /// Binds a null of type `ty` to every occurrence of `name`.
    ///
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
    /// Whether a driver accepts a text-typed null for a non-text column is
    /// driver-dependent; prefer [`bind_null`](Self::bind_null) when the column
    /// type is known.
    ///
    /// # Errors
    ///
    /// As [`bind`](Self::bind).
    pub fn bind_untyped_null(&mut self, name: &str) -> crate::Result<&mut Self> {
        self.statement.bind_null(name, None, false)?;
        Ok(self)
    }

    #[must_use]
    pub fn template(&self) -> &ParsedTemplate {
        self.statement.template()
    }

    /// Names that still need a value before [`execute`](Self::execute).
    #[must_use]
    pub fn unbound_names(&self) -> Vec<&str> {
        self.statement.bindings().unbound_names()
    }

    /// Executes the statement and returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// [`Error::UnboundParameter`](crate::Error::UnboundParameter) if a name is
    /// unbound (the database is not contacted), or
    /// [`Error::Driver`](crate::Error::Driver) if the database fails.
    pub fn execute(self) -> crate::Result<u64> {
        self.statement.execute_update()
    }
}
