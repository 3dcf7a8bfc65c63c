use std::fmt;

use crate::binding::BindingState;
use crate::driver::DriverError;
use crate::value::Binding;

/// Error types for sqlx-named-exec
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The SQL template is malformed
    #[error("Failed to parse SQL template at byte {offset}: {reason}")]
    Parse { offset: usize, reason: String },

    /// The identifier pattern could not be compiled
    #[error("Failed to compile placeholder pattern: {0}")]
    Regex(#[from] regex::Error),

    /// A bind referenced a name that is not in the template
    #[error("Parameter '{0}' does not appear in the SQL template")]
    UnknownParameter(String),

    /// A strict bind hit a parameter that already has a value
    #[error("Parameter '{0}' is already bound")]
    AlreadyBound(String),

    /// Execution was attempted with parameters still unbound
    #[error("Unbound parameters: {}", .0.join(", "))]
    UnboundParameter(Vec<String>),

    /// The driver failed; carries the SQL and the bindings in effect
    #[error("Database error: {source} [sql: {sql}] [bindings: {}]", BindingList(.bindings))]
    Driver {
        sql: String,
        bindings: Vec<NamedBinding>,
        #[source]
        source: DriverError,
    },
}

impl Error {
    /// The underlying driver error, if this is a driver failure.
    #[must_use]
    pub fn driver_error(&self) -> Option<&DriverError> {
        match self {
            Error::Driver { source, .. } => Some(source),
            _ => None,
        }
    }

    /// The SQLSTATE reported by the driver, passed through untouched.
    #[must_use]
    pub fn sql_state(&self) -> Option<&str> {
        self.driver_error().and_then(DriverError::sql_state)
    }
}

/// Result type alias for sqlx-named-exec operations
pub type Result<T> = std::result::Result<T, Error>;

/// The value bound to one named parameter when an error was captured.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedBinding {
    pub name: String,
    /// `None` when the parameter had not been bound yet.
    pub value: Option<Binding>,
}

impl fmt::Display for NamedBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={value}", self.name),
            None => write!(f, "{}=<unbound>", self.name),
        }
    }
}

struct BindingList<'a>(&'a [NamedBinding]);

impl fmt::Display for BindingList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, binding) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            binding.fmt(f)?;
        }
        Ok(())
    }
}

/// Attaches the positional SQL and the current bindings to a driver failure.
pub(crate) fn translate(source: DriverError, bindings: &BindingState) -> Error {
    translate_with(source, bindings, bindings.snapshot())
}

pub(crate) fn translate_with(
    source: DriverError,
    bindings: &BindingState,
    snapshot: Vec<NamedBinding>,
) -> Error {
    Error::Driver {
        sql: bindings.template().positional_sql().to_owned(),
        bindings: snapshot,
        source,
    }
}
