use std::fmt;

/// A concrete parameter value.
///
/// The variants mirror the scalar types every supported driver can encode, so
/// callers never have to branch on the backend when binding:
///
/// ```
/// use sqlx_named_exec::Value;
///
/// let values: Vec<Value> = vec![1_i64.into(), "alice".into(), true.into()];
/// assert_eq!(values[1], Value::Text("alice".to_owned()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit float
    Float(f64),
    /// Text
    Text(String),
    /// Boolean
    Bool(bool),
    /// Raw bytes
    Blob(Vec<u8>),
}

/// Database type tag attached to a bound `NULL`.
///
/// Some drivers cannot infer the type of an untyped null; the tag tells them
/// which column type the null stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SqlType {
    Boolean,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    /// Generic variable-length text.
    ///
    /// This is the type used when the caller does not name one. Most drivers
    /// accept it for any nullable column, but that is a driver-dependent
    /// compatibility behavior, not a guarantee.
    #[default]
    Varchar,
    Text,
    Blob,
}

impl SqlType {
    /// The SQL spelling of the type, used in diagnostics.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SqlType::Boolean => "BOOLEAN",
            SqlType::SmallInt => "SMALLINT",
            SqlType::Integer => "INTEGER",
            SqlType::BigInt => "BIGINT",
            SqlType::Real => "REAL",
            SqlType::Double => "DOUBLE",
            SqlType::Varchar => "VARCHAR",
            SqlType::Text => "TEXT",
            SqlType::Blob => "BLOB",
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a single placeholder position is bound to.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Value(Value),
    /// A null marker with the type the driver should assume for it.
    Null(SqlType),
}

impl Binding {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Binding::Null(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "'{v}'"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Blob(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Value(value) => value.fmt(f),
            Binding::Null(ty) => write!(f, "NULL::{ty}"),
        }
    }
}

impl From<Value> for Binding {
    fn from(value: Value) -> Self {
        Binding::Value(value)
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

value_from! {
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Int,
    u16 => Int,
    u32 => Int,
    f32 => Float,
    f64 => Float,
    bool => Bool,
    String => Text,
    &str => Text,
    Vec<u8> => Blob,
    &[u8] => Blob,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from(7_i32), Value::Int(7));
        assert_eq!(Value::from(1.5_f32), Value::Float(1.5));
        assert_eq!(Value::from("x"), Value::Text("x".to_owned()));
        assert_eq!(Value::from(&b"ab"[..]), Value::Blob(vec![b'a', b'b']));
    }

    #[test]
    fn test_default_null_type_is_varchar() {
        assert_eq!(SqlType::default(), SqlType::Varchar);
    }

    #[test]
    fn test_display() {
        assert_eq!(Binding::Value(Value::Text("bob".into())).to_string(), "'bob'");
        assert_eq!(Binding::Null(SqlType::Integer).to_string(), "NULL::INTEGER");
        assert_eq!(Value::Blob(vec![0; 3]).to_string(), "<3 bytes>");
    }
}
