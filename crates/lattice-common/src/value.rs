//! Typed column values.
//!
//! `Value` is a closed tagged variant with one case per supported column
//! type. Parameter binding and literal parsing both go through it, so a
//! value's runtime type is always known and checked against the declared
//! column type at the binding boundary.

use std::fmt;

use crate::schema::DataType;

/// A typed column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    BigInt(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// UTF-8 string.
    Varchar(String),
    /// Days since the Unix epoch.
    Date(i32),
    /// Milliseconds since the Unix epoch.
    Timestamp(i64),
}

impl Value {
    /// Returns true if the value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the value's data type, or `None` for NULL.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(DataType::Bool),
            Value::Int(_) => Some(DataType::Int),
            Value::BigInt(_) => Some(DataType::BigInt),
            Value::Float(_) => Some(DataType::Float),
            Value::Double(_) => Some(DataType::Double),
            Value::Varchar(_) => Some(DataType::Varchar),
            Value::Date(_) => Some(DataType::Date),
            Value::Timestamp(_) => Some(DataType::Timestamp),
        }
    }

    /// Returns true if the value may be stored in a column of the given
    /// declared type.
    ///
    /// The rule is exact match plus a small widening set: `Int` is
    /// accepted by `BigInt`, `Float` and `Double` columns, and `BigInt`
    /// is accepted by `Double` and `Timestamp` columns. There is no
    /// narrowing and no string/numeric coercion. NULL matches every
    /// type; nullability is checked separately.
    pub fn matches(&self, declared: DataType) -> bool {
        match (self, declared) {
            (Value::Null, _) => true,
            (Value::Int(_), DataType::BigInt)
            | (Value::Int(_), DataType::Float)
            | (Value::Int(_), DataType::Double) => true,
            (Value::BigInt(_), DataType::Double) | (Value::BigInt(_), DataType::Timestamp) => true,
            _ => self.data_type() == Some(declared),
        }
    }

    /// Tries to get as boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Tries to get as a 32-bit integer.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Tries to get as a 64-bit integer, widening `Int`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(i64::from(*i)),
            Value::BigInt(i) => Some(*i),
            _ => None,
        }
    }

    /// Tries to get as a 64-bit float, widening numeric variants.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(f64::from(*i)),
            Value::BigInt(i) => Some(*i as f64),
            Value::Float(f) => Some(f64::from(*f)),
            Value::Double(f) => Some(*f),
            _ => None,
        }
    }

    /// Tries to get as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Varchar(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::BigInt(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Varchar(s) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "date({})", d),
            Value::Timestamp(ts) => write!(f, "timestamp({})", ts),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::BigInt(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Varchar(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Varchar(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_matching() {
        assert!(Value::BigInt(1).matches(DataType::BigInt));
        assert!(Value::Null.matches(DataType::BigInt));
        assert!(!Value::Varchar("1".into()).matches(DataType::BigInt));
        assert!(!Value::BigInt(1).matches(DataType::Int));
    }

    #[test]
    fn test_widening() {
        assert!(Value::Int(1).matches(DataType::BigInt));
        assert!(Value::Int(1).matches(DataType::Float));
        assert!(Value::Int(1).matches(DataType::Double));
        assert!(Value::BigInt(1).matches(DataType::Double));
        assert!(Value::BigInt(1).matches(DataType::Timestamp));
        // No narrowing
        assert!(!Value::Double(1.0).matches(DataType::Float));
        assert!(!Value::BigInt(1).matches(DataType::Float));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Int(7).as_i64(), Some(7));
        assert_eq!(Value::BigInt(7).as_f64(), Some(7.0));
        assert_eq!(Value::Varchar("x".into()).as_str(), Some("x"));
        assert!(Value::Null.is_null());
        assert!(Value::Null.data_type().is_none());
    }

    #[test]
    fn test_from_impls() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(42i32), Value::Int(42));
        assert_eq!(Value::from(42i64), Value::BigInt(42));
        assert_eq!(Value::from("hi"), Value::Varchar("hi".into()));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(1i32)), Value::Int(1));
    }
}
