//! The `Value` tree and its scalar accessors.
//!
//! A `Value` exclusively owns all of its descendants. There is no sharing
//! between trees: `Clone` is a deep copy and dropping a value releases the
//! whole subtree exactly once.

use core::fmt;
use core::mem;

use crate::object::Object;

/// Enum distinguishing the value types.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueType {
    /// Null value
    Null,
    /// Boolean value
    Bool,
    /// 64-bit signed integer
    Integer,
    /// Double precision floating point number
    Real,
    /// String (UTF-8)
    String,
    /// Array
    Array,
    /// Object (ordered key-value pairs)
    Object,
}

impl ValueType {
    /// Lowercase name used in diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            ValueType::Null => "null",
            ValueType::Bool => "bool",
            ValueType::Integer => "integer",
            ValueType::Real => "real",
            ValueType::String => "string",
            ValueType::Array => "array",
            ValueType::Object => "object",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One JSON datum and everything below it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// `null`
    #[default]
    Null,
    /// `true` or `false`
    Bool(bool),
    /// A number written without fraction or exponent
    Integer(i64),
    /// A number written with a fraction or exponent
    Real(f64),
    /// A string
    String(String),
    /// An ordered sequence of values
    Array(Vec<Value>),
    /// An ordered sequence of key-value pairs
    Object(Object),
}

/// A shared `null`, handy as the fallback for lookups that found nothing.
pub static NULL: Value = Value::Null;

impl Value {
    /// Builds a `null`.
    pub const fn null() -> Self {
        Value::Null
    }

    /// Builds a boolean.
    pub const fn bool(b: bool) -> Self {
        Value::Bool(b)
    }

    /// Builds an integer.
    pub const fn integer(i: i64) -> Self {
        Value::Integer(i)
    }

    /// Builds a real number.
    pub const fn real(r: f64) -> Self {
        Value::Real(r)
    }

    /// Builds a string, copying the given text.
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Returns the type of this value.
    pub const fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Bool,
            Value::Integer(_) => ValueType::Integer,
            Value::Real(_) => ValueType::Real,
            Value::String(_) => ValueType::String,
            Value::Array(_) => ValueType::Array,
            Value::Object(_) => ValueType::Object,
        }
    }

    /// Returns `true` if this is `null`.
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` if this is a boolean.
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Returns `true` if this is an integer or a real.
    pub const fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Real(_))
    }

    /// Returns `true` if this is a string.
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Returns `true` if this is an array.
    pub const fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Returns `true` if this is an object.
    pub const fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Gets the boolean, if this is one.
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Gets the integer, if this is one.
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Gets the real, if this is one. Integers are not widened; see [`Value::as_number`].
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// Gets any number as an `f64`, widening integers.
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// Gets the string contents, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Gets the elements, if this is an array.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Gets the elements mutably, if this is an array.
    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Gets the object, if this is one.
    pub const fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Gets the object mutably, if this is one.
    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Looks up `key` if this is an object (first match in insertion order).
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|object| object.get(key))
    }

    /// Looks up element `index` if this is an array.
    pub fn at(&self, index: usize) -> Option<&Value> {
        self.as_array().and_then(|items| items.get(index))
    }

    /// Moves the value out, leaving `null` behind.
    pub fn take(&mut self) -> Value {
        mem::take(self)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(i: $ty) -> Self {
                    Value::Integer(i64::from(i))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(r: f32) -> Self {
        Value::Real(f64::from(r))
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Value::Real(r)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn types_and_accessors_agree() {
        assert_eq!(Value::null().value_type(), ValueType::Null);
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from(1337).as_i64(), Some(1337));
        assert_eq!(Value::from(1337).as_f64(), None);
        assert_eq!(Value::from(1337).as_number(), Some(1337.0));
        assert_eq!(Value::from(2.5).as_f64(), Some(2.5));
        assert_eq!(Value::from("hi").as_str(), Some("hi"));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(3u8)), Value::Integer(3));
    }

    #[test]
    fn take_leaves_null() {
        let mut v = Value::from("owned");
        let taken = v.take();
        assert!(v.is_null());
        assert_eq!(taken.as_str(), Some("owned"));
    }

    #[test]
    fn value_type_display() {
        assert_eq!(ValueType::Real.to_string(), "real");
        assert_eq!(ValueType::Object.to_string(), "object");
    }
}
