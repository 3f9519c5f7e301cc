//! Scalar kinds every registry understands without registration.

use core::any::{Any, type_name};

use knit_value::Value;

use crate::error::{MarshalError, MarshalErrorKind, Result};

/// A builtin scalar type.
///
/// Each kind has a fixed host type: the value handed to marshal must be that
/// type, and unmarshal produces a boxed value of that type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// `char` / `i8`, host type `i8`
    Char,
    /// `short` / `i16`, host type `i16`
    Short,
    /// `int` / `i32`, host type `i32`
    Int,
    /// `long` / `i64`, host type `i64`
    Long,
    /// `long long`, host type `i64`
    LongLong,
    /// `float` / `f32`, host type `f32`
    Float,
    /// `double` / `f64`, host type `f64`
    Double,
    /// `string` / `String`, host type `String`
    String,
    /// `bool`, host type `bool`
    Bool,
}

/// Every builtin name, in lookup order.
pub const BUILTIN_NAMES: &[(&str, Builtin)] = &[
    ("char", Builtin::Char),
    ("i8", Builtin::Char),
    ("short", Builtin::Short),
    ("i16", Builtin::Short),
    ("int", Builtin::Int),
    ("i32", Builtin::Int),
    ("long", Builtin::Long),
    ("i64", Builtin::Long),
    ("long long", Builtin::LongLong),
    ("float", Builtin::Float),
    ("f32", Builtin::Float),
    ("double", Builtin::Double),
    ("f64", Builtin::Double),
    ("string", Builtin::String),
    ("String", Builtin::String),
    ("bool", Builtin::Bool),
];

impl Builtin {
    /// Looks up a builtin by any of its names.
    pub fn from_name(name: &str) -> Option<Builtin> {
        BUILTIN_NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, b)| *b)
    }

    /// The primary name of this kind.
    pub const fn name(self) -> &'static str {
        match self {
            Builtin::Char => "char",
            Builtin::Short => "short",
            Builtin::Int => "int",
            Builtin::Long => "long",
            Builtin::LongLong => "long long",
            Builtin::Float => "float",
            Builtin::Double => "double",
            Builtin::String => "string",
            Builtin::Bool => "bool",
        }
    }

    /// Name of the Rust type values of this kind are stored as.
    pub fn host_type(self) -> &'static str {
        match self {
            Builtin::Char => type_name::<i8>(),
            Builtin::Short => type_name::<i16>(),
            Builtin::Int => type_name::<i32>(),
            Builtin::Long | Builtin::LongLong => type_name::<i64>(),
            Builtin::Float => type_name::<f32>(),
            Builtin::Double => type_name::<f64>(),
            Builtin::String => type_name::<String>(),
            Builtin::Bool => type_name::<bool>(),
        }
    }

    fn host_mismatch(self) -> MarshalError {
        MarshalError::new(MarshalErrorKind::HostTypeMismatch {
            type_name: self.name().to_owned(),
            expected: self.host_type(),
        })
    }

    fn shape_mismatch(self, expected: &'static str, got: &Value) -> MarshalError {
        MarshalError::new(MarshalErrorKind::TypeMismatch {
            type_name: self.name().to_owned(),
            expected,
            got: got.value_type().as_str(),
        })
    }

    fn out_of_range(self, value: impl ToString) -> MarshalError {
        MarshalError::new(MarshalErrorKind::NumberOutOfRange {
            type_name: self.name().to_owned(),
            value: value.to_string(),
        })
    }

    fn downcast<T: Any>(self, value: &dyn Any) -> Result<&T> {
        value.downcast_ref::<T>().ok_or_else(|| self.host_mismatch())
    }

    /// Converts a host value of this kind to JSON.
    pub fn marshal(self, value: &dyn Any) -> Result<Value> {
        Ok(match self {
            Builtin::Char => Value::from(*self.downcast::<i8>(value)?),
            Builtin::Short => Value::from(*self.downcast::<i16>(value)?),
            Builtin::Int => Value::from(*self.downcast::<i32>(value)?),
            Builtin::Long | Builtin::LongLong => Value::from(*self.downcast::<i64>(value)?),
            Builtin::Float => {
                let x = *self.downcast::<f32>(value)?;
                // widen through the shortest decimal so 3.162277f32 stays 3.162277
                Value::Real(x.to_string().parse::<f64>().unwrap_or(f64::from(x)))
            }
            Builtin::Double => Value::Real(*self.downcast::<f64>(value)?),
            Builtin::String => Value::String(self.downcast::<String>(value)?.clone()),
            Builtin::Bool => Value::Bool(*self.downcast::<bool>(value)?),
        })
    }

    /// Converts JSON to a boxed host value of this kind.
    ///
    /// Integer kinds take JSON integers in range; float kinds take integers or
    /// reals. The caller handles `null`.
    pub fn unmarshal(self, value: &Value) -> Result<Box<dyn Any>> {
        let boxed: Box<dyn Any> = match self {
            Builtin::Char => Box::new(self.integer::<i8>(value)?),
            Builtin::Short => Box::new(self.integer::<i16>(value)?),
            Builtin::Int => Box::new(self.integer::<i32>(value)?),
            Builtin::Long | Builtin::LongLong => Box::new(self.integer::<i64>(value)?),
            Builtin::Float => {
                let wide = self.real(value)?;
                let narrow = wide as f32;
                if narrow.is_infinite() {
                    return Err(self.out_of_range(wide));
                }
                Box::new(narrow)
            }
            Builtin::Double => Box::new(self.real(value)?),
            Builtin::String => match value {
                Value::String(s) => Box::new(s.clone()),
                other => return Err(self.shape_mismatch("a string", other)),
            },
            Builtin::Bool => match value {
                Value::Bool(b) => Box::new(*b),
                other => return Err(self.shape_mismatch("a bool", other)),
            },
        };
        Ok(boxed)
    }

    fn integer<T: TryFrom<i64>>(self, value: &Value) -> Result<T> {
        match value {
            Value::Integer(i) => T::try_from(*i).map_err(|_| self.out_of_range(i)),
            other => Err(self.shape_mismatch("an integer", other)),
        }
    }

    fn real(self, value: &Value) -> Result<f64> {
        value
            .as_number()
            .ok_or_else(|| self.shape_mismatch("a number", value))
    }
}
