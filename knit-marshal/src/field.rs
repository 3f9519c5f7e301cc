//! Per-field helpers used by [`Marshal`](crate::Marshal) implementations.
//!
//! A required field is stored inline as `T`; JSON `null` or a missing key is
//! an error when reading it. An optional field is an `Option<Box<T>>`, which
//! marshals `None` as `null` and reads `null` or a missing key as `None`.
//! Every error raised here carries the field name in its path.

use core::any::{Any, type_name};

use knit_value::{NULL, Object};

use crate::Registry;
use crate::error::{MarshalError, MarshalErrorKind, Result};

fn push(out: &mut Object, key: &str, value: knit_value::Value) -> Result<()> {
    out.try_reserve(1)
        .map_err(|_| MarshalError::new(MarshalErrorKind::AllocationFailure))?;
    out.push(key, value);
    Ok(())
}

fn downcast<T: Any>(name: &str, value: Box<dyn Any>) -> Result<T> {
    value.downcast::<T>().map(|b| *b).map_err(|_| {
        MarshalError::new(MarshalErrorKind::HostTypeMismatch {
            type_name: name.to_owned(),
            expected: type_name::<T>(),
        })
    })
}

/// Marshals an inline field.
pub fn marshal_required<T: Any>(
    registry: &Registry,
    out: &mut Object,
    key: &str,
    type_name: &str,
    value: &T,
) -> Result<()> {
    let json = registry
        .marshal_value(type_name, Some(value as &dyn Any))
        .map_err(|e| e.in_field(key))?;
    push(out, key, json)
}

/// Marshals an optional field; `None` becomes `null`.
pub fn marshal_optional<T: Any>(
    registry: &Registry,
    out: &mut Object,
    key: &str,
    type_name: &str,
    value: Option<&T>,
) -> Result<()> {
    let json = registry
        .marshal_value(type_name, value.map(|v| v as &dyn Any))
        .map_err(|e| e.in_field(key))?;
    push(out, key, json)
}

/// Reads an inline field. `null` and a missing key are both errors.
pub fn unmarshal_required<T: Any>(
    registry: &Registry,
    object: &Object,
    key: &str,
    type_name: &str,
) -> Result<T> {
    let json = object.get(key).unwrap_or(&NULL);
    let read = || -> Result<T> {
        match registry.unmarshal_value(type_name, json)? {
            Some(value) => downcast::<T>(type_name, value),
            None => Err(MarshalError::new(MarshalErrorKind::RequiredFieldNull {
                type_name: type_name.to_owned(),
            })),
        }
    };
    read().map_err(|e| e.in_field(key))
}

/// Reads an optional field. `null` and a missing key give `None`.
pub fn unmarshal_optional<T: Any>(
    registry: &Registry,
    object: &Object,
    key: &str,
    type_name: &str,
) -> Result<Option<Box<T>>> {
    let json = object.get(key).unwrap_or(&NULL);
    let read = || -> Result<Option<Box<T>>> {
        match registry.unmarshal_value(type_name, json)? {
            Some(value) => downcast::<T>(type_name, value).map(|v| Some(Box::new(v))),
            None => Ok(None),
        }
    };
    read().map_err(|e| e.in_field(key))
}

/// Releases an inline field through the registry.
pub fn destroy_required<T: Any>(
    registry: &Registry,
    key: &str,
    type_name: &str,
    value: T,
) -> Result<()> {
    registry
        .destroy(type_name, Box::new(value))
        .map_err(|e| e.in_field(key))
}

/// Releases an optional field if present.
pub fn destroy_optional<T: Any>(
    registry: &Registry,
    key: &str,
    type_name: &str,
    value: Option<Box<T>>,
) -> Result<()> {
    match value {
        Some(value) => registry
            .destroy(type_name, value)
            .map_err(|e| e.in_field(key)),
        None => Ok(()),
    }
}
