//! Statically typed aggregates.

use core::any::{Any, type_name};
use core::marker::PhantomData;

use knit_value::{Object, Value};

use crate::Registry;
use crate::codec::Codec;
use crate::error::{MarshalError, MarshalErrorKind, Result};

/// A Rust struct that marshals as a JSON object.
///
/// Usually implemented with [`aggregate!`](crate::aggregate), which emits one
/// field helper call per declared field. Hand-written impls use the helpers in
/// [`crate::field`] the same way.
pub trait Marshal: Any + Sized {
    /// One or two registry names; the first is used by typed entry points.
    const NAMES: &'static [&'static str];

    /// Writes every field, in declaration order, into `out`.
    fn marshal_fields(&self, registry: &Registry, out: &mut Object) -> Result<()>;

    /// Reads every field from `object`.
    fn unmarshal_fields(registry: &Registry, object: &Object) -> Result<Self>;

    /// Releases optional parts through the registry.
    fn destroy_fields(self, registry: &Registry) -> Result<()> {
        let _ = registry;
        Ok(())
    }
}

/// The name typed entry points use for `T`.
pub fn primary_name<T: Marshal>() -> Result<&'static str> {
    T::NAMES.first().copied().ok_or_else(|| {
        MarshalError::new(MarshalErrorKind::InvalidAliases {
            count: T::NAMES.len(),
        })
    })
}

/// Adapts a [`Marshal`] type to the registry's dynamic [`Codec`] interface.
pub struct TypedCodec<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Marshal> TypedCodec<T> {
    pub(crate) const fn new(name: &'static str) -> Self {
        TypedCodec {
            name,
            _marker: PhantomData,
        }
    }

    fn host_mismatch(&self) -> MarshalError {
        MarshalError::new(MarshalErrorKind::HostTypeMismatch {
            type_name: self.name.to_owned(),
            expected: type_name::<T>(),
        })
    }
}

impl<T: Marshal> Codec for TypedCodec<T> {
    fn marshal(&self, registry: &Registry, value: &dyn Any) -> Result<Value> {
        let value = value
            .downcast_ref::<T>()
            .ok_or_else(|| self.host_mismatch())?;
        let mut out = Object::new();
        value.marshal_fields(registry, &mut out)?;
        Ok(Value::Object(out))
    }

    fn unmarshal(&self, registry: &Registry, value: &Value) -> Result<Box<dyn Any>> {
        let Value::Object(object) = value else {
            return Err(MarshalError::new(MarshalErrorKind::TypeMismatch {
                type_name: self.name.to_owned(),
                expected: "an object",
                got: value.value_type().as_str(),
            }));
        };
        Ok(Box::new(T::unmarshal_fields(registry, object)?))
    }

    fn destroy(&self, registry: &Registry, value: Box<dyn Any>) -> Result<()> {
        let value = value.downcast::<T>().map_err(|_| self.host_mismatch())?;
        value.destroy_fields(registry)
    }
}
