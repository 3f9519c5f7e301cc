//! The function table behind every registered entry.

use core::any::Any;

use knit_value::Value;

use crate::Registry;
use crate::error::Result;

/// Converts one host type to and from JSON.
///
/// Implementations receive the registry so they can dispatch nested fields by
/// type name. `unmarshal` is never called with `null`; the registry turns
/// that into an absent value before reaching the codec.
pub trait Codec: Send + Sync {
    /// Converts a host value to JSON.
    fn marshal(&self, registry: &Registry, value: &dyn Any) -> Result<Value>;

    /// Builds a new host value from JSON.
    fn unmarshal(&self, registry: &Registry, value: &Value) -> Result<Box<dyn Any>>;

    /// Releases a value produced by [`Codec::unmarshal`], recursing into its
    /// optional parts. The default just drops it.
    fn destroy(&self, registry: &Registry, value: Box<dyn Any>) -> Result<()> {
        let _ = registry;
        drop(value);
        Ok(())
    }
}

/// Marshal function of a raw registration.
pub type MarshalFn = fn(&Registry, &dyn Any) -> Result<Value>;

/// Unmarshal function of a raw registration.
pub type UnmarshalFn = fn(&Registry, &Value) -> Result<Box<dyn Any>>;

/// Destroy function of a raw registration.
pub type DestroyFn = fn(&Registry, Box<dyn Any>) -> Result<()>;

/// A codec made of three plain functions.
#[derive(Debug, Clone, Copy)]
pub struct FnCodec {
    /// Host value to JSON
    pub marshal: MarshalFn,
    /// JSON to host value
    pub unmarshal: UnmarshalFn,
    /// Release a host value
    pub destroy: DestroyFn,
}

impl Codec for FnCodec {
    fn marshal(&self, registry: &Registry, value: &dyn Any) -> Result<Value> {
        (self.marshal)(registry, value)
    }

    fn unmarshal(&self, registry: &Registry, value: &Value) -> Result<Box<dyn Any>> {
        (self.unmarshal)(registry, value)
    }

    fn destroy(&self, registry: &Registry, value: Box<dyn Any>) -> Result<()> {
        (self.destroy)(registry, value)
    }
}
