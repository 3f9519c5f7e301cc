#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

/// Trace-level logging macro that forwards to `tracing::trace!` when the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {
        ::tracing::trace!($($arg)*)
    };
}

/// Trace-level logging macro (no-op when `tracing` feature is disabled).
#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

/// Debug-level logging macro that forwards to `tracing::debug!` when the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {
        ::tracing::debug!($($arg)*)
    };
}

/// Debug-level logging macro (no-op when `tracing` feature is disabled).
#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

#[allow(unused_imports)]
pub(crate) use debug;
#[allow(unused_imports)]
pub(crate) use trace;

mod builtin;
mod codec;
mod error;
pub mod field;
mod macros;
mod marshal;
mod registry;
mod schema;

use core::any::Any;

pub use builtin::{BUILTIN_NAMES, Builtin};
pub use codec::{Codec, DestroyFn, FnCodec, MarshalFn, UnmarshalFn};
pub use error::{MarshalError, MarshalErrorKind, PathSegment, Result};
pub use knit_json::ParseError;
pub use knit_value::{Object, Value};
pub use marshal::{Marshal, TypedCodec, primary_name};
pub use registry::{Registry, Resolved, global, install_global};
pub use schema::{FieldSpec, Record, RecordSchema};

/// [`Registry::marshal`] on the [`global`] registry.
pub fn marshal(name: &str, value: &dyn Any) -> Result<String> {
    global().marshal(name, value)
}

/// [`Registry::unmarshal`] on the [`global`] registry.
pub fn unmarshal(name: &str, json: &str) -> Result<Option<Box<dyn Any>>> {
    global().unmarshal(name, json)
}

/// [`Registry::destroy`] on the [`global`] registry.
pub fn destroy(name: &str, value: Box<dyn Any>) -> Result<()> {
    global().destroy(name, value)
}

/// [`Registry::marshal_array`] on the [`global`] registry.
pub fn marshal_array(name: &str, items: &[Option<&dyn Any>]) -> Result<String> {
    global().marshal_array(name, items)
}

/// [`Registry::unmarshal_array`] on the [`global`] registry.
pub fn unmarshal_array(name: &str, json: &str) -> Result<Vec<Option<Box<dyn Any>>>> {
    global().unmarshal_array(name, json)
}

/// [`Registry::destroy_array`] on the [`global`] registry.
pub fn destroy_array(name: &str, items: Vec<Option<Box<dyn Any>>>) -> Result<()> {
    global().destroy_array(name, items)
}

/// [`Registry::to_string`] on the [`global`] registry.
pub fn to_string<T: Marshal>(value: &T) -> Result<String> {
    global().to_string(value)
}

/// [`Registry::from_str`] on the [`global`] registry.
pub fn from_str<T: Marshal>(json: &str) -> Result<Option<T>> {
    global().from_str(json)
}
