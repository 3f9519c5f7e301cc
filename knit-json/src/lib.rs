//! Strict JSON text handling for [`knit_value::Value`] trees.
//!
//! - [`from_str`] parses a document, rejecting trailing commas, comments,
//!   `\u` escapes and raw control characters that have a short escape.
//! - [`to_string`] writes compact JSON after measuring the exact output size
//!   with [`encoded_len`].
//! - [`query`] selects a sub-value with a dotted path such as `.users.[0]."e-mail"`.

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

mod error;
mod parser;
mod query;
mod serializer;

pub use error::{ParseError, ParseErrorKind, QueryError, QueryErrorKind};
pub use parser::{
    DEFAULT_MAX_DEPTH, ParseOptions, UnknownEscape, from_slice, from_slice_with_options, from_str,
    from_str_with_options,
};
pub use query::{QueryPath, Segment, array_get, object_get, query};
pub use serializer::{encoded_len, to_string, to_vec, to_writer_std};

pub use knit_value::{Object, Value, ValueType};
