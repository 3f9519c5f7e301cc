#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

pub use knit_json as json;
pub use knit_marshal as marshal;
pub use knit_value as value;

pub use knit_json::{ParseError, ParseOptions, QueryError, from_str, query, to_string};
pub use knit_marshal::{Marshal, MarshalError, Record, RecordSchema, Registry, aggregate};
pub use knit_value::{Object, Value, ValueType, value};
