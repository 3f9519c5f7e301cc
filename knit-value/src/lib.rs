#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

#[macro_use]
mod macros;

mod value;
pub use value::*;

mod object;
pub use object::{Iter, Object};

mod builder;
pub use builder::BuildError;

mod format;
pub use format::{format_tree, write_tree};
