//! Array and object builders with explicit ownership.
//!
//! The moving builders take their children by value. The copying builders
//! take references and clone, leaving the caller's values untouched.
//!
//! The `try_*` variants accept possibly-missing children. A moving builder
//! always consumes every child it was handed, so children supplied after the
//! first missing one are dropped too. A copying builder stops at the first
//! missing child, since it owns nothing it would need to release.

use core::fmt;

use crate::{Object, Value};

/// Error returned when a builder is handed a missing child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// An array element was missing
    MissingElement {
        /// Position of the first missing element
        index: usize,
    },
    /// An object entry had no key
    MissingKey {
        /// Position of the first entry without a key
        index: usize,
    },
    /// An object entry had no value
    MissingValue {
        /// Position of the first entry without a value
        index: usize,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::MissingElement { index } => write!(f, "array element {index} is missing"),
            BuildError::MissingKey { index } => write!(f, "object entry {index} has no key"),
            BuildError::MissingValue { index } => write!(f, "object entry {index} has no value"),
        }
    }
}

impl core::error::Error for BuildError {}

impl Value {
    /// Builds an array, taking ownership of every element.
    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(items.into_iter().collect())
    }

    /// Builds an array from deep copies of borrowed elements.
    pub fn array_copied<'a>(items: impl IntoIterator<Item = &'a Value>) -> Self {
        Value::Array(items.into_iter().cloned().collect())
    }

    /// Builds an object, taking ownership of every value.
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Object(entries.into_iter().collect())
    }

    /// Builds an object from deep copies of borrowed values.
    pub fn object_copied<'a>(entries: impl IntoIterator<Item = (&'a str, &'a Value)>) -> Self {
        Value::Object(entries.into_iter().map(|(k, v)| (k, v.clone())).collect())
    }

    /// Builds an array from possibly-missing elements, taking ownership.
    ///
    /// Every supplied element is consumed. If any is missing, all of them are
    /// dropped and the index of the first missing one is reported.
    pub fn try_array(items: impl IntoIterator<Item = Option<Value>>) -> Result<Self, BuildError> {
        let mut built = Vec::new();
        let mut first_missing = None;
        for (index, item) in items.into_iter().enumerate() {
            match item {
                Some(value) if first_missing.is_none() => built.push(value),
                Some(_) => {}
                None => {
                    first_missing.get_or_insert(index);
                }
            }
        }
        match first_missing {
            Some(index) => Err(BuildError::MissingElement { index }),
            None => Ok(Value::Array(built)),
        }
    }

    /// Builds an array from possibly-missing borrowed elements.
    ///
    /// Stops at the first missing element without cloning anything further.
    pub fn try_array_copied<'a>(
        items: impl IntoIterator<Item = Option<&'a Value>>,
    ) -> Result<Self, BuildError> {
        let mut built = Vec::new();
        for (index, item) in items.into_iter().enumerate() {
            let value = item.ok_or(BuildError::MissingElement { index })?;
            built.push(value.clone());
        }
        Ok(Value::Array(built))
    }

    /// Builds an object from possibly-incomplete entries, taking ownership.
    ///
    /// Every supplied entry is consumed. If any key or value is missing, all
    /// of them are dropped and the first offending entry is reported.
    pub fn try_object<K: Into<String>>(
        entries: impl IntoIterator<Item = (Option<K>, Option<Value>)>,
    ) -> Result<Self, BuildError> {
        let mut built = Object::new();
        let mut failure = None;
        for (index, entry) in entries.into_iter().enumerate() {
            match entry {
                (Some(key), Some(value)) if failure.is_none() => built.push(key, value),
                (Some(_), Some(_)) => {}
                (None, _) => {
                    failure.get_or_insert(BuildError::MissingKey { index });
                }
                (Some(_), None) => {
                    failure.get_or_insert(BuildError::MissingValue { index });
                }
            }
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(Value::Object(built)),
        }
    }

    /// Builds an object from possibly-incomplete borrowed entries.
    ///
    /// Stops at the first incomplete entry without cloning anything further.
    pub fn try_object_copied<'a>(
        entries: impl IntoIterator<Item = (Option<&'a str>, Option<&'a Value>)>,
    ) -> Result<Self, BuildError> {
        let mut built = Object::new();
        for (index, entry) in entries.into_iter().enumerate() {
            match entry {
                (Some(key), Some(value)) => built.push(key, value.clone()),
                (None, _) => return Err(BuildError::MissingKey { index }),
                (Some(_), None) => return Err(BuildError::MissingValue { index }),
            }
        }
        Ok(Value::Object(built))
    }
}
