//! Name-keyed registry and the dispatch entry points.

use core::any::Any;
use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use knit_value::Value;

use crate::builtin::{BUILTIN_NAMES, Builtin};
use crate::codec::{Codec, DestroyFn, FnCodec, MarshalFn, UnmarshalFn};
use crate::error::{MarshalError, MarshalErrorKind, PathSegment, Result};
use crate::marshal::{Marshal, TypedCodec, primary_name};
use crate::schema::{RecordCodec, RecordSchema};
use crate::{debug, trace};

const SIMILARITY_THRESHOLD: f64 = 0.8;

/// What a type name resolved to.
#[derive(Clone, Copy)]
pub enum Resolved<'r> {
    /// A builtin scalar
    Builtin(Builtin),
    /// A registered entry
    Codec(&'r dyn Codec),
}

/// Table of every type that can be marshalled by name.
///
/// Builtins are always present. Aggregates are added with one of the
/// `register*` methods, each under one or two names that must not collide
/// with anything already known. Registration needs `&mut self`; dispatch only
/// needs `&self`, so a finished registry can be shared across threads.
#[derive(Default)]
pub struct Registry {
    entries: IndexMap<String, Arc<dyn Codec>>,
}

impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Registry {
    /// Creates a registry holding only the builtins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a codec under one or two names.
    pub fn register_codec<C: Codec + 'static>(&mut self, names: &[&str], codec: C) -> Result<()> {
        if names.is_empty() || names.len() > 2 {
            return Err(MarshalError::new(MarshalErrorKind::InvalidAliases {
                count: names.len(),
            }));
        }
        for (i, name) in names.iter().enumerate() {
            if self.is_known(name) || names[..i].contains(name) {
                return Err(MarshalError::new(
                    MarshalErrorKind::DuplicateRegistration {
                        name: (*name).to_owned(),
                    },
                ));
            }
        }
        let codec: Arc<dyn Codec> = Arc::new(codec);
        self.entries
            .try_reserve(names.len())
            .map_err(|_| MarshalError::new(MarshalErrorKind::AllocationFailure))?;
        for name in names {
            self.entries.insert((*name).to_owned(), Arc::clone(&codec));
        }
        debug!(?names, "registered type");
        Ok(())
    }

    /// Registers three plain functions under one or two names.
    pub fn register(
        &mut self,
        names: &[&str],
        marshal: MarshalFn,
        unmarshal: UnmarshalFn,
        destroy: DestroyFn,
    ) -> Result<()> {
        self.register_codec(
            names,
            FnCodec {
                marshal,
                unmarshal,
                destroy,
            },
        )
    }

    /// Registers a statically typed aggregate under its declared names.
    pub fn register_type<T: Marshal>(&mut self) -> Result<()> {
        let codec = TypedCodec::<T>::new(primary_name::<T>()?);
        self.register_codec(T::NAMES, codec)
    }

    /// Registers a schema-described record type under the schema's names.
    pub fn register_schema(&mut self, schema: RecordSchema) -> Result<()> {
        let names: Vec<String> = schema.names().to_vec();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        self.register_codec(&names, RecordCodec::new(schema))
    }

    /// Returns `true` if `name` is a builtin or registered name.
    pub fn is_known(&self, name: &str) -> bool {
        Builtin::from_name(name).is_some() || self.entries.contains_key(name)
    }

    /// Every known name: builtins first, then registrations in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        BUILTIN_NAMES
            .iter()
            .map(|(name, _)| *name)
            .chain(self.entries.keys().map(String::as_str))
    }

    /// Looks up a type name.
    pub fn resolve(&self, name: &str) -> Result<Resolved<'_>> {
        if let Some(builtin) = Builtin::from_name(name) {
            return Ok(Resolved::Builtin(builtin));
        }
        match self.entries.get(name) {
            Some(codec) => Ok(Resolved::Codec(codec.as_ref())),
            None => Err(MarshalError::new(MarshalErrorKind::UnknownType {
                name: name.to_owned(),
                suggestion: self.suggest(name),
            })),
        }
    }

    fn suggest(&self, unknown: &str) -> Option<String> {
        let mut best: Option<(f64, &str)> = None;
        for known in self.names() {
            let similarity = strsim::jaro_winkler(unknown, known);
            if similarity >= SIMILARITY_THRESHOLD && best.is_none_or(|(s, _)| similarity > s) {
                best = Some((similarity, known));
            }
        }
        best.map(|(_, name)| name.to_owned())
    }

    /// Converts a host value to JSON by type name. `None` is always `null`.
    pub fn marshal_value(&self, name: &str, value: Option<&dyn Any>) -> Result<Value> {
        let Some(value) = value else {
            return Ok(Value::Null);
        };
        trace!(name, "marshal");
        match self.resolve(name)? {
            Resolved::Builtin(builtin) => builtin.marshal(value),
            Resolved::Codec(codec) => codec.marshal(self, value),
        }
    }

    /// Builds a host value from JSON by type name. `null` always gives `None`.
    pub fn unmarshal_value(&self, name: &str, value: &Value) -> Result<Option<Box<dyn Any>>> {
        if value.is_null() {
            return Ok(None);
        }
        trace!(name, "unmarshal");
        let boxed = match self.resolve(name)? {
            Resolved::Builtin(builtin) => builtin.unmarshal(value)?,
            Resolved::Codec(codec) => codec.unmarshal(self, value)?,
        };
        Ok(Some(boxed))
    }

    /// Releases a value produced by unmarshalling under `name`.
    pub fn destroy(&self, name: &str, value: Box<dyn Any>) -> Result<()> {
        trace!(name, "destroy");
        match self.resolve(name)? {
            Resolved::Builtin(_) => {
                drop(value);
                Ok(())
            }
            Resolved::Codec(codec) => codec.destroy(self, value),
        }
    }

    /// Marshals a host value to JSON text.
    pub fn marshal(&self, name: &str, value: &dyn Any) -> Result<String> {
        let json = self.marshal_value(name, Some(value))?;
        Ok(knit_json::to_string(&json))
    }

    /// Parses JSON text and unmarshals it. JSON `null` gives `Ok(None)`.
    pub fn unmarshal(&self, name: &str, json: &str) -> Result<Option<Box<dyn Any>>> {
        let value = knit_json::from_str(json)?;
        self.unmarshal_value(name, &value)
    }

    /// Marshals a sequence of possibly-absent host values to a JSON array.
    pub fn marshal_array(&self, name: &str, items: &[Option<&dyn Any>]) -> Result<String> {
        let mut out = Vec::new();
        out.try_reserve(items.len())
            .map_err(|_| MarshalError::new(MarshalErrorKind::AllocationFailure))?;
        for (i, item) in items.iter().enumerate() {
            let value = self
                .marshal_value(name, *item)
                .map_err(|e| e.with_path(PathSegment::Index(i)))?;
            out.push(value);
        }
        Ok(knit_json::to_string(&Value::Array(out)))
    }

    /// Parses a one-level JSON array and unmarshals each element.
    ///
    /// `null` elements become `None`; a top-level `null` gives an empty vec.
    pub fn unmarshal_array(&self, name: &str, json: &str) -> Result<Vec<Option<Box<dyn Any>>>> {
        let items = match knit_json::from_str(json)? {
            Value::Null => return Ok(Vec::new()),
            Value::Array(items) => items,
            other => {
                return Err(MarshalError::new(MarshalErrorKind::TypeMismatch {
                    type_name: name.to_owned(),
                    expected: "an array",
                    got: other.value_type().as_str(),
                }));
            }
        };
        let mut out = Vec::new();
        out.try_reserve(items.len())
            .map_err(|_| MarshalError::new(MarshalErrorKind::AllocationFailure))?;
        for (i, item) in items.iter().enumerate() {
            let value = self
                .unmarshal_value(name, item)
                .map_err(|e| e.with_path(PathSegment::Index(i)))?;
            out.push(value);
        }
        Ok(out)
    }

    /// Releases every present element of an unmarshalled array.
    pub fn destroy_array(&self, name: &str, items: Vec<Option<Box<dyn Any>>>) -> Result<()> {
        for (i, item) in items.into_iter().enumerate() {
            if let Some(value) = item {
                self.destroy(name, value)
                    .map_err(|e| e.with_path(PathSegment::Index(i)))?;
            }
        }
        Ok(())
    }

    /// Marshals a typed aggregate under its primary name.
    pub fn to_string<T: Marshal>(&self, value: &T) -> Result<String> {
        self.marshal(primary_name::<T>()?, value)
    }

    /// Parses JSON text into a typed aggregate. JSON `null` gives `Ok(None)`.
    pub fn from_str<T: Marshal>(&self, json: &str) -> Result<Option<T>> {
        let name = primary_name::<T>()?;
        match self.unmarshal(name, json)? {
            None => Ok(None),
            Some(boxed) => boxed.downcast::<T>().map(|b| Some(*b)).map_err(|_| {
                MarshalError::new(MarshalErrorKind::HostTypeMismatch {
                    type_name: name.to_owned(),
                    expected: core::any::type_name::<T>(),
                })
            }),
        }
    }
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Installs the process-wide registry used by the crate-level functions.
///
/// Succeeds once. Fails with [`MarshalErrorKind::RegistryInstalled`] if a
/// registry was already installed, or if [`global`] was called first.
pub fn install_global(registry: Registry) -> Result<&'static Registry> {
    GLOBAL
        .set(registry)
        .map_err(|_| MarshalError::new(MarshalErrorKind::RegistryInstalled))?;
    debug!("installed global registry");
    Ok(global())
}

/// The process-wide registry. Holds only the builtins if nothing was installed.
pub fn global() -> &'static Registry {
    GLOBAL.get_or_init(Registry::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marshal_pair(_: &Registry, value: &dyn Any) -> Result<Value> {
        let (a, b) = value.downcast_ref::<(i64, i64)>().copied().unwrap_or_default();
        Ok(Value::array([Value::from(a), Value::from(b)]))
    }

    fn unmarshal_pair(_: &Registry, value: &Value) -> Result<Box<dyn Any>> {
        let a = value.at(0).and_then(Value::as_i64).unwrap_or_default();
        let b = value.at(1).and_then(Value::as_i64).unwrap_or_default();
        Ok(Box::new((a, b)))
    }

    fn destroy_pair(_: &Registry, value: Box<dyn Any>) -> Result<()> {
        drop(value);
        Ok(())
    }

    fn with_pair() -> Registry {
        let mut registry = Registry::new();
        registry
            .register(&["pair", "tuple"], marshal_pair, unmarshal_pair, destroy_pair)
            .unwrap();
        registry
    }

    #[test]
    fn raw_functions_are_dispatched_by_either_alias() {
        let registry = with_pair();
        assert_eq!(registry.marshal("pair", &(1i64, 2i64)).unwrap(), "[1,2]");
        let back = registry.unmarshal("tuple", "[3,4]").unwrap().unwrap();
        assert_eq!(back.downcast_ref::<(i64, i64)>(), Some(&(3, 4)));
    }

    #[test]
    fn names_must_be_unique() {
        let mut registry = with_pair();
        let err = registry
            .register(&["other", "pair"], marshal_pair, unmarshal_pair, destroy_pair)
            .unwrap_err();
        assert!(matches!(err.kind, MarshalErrorKind::DuplicateRegistration { ref name } if name == "pair"));
        // nothing from the failed call was kept
        assert!(!registry.is_known("other"));

        let err = registry
            .register(&["int"], marshal_pair, unmarshal_pair, destroy_pair)
            .unwrap_err();
        assert!(matches!(err.kind, MarshalErrorKind::DuplicateRegistration { .. }));
    }

    #[test]
    fn alias_count_is_checked() {
        let mut registry = Registry::new();
        for names in [&[][..], &["a", "b", "c"][..]] {
            let err = registry
                .register(names, marshal_pair, unmarshal_pair, destroy_pair)
                .unwrap_err();
            assert!(matches!(err.kind, MarshalErrorKind::InvalidAliases { .. }));
        }
    }

    #[test]
    fn unknown_names_get_suggestions() {
        let registry = with_pair();
        let err = registry.marshal("pairs", &(1i64, 2i64)).unwrap_err();
        match err.kind {
            MarshalErrorKind::UnknownType { name, suggestion } => {
                assert_eq!(name, "pairs");
                assert_eq!(suggestion.as_deref(), Some("pair"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn null_short_circuits_dispatch() {
        let registry = Registry::new();
        assert_eq!(registry.marshal_value("no such type", None).unwrap(), Value::Null);
        assert!(registry.unmarshal("no such type", "null").unwrap().is_none());
    }
}
