//! Record types described at runtime instead of declared in Rust.
//!
//! A [`RecordSchema`] lists fields with their JSON key, registry type name and
//! whether they are required. Registering it produces an entry whose host
//! value is a [`Record`]: a bag of boxed field values keyed by name.

use core::any::{Any, type_name};

use indexmap::IndexMap;
use knit_value::{NULL, Object, Value};

use crate::Registry;
use crate::codec::Codec;
use crate::error::{MarshalError, MarshalErrorKind, Result};
use crate::trace;

/// One field of a [`RecordSchema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// JSON key and [`Record`] slot name
    pub name: String,
    /// Registry name of the field's type
    pub type_name: String,
    /// Whether `null` or absence is an error
    pub required: bool,
}

/// Field layout of a runtime record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    names: Vec<String>,
    fields: Vec<FieldSpec>,
}

impl RecordSchema {
    /// Starts a schema registered under `names` (one or two).
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        RecordSchema {
            names: names.into_iter().map(Into::into).collect(),
            fields: Vec::new(),
        }
    }

    /// Appends a required field.
    pub fn required(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            type_name: type_name.into(),
            required: true,
        });
        self
    }

    /// Appends an optional field.
    pub fn optional(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            type_name: type_name.into(),
            required: false,
        });
        self
    }

    /// Registry names of this record type.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }
}

/// Host value of a schema-registered type.
#[derive(Debug, Default)]
pub struct Record {
    slots: IndexMap<String, Box<dyn Any>>,
}

impl Record {
    /// An empty record: every field absent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a field value, replacing any previous one.
    pub fn set<T: Any>(&mut self, name: impl Into<String>, value: T) -> &mut Self {
        self.slots.insert(name.into(), Box::new(value));
        self
    }

    /// Stores an already boxed value, or clears the slot for `None`.
    pub fn set_boxed(&mut self, name: impl Into<String>, value: Option<Box<dyn Any>>) {
        let name = name.into();
        match value {
            Some(value) => {
                self.slots.insert(name, value);
            }
            None => {
                self.slots.shift_remove(&name);
            }
        }
    }

    /// Borrows a field if present and of type `T`.
    pub fn get<T: Any>(&self, name: &str) -> Option<&T> {
        self.slots.get(name)?.downcast_ref()
    }

    /// Mutable variant of [`Record::get`].
    pub fn get_mut<T: Any>(&mut self, name: &str) -> Option<&mut T> {
        self.slots.get_mut(name)?.downcast_mut()
    }

    /// Borrows a field as `dyn Any`.
    pub fn get_any(&self, name: &str) -> Option<&dyn Any> {
        self.slots.get(name).map(|b| b.as_ref())
    }

    /// Removes a field and hands it back.
    pub fn take(&mut self, name: &str) -> Option<Box<dyn Any>> {
        self.slots.shift_remove(name)
    }

    /// Returns `true` if the field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Number of present fields.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no field is present.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

pub(crate) struct RecordCodec {
    schema: RecordSchema,
}

impl RecordCodec {
    pub(crate) fn new(schema: RecordSchema) -> Self {
        RecordCodec { schema }
    }

    fn name(&self) -> String {
        self.schema.names.first().cloned().unwrap_or_default()
    }

    fn host_mismatch(&self) -> MarshalError {
        MarshalError::new(MarshalErrorKind::HostTypeMismatch {
            type_name: self.name(),
            expected: type_name::<Record>(),
        })
    }
}

fn required_null(field: &FieldSpec) -> MarshalError {
    MarshalError::new(MarshalErrorKind::RequiredFieldNull {
        type_name: field.type_name.clone(),
    })
    .in_field(&field.name)
}

impl Codec for RecordCodec {
    fn marshal(&self, registry: &Registry, value: &dyn Any) -> Result<Value> {
        let record = value
            .downcast_ref::<Record>()
            .ok_or_else(|| self.host_mismatch())?;
        let mut out = Object::new();
        out.try_reserve(self.schema.fields.len())
            .map_err(|_| MarshalError::new(MarshalErrorKind::AllocationFailure))?;
        for field in &self.schema.fields {
            let slot = record.get_any(&field.name);
            if field.required && slot.is_none() {
                return Err(required_null(field));
            }
            let json = registry
                .marshal_value(&field.type_name, slot)
                .map_err(|e| e.in_field(&field.name))?;
            out.push(field.name.as_str(), json);
        }
        Ok(Value::Object(out))
    }

    fn unmarshal(&self, registry: &Registry, value: &Value) -> Result<Box<dyn Any>> {
        let Value::Object(object) = value else {
            return Err(MarshalError::new(MarshalErrorKind::TypeMismatch {
                type_name: self.name(),
                expected: "an object",
                got: value.value_type().as_str(),
            }));
        };
        let mut record = Record::new();
        for field in &self.schema.fields {
            let json = object.get(&field.name).unwrap_or(&NULL);
            let slot = registry
                .unmarshal_value(&field.type_name, json)
                .map_err(|e| e.in_field(&field.name))?;
            if field.required && slot.is_none() {
                return Err(required_null(field));
            }
            record.set_boxed(field.name.as_str(), slot);
        }
        Ok(Box::new(record))
    }

    fn destroy(&self, registry: &Registry, value: Box<dyn Any>) -> Result<()> {
        let mut record = value
            .downcast::<Record>()
            .map_err(|_| self.host_mismatch())?;
        for field in &self.schema.fields {
            if let Some(slot) = record.take(&field.name) {
                trace!(field = %field.name, "destroy record field");
                registry
                    .destroy(&field.type_name, slot)
                    .map_err(|e| e.in_field(&field.name))?;
            }
        }
        Ok(())
    }
}
