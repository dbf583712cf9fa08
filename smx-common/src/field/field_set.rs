//! Ordered, key-unique field storage

use super::{Field, FieldDefinition, FieldType};
use crate::xml::is_valid_tag;
use crate::{Error, Result};
use indexmap::IndexMap;
use std::sync::Arc;

/// Mapping of field key to [`Field`], in insertion order
///
/// Order matters: the legacy reader sees elements in the order they were
/// first inserted. Replacing a key keeps its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    fields: IndexMap<String, Field>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Field> {
        self.fields.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Field> {
        self.fields.get_mut(key)
    }

    /// Value of `key`, if present
    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(|f| f.value.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Insert or replace the field stored under `key`
    ///
    /// The stored field's key is forced to `key`. When the existing field
    /// carries a definition and the new one doesn't, only the value is
    /// replaced so the field keeps its type and classification.
    ///
    /// Fails if the element name the field would be written under is
    /// unusable, so a bad key never reaches a saved document.
    pub fn set(&mut self, key: &str, mut field: Field) -> Result<()> {
        if key.trim().is_empty() {
            return Err(Error::MalformedInput(format!(
                "field key must not be empty (value {:?})",
                field.value
            )));
        }
        field.key = key.to_string();

        let tag = match self.fields.get(key) {
            Some(existing) if existing.definition.is_some() && field.definition.is_none() => {
                existing.tag().to_string()
            }
            _ => field.tag().to_string(),
        };
        if !is_valid_tag(&tag) {
            return Err(Error::MalformedInput(format!(
                "'{}' cannot be used as an element name",
                tag
            )));
        }

        match self.fields.get_mut(key) {
            Some(existing) if existing.definition.is_some() && field.definition.is_none() => {
                existing.value = field.value;
            }
            Some(existing) => *existing = field,
            None => {
                self.fields.insert(key.to_string(), field);
            }
        }
        Ok(())
    }

    /// Set the value of `key`, creating a bare text field if it's missing
    pub fn set_text(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        match self.fields.get_mut(key) {
            Some(existing) => {
                existing.value = value.into();
                Ok(())
            }
            None => self.set(key, Field::text(key, value)),
        }
    }

    /// Guarantee a field exists under `key` without touching an existing value
    pub fn ensure_mandatory_text_field(&mut self, key: &str, default_value: &str) -> Result<()> {
        if self.contains(key) {
            return Ok(());
        }
        self.set(key, Field::new(key, default_value, FieldType::Text))
    }

    /// Make sure every definition has a field, defaulted from the definition
    ///
    /// Existing fields keep their values; ones that were bare adopt the
    /// definition.
    pub fn ensure_defined_fields(&mut self, definitions: &[Arc<FieldDefinition>]) -> Result<()> {
        for definition in definitions {
            match self.fields.get_mut(&definition.key) {
                Some(existing) => {
                    if existing.definition.is_none() {
                        existing.field_type = definition.field_type;
                        existing.definition = Some(Arc::clone(definition));
                    }
                }
                None => self.set(&definition.key, Field::from_definition(definition))?,
            }
        }
        Ok(())
    }

    /// Apply every field of `other` through [`FieldSet::set`], in its order
    pub fn merge(&mut self, other: FieldSet) -> Result<()> {
        for (key, field) in other.fields {
            self.set(&key, field)?;
        }
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Option<Field> {
        self.fields.shift_remove(key)
    }

    /// Fields in insertion order
    pub fn values(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
