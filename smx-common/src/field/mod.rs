//! Typed metadata fields
//!
//! A [`Field`] is a keyed value with a semantic type and, usually, a shared
//! reference to the immutable [`FieldDefinition`] that describes it. Fields
//! without a definition are "bare": they persist as plain top-level elements.

mod catalog;
mod field_set;

pub use catalog::{find_definition, FieldCatalog};
pub use field_set::FieldSet;

use crate::choices::Choice;
use crate::Error;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::Arc;

/// Semantic type of a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Date,
    /// One value out of a closed list of choices
    Choice,
    /// The contributions list; persisted through `<contributions>`, not as a field
    Contributions,
}

impl FieldType {
    /// Value of the `type` attribute written in the legacy dialect
    pub fn xml_type(self) -> &'static str {
        match self {
            FieldType::Text | FieldType::Choice => "text",
            FieldType::Date => "date",
            FieldType::Contributions => "xml",
        }
    }

    /// Inverse of [`FieldType::xml_type`] for values read back from disk
    pub fn from_xml_type(type_attr: &str) -> Self {
        match type_attr {
            "date" => FieldType::Date,
            _ => FieldType::Text,
        }
    }
}

/// Where a UI shows the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldVisibility {
    #[default]
    Always,
    IfNotEmpty,
    Never,
}

/// Output grouping of a field, computed once from its definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldClass {
    /// Written directly under the root element
    Simple,
    /// Schema-known optional field, grouped under `AdditionalFields`
    Additional,
    /// User-defined field, grouped under `CustomFields`
    Custom,
}

fn default_persist() -> bool {
    true
}

/// Immutable schema entry for one field key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub key: String,

    #[serde(default)]
    pub english_label: String,

    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    #[serde(default)]
    pub visibility: FieldVisibility,

    #[serde(default)]
    pub is_additional: bool,

    #[serde(default)]
    pub is_custom: bool,

    /// Tag used instead of `key` because the legacy reader expects its own
    /// (inconsistent) capitalization
    #[serde(default)]
    pub legacy_tag: Option<String>,

    /// Non-persistent fields are never written to disk
    #[serde(default = "default_persist")]
    pub persist: bool,

    #[serde(default)]
    pub default_value: String,

    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl FieldDefinition {
    /// Persistent text definition with no classification
    pub fn new(key: impl Into<String>, field_type: FieldType) -> Self {
        let key = key.into();
        Self {
            english_label: key.clone(),
            key,
            field_type,
            visibility: FieldVisibility::Always,
            is_additional: false,
            is_custom: false,
            legacy_tag: None,
            persist: true,
            default_value: String::new(),
            choices: Vec::new(),
        }
    }

    /// Definition for a user-defined field that the schema doesn't know
    pub fn custom(key: impl Into<String>) -> Self {
        Self {
            is_custom: true,
            ..Self::new(key, FieldType::Text)
        }
    }

    /// Definition for a schema-known optional field
    pub fn additional(key: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            is_additional: true,
            ..Self::new(key, field_type)
        }
    }

    /// Custom wins when a definition claims both classifications.
    pub fn class(&self) -> FieldClass {
        if self.is_custom {
            FieldClass::Custom
        } else if self.is_additional {
            FieldClass::Additional
        } else {
            FieldClass::Simple
        }
    }

    /// Element name on disk: the legacy override if there is one, else the key
    pub fn tag(&self) -> &str {
        match self.legacy_tag.as_deref() {
            Some(tag) if !tag.is_empty() => tag,
            _ => &self.key,
        }
    }
}

/// A typed, named metadata value
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub value: String,
    pub field_type: FieldType,
    pub definition: Option<Arc<FieldDefinition>>,
}

impl Field {
    /// Bare field of the given type
    pub fn new(key: impl Into<String>, value: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            field_type,
            definition: None,
        }
    }

    /// Bare text field
    pub fn text(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, value, FieldType::Text)
    }

    /// Field initialized from its definition's default value
    pub fn from_definition(definition: &Arc<FieldDefinition>) -> Self {
        Self {
            key: definition.key.clone(),
            value: definition.default_value.clone(),
            field_type: definition.field_type,
            definition: Some(Arc::clone(definition)),
        }
    }

    /// Same field with `value` replaced
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn class(&self) -> FieldClass {
        self.definition
            .as_ref()
            .map_or(FieldClass::Simple, |d| d.class())
    }

    /// Bare fields always persist
    pub fn persist(&self) -> bool {
        self.definition.as_ref().map_or(true, |d| d.persist)
    }

    pub fn tag(&self) -> &str {
        self.definition.as_ref().map_or(self.key.as_str(), |d| d.tag())
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// The value as a calendar date, if it parses as ISO `YYYY-MM-DD`
    pub fn date(&self) -> Option<NaiveDate> {
        if self.field_type != FieldType::Date {
            return None;
        }
        NaiveDate::parse_from_str(self.value.trim(), "%Y-%m-%d").ok()
    }

    /// Type tag plus the value escaped for XML element text
    ///
    /// Only markup characters (`&`, `<`, `>`) are escaped; quotes stay literal
    /// in element text, matching what the legacy writer produced.
    pub fn type_and_value_escaped_for_xml(&self) -> (&'static str, Cow<'_, str>) {
        (
            self.field_type.xml_type(),
            quick_xml::escape::partial_escape(&self.value),
        )
    }

    /// Keys that mention "date" are expected to hold dates.
    pub fn integrity_violation(&self) -> Option<Error> {
        if self.key.contains("date") && self.field_type != FieldType::Date {
            Some(Error::IntegrityViolation(format!(
                "field '{}' looks like a date but has type {:?}",
                self.key, self.field_type
            )))
        } else {
            None
        }
    }
}
