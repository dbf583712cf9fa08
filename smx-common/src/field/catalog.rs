//! Known field definitions per folder kind
//!
//! The catalog is JSON with one array of definitions per kind:
//!
//! ```json
//! { "project": [ ... ], "session": [ ... ], "person": [ ... ] }
//! ```
//!
//! A built-in catalog ships with the library; a deployment can point
//! `fields.catalog` in the config at its own file.

use super::FieldDefinition;
use crate::folder::FolderKind;
use crate::Result;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

const BUILTIN_CATALOG: &str = include_str!("builtin_fields.json");

#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    project: Vec<FieldDefinition>,
    #[serde(default)]
    session: Vec<FieldDefinition>,
    #[serde(default)]
    person: Vec<FieldDefinition>,
}

/// Shared, immutable definitions for every folder kind
#[derive(Debug, Clone, Default)]
pub struct FieldCatalog {
    project: Vec<Arc<FieldDefinition>>,
    session: Vec<Arc<FieldDefinition>>,
    person: Vec<Arc<FieldDefinition>>,
}

impl FieldCatalog {
    /// Catalog embedded in the library
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawCatalog = serde_json::from_str(json)?;
        let share = |defs: Vec<FieldDefinition>| defs.into_iter().map(Arc::new).collect();
        Ok(Self {
            project: share(raw.project),
            session: share(raw.session),
            person: share(raw.person),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&json)?;
        tracing::debug!(
            path = %path.display(),
            project = catalog.project.len(),
            session = catalog.session.len(),
            person = catalog.person.len(),
            "Loaded field catalog"
        );
        Ok(catalog)
    }

    pub fn definitions(&self, kind: FolderKind) -> &[Arc<FieldDefinition>] {
        match kind {
            FolderKind::Project => &self.project,
            FolderKind::Session => &self.session,
            FolderKind::Person => &self.person,
        }
    }
}

/// Find the definition whose key or legacy tag is `tag`
pub fn find_definition<'a>(
    definitions: &'a [Arc<FieldDefinition>],
    tag: &str,
) -> Option<&'a Arc<FieldDefinition>> {
    definitions
        .iter()
        .find(|d| d.key == tag)
        .or_else(|| definitions.iter().find(|d| d.tag() == tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldClass, FieldType};

    #[test]
    fn test_builtin_catalog_parses() {
        let catalog = FieldCatalog::builtin().unwrap();
        for kind in [FolderKind::Project, FolderKind::Session, FolderKind::Person] {
            let defs = catalog.definitions(kind);
            assert!(!defs.is_empty(), "{:?} has no definitions", kind);
            assert!(defs.iter().any(|d| d.key == "title" || d.key == "name"));
        }
    }

    #[test]
    fn test_builtin_date_keys_are_dates() {
        let catalog = FieldCatalog::builtin().unwrap();
        for kind in [FolderKind::Project, FolderKind::Session, FolderKind::Person] {
            for def in catalog.definitions(kind) {
                if def.key.contains("date") {
                    assert_eq!(def.field_type, FieldType::Date, "{}", def.key);
                }
            }
        }
    }

    #[test]
    fn test_session_has_additional_fields() {
        let catalog = FieldCatalog::builtin().unwrap();
        assert!(catalog
            .definitions(FolderKind::Session)
            .iter()
            .any(|d| d.class() == FieldClass::Additional));
    }

    #[test]
    fn test_find_definition_by_legacy_tag() {
        let catalog = FieldCatalog::from_json_str(
            r#"{"project":[{"key":"title","legacyTag":"Title"}]}"#,
        )
        .unwrap();
        let defs = catalog.definitions(FolderKind::Project);
        assert_eq!(find_definition(defs, "Title").unwrap().key, "title");
        assert_eq!(find_definition(defs, "title").unwrap().key, "title");
        assert!(find_definition(defs, "location").is_none());
        assert!(catalog.definitions(FolderKind::Person).is_empty());
    }
}
