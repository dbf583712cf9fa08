//! Metadata and companion files
//!
//! Every file in a record's folder owns a [`FieldSet`]. For the folder's
//! metadata file (`.sprj`, `.session`, `.person`) that set *is* the record's
//! metadata; a companion file (recording, image, document...) keeps its
//! fields in a `<file>.meta` sidecar next to it.

use crate::contribution::Contribution;
use crate::field::{Field, FieldDefinition, FieldSet};
use crate::xml::{empty_document, read_legacy_xml, to_legacy_xml};
use crate::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Suffix of the sidecar holding a companion file's metadata
pub const SIDECAR_SUFFIX: &str = ".meta";
const SIDECAR_ROOT_TAG: &str = "Meta";
/// Suffix of the temp file a save writes before renaming it into place
pub const TEMP_SUFFIX: &str = ".tmp";

/// Element layout a file is persisted with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XmlDialect {
    pub root_tag: &'static str,
    /// `type` attributes on simple fields
    pub typed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    /// The canonical metadata file of a Project/Session/Person folder
    Metadata,
    /// Any other file in the folder
    Companion,
}

/// One file of a folder and the metadata it exclusively owns
#[derive(Debug, Clone)]
pub struct File {
    path: PathBuf,
    role: FileRole,
    dialect: XmlDialect,
    properties: FieldSet,
    contributions: Vec<Contribution>,
}

impl File {
    /// The metadata file at `path`, persisted with `dialect`
    pub fn metadata(path: impl Into<PathBuf>, dialect: XmlDialect) -> Self {
        Self {
            path: path.into(),
            role: FileRole::Metadata,
            dialect,
            properties: FieldSet::new(),
            contributions: Vec::new(),
        }
    }

    pub fn companion(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            role: FileRole::Companion,
            dialect: XmlDialect {
                root_tag: SIDECAR_ROOT_TAG,
                typed: true,
            },
            properties: FieldSet::new(),
            contributions: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn role(&self) -> FileRole {
        self.role
    }

    pub fn is_metadata(&self) -> bool {
        self.role == FileRole::Metadata
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Where this file's fields are persisted
    pub fn metadata_file_path(&self) -> PathBuf {
        match self.role {
            FileRole::Metadata => self.path.clone(),
            FileRole::Companion => {
                let mut sidecar = self.path.clone().into_os_string();
                sidecar.push(SIDECAR_SUFFIX);
                PathBuf::from(sidecar)
            }
        }
    }

    pub fn properties(&self) -> &FieldSet {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut FieldSet {
        &mut self.properties
    }

    pub fn set_field(&mut self, key: &str, field: Field) -> Result<()> {
        self.properties.set(key, field)
    }

    pub fn set_text(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.properties.set_text(key, value)
    }

    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    pub fn contributions_mut(&mut self) -> &mut Vec<Contribution> {
        &mut self.contributions
    }

    /// Load persisted metadata into this file's FieldSet
    ///
    /// A missing metadata file is created empty; a companion without a
    /// sidecar simply has no persisted fields yet.
    pub fn read_metadata_file(&mut self, definitions: &[Arc<FieldDefinition>]) -> Result<()> {
        let path = self.metadata_file_path();
        if !path.exists() {
            if self.role == FileRole::Metadata {
                tracing::info!(path = %path.display(), "Creating missing metadata file");
                write_atomic(&path, &empty_document(self.dialect.root_tag)?)?;
            }
            return Ok(());
        }

        let xml = std::fs::read_to_string(&path)?;
        read_legacy_xml(
            &xml,
            definitions,
            self.dialect.typed,
            &mut self.properties,
            &mut self.contributions,
        )?;
        tracing::debug!(
            path = %path.display(),
            fields = self.properties.len(),
            contributions = self.contributions.len(),
            "Read metadata"
        );
        Ok(())
    }

    /// This file's metadata in the legacy dialect
    pub fn to_xml(&self, emit_empty_custom_fields: bool) -> Result<String> {
        to_legacy_xml(
            self.dialect.root_tag,
            &self.properties,
            &self.contributions,
            self.dialect.typed,
            emit_empty_custom_fields,
        )
    }

    /// Persist the metadata (temp file + rename)
    pub fn save(&self) -> Result<()> {
        let path = self.metadata_file_path();
        write_atomic(&path, &self.to_xml(false)?)?;
        tracing::debug!(path = %path.display(), "Saved metadata");
        Ok(())
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let mut temp = path.as_os_str().to_owned();
    temp.push(TEMP_SUFFIX);
    let temp = PathBuf::from(temp);

    std::fs::write(&temp, contents)?;
    std::fs::rename(&temp, path)?;
    Ok(())
}
