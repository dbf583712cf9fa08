//! Project, Session and Person folders
//!
//! A folder groups one canonical metadata file with the companion files found
//! next to it. The record's properties live in the metadata file, but callers
//! treat them as the folder's own, so [`Folder::properties`] delegates there.

use crate::config::FolderConfig;
use crate::discovery::FileDiscovery;
use crate::field::{FieldDefinition, FieldSet};
use crate::file::{File, XmlDialect, TEMP_SUFFIX};
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Handed out by folders that have no metadata file
static EMPTY_PROPERTIES: Lazy<FieldSet> = Lazy::new(FieldSet::new);

/// Field every folder is guaranteed to have
pub const TITLE_KEY: &str = "title";
const DEFAULT_TITLE: &str = "untitled";

/// Kind of record a folder holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FolderKind {
    Project,
    Session,
    Person,
}

impl FolderKind {
    pub fn root_tag(self) -> &'static str {
        match self {
            FolderKind::Project => "Project",
            FolderKind::Session => "Session",
            FolderKind::Person => "Person",
        }
    }

    /// Metadata file extension, without the dot
    pub fn extension(self) -> &'static str {
        match self {
            FolderKind::Project => "sprj",
            FolderKind::Session => "session",
            FolderKind::Person => "person",
        }
    }

    /// The legacy Project file never had `type` attributes; Session and
    /// Person files do.
    pub fn emit_type_attribute(self) -> bool {
        !matches!(self, FolderKind::Project)
    }

    pub fn dialect(self) -> XmlDialect {
        XmlDialect {
            root_tag: self.root_tag(),
            typed: self.emit_type_attribute(),
        }
    }

    /// `<directory>/<directory name>.<extension>`
    pub fn metadata_path(self, directory: &Path) -> PathBuf {
        let name = directory
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root_tag().to_string());
        directory.join(format!("{}.{}", name, self.extension()))
    }
}

impl fmt::Display for FolderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.root_tag())
    }
}

impl FromStr for FolderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "project" => Ok(FolderKind::Project),
            "session" => Ok(FolderKind::Session),
            "person" => Ok(FolderKind::Person),
            other => Err(Error::MalformedInput(format!(
                "unknown folder kind '{}' (expected project, session or person)",
                other
            ))),
        }
    }
}

/// Load the files constituting a project, session or person
///
/// **Algorithm:**
/// 1. Give the metadata file a field for every known definition
/// 2. Read its persisted content over those defaults
/// 3. Put it first; index 0 is the canonical metadata file
/// 4. Every other discovered file becomes a companion, unless it ends in an
///    excluded suffix, is a leftover save temp file or is the metadata file
///    itself. An unreadable sidecar leaves its companion with no fields.
pub fn compose(
    directory: &Path,
    mut metadata_file: File,
    known_definitions: &[Arc<FieldDefinition>],
    discovery: &dyn FileDiscovery,
    config: &FolderConfig,
) -> Result<Vec<File>> {
    if !directory.is_dir() {
        return Err(Error::Scan {
            path: directory.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    metadata_file
        .properties_mut()
        .ensure_defined_fields(known_definitions)?;
    metadata_file.read_metadata_file(known_definitions)?;

    let metadata_path = metadata_file.metadata_file_path();
    let mut files = vec![metadata_file];

    for path in discovery.discover(directory)? {
        if same_path(&path, &metadata_path) || has_excluded_suffix(&path, config) {
            continue;
        }
        let mut companion = File::companion(&path);
        if let Err(e) = companion.read_metadata_file(&[]) {
            tracing::warn!(
                path = %companion.metadata_file_path().display(),
                "Ignoring unreadable sidecar: {}",
                e
            );
            companion = File::companion(path);
        }
        files.push(companion);
    }

    tracing::debug!(
        directory = %directory.display(),
        companions = files.len() - 1,
        "Composed folder"
    );
    Ok(files)
}

fn has_excluded_suffix(path: &Path, config: &FolderConfig) -> bool {
    let name = path.to_string_lossy();
    name.ends_with(TEMP_SUFFIX)
        || config
            .excluded_suffixes
            .iter()
            .any(|suffix| name.ends_with(suffix.as_str()))
}

/// Component-wise comparison, falling back to canonical paths when both exist
fn same_path(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// A Project, Session or Person folder
#[derive(Debug, Clone)]
pub struct Folder {
    directory: PathBuf,
    kind: FolderKind,
    /// Metadata file first when there is one
    files: Vec<File>,
    has_metadata_file: bool,
}

impl Folder {
    /// Assemble a folder; a metadata file gets its mandatory title
    pub fn new(
        directory: impl Into<PathBuf>,
        kind: FolderKind,
        metadata_file: Option<File>,
        companions: Vec<File>,
    ) -> Result<Self> {
        let has_metadata_file = metadata_file.is_some();
        let mut files: Vec<File> = metadata_file.into_iter().collect();
        files.extend(companions);

        if has_metadata_file {
            files[0]
                .properties_mut()
                .ensure_mandatory_text_field(TITLE_KEY, DEFAULT_TITLE)?;
        }

        Ok(Self {
            directory: directory.into(),
            kind,
            files,
            has_metadata_file,
        })
    }

    /// Load the folder at `directory` from disk
    pub fn load(
        directory: &Path,
        kind: FolderKind,
        known_definitions: &[Arc<FieldDefinition>],
        discovery: &dyn FileDiscovery,
        config: &FolderConfig,
    ) -> Result<Self> {
        let metadata_file = File::metadata(kind.metadata_path(directory), kind.dialect());
        let mut files = compose(directory, metadata_file, known_definitions, discovery, config)?;
        let companions = files.split_off(1);
        let metadata_file = files.pop();

        tracing::info!(
            directory = %directory.display(),
            kind = %kind,
            companions = companions.len(),
            "Loaded folder"
        );
        Self::new(directory, kind, metadata_file, companions)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn kind(&self) -> FolderKind {
        self.kind
    }

    /// The record's properties; empty (never missing) without a metadata file
    pub fn properties(&self) -> &FieldSet {
        match self.metadata_file() {
            Some(file) => file.properties(),
            None => &*EMPTY_PROPERTIES,
        }
    }

    pub fn metadata_file(&self) -> Option<&File> {
        if self.has_metadata_file {
            self.files.first()
        } else {
            None
        }
    }

    /// Mutation goes through the owning file
    pub fn metadata_file_mut(&mut self) -> Option<&mut File> {
        if self.has_metadata_file {
            self.files.first_mut()
        } else {
            None
        }
    }

    /// All files, metadata file first
    pub fn files(&self) -> &[File] {
        &self.files
    }

    pub fn companions(&self) -> &[File] {
        let start = usize::from(self.has_metadata_file);
        &self.files[start..]
    }

    pub fn companion_mut(&mut self, file_name: &str) -> Option<&mut File> {
        let start = usize::from(self.has_metadata_file);
        self.files[start..]
            .iter_mut()
            .find(|f| f.file_name() == file_name)
    }

    /// Title, falling back to the directory name
    pub fn display_name(&self) -> String {
        match self.properties().text(TITLE_KEY) {
            Some(title) if !title.trim().is_empty() && title != DEFAULT_TITLE => {
                title.to_string()
            }
            _ => self
                .directory
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        }
    }

    /// Write the metadata file back to disk
    pub fn save(&self) -> Result<()> {
        match self.metadata_file() {
            Some(file) => file.save(),
            None => Err(Error::NotFound(format!(
                "{} has no metadata file",
                self.directory.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_policies() {
        assert!(!FolderKind::Project.emit_type_attribute());
        assert!(FolderKind::Session.emit_type_attribute());
        assert!(FolderKind::Person.emit_type_attribute());
        assert_eq!(FolderKind::Person.root_tag(), "Person");
    }

    #[test]
    fn test_metadata_path() {
        let path = FolderKind::Session.metadata_path(Path::new("/archive/Sessions/ETR009"));
        assert_eq!(path, PathBuf::from("/archive/Sessions/ETR009/ETR009.session"));
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("Session".parse::<FolderKind>().unwrap(), FolderKind::Session);
        assert_eq!("PROJECT".parse::<FolderKind>().unwrap(), FolderKind::Project);
        assert!("recording".parse::<FolderKind>().is_err());
    }

    #[test]
    fn test_properties_never_missing() {
        let folder = Folder::new("/archive/docs", FolderKind::Project, None, Vec::new()).unwrap();
        assert!(folder.properties().is_empty());
        assert!(folder.metadata_file().is_none());
        assert!(folder.save().is_err());
    }

    #[test]
    fn test_new_guarantees_title() {
        let meta = File::metadata("/x/x.session", FolderKind::Session.dialect());
        let folder = Folder::new("/x", FolderKind::Session, Some(meta), Vec::new()).unwrap();
        assert_eq!(folder.properties().text(TITLE_KEY), Some("untitled"));
        assert_eq!(folder.display_name(), "x");
    }

    #[test]
    fn test_excluded_suffixes() {
        let config = FolderConfig::default();
        assert!(has_excluded_suffix(Path::new("/x/a.wav.meta"), &config));
        assert!(has_excluded_suffix(Path::new("/x/a.test"), &config));
        assert!(!has_excluded_suffix(Path::new("/x/a.wav"), &config));
        // interrupted saves
        assert!(has_excluded_suffix(Path::new("/x/x.session.tmp"), &config));
        assert!(has_excluded_suffix(
            Path::new("/x/a.wav.meta.tmp"),
            &FolderConfig {
                excluded_suffixes: Vec::new(),
                ..FolderConfig::default()
            }
        ));
    }
}
