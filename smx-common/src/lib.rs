//! # SMX Common Library
//!
//! Metadata model and persistence for archival research records
//! (Project → Session/Person → component files):
//! - Typed fields, field definitions and the ordered `FieldSet`
//! - Contributions (who did what, when)
//! - Legacy-compatible XML writer and reader
//! - Metadata/companion files and folder composition
//! - Configuration loading
//! - Choice lists and the localization interface used by UIs

pub mod choices;
pub mod config;
pub mod contribution;
pub mod discovery;
pub mod error;
pub mod field;
pub mod file;
pub mod folder;
pub mod xml;

pub use contribution::Contribution;
pub use error::{Error, Result};
pub use field::{Field, FieldClass, FieldDefinition, FieldSet, FieldType};
pub use file::File;
pub use folder::{Folder, FolderKind};
