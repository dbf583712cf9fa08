//! SMX metadata tool - Main entry point
//!
//! Loads Project, Session and Person folders from disk and inspects or
//! rewrites their metadata in the legacy XML dialect.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use smx_common::config::SmxConfig;
use smx_common::discovery::DirectoryScanner;
use smx_common::field::FieldCatalog;
use smx_common::{Folder, FolderKind};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for smx-tool
#[derive(Parser, Debug)]
#[command(name = "smx-tool")]
#[command(about = "Inspect and rewrite archival metadata folders")]
#[command(version)]
struct Args {
    /// Config file (TOML)
    #[arg(short, long, env = "SMX_CONFIG")]
    config: Option<PathBuf>,

    /// Folder kind (project, session, person); detected from the metadata
    /// file extension when omitted
    #[arg(short, long, global = true)]
    kind: Option<FolderKind>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List a folder's fields, contributions and companion files
    Show { folder: PathBuf },

    /// Print a folder's metadata file as legacy XML
    Xml {
        folder: PathBuf,

        /// Include empty custom fields (used when watching a file for changes)
        #[arg(long)]
        emit_empty_custom_fields: bool,
    },

    /// Rewrite the metadata file of each folder
    Resave {
        #[arg(required = true)]
        folders: Vec<PathBuf>,
    },

    /// Report fields whose value doesn't match their key
    Check {
        #[arg(required = true)]
        folders: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = SmxConfig::load(args.config.as_deref()).context("Failed to load config")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let catalog = config
        .field_catalog()
        .context("Failed to load field catalog")?;

    match &args.command {
        Command::Show { folder } => {
            let folder = load_folder(folder, args.kind, &config, &catalog)?;
            show(&folder);
        }
        Command::Xml {
            folder,
            emit_empty_custom_fields,
        } => {
            let folder = load_folder(folder, args.kind, &config, &catalog)?;
            let Some(file) = folder.metadata_file() else {
                bail!("{} has no metadata file", folder.directory().display());
            };
            println!("{}", file.to_xml(*emit_empty_custom_fields)?);
        }
        Command::Resave { folders } => {
            for directory in folders {
                let folder = load_folder(directory, args.kind, &config, &catalog)?;
                folder
                    .save()
                    .with_context(|| format!("Failed to save {}", directory.display()))?;
                info!(folder = %folder.display_name(), "Resaved");
            }
        }
        Command::Check { folders } => {
            let mut violations = 0;
            for directory in folders {
                let folder = load_folder(directory, args.kind, &config, &catalog)?;
                violations += report_integrity_violations(&folder);
            }
            if violations > 0 {
                bail!("{} integrity violation(s)", violations);
            }
        }
    }

    Ok(())
}

fn load_folder(
    directory: &Path,
    kind: Option<FolderKind>,
    config: &SmxConfig,
    catalog: &FieldCatalog,
) -> Result<Folder> {
    let kind = match kind {
        Some(kind) => kind,
        None => detect_kind(directory)?,
    };
    Folder::load(
        directory,
        kind,
        catalog.definitions(kind),
        &DirectoryScanner::from_config(&config.folders),
        &config.folders,
    )
    .with_context(|| format!("Failed to load {} folder {}", kind, directory.display()))
}

/// Kind whose metadata file already exists in `directory`
fn detect_kind(directory: &Path) -> Result<FolderKind> {
    let found: Vec<FolderKind> = [FolderKind::Project, FolderKind::Session, FolderKind::Person]
        .into_iter()
        .filter(|kind| kind.metadata_path(directory).is_file())
        .collect();

    match found.as_slice() {
        [kind] => Ok(*kind),
        [] => bail!(
            "No metadata file in {}; pass --kind to create one",
            directory.display()
        ),
        _ => {
            warn!(directory = %directory.display(), "Several metadata files found");
            bail!("Ambiguous folder {}; pass --kind", directory.display())
        }
    }
}

/// Print every integrity violation in the folder's files; returns the count
fn report_integrity_violations(folder: &Folder) -> usize {
    let mut violations = 0;
    for file in folder.files() {
        for field in file.properties().values() {
            if let Some(e) = field.integrity_violation() {
                println!("{}: {}", file.path().display(), e);
                violations += 1;
            }
        }
    }
    violations
}

fn show(folder: &Folder) {
    println!("{} {}", folder.kind(), folder.display_name());
    println!("  directory: {}", folder.directory().display());

    for field in folder.properties().values() {
        println!("  {} [{:?}] = {}", field.key, field.class(), field.value);
    }

    if let Some(file) = folder.metadata_file() {
        for contribution in file.contributions() {
            println!(
                "  contributor: {} ({})",
                contribution.person_reference,
                contribution.role().unwrap_or("no role")
            );
        }
    }

    for companion in folder.companions() {
        println!(
            "  file: {} ({} fields)",
            companion.file_name(),
            companion.properties().len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_detect_kind_from_metadata_file() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("Joe");
        std::fs::create_dir(&dir).unwrap();

        assert!(detect_kind(&dir).is_err());

        std::fs::write(dir.join("Joe.person"), "<Person></Person>").unwrap();
        assert_eq!(detect_kind(&dir).unwrap(), FolderKind::Person);

        std::fs::write(dir.join("Joe.session"), "<Session></Session>").unwrap();
        assert!(detect_kind(&dir).is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["smx-tool", "--kind", "session", "show", "/tmp/s1"]).unwrap();
        assert_eq!(args.kind, Some(FolderKind::Session));
        assert!(matches!(args.command, Command::Show { .. }));

        assert!(Args::try_parse_from(["smx-tool", "resave"]).is_err());
        assert!(Args::try_parse_from(["smx-tool", "check"]).is_err());
    }

    #[test]
    fn test_check_counts_date_named_text_fields() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("S1");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(
            dir.join("S1.session"),
            r#"<Session>
  <title type="text">Rain</title>
  <date>2019-06-01</date>
  <recordingdate type="text">last spring</recordingdate>
  <contributions></contributions>
</Session>"#,
        )
        .unwrap();

        let config = SmxConfig::default();
        let catalog = FieldCatalog::builtin().unwrap();
        let folder = load_folder(&dir, None, &config, &catalog).unwrap();
        assert_eq!(report_integrity_violations(&folder), 1);

        let clean = root.path().join("S2");
        std::fs::create_dir(&clean).unwrap();
        let folder = load_folder(&clean, Some(FolderKind::Session), &config, &catalog).unwrap();
        assert_eq!(report_integrity_violations(&folder), 0);
    }
}
