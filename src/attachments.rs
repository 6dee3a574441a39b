//! File attachments for healthbinder.
//!
//! The binder can hold copies of lab reports, prescriptions, and similar
//! documents. Files are stored as BLOBs in the database and deduplicated by
//! content hash, so re-adding the same document is a no-op.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::storage::Storage;

/// Metadata for a stored attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    /// Unique identifier (assigned by the storage layer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Original file name.
    pub name: String,

    /// Coarse file kind derived from the extension ("pdf", "image", ...).
    pub kind: String,

    /// BLAKE3 hash of the file contents, used for deduplication.
    pub content_hash: String,

    /// When the file was added to the binder.
    pub added_at: DateTime<Utc>,

    /// Size of the stored contents in bytes.
    pub size_bytes: u64,
}

impl Attachment {
    /// Build attachment metadata for the given file name and contents.
    #[must_use]
    pub fn from_bytes(name: impl Into<String>, data: &[u8]) -> Self {
        let name = name.into();
        let kind = kind_for_name(&name).to_string();
        Self {
            id: None,
            name,
            kind,
            content_hash: blake3::hash(data).to_hex().to_string(),
            added_at: Utc::now(),
            size_bytes: data.len() as u64,
        }
    }
}

/// Derive a coarse kind label from a file name's extension.
#[must_use]
pub fn kind_for_name(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("pdf") => "pdf",
        Some("png" | "jpg" | "jpeg" | "gif" | "webp" | "heic") => "image",
        Some("txt" | "md") => "text",
        Some("csv") => "csv",
        Some("json") => "json",
        _ => "file",
    }
}

/// Outcome of adding a single file to the binder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// The file was stored under the given id.
    Stored {
        /// Assigned attachment id.
        id: i64,
        /// File name as stored.
        name: String,
    },
    /// Identical contents were already in the binder.
    Duplicate {
        /// File name that was skipped.
        name: String,
    },
}

/// Read the given files and store them in the binder.
///
/// # Errors
///
/// Returns an error if a file cannot be read or a database operation fails.
pub fn add_files(storage: &Storage, paths: &[PathBuf]) -> Result<Vec<AddOutcome>> {
    let mut outcomes = Vec::with_capacity(paths.len());

    for path in paths {
        let data = std::fs::read(path).map_err(|source| Error::FileRead {
            path: path.clone(),
            source,
        })?;
        let name = path
            .file_name()
            .map_or_else(|| path.to_string_lossy().into_owned(), |n| {
                n.to_string_lossy().into_owned()
            });

        let attachment = Attachment::from_bytes(name.clone(), &data);
        match storage.insert_attachment(&attachment, &data)? {
            Some(id) => {
                info!("Attached {} ({} bytes)", name, data.len());
                outcomes.push(AddOutcome::Stored { id, name });
            }
            None => {
                debug!("Duplicate attachment skipped: {}", name);
                outcomes.push(AddOutcome::Duplicate { name });
            }
        }
    }

    Ok(outcomes)
}

/// Write a single attachment's contents out to the given path.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the id is unknown, or an I/O error if the
/// file cannot be written.
pub fn export_one(storage: &Storage, id: i64, output: &Path) -> Result<()> {
    let (meta, data) = storage.attachment_data(id)?.ok_or(Error::NotFound {
        kind: "attachment",
        id,
    })?;

    std::fs::write(output, data)?;
    info!("Wrote {} to {}", meta.name, output.display());
    Ok(())
}

/// Write every attachment out to the given directory, keeping original names.
///
/// Returns the paths written. A name collision gets an `-<id>` suffix so
/// nothing is overwritten.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or a write fails.
pub fn export_all(storage: &Storage, dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let mut written = Vec::new();
    for meta in storage.attachments()? {
        let Some(id) = meta.id else { continue };
        let Some((_, data)) = storage.attachment_data(id)? else {
            continue;
        };

        let mut target = dir.join(&meta.name);
        if target.exists() {
            target = dir.join(disambiguated_name(&meta.name, id));
        }
        std::fs::write(&target, data)?;
        written.push(target);
    }

    info!("Exported {} attachments to {}", written.len(), dir.display());
    Ok(written)
}

/// Insert `-<id>` before the extension of a file name.
fn disambiguated_name(name: &str, id: i64) -> String {
    let path = Path::new(name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => {
            format!("{}-{id}.{}", stem.to_string_lossy(), ext.to_string_lossy())
        }
        _ => format!("{name}-{id}"),
    }
}
