//! Writer module for persisting modified workbooks

mod xlsx_writer;

pub use xlsx_writer::{rewrite_relationship_targets, write_xlsx};

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{LinkError, Result};

/// Replace the file at `path` with `bytes`.
///
/// The content goes to a temporary file in the destination directory first and
/// is renamed over the destination, so a failed write leaves the old file intact.
pub fn persist(path: &Path, bytes: &[u8]) -> Result<()> {
    let destination = resolve_destination(path)?;
    let access_error = |e: io::Error| LinkError::file_access(path, e);

    let permissions = match fs::metadata(&destination) {
        Ok(meta) => {
            check_writable(&destination, &meta).map_err(access_error)?;
            Some(meta.permissions())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(access_error(e)),
    };

    let dir = match destination.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut tmp = NamedTempFile::new_in(&dir).map_err(access_error)?;
    tmp.write_all(bytes).map_err(access_error)?;
    tmp.as_file().sync_all().map_err(access_error)?;
    if let Some(permissions) = permissions {
        fs::set_permissions(tmp.path(), permissions).map_err(access_error)?;
    }
    tmp.persist(&destination).map_err(|e| access_error(e.error))?;

    Ok(())
}

/// Refuse an existing destination the current user may not modify
fn check_writable(destination: &Path, meta: &fs::Metadata) -> io::Result<()> {
    if meta.permissions().readonly() {
        return Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "file is read-only",
        ));
    }
    // A writable directory is not enough, the file itself must accept writes
    OpenOptions::new().write(true).open(destination).map(drop)
}

/// Follow a symlinked destination so the link itself is kept
fn resolve_destination(path: &Path) -> Result<PathBuf> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::canonicalize(path).map_err(|e| LinkError::file_access(path, e))
        }
        _ => Ok(path.to_path_buf()),
    }
}
