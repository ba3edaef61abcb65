//! Workbook discovery in directory mode

use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{LinkError, Result};

/// Immediate entries of `dir` whose file name ends with `suffix`.
///
/// The match is case-sensitive and non-recursive; directories are skipped.
/// Files come back in `read_dir` order, which is not necessarily alphabetical.
pub fn spreadsheet_files<P: AsRef<Path>>(dir: P, suffix: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|e| LinkError::file_access(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| LinkError::file_access(dir, e))?;
        if !entry
            .file_name()
            .as_encoded_bytes()
            .ends_with(suffix.as_bytes())
        {
            continue;
        }

        let path = entry.path();
        if path.is_dir() {
            debug!("Skipping directory {}", path.display());
            continue;
        }
        files.push(path);
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selects_by_exact_suffix() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.xlsx", "b.xlsx", "notes.txt", "upper.XLSX", "old.xlsx.bak", "macro.xlsm"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("folder.xlsx")).unwrap();

        let mut names: Vec<String> = spreadsheet_files(dir.path(), ".xlsx")
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();

        assert_eq!(names, vec!["a.xlsx", "b.xlsx"]);
    }

    #[test]
    fn test_is_not_recursive() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("inner.xlsx"), b"").unwrap();

        assert!(spreadsheet_files(dir.path(), ".xlsx").unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = spreadsheet_files(dir.path().join("nope"), ".xlsx").unwrap_err();
        assert!(matches!(err, LinkError::FileAccess { .. }));
    }
}
