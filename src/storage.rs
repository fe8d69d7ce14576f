//! Reading Markdown input and writing Zim output.

use crate::error::{Result, StorageError};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// `name-(3)`, `name_(3)` or `name (3)`.
static NUMBERED_STEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)([- _])\((\d+)\)$").expect("valid numbered stem regex"));

/// Read a document, expanding a leading `~`. Invalid UTF-8 is replaced.
pub fn read_document(path: &Path) -> Result<String> {
    let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
    if !expanded.exists() {
        return Err(StorageError::InputNotFound(expanded.display().to_string()).into());
    }

    let bytes = fs::read(&expanded)?;
    log::debug!("Read {} bytes from {}", bytes.len(), expanded.display());
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write `text` to `path`. Without `overwrite`, an existing file is kept and
/// a free name is chosen with [`auto_rename`]. Returns the path written.
pub fn write_document(path: &Path, text: &str, overwrite: bool) -> Result<PathBuf> {
    let target = if !overwrite && path.exists() {
        auto_rename(path)
    } else {
        path.to_path_buf()
    };

    fs::write(&target, text).map_err(|e| StorageError::Write {
        path: target.display().to_string(),
        message: e.to_string(),
    })?;
    log::debug!("Wrote {} bytes to {}", text.len(), target.display());
    Ok(target)
}

/// First path derived from `path` that does not exist yet: `name_(1).ext`,
/// or the next number when the name already ends in a `(n)` suffix.
pub fn auto_rename(path: &Path) -> PathBuf {
    let mut candidate = path.to_path_buf();
    while candidate.exists() {
        candidate = next_name(&candidate);
    }
    candidate
}

fn next_name(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let renamed = match NUMBERED_STEM.captures(&stem) {
        Some(caps) => {
            let number: u64 = caps[3].parse().unwrap_or(0);
            format!("{}{}({}){extension}", &caps[1], &caps[2], number + 1)
        }
        None => format!("{stem}_(1){extension}"),
    };
    path.with_file_name(renamed)
}

/// Default output path for `input`: same directory, `{stem}{suffix}.txt`.
pub fn default_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{suffix}.txt"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_document(&dir.path().join("missing.md")).unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::InputNotFound(_))));
    }

    #[test]
    fn test_read_replaces_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.md");
        fs::write(&path, b"ok \xff end").unwrap();
        assert_eq!(read_document(&path).unwrap(), "ok \u{fffd} end");
    }

    #[test]
    fn test_write_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "old").unwrap();
        let written = write_document(&path, "new", true).unwrap();
        assert_eq!(written, path);
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_write_without_overwrite_renames() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "old").unwrap();

        let first = write_document(&path, "one", false).unwrap();
        assert_eq!(first, dir.path().join("out_(1).txt"));
        let second = write_document(&path, "two", false).unwrap();
        assert_eq!(second, dir.path().join("out_(2).txt"));

        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
        assert_eq!(fs::read_to_string(&second).unwrap(), "two");
    }

    #[test]
    fn test_next_name_increments_suffix() {
        assert_eq!(next_name(Path::new("a/notes-(4).txt")), Path::new("a/notes-(5).txt"));
        assert_eq!(next_name(Path::new("notes (9).md")), Path::new("notes (10).md"));
        assert_eq!(next_name(Path::new("notes.txt")), Path::new("notes_(1).txt"));
        assert_eq!(next_name(Path::new("README")), Path::new("README_(1)"));
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("docs/page.md"), "_md2zim"),
            Path::new("docs/page_md2zim.txt")
        );
    }
}
