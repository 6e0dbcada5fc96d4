//! File helpers shared by the page injector and the search index rewriter.

use crate::error::UnitError;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Read a UTF-8 text file. Bytes that are not UTF-8 are a parse error, not an
/// access error: the file exists but cannot be processed as text.
pub fn read_text(path: &Path) -> Result<String, UnitError> {
    let bytes = std::fs::read(path).map_err(|e| UnitError::access(path, e))?;
    String::from_utf8(bytes)
        .map_err(|e| UnitError::Parse(format!("{} is not valid UTF-8: {}", path.display(), e)))
}

/// Replace the contents of `path` without ever leaving it truncated.
///
/// The new contents go to a temporary file next to the target, which is then
/// renamed over it. The original file's permissions are carried over.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), UnitError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| UnitError::access(path, e))?;
    temp.write_all(contents.as_bytes())
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| UnitError::access(path, e))?;

    if let Ok(metadata) = std::fs::metadata(path) {
        temp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(|e| UnitError::access(path, e))?;
    }

    temp.persist(path)
        .map_err(|e| UnitError::access(path, e.error))?;
    Ok(())
}

/// Path shown in reports: relative to `root` when possible.
pub fn display_path(path: &Path, root: &Path) -> String {
    pathdiff::diff_paths(path, root)
        .filter(|relative| !relative.as_os_str().is_empty() && !relative.starts_with(".."))
        .unwrap_or_else(|| path.to_path_buf())
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_replaces_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("index.html");
        fs::write(&path, "old contents that are longer").unwrap();

        write_atomic(&path, "new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        // No stray temporary files
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_read_text_errors() {
        let temp_dir = TempDir::new().unwrap();

        let missing = temp_dir.path().join("missing.html");
        assert!(matches!(read_text(&missing), Err(UnitError::Access { .. })));

        let binary = temp_dir.path().join("binary.html");
        fs::write(&binary, [0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(read_text(&binary), Err(UnitError::Parse(_))));
    }

    #[test]
    fn test_display_path() {
        let root = Path::new("/site/docs");
        assert_eq!(
            display_path(Path::new("/site/docs/v1.0.0/index.html"), root),
            "v1.0.0/index.html"
        );
        assert_eq!(display_path(Path::new("/elsewhere/a.html"), root), "/elsewhere/a.html");
    }
}
