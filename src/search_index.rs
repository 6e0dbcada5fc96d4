//! Version prefixing of URLs in per-version search indexes.
//!
//! Each version directory carries its own `search.json` whose URLs point at
//! the site root. They are rewritten to point into the version directory.
//! The document is treated as plain text, so any occurrence of the base URL
//! is rewritten, including occurrences inside unrelated string values.

use crate::error::UnitError;
use crate::utils;
use serde::Serialize;
use std::path::Path;

/// File name of the search index inside a version directory.
pub const SEARCH_INDEX_FILE: &str = "search.json";

/// Outcome of rewriting one search index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rewrite {
    /// URLs were rewritten and the file was written back.
    Updated { replacements: usize },
    /// Every URL already pointed into the version, nothing was written.
    Unchanged,
}

/// Insert `version/` after every `base_url` in `text` that is not already
/// followed by `version`. Returns the new text and the number of rewritten
/// occurrences.
///
/// Matches are found left to right without overlap. `base_url` must not be
/// empty.
pub fn rewrite_urls(text: &str, version: &str, base_url: &str) -> (String, usize) {
    if base_url.is_empty() {
        return (text.to_string(), 0);
    }

    let mut output = String::with_capacity(text.len());
    let mut replacements = 0;
    let mut last = 0;

    for (start, _) in text.match_indices(base_url) {
        let end = start + base_url.len();
        output.push_str(&text[last..end]);
        last = end;

        if !text[end..].starts_with(version) {
            output.push_str(version);
            output.push('/');
            replacements += 1;
        }
    }
    output.push_str(&text[last..]);

    (output, replacements)
}

/// Rewrite the search index at `path` for `version`, writing it back only when
/// something changed.
pub fn update_search_index(
    path: &Path,
    version: &str,
    base_url: &str,
) -> Result<Rewrite, UnitError> {
    let contents = utils::read_text(path)?;
    let (updated, replacements) = rewrite_urls(&contents, version, base_url);

    if replacements == 0 {
        log::debug!("No URLs to update in {}", path.display());
        return Ok(Rewrite::Unchanged);
    }

    utils::write_atomic(path, &updated)?;
    log::debug!("Rewrote {} URLs in {}", replacements, path.display());
    Ok(Rewrite::Updated { replacements })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_rewrite_unversioned_url() {
        let (text, count) = rewrite_urls("https://x/page", "v1.0.0", "https://x/");
        assert_eq!(text, "https://x/v1.0.0/page");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_versioned_url_is_left_alone() {
        let (text, count) = rewrite_urls("https://x/v1.0.0/page", "v1.0.0", "https://x/");
        assert_eq!(text, "https://x/v1.0.0/page");
        assert_eq!(count, 0);
    }

    #[test]
    fn test_rewrite_search_document() {
        let document = r#"[{"path":"https://x/index.html","title":"Home"},{"path":"https://x/v1.0.0/news.html","title":"News"},{"path":"https://x/reference/f.html","text":"see https://x/"}]"#;
        let (text, count) = rewrite_urls(document, "v1.0.0", "https://x/");

        assert_eq!(count, 3);
        assert_eq!(
            text,
            r#"[{"path":"https://x/v1.0.0/index.html","title":"Home"},{"path":"https://x/v1.0.0/news.html","title":"News"},{"path":"https://x/v1.0.0/reference/f.html","text":"see https://x/v1.0.0/"}]"#
        );

        // A second pass changes nothing
        assert_eq!(rewrite_urls(&text, "v1.0.0", "https://x/"), (text.clone(), 0));
    }

    #[test]
    fn test_version_prefix_counts_as_versioned() {
        // Only the text after the base URL is checked, not a full path segment
        let (text, count) = rewrite_urls("https://x/v1.0.0-rc/page", "v1.0.0", "https://x/");
        assert_eq!(text, "https://x/v1.0.0-rc/page");
        assert_eq!(count, 0);
    }

    #[test]
    fn test_update_search_index_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(SEARCH_INDEX_FILE);
        fs::write(&path, r#"[{"path":"https://x/a.html"}]"#).unwrap();

        assert_eq!(
            update_search_index(&path, "main", "https://x/").unwrap(),
            Rewrite::Updated { replacements: 1 }
        );
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            r#"[{"path":"https://x/main/a.html"}]"#
        );
        assert_eq!(
            update_search_index(&path, "main", "https://x/").unwrap(),
            Rewrite::Unchanged
        );
    }

    #[test]
    fn test_missing_search_index_is_access_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(SEARCH_INDEX_FILE);
        let result = update_search_index(&path, "main", "https://x/");
        assert!(matches!(result, Err(UnitError::Access { .. })));
    }
}
