//! Discovery of reference (version/branch) directories.

use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;

/// Returns the names of the directories directly under `root` whose name
/// matches `pattern`, sorted for consistent results.
///
/// Non-UTF-8 names are skipped since they cannot be turned into URLs.
pub fn find_matching_directories(root: &Path, pattern: &Regex) -> Result<Vec<String>> {
    let mut matched = Vec::new();

    for entry in std::fs::read_dir(root)
        .with_context(|| format!("Failed to read directory: {}", root.display()))?
    {
        let entry = entry
            .with_context(|| format!("Failed to read directory entry in: {}", root.display()))?;

        // Follows symlinks, a linked version directory is still a version
        if !entry.path().is_dir() {
            continue;
        }

        match entry.file_name().into_string() {
            Ok(name) if pattern.is_match(&name) => matched.push(name),
            Ok(_) => {}
            Err(name) => {
                log::warn!("Skipping directory with non-UTF-8 name: {:?}", name);
            }
        }
    }

    matched.sort();
    log::debug!(
        "Found {} reference directories in {}",
        matched.len(),
        root.display()
    );

    Ok(matched)
}
