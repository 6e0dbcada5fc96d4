use anyhow::{Context, Result};
use dashmap::DashSet;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

use crate::config::RunConfig;
use crate::error::UnitError;
use crate::markup;
use crate::navbar;
use crate::ordering::{self, OrderedReferences};
use crate::report::{RunReport, UnitReport};
use crate::scanner;
use crate::search_index::{self, SEARCH_INDEX_FILE};
use crate::utils;

/// Drives one run over a multi-version site: every page gets the versions
/// dropdown, every version directory gets its search index rewritten.
pub struct MultiversionUpdater {
    config: RunConfig,
}

impl MultiversionUpdater {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Names of the directories under the root that match the pattern.
    pub fn reference_directories(&self) -> Result<Vec<String>> {
        scanner::find_matching_directories(&self.config.root, &self.config.pattern)
    }

    /// References in dropdown order.
    pub fn ordered_references(&self, directories: &[String]) -> OrderedReferences {
        ordering::order_references(directories, &self.config.refs_order)
    }

    pub fn run(&self) -> Result<RunReport> {
        let start_time = Instant::now();
        info!("Updating multi-version site in {}", self.config.root.display());

        let directories = self.reference_directories()?;
        let references = self.ordered_references(&directories);
        info!(
            "Found {} references: {}",
            references.len(),
            references.as_slice().join(", ")
        );

        // Rendered once, re-parsed for every page
        let dropdown = markup::render_versions_dropdown(&references, &self.config.base_url);

        let mut units = self.process_pages(&dropdown)?;
        units.extend(self.update_search_indexes(&directories));

        let report = RunReport {
            references: references.into_vec(),
            units,
        };

        let summary = report.summary();
        info!(
            "Run completed in {:?}: {} updated, {} unchanged, {} failed",
            start_time.elapsed(),
            summary.updated,
            summary.unchanged,
            summary.failed
        );
        Ok(report)
    }

    fn process_pages(&self, dropdown: &str) -> Result<Vec<UnitReport>> {
        let (pages, mut units) = self.discover_pages();
        info!(
            "Processing {} pages with {} parallel jobs",
            pages.len(),
            self.config.jobs
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.jobs)
            .build()
            .context("Failed to create worker pool")?;

        // Canonical paths, so a page reachable through a symlink is only done once
        let processed: DashSet<PathBuf> = DashSet::new();

        let reports: Vec<UnitReport> = pool.install(|| {
            pages
                .par_iter()
                .filter_map(|path| {
                    let key = path.canonicalize().unwrap_or_else(|_| path.clone());
                    if !processed.insert(key.clone()) {
                        debug!("Skipping already processed page {}", path.display());
                        return None;
                    }

                    // Rewriting the link target keeps symlinks intact
                    let result = navbar::process_page(&key, dropdown);
                    Some(UnitReport::page(path.clone(), self.relative(path), result))
                })
                .collect()
        });

        units.extend(reports);
        units.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(units)
    }

    /// All `*.html` files under the root. Directories that cannot be read are
    /// returned as failed units.
    fn discover_pages(&self) -> (Vec<PathBuf>, Vec<UnitReport>) {
        let mut pages = Vec::new();
        let mut failures = Vec::new();

        for entry in WalkDir::new(&self.config.root).sort_by_file_name() {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    let is_html = path
                        .extension()
                        .map(|ext| ext == "html")
                        .unwrap_or(false);
                    if is_html && path.is_file() {
                        pages.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.config.root.clone());
                    warn!("Failed to walk {}: {}", path.display(), e);

                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
                    failures.push(UnitReport::page(
                        path.clone(),
                        self.relative(&path),
                        Err(UnitError::access(&path, source)),
                    ));
                }
            }
        }

        (pages, failures)
    }

    fn update_search_indexes(&self, directories: &[String]) -> Vec<UnitReport> {
        directories
            .iter()
            .filter_map(|version| {
                let path = self.config.root.join(version).join(SEARCH_INDEX_FILE);
                if !path.is_file() {
                    debug!("No {} in {}", SEARCH_INDEX_FILE, version);
                    return None;
                }

                let result =
                    search_index::update_search_index(&path, version, &self.config.base_url);
                Some(UnitReport::search_index(path.clone(), self.relative(&path), result))
            })
            .collect()
    }

    fn relative(&self, path: &Path) -> String {
        utils::display_path(path, &self.config.root)
    }
}
