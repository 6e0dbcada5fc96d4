//! Per-unit results of a run and their presentation.

use crate::error::UnitError;
use crate::navbar::Injection;
use crate::search_index::Rewrite;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

/// Kind of unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Page,
    SearchIndex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The file was rewritten.
    Updated,
    /// Nothing to change, the file was not written.
    Unchanged,
    /// The unit was skipped because of an error.
    Failed,
}

/// Result of processing one page or one search index.
#[derive(Debug, Clone, Serialize)]
pub struct UnitReport {
    pub path: PathBuf,
    /// Path relative to the site root
    pub relative_path: String,
    pub kind: UnitKind,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    pub message: String,
}

impl UnitReport {
    pub fn page(
        path: PathBuf,
        relative_path: String,
        result: Result<Injection, UnitError>,
    ) -> Self {
        match result {
            Ok(Injection::Inserted) => Self::success(
                path,
                relative_path,
                UnitKind::Page,
                Outcome::Updated,
                "versions dropdown inserted".to_string(),
            ),
            Ok(Injection::Replaced { removed }) => Self::success(
                path,
                relative_path,
                UnitKind::Page,
                Outcome::Updated,
                if removed == 0 {
                    "versions dropdown replaced".to_string()
                } else {
                    format!("versions dropdown replaced, {} duplicates removed", removed)
                },
            ),
            Err(e) => Self::failure(path, relative_path, UnitKind::Page, e),
        }
    }

    pub fn search_index(
        path: PathBuf,
        relative_path: String,
        result: Result<Rewrite, UnitError>,
    ) -> Self {
        match result {
            Ok(Rewrite::Updated { replacements }) => Self::success(
                path,
                relative_path,
                UnitKind::SearchIndex,
                Outcome::Updated,
                format!("{} URLs updated", replacements),
            ),
            Ok(Rewrite::Unchanged) => Self::success(
                path,
                relative_path,
                UnitKind::SearchIndex,
                Outcome::Unchanged,
                "no URLs to update".to_string(),
            ),
            Err(e) => Self::failure(path, relative_path, UnitKind::SearchIndex, e),
        }
    }

    fn success(
        path: PathBuf,
        relative_path: String,
        kind: UnitKind,
        outcome: Outcome,
        message: String,
    ) -> Self {
        Self {
            path,
            relative_path,
            kind,
            outcome,
            error: None,
            message,
        }
    }

    fn failure(path: PathBuf, relative_path: String, kind: UnitKind, error: UnitError) -> Self {
        Self {
            path,
            relative_path,
            kind,
            outcome: Outcome::Failed,
            error: Some(error.kind()),
            message: error.to_string(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.outcome == Outcome::Failed
    }
}

/// Output format of the run report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    /// One line per unit, failures on stderr
    #[default]
    Human,
    /// A single JSON document on stdout
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
}

/// Everything a run did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// References listed in the dropdown, in display order
    pub references: Vec<String>,
    pub units: Vec<UnitReport>,
}

impl RunReport {
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for unit in &self.units {
            match unit.outcome {
                Outcome::Updated => summary.updated += 1,
                Outcome::Unchanged => summary.unchanged += 1,
                Outcome::Failed => summary.failed += 1,
            }
        }
        summary
    }

    pub fn has_failures(&self) -> bool {
        self.units.iter().any(UnitReport::is_failure)
    }

    /// Process exit code: 0 when every unit succeeded, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.has_failures() {
            1
        } else {
            0
        }
    }

    pub fn write(
        &self,
        format: ReportFormat,
        out: &mut impl Write,
        err: &mut impl Write,
    ) -> io::Result<()> {
        match format {
            ReportFormat::Human => self.write_human(out, err),
            ReportFormat::Json => self.write_json(out),
        }
    }

    fn write_human(&self, out: &mut impl Write, err: &mut impl Write) -> io::Result<()> {
        for unit in &self.units {
            let path = unit.path.display();
            match (unit.kind, unit.outcome) {
                (_, Outcome::Failed) => writeln!(err, "❌ {}: {}", path, unit.message)?,
                (UnitKind::Page, _) => writeln!(out, "✅ {}", path)?,
                (UnitKind::SearchIndex, Outcome::Updated) => {
                    writeln!(out, "Updated URLs in {}", path)?
                }
                (UnitKind::SearchIndex, Outcome::Unchanged) => {
                    writeln!(out, "No URLs to update in {}", path)?
                }
            }
        }
        Ok(())
    }

    fn write_json(&self, out: &mut impl Write) -> io::Result<()> {
        #[derive(Serialize)]
        struct Document<'a> {
            summary: Summary,
            #[serde(flatten)]
            report: &'a RunReport,
        }

        let document = Document {
            summary: self.summary(),
            report: self,
        };
        serde_json::to_writer_pretty(&mut *out, &document)?;
        writeln!(out)
    }
}
