//! Docs Multiversion
//!
//! Post-processing for multi-version documentation sites: injects a versions
//! dropdown into the navigation bar of every page and points the URLs of each
//! version's search index into that version's directory.

pub mod config;
pub mod error;
pub mod markup;
pub mod navbar;
pub mod ordering;
pub mod report;
pub mod scanner;
pub mod search_index;
pub mod updater;
pub mod utils;

pub use crate::config::{RunConfig, Settings};
pub use error::{ConfigError, UnitError};
pub use markup::{render_versions_dropdown, WIDGET_MARKER};
pub use navbar::{inject_versions_dropdown, InjectedPage, Injection};
pub use ordering::{order_references, OrderedReferences, SortKey};
pub use report::{Outcome, ReportFormat, RunReport, UnitKind, UnitReport};
pub use search_index::{rewrite_urls, update_search_index, Rewrite};
pub use updater::MultiversionUpdater;
