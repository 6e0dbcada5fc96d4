//! Run settings.
//!
//! Settings are layered: an optional settings file, then `DOCS_MULTIVERSION_*`
//! environment variables, then command-line overrides. [`Settings::validate`]
//! turns the merged layer into a [`RunConfig`] and fails fast on anything that
//! would make the run meaningless.

use crate::error::ConfigError;
use config::{Config, Environment, File};
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Prefix of the environment variables read by [`Settings::load`].
pub const ENV_PREFIX: &str = "DOCS_MULTIVERSION";

/// One layer of partially specified settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// Root of the generated multi-version site
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// Regular expression matched against the start of directory names
    #[serde(default)]
    pub pattern: Option<String>,
    /// References that always appear first, in this order
    #[serde(default)]
    pub refs_order: Option<Vec<String>>,
    /// Base URL prepended to every reference in the dropdown
    #[serde(default)]
    pub base_url: Option<String>,
    /// Number of worker threads used for page processing
    #[serde(default)]
    pub jobs: Option<usize>,
}

impl Settings {
    /// Load settings from an optional file and the environment.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = config_file {
            log::debug!("Loading settings from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("refs_order"),
        );

        let settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    /// Overlay `overrides` on top of `self`; set fields in `overrides` win.
    pub fn merge(self, overrides: Settings) -> Self {
        Self {
            directory: overrides.directory.or(self.directory),
            pattern: overrides.pattern.or(self.pattern),
            refs_order: overrides.refs_order.or(self.refs_order),
            base_url: overrides.base_url.or(self.base_url),
            jobs: overrides.jobs.or(self.jobs),
        }
    }

    /// Check the merged settings and compile them into a [`RunConfig`].
    pub fn validate(self) -> Result<RunConfig, ConfigError> {
        let root = self.directory.ok_or(ConfigError::Missing("directory"))?;
        let pattern = self.pattern.ok_or(ConfigError::Missing("pattern"))?;
        let refs_order = self.refs_order.ok_or(ConfigError::Missing("refs_order"))?;
        let base_url = self.base_url.ok_or(ConfigError::Missing("base_url"))?;

        if base_url.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if !root.is_dir() {
            return Err(ConfigError::MissingRoot(root));
        }

        let jobs = self.jobs.unwrap_or(1);
        if jobs == 0 {
            return Err(ConfigError::InvalidJobs);
        }

        // Names only need to match at their start
        let regex = Regex::new(&format!("^(?:{})", pattern))
            .map_err(|source| ConfigError::InvalidPattern { pattern, source })?;

        Ok(RunConfig {
            root,
            pattern: regex,
            refs_order,
            base_url,
            jobs,
        })
    }
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub root: PathBuf,
    pub pattern: Regex,
    pub refs_order: Vec<String>,
    pub base_url: String,
    pub jobs: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn complete(root: &Path) -> Settings {
        Settings {
            directory: Some(root.to_path_buf()),
            pattern: Some(r"v\d+".to_string()),
            refs_order: Some(vec!["main".to_string()]),
            base_url: Some("https://example.org/pkg/".to_string()),
            jobs: None,
        }
    }

    #[test]
    fn test_validate_complete_settings() {
        let temp_dir = TempDir::new().unwrap();
        let config = complete(temp_dir.path()).validate().unwrap();

        assert_eq!(config.jobs, 1);
        assert_eq!(config.refs_order, vec!["main"]);
        assert!(config.pattern.is_match("v1.0.0"));
        // Anchored at the start only
        assert!(config.pattern.is_match("v2-rc"));
        assert!(!config.pattern.is_match("pre-v1"));
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        let temp_dir = TempDir::new().unwrap();

        let mut settings = complete(temp_dir.path());
        settings.base_url = Some(String::new());
        assert!(matches!(settings.validate(), Err(ConfigError::EmptyBaseUrl)));

        let mut settings = complete(temp_dir.path());
        settings.pattern = Some("v(".to_string());
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidPattern { .. })
        ));

        let mut settings = complete(temp_dir.path());
        settings.jobs = Some(0);
        assert!(matches!(settings.validate(), Err(ConfigError::InvalidJobs)));

        let mut settings = complete(temp_dir.path());
        settings.directory = Some(temp_dir.path().join("missing"));
        assert!(matches!(settings.validate(), Err(ConfigError::MissingRoot(_))));

        let mut settings = complete(temp_dir.path());
        settings.refs_order = None;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::Missing("refs_order"))
        ));
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let base = Settings {
            pattern: Some("v.*".to_string()),
            base_url: Some("https://file/".to_string()),
            jobs: Some(4),
            ..Default::default()
        };
        let overrides = Settings {
            base_url: Some("https://cli/".to_string()),
            ..Default::default()
        };

        let merged = base.merge(overrides);
        assert_eq!(merged.pattern.as_deref(), Some("v.*"));
        assert_eq!(merged.base_url.as_deref(), Some("https://cli/"));
        assert_eq!(merged.jobs, Some(4));
    }

    #[test]
    fn test_load_from_yaml_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("versions.yaml");
        fs::write(
            &path,
            "pattern: \"^(main|v.*)$\"\nrefs_order:\n  - main\n  - latest\nbase_url: https://x/\njobs: 2\n",
        )
        .unwrap();

        let settings = Settings::load(Some(path.as_path())).unwrap();
        assert_eq!(settings.pattern.as_deref(), Some("^(main|v.*)$"));
        assert_eq!(
            settings.refs_order,
            Some(vec!["main".to_string(), "latest".to_string()])
        );
        assert_eq!(settings.base_url.as_deref(), Some("https://x/"));
        assert_eq!(settings.jobs, Some(2));
    }
}
