//! Configuration
//!
//! `GridConfig` is read from TOML; every key has a default so an empty file
//! is a valid configuration.
//!
//! ```toml
//! page_size = 25
//! display_field = "Name"
//! match_mode = "case_insensitive"
//! store_timeout_ms = 3000
//!
//! [default_sort]
//! field = "Name"
//! direction = "DESC"
//!
//! [log]
//! level = "debug"
//! format = "json"
//! ```

use grid_store::{MatchMode, SortSpec, DEFAULT_DISPLAY_FIELD};
use grid_view::ViewConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML is malformed
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// Value out of range
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable single-line events
    #[default]
    Compact,
    /// JSON lines
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Base level directive (`RUST_LOG` wins when set)
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Per-target level overrides
    pub targets: BTreeMap<String, String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            targets: BTreeMap::new(),
        }
    }
}

/// Table controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Rows per page
    pub page_size: usize,
    /// Field filters match against
    pub display_field: String,
    /// Case handling of the local filter
    pub match_mode: MatchMode,
    /// Sort applied before the user picks one
    pub default_sort: SortSpec,
    /// Per store call budget in milliseconds (0 disables)
    pub store_timeout_ms: u64,
    /// Refresh event channel name
    pub refresh_channel: String,
    /// Logging
    pub log: LogConfig,
}

impl GridConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML text and validate
    ///
    /// # Errors
    /// - `ConfigError::Parse` for malformed TOML
    /// - `ConfigError::Invalid` for out-of-range values
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - as [`GridConfig::from_toml_str`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// - `ConfigError::Invalid` for zero page size or blank field names
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1".into()));
        }
        if self.display_field.trim().is_empty() {
            return Err(ConfigError::Invalid("display_field must not be blank".into()));
        }
        if self.default_sort.field.trim().is_empty() {
            return Err(ConfigError::Invalid("default_sort.field must not be blank".into()));
        }
        Ok(())
    }

    /// With page size
    #[inline]
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// With match mode
    #[inline]
    #[must_use]
    pub fn with_match_mode(mut self, match_mode: MatchMode) -> Self {
        self.match_mode = match_mode;
        self
    }

    /// With store timeout in milliseconds
    #[inline]
    #[must_use]
    pub fn with_store_timeout_ms(mut self, millis: u64) -> Self {
        self.store_timeout_ms = millis;
        self
    }

    /// Store call budget, if enabled
    #[inline]
    #[must_use]
    pub fn store_timeout(&self) -> Option<Duration> {
        (self.store_timeout_ms > 0).then(|| Duration::from_millis(self.store_timeout_ms))
    }

    /// View settings derived from this configuration
    #[must_use]
    pub fn view_config(&self) -> ViewConfig {
        ViewConfig::new()
            .with_page_size(self.page_size)
            .with_display_field(self.display_field.clone())
            .with_match_mode(self.match_mode)
            .with_sort(self.default_sort.clone())
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            display_field: DEFAULT_DISPLAY_FIELD.to_string(),
            match_mode: MatchMode::CaseSensitive,
            default_sort: SortSpec::default(),
            store_timeout_ms: 5000,
            refresh_channel: "/event/RefreshDataTable__e".to_string(),
            log: LogConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_store::SortDirection;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_toml_is_default() {
        let config = GridConfig::from_toml_str("").unwrap();
        assert_eq!(config, GridConfig::default());
        assert_eq!(config.store_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn full_toml() {
        let config = GridConfig::from_toml_str(
            r#"
            page_size = 25
            match_mode = "case_insensitive"
            store_timeout_ms = 0

            [default_sort]
            field = "BillingCity"
            direction = "DESC"

            [log]
            level = "debug"
            format = "json"

            [log.targets]
            grid_store = "trace"
            "#,
        )
        .unwrap();

        assert_eq!(config.page_size, 25);
        assert_eq!(config.match_mode, MatchMode::CaseInsensitive);
        assert_eq!(config.default_sort.direction, SortDirection::Descending);
        assert_eq!(config.store_timeout(), None);
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.targets.get("grid_store").map(String::as_str), Some("trace"));
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(matches!(
            GridConfig::from_toml_str("page_size = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GridConfig::from_toml_str("display_field = \" \""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GridConfig::from_toml_str("page_size = \"ten\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.toml");
        std::fs::write(&path, "page_size = 3\n").unwrap();

        let config = GridConfig::load(&path).unwrap();
        assert_eq!(config.view_config().page_size, 3);

        let missing = GridConfig::load(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
