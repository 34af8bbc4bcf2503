// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FlexION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Configuration for the analytics engine and the per-country feed table.
//!
//! Loaded from `flexion.toml`; missing files fall back to defaults. A few
//! analysis parameters can be overridden from the environment.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use flexion_types::Metric;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::feeds::{FeedKind, FeedRole};
use crate::flexibility::{DEFAULT_WINDOWS, MIN_HOURLY_POINTS};
use crate::hybrid::EstimationPolicy;
use crate::summary::DEFAULT_SUMMARY_DAYS;

pub const DEFAULT_CONFIG_PATH: &str = "flexion.toml";

fn default_windows() -> Vec<u32> {
    DEFAULT_WINDOWS.to_vec()
}

fn default_min_hourly_points() -> usize {
    MIN_HOURLY_POINTS
}

fn default_summary_days() -> u32 {
    DEFAULT_SUMMARY_DAYS
}

/// Parameters shared by the batch and interactive paths
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Flexibility windows to evaluate (hours)
    #[serde(default = "default_windows")]
    pub windows: Vec<u32>,

    /// Minimum hourly observations for an exact computation
    #[serde(default = "default_min_hourly_points")]
    pub min_hourly_points: usize,

    /// Days covered by the summary average
    #[serde(default = "default_summary_days")]
    pub summary_days: u32,

    /// Fallback heuristic for sparse periods
    #[serde(default)]
    pub estimation: EstimationPolicy,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            windows: default_windows(),
            min_hourly_points: MIN_HOURLY_POINTS,
            summary_days: DEFAULT_SUMMARY_DAYS,
            estimation: EstimationPolicy::default(),
        }
    }
}

/// One feed of one country
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    pub metric: Metric,
    pub kind: FeedKind,

    /// Relative paths resolve against the config file's directory
    pub path: PathBuf,

    #[serde(default)]
    pub role: FeedRole,

    #[serde(default)]
    pub priority: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryConfig {
    /// Bidding zone or ISO country code ("DE", "CZ", ...)
    pub code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub analysis: AnalysisSettings,

    #[serde(default)]
    pub countries: Vec<CountryConfig>,

    /// Directory relative feed paths resolve against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl AppConfig {
    /// Load from a TOML file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let mut config = Self::from_toml(&content)?;
            config.base_dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            info!(
                "Loaded configuration from {} ({} countries)",
                path.display(),
                config.countries.len()
            );
            config
        } else {
            warn!("Config {} not found, using defaults", path.display());
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `FLEXION_*` overrides; unparsable values are ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup("FLEXION_SUMMARY_DAYS") {
            match raw.trim().parse() {
                Ok(days) => self.analysis.summary_days = days,
                Err(_) => warn!("Ignoring invalid FLEXION_SUMMARY_DAYS={raw}"),
            }
        }

        if let Some(raw) = lookup("FLEXION_MIN_HOURLY_POINTS") {
            match raw.trim().parse() {
                Ok(points) => self.analysis.min_hourly_points = points,
                Err(_) => warn!("Ignoring invalid FLEXION_MIN_HOURLY_POINTS={raw}"),
            }
        }

        if let Some(raw) = lookup("FLEXION_WINDOWS") {
            match parse_windows(&raw) {
                Some(windows) => self.analysis.windows = windows,
                None => warn!("Ignoring invalid FLEXION_WINDOWS={raw}"),
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let analysis = &self.analysis;
        if analysis.windows.is_empty() {
            return Err(ConfigError::Invalid(
                "analysis.windows must list at least one window".to_owned(),
            ));
        }
        if analysis.min_hourly_points == 0 {
            return Err(ConfigError::Invalid(
                "analysis.min_hourly_points must be positive".to_owned(),
            ));
        }
        if analysis.summary_days == 0 {
            return Err(ConfigError::Invalid(
                "analysis.summary_days must be positive".to_owned(),
            ));
        }
        if let Some(bad) = analysis
            .estimation
            .fractions
            .iter()
            .find(|f| !(0.0..=1.0).contains(&f.fraction))
        {
            return Err(ConfigError::Invalid(format!(
                "estimation fraction for {}h must be within [0, 1], got {}",
                bad.window_hours, bad.fraction
            )));
        }

        let mut seen = HashSet::new();
        for country in &self.countries {
            if country.code.trim().is_empty() {
                return Err(ConfigError::Invalid("country code must not be empty".to_owned()));
            }
            if !seen.insert(country.code.trim().to_ascii_uppercase()) {
                return Err(ConfigError::Invalid(format!(
                    "country {} configured twice",
                    country.code
                )));
            }
        }

        Ok(())
    }

    pub fn country(&self, code: &str) -> Option<&CountryConfig> {
        self.countries
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code))
    }

    /// Resolve a feed path against the config directory
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

/// "1, 2,4" -> [1, 2, 4]; None if any entry is not a number or the list is empty
pub fn parse_windows(raw: &str) -> Option<Vec<u32>> {
    let windows: Option<Vec<u32>> = raw
        .split(',')
        .map(|w| w.trim().trim_end_matches('h').parse().ok())
        .collect();
    windows.filter(|w| !w.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[analysis]
windows = [1, 3]
summary_days = 14

[[analysis.estimation.fractions]]
window_hours = 1
fraction = 0.2

[[countries]]
code = "DE"
name = "Germany"

[[countries.feeds]]
metric = "price"
kind = "csv"
path = "data/de_price.csv"

[[countries.feeds]]
metric = "price"
kind = "json"
path = "live/de_price.json"
role = "live"
priority = 10
"#;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.analysis.windows, vec![1, 2, 4, 8]);
        assert_eq!(config.analysis.min_hourly_points, 24);
        assert_eq!(config.analysis.summary_days, 7);
        assert_eq!(config.analysis.estimation.fractions.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_sample() {
        let config = AppConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(config.analysis.windows, vec![1, 3]);
        assert_eq!(config.analysis.min_hourly_points, 24);
        assert_eq!(config.analysis.summary_days, 14);

        let de = config.country("de").unwrap();
        assert_eq!(de.feeds.len(), 2);
        assert_eq!(de.feeds[0].role, FeedRole::Archive);
        assert_eq!(de.feeds[0].priority, 0);
        assert_eq!(de.feeds[1].role, FeedRole::Live);
        assert_eq!(de.feeds[1].kind, FeedKind::Json);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AppConfig::from_toml(SAMPLE).unwrap();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let back = AppConfig::from_toml(&serialized).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_load_sets_base_dir() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        let resolved = config.resolve_path(Path::new("data/de_price.csv"));
        assert_eq!(
            resolved,
            file.path().parent().unwrap().join("data/de_price.csv")
        );
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load(Path::new("/nonexistent/flexion.toml")).unwrap();
        assert!(config.countries.is_empty());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("FLEXION_SUMMARY_DAYS", "30"),
            ("FLEXION_WINDOWS", "1h, 6h,12"),
            ("FLEXION_MIN_HOURLY_POINTS", "many"),
        ]);
        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| (*v).to_owned()));

        assert_eq!(config.analysis.summary_days, 30);
        assert_eq!(config.analysis.windows, vec![1, 6, 12]);
        assert_eq!(config.analysis.min_hourly_points, 24);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.analysis.windows.clear();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.analysis.estimation.fractions[0].fraction = 1.5;
        assert!(config.validate().is_err());

        let config = AppConfig::from_toml(
            r#"
[[countries]]
code = "FR"
[[countries]]
code = "FR"
"#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_example_config_is_valid() {
        let config = AppConfig::from_toml(include_str!("../../../flexion.example.toml")).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.analysis.estimation, EstimationPolicy::default());
        assert_eq!(config.countries.len(), 2);
    }

    #[test]
    fn test_parse_windows() {
        assert_eq!(parse_windows("1,2,4"), Some(vec![1, 2, 4]));
        assert_eq!(parse_windows("1,x"), None);
        assert_eq!(parse_windows(""), None);
    }
}
