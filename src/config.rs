use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::api::FieldName;
use crate::constants::{DEFAULT_API_URL, DEFAULT_LIMIT};
use crate::route::SearchDefaults;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the capture server's API.
    #[serde(default = "default_api_url")]
    pub url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Messages per page. Clamped to at least 1 on load.
    #[serde(default = "default_limit")]
    pub limit: u64,
    /// Restrict searches to the last N days; 0 means unbounded.
    #[serde(default)]
    pub days: u32,
    /// Header locations to search, in display order.
    #[serde(default = "default_fields")]
    pub fields: Vec<FieldName>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            days: 0,
            fields: default_fields(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

fn default_fields() -> Vec<FieldName> {
    vec![FieldName::From, FieldName::To, FieldName::Subject]
}

impl Config {
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join("mailpeek"))
            .context("Could not determine config directory")
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load the config file, falling back to defaults when it is absent.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(Self::config_dir()?)?;
        Ok(())
    }

    /// The carried-forward search state handed to the controllers. Dedupes
    /// the field list while preserving its order and clamps the limit.
    pub fn search_defaults(&self) -> SearchDefaults {
        let mut locations: Vec<FieldName> = Vec::new();
        for field in &self.search.fields {
            if !locations.contains(field) {
                locations.push(*field);
            }
        }
        if locations.is_empty() {
            locations = default_fields();
        }
        SearchDefaults {
            limit: self.search.limit.max(1),
            locations,
            days: self.search.days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_sections_absent() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.api.url, DEFAULT_API_URL);
        let defaults = config.search_defaults();
        assert_eq!(defaults.limit, DEFAULT_LIMIT);
        assert_eq!(defaults.days, 0);
        assert_eq!(
            defaults.locations,
            vec![FieldName::From, FieldName::To, FieldName::Subject]
        );
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [api]
            url = "http://mail.test:9000/api"

            [search]
            limit = 50
            days = 7
            fields = ["Subject", "Body"]
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api.url, "http://mail.test:9000/api");
        let defaults = config.search_defaults();
        assert_eq!(defaults.limit, 50);
        assert_eq!(defaults.days, 7);
        assert_eq!(defaults.locations, vec![FieldName::Subject, FieldName::Body]);
    }

    #[test]
    fn test_duplicate_fields_are_deduped_in_order() {
        let toml = r#"
            [search]
            fields = ["To", "From", "To", "Subject", "From"]
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.search_defaults().locations,
            vec![FieldName::To, FieldName::From, FieldName::Subject]
        );
    }

    #[test]
    fn test_zero_limit_is_clamped() {
        let config: Config = toml::from_str("[search]\nlimit = 0").unwrap();
        assert_eq!(config.search_defaults().limit, 1);
    }
}
