//! Optional TOML defaults for the `run` command.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{InfectionError, Result};
use crate::infection::InfectionType;
use crate::output::OutputFormat;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run: RunSettings,
}

/// Defaults applied when the matching flag is not given on the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSettings {
    #[serde(rename = "type", default)]
    pub kind: Option<InfectionType>,

    #[serde(default)]
    pub data: Option<String>,

    #[serde(default)]
    pub infect: Option<String>,

    #[serde(default)]
    pub max: Option<usize>,

    /// Seed for randomly weighted relationships.
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default = "default_true")]
    pub color: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        RunSettings {
            kind: None,
            data: None,
            infect: None,
            max: None,
            seed: None,
            format: OutputFormat::default(),
            color: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            InfectionError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_settings() {
        let config = Config::parse(
            r#"
            [run]
            type = "limited"
            infect = "Dan"
            max = 5
            seed = 42
            format = "json"
            color = false
            "#,
        )
        .unwrap();
        assert_eq!(config.run.kind, Some(InfectionType::Limited));
        assert_eq!(config.run.infect.as_deref(), Some("Dan"));
        assert_eq!(config.run.max, Some(5));
        assert_eq!(config.run.seed, Some(42));
        assert_eq!(config.run.format, OutputFormat::Json);
        assert!(!config.run.color);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert!(config.run.kind.is_none());
        assert_eq!(config.run.format, OutputFormat::Text);
        assert!(config.run.color);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let err = Config::parse("[run]\ntype = \"viral\"\n").unwrap_err();
        assert!(matches!(err, InfectionError::Toml(_)));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Config::load("/nonexistent/infect.toml").unwrap_err();
        assert!(matches!(err, InfectionError::Config(_)));
    }
}
