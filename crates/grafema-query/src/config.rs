//! Project configuration (§6): `.grafema/config.yaml`, with legacy
//! `config.json` accepted under a deprecation warning. Parse errors on
//! either source fall back to defaults rather than aborting the run.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io { path: String, source: std::io::Error },

    #[error("failed to parse {path} as YAML: {source}")]
    Yaml { path: String, source: serde_yaml::Error },

    #[error("failed to parse {path} as JSON: {source}")]
    Json { path: String, source: serde_json::Error },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PluginsConfig {
    #[serde(default)]
    pub discovery: Vec<String>,
    #[serde(default)]
    pub indexing: Vec<String>,
    #[serde(default)]
    pub analysis: Vec<String>,
    #[serde(default)]
    pub enrichment: Vec<String>,
    #[serde(default)]
    pub validation: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
    pub name: String,
    pub path: String,
    #[serde(rename = "entryPoint", default)]
    pub entry_point: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkspaceSection {
    #[serde(default)]
    pub roots: Vec<String>,
}

/// `{plugins, include, exclude, services, workspace}` (§6). Missing
/// sections inherit defaults via `#[serde(default)]` on every field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub plugins: PluginsConfig,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
    #[serde(default)]
    pub workspace: WorkspaceSection,
}

/// Loads `<project>/.grafema/config.yaml`, falling back to the legacy
/// `<project>/config.json` with a deprecation warning, and finally to
/// `Config::default()` when neither exists or parsing fails (§6: "Parse
/// errors log a warning and fall back to defaults").
pub fn load_config(project_root: &Path) -> Config {
    let yaml_path = project_root.join(".grafema").join("config.yaml");
    if yaml_path.is_file() {
        match read_yaml(&yaml_path) {
            Ok(config) => return config,
            Err(err) => {
                tracing::warn!(error = %err, "failed to parse .grafema/config.yaml, using defaults");
                return Config::default();
            }
        }
    }

    let json_path = project_root.join("config.json");
    if json_path.is_file() {
        tracing::warn!("config.json is deprecated, migrate to .grafema/config.yaml");
        match read_json(&json_path) {
            Ok(config) => return config,
            Err(err) => {
                tracing::warn!(error = %err, "failed to parse config.json, using defaults");
                return Config::default();
            }
        }
    }

    Config::default()
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.display().to_string(), source })?;
    serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml { path: path.display().to_string(), source })
}

fn read_json(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.display().to_string(), source })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Json { path: path.display().to_string(), source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config(dir.path());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn yaml_config_is_parsed() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".grafema")).unwrap();
        fs::write(
            dir.path().join(".grafema/config.yaml"),
            "plugins:\n  analysis: [walker-analysis]\ninclude: [\"src/**/*.ts\"]\n",
        )
        .unwrap();

        let config = load_config(dir.path());
        assert_eq!(config.plugins.analysis, vec!["walker-analysis".to_string()]);
        assert_eq!(config.include, vec!["src/**/*.ts".to_string()]);
    }

    #[test]
    fn legacy_json_config_is_still_accepted() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("config.json"), r#"{"include": ["a.js"]}"#).unwrap();

        let config = load_config(dir.path());
        assert_eq!(config.include, vec!["a.js".to_string()]);
    }

    #[test]
    fn malformed_yaml_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".grafema")).unwrap();
        fs::write(dir.path().join(".grafema/config.yaml"), "plugins: [this is not a mapping").unwrap();

        let config = load_config(dir.path());
        assert_eq!(config, Config::default());
    }
}
