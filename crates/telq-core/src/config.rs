use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TelqError};

/// Backend endpoint and credentials.
///
/// Loaded from the config file first, then overridden by environment
/// variables, so `TELQ_ENDPOINT` / `TELQ_API_KEY` / `TELQ_APP_KEY` always win.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub app_key: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut cfg = load_file(&config_file_path())?.unwrap_or_default();
        apply_env_overrides(&mut cfg);
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(TelqError::Config(
                "endpoint is not set (use `telq configure` or set TELQ_ENDPOINT)".to_string(),
            ));
        }
        if self.api_key.is_empty() {
            return Err(TelqError::Config(
                "api key is not set (use `telq configure` or set TELQ_API_KEY)".to_string(),
            ));
        }
        if self.app_key.is_empty() {
            return Err(TelqError::Config(
                "application key is not set (use `telq configure` or set TELQ_APP_KEY)".to_string(),
            ));
        }
        Ok(())
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = config_file_path();
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let raw = toml::to_string_pretty(self)
            .map_err(|e| TelqError::Config(format!("encoding config: {e}")))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                TelqError::Config(format!("creating {}: {e}", parent.display()))
            })?;
        }
        fs::write(path, raw)
            .map_err(|e| TelqError::Config(format!("writing {}: {e}", path.display())))
    }
}

fn config_file_path() -> PathBuf {
    if let Ok(path) = env::var("TELQ_CONFIG") {
        return PathBuf::from(path);
    }

    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let config_home = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(home).join(".config"));
    config_home.join("telq/config.toml")
}

fn load_file(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| TelqError::Config(format!("failed reading {}: {e}", path.display())))?;
    let parsed: Config = toml::from_str(&raw)
        .map_err(|e| TelqError::Config(format!("failed parsing {}: {e}", path.display())))?;
    Ok(Some(parsed))
}

fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = env::var("TELQ_ENDPOINT") {
        cfg.endpoint = v;
    }
    if let Ok(v) = env::var("TELQ_API_KEY") {
        cfg.api_key = v;
    }
    if let Ok(v) = env::var("TELQ_APP_KEY") {
        cfg.app_key = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_config() -> Config {
        Config {
            endpoint: "https://telemetry.example.com".to_string(),
            api_key: "api".to_string(),
            app_key: "app".to_string(),
        }
    }

    #[test]
    fn validate_rejects_missing_fields() {
        assert!(full_config().validate().is_ok());

        let mut cfg = full_config();
        cfg.api_key.clear();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("TELQ_API_KEY"));

        let mut cfg = full_config();
        cfg.endpoint.clear();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        let cfg = full_config();
        cfg.save_to(&path).unwrap();

        let loaded = load_file(&path).unwrap().unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_file(&dir.path().join("absent.toml")).unwrap().is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "endpoint = [not toml").unwrap();
        assert!(load_file(&path).is_err());
    }
}
