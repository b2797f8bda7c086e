use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::ClientConfig;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "TASKMATE_CONFIG";
/// Environment variable overriding `server.base_url`
pub const BASE_URL_ENV: &str = "TASKMATE_BASE_URL";

/// Error type for config and session file I/O
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("could not edit config: {0}")]
    EditError(#[from] toml_edit::TomlError),
    #[error("could not encode session: {0}")]
    EncodeError(#[from] serde_json::Error),
}

/// Get the config file path: `$TASKMATE_CONFIG`, else
/// `$XDG_CONFIG_HOME/taskmate/config.toml`, else `~/.config/taskmate/config.toml`
pub fn config_path() -> PathBuf {
    if let Ok(explicit) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(explicit);
    }
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| super::home_dir().join(".config"));
    config_dir.join("taskmate").join("config.toml")
}

/// Read config from a specific path. A missing file yields the defaults.
pub fn read_config_from(path: &Path) -> Result<ClientConfig, ConfigError> {
    if !path.exists() {
        return Ok(ClientConfig::default());
    }
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read config from the default location, with environment overrides applied
pub fn read_config() -> Result<ClientConfig, ConfigError> {
    let mut config = read_config_from(&config_path())?;
    apply_env(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Apply environment overrides, looked up through `lookup`
pub fn apply_env(config: &mut ClientConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(BASE_URL_ENV).filter(|u| !u.trim().is_empty()) {
        config.server.base_url = url;
    }
}

/// Set `server.base_url` in the config file, keeping the rest of the
/// document (comments, ordering) as it was.
pub fn set_base_url(path: &Path, base_url: &str) -> Result<(), ConfigError> {
    let text = if path.exists() {
        fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?
    } else {
        String::new()
    };
    let mut doc: toml_edit::DocumentMut = text.parse()?;
    if !doc.contains_key("server") {
        doc["server"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["server"]["base_url"] = toml_edit::value(base_url);
    super::write_atomic(path, &doc.to_string())
}
