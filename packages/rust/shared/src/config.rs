//! Application configuration for taxsync.
//!
//! User config lives at `~/.taxsync/taxsync.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TaxSyncError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "taxsync.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".taxsync";

// ---------------------------------------------------------------------------
// Config structs (matching taxsync.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote term store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// `[store]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the term store REST API.
    #[serde(default = "default_api_root")]
    pub api_root: String,

    /// Name of the env var holding the OAuth token (never store the token
    /// itself in the config file).
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_root: default_api_root(),
            token_env: default_token_env(),
        }
    }
}

fn default_api_root() -> String {
    "https://vault.example.edu/api".into()
}
fn default_token_env() -> String {
    "TAXSYNC_TOKEN".into()
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory for the taxonomy-list snapshot and run logs.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> String {
    "~/.taxsync/data".into()
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Directory holding the user config file.
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| TaxSyncError::config("cannot determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Full path to the user config file.
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load config from the default location; missing file yields defaults.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    load_config_from(&path)
}

/// Load config from an explicit path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let raw = std::fs::read_to_string(path).map_err(|e| TaxSyncError::io(path, e))?;
    toml::from_str(&raw)
        .map_err(|e| TaxSyncError::config(format!("invalid TOML in {}: {e}", path.display())))
}

/// Write a default config file if none exists; returns its path.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| TaxSyncError::io(&dir, e))?;
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        let default = toml::to_string_pretty(&AppConfig::default())
            .map_err(|e| TaxSyncError::config(format!("serialize default config: {e}")))?;
        std::fs::write(&path, default).map_err(|e| TaxSyncError::io(&path, e))?;
    }
    Ok(path)
}

/// Resolve the OAuth token from the configured env var.
pub fn resolve_token(config: &AppConfig) -> Result<String> {
    std::env::var(&config.store.token_env).map_err(|_| {
        TaxSyncError::config(format!(
            "no OAuth token found; set the {} environment variable",
            config.store.token_env
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_sections() {
        let config: AppConfig = toml::from_str("").expect("empty TOML parses");
        assert_eq!(config.store.token_env, "TAXSYNC_TOKEN");
        assert!(config.defaults.data_dir.contains(".taxsync"));
    }

    #[test]
    fn partial_config_overrides() {
        let config: AppConfig = toml::from_str(
            r#"
            [store]
            api_root = "https://vault.cca.edu/api"
            "#,
        )
        .expect("parse");
        assert_eq!(config.store.api_root, "https://vault.cca.edu/api");
        // unset keys keep their defaults
        assert_eq!(config.store.token_env, "TAXSYNC_TOKEN");
    }

    #[test]
    fn missing_token_env_is_config_error() {
        let mut config = AppConfig::default();
        config.store.token_env = "TAXSYNC_TEST_TOKEN_UNSET".into();
        let err = resolve_token(&config).unwrap_err();
        assert!(err.to_string().contains("TAXSYNC_TEST_TOKEN_UNSET"));
    }
}
