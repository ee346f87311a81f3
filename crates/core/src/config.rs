//! Configuration management
//!
//! This module handles loading, saving, and migrating the dsync configuration
//! file. The configuration file is stored in TOML format at
//! ~/.config/dsync/config.toml; the directory can be overridden with the
//! DSYNC_CONFIG_DIR environment variable.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Current configuration schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Default output format
const DEFAULT_OUTPUT: &str = "human";

/// Default download chunk size in MiB
const DEFAULT_CHUNK_SIZE_MIB: u64 = 4;

/// Default root folder name in the remote store
const DEFAULT_ROOT_FOLDER: &str = "drivesync";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schema version for migration support
    pub schema_version: u32,

    /// Default settings
    #[serde(default)]
    pub defaults: Defaults,

    /// Remote store profile
    #[serde(default)]
    pub remote: Remote,
}

/// Default settings for CLI behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    /// Output format: "human" or "json"
    #[serde(default = "default_output")]
    pub output: String,

    /// Show progress bars
    #[serde(default = "default_true")]
    pub progress: bool,

    /// Download chunk size in MiB
    #[serde(default = "default_chunk_size")]
    pub chunk_size_mib: u64,
}

/// Remote store profile: where the folder hierarchy lives and where the
/// session token is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Remote {
    /// Name of the root folder that holds the category folders
    #[serde(default = "default_root_folder")]
    pub root_folder: String,

    /// Path to the OAuth client secrets file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_path: Option<PathBuf>,

    /// Path to the persisted session token file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_path: Option<PathBuf>,
}

fn default_output() -> String {
    DEFAULT_OUTPUT.to_string()
}

fn default_true() -> bool {
    true
}

fn default_chunk_size() -> u64 {
    DEFAULT_CHUNK_SIZE_MIB
}

fn default_root_folder() -> String {
    DEFAULT_ROOT_FOLDER.to_string()
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            progress: true,
            chunk_size_mib: default_chunk_size(),
        }
    }
}

impl Default for Remote {
    fn default() -> Self {
        Self {
            root_folder: default_root_folder(),
            credentials_path: None,
            token_path: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            defaults: Defaults::default(),
            remote: Remote::default(),
        }
    }
}

impl Config {
    /// Effective download chunk size in bytes
    pub fn chunk_size(&self) -> u64 {
        self.defaults.chunk_size_mib.max(1) * 1024 * 1024
    }

    /// Effective token file path (next to the config file by default)
    pub fn token_path(&self, config_dir: &std::path::Path) -> PathBuf {
        self.remote
            .token_path
            .clone()
            .unwrap_or_else(|| config_dir.join("token.json"))
    }
}

/// Configuration manager handles loading and saving config
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the default config path
    ///
    /// Honors the DSYNC_CONFIG_DIR environment variable when set.
    pub fn new() -> Result<Self> {
        let config_dir = match std::env::var_os("DSYNC_CONFIG_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .ok_or_else(|| Error::Config("Could not determine config directory".into()))?
                .join("dsync"),
        };
        Ok(Self {
            config_path: config_dir.join("config.toml"),
        })
    }

    /// Create a ConfigManager with a custom path (useful for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Get the directory holding the configuration file
    pub fn config_dir(&self) -> PathBuf {
        self.config_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Load configuration from disk
    ///
    /// If the configuration file doesn't exist, returns a default configuration.
    /// If the schema version doesn't match, attempts migration.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        if config.schema_version < SCHEMA_VERSION {
            config = self.migrate(config)?;
        } else if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Configuration file version {} is newer than supported version {}. Please upgrade dsync.",
                config.schema_version, SCHEMA_VERSION
            )));
        }

        Ok(config)
    }

    /// Save configuration to disk
    ///
    /// Creates parent directories if they don't exist.
    /// Sets file permissions to 600 (owner read/write only).
    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(config)?;
        std::fs::write(&self.config_path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.config_path, permissions)?;
        }

        Ok(())
    }

    /// Migrate configuration from older schema version
    fn migrate(&self, config: Config) -> Result<Config> {
        let mut config = config;

        // Add migration logic here when schema version is bumped

        config.schema_version = SCHEMA_VERSION;
        Ok(config)
    }
}
