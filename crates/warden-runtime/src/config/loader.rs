//! Configuration loader using figment.
//!
//! Layered sources, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. The first `warden.toml` / `warden.yaml` / `warden.yml` found in
//!    the search paths (current directory, then the user config
//!    directory)
//! 3. Environment variables with the `WARDEN_` prefix, `__` as the
//!    nesting separator (`WARDEN_MODERATION__SPAM_THRESHOLD=3` →
//!    `moderation.spam_threshold = 3`)
//!
//! The loaded configuration is validated before being returned.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml, Yaml};
use tracing::{debug, info, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::WardenConfig;
use super::validation::validate_config;

const FILE_NAMES: &[&str] = &["warden.toml", "warden.yaml", "warden.yml"];

/// Configuration loader with figment-based multi-source support.
pub struct ConfigLoader {
    search_paths: Vec<PathBuf>,
    config_file: Option<PathBuf>,
    load_env: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader with the default search paths and environment
    /// overrides enabled.
    pub fn new() -> Self {
        Self {
            search_paths: Vec::new(),
            config_file: None,
            load_env: true,
        }
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Sets a specific configuration file to load, bypassing the search.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Disables environment variable overrides.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Loads, validates and returns the configuration.
    pub fn load(self) -> ConfigResult<WardenConfig> {
        let figment = self.build_figment()?;
        let config: WardenConfig = figment
            .extract()
            .map_err(|e| ConfigError::Extract(e.to_string()))?;

        validate_config(&config)?;
        debug!(level = %config.logging.level, "configuration loaded");
        Ok(config)
    }

    fn build_figment(self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(WardenConfig::default()));

        if let Some(path) = &self.config_file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
            info!(path = %path.display(), "loading configuration file");
            figment = merge_file(figment, path)?;
        } else if let Some(path) = self.find_config_file() {
            info!(path = %path.display(), "loading configuration file");
            figment = merge_file(figment, &path)?;
        } else {
            warn!("no configuration file found, using defaults");
        }

        if self.load_env {
            figment = figment.merge(
                Env::prefixed("WARDEN_")
                    .split("__")
                    .map(|key| key.as_str().replace("__", ".").into()),
            );
        }

        Ok(figment)
    }

    fn find_config_file(&self) -> Option<PathBuf> {
        let paths = if self.search_paths.is_empty() {
            let mut paths = Vec::new();
            if let Ok(cwd) = std::env::current_dir() {
                paths.push(cwd);
            }
            if let Some(config_dir) = dirs::config_dir() {
                paths.push(config_dir.join("warden"));
            }
            paths
        } else {
            self.search_paths.clone()
        };

        for dir in paths {
            for name in FILE_NAMES {
                let candidate = dir.join(name);
                if candidate.exists() {
                    return Some(candidate);
                }
            }
        }
        None
    }
}

/// Merges a single config file, dispatching on file extension.
fn merge_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        "toml" => Ok(figment.merge(Toml::file(path))),
        "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
        other => Err(ConfigError::Extract(format!(
            "unsupported configuration file format: .{other}"
        ))),
    }
}

/// Loads configuration from the default locations.
pub fn load_config() -> ConfigResult<WardenConfig> {
    ConfigLoader::new().load()
}
