use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::schema::FolioConfig;

/// Loads and reloads the Folio configuration.
pub struct ConfigLoader {
    config: Arc<RwLock<FolioConfig>>,
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Resolve the config path: explicit path > FOLIO_CONFIG env > ~/.folio/folio.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("FOLIO_CONFIG") {
            return PathBuf::from(p);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".folio")
            .join("folio.toml")
    }

    /// Load the config from disk, falling back to defaults.
    pub fn load(path: Option<&Path>) -> folio_core::Result<Self> {
        let config_path = Self::resolve_path(path);
        let config = if config_path.exists() {
            info!(?config_path, "loading configuration");
            Self::read(&config_path)?
        } else {
            warn!(?config_path, "config file not found, using defaults");
            FolioConfig::default()
        };

        let config = Self::apply_env_overrides(config);

        // Log warnings, fail on errors
        match config.validate() {
            Ok(warnings) => {
                for w in &warnings {
                    warn!("{}", w);
                }
            }
            Err(e) => {
                return Err(folio_core::FolioError::Config(e));
            }
        }

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
        })
    }

    /// Wrap an in-memory config (no backing file).
    pub fn from_config(config: FolioConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            config_path: PathBuf::new(),
        }
    }

    /// Get a read snapshot of the current config.
    pub fn get(&self) -> FolioConfig {
        self.config.read().clone()
    }

    /// Get a shared reference for subscription.
    pub fn shared(&self) -> Arc<RwLock<FolioConfig>> {
        Arc::clone(&self.config)
    }

    /// Path the config was loaded from.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    fn read(path: &Path) -> folio_core::Result<FolioConfig> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str::<FolioConfig>(&raw).map_err(|e| {
            folio_core::FolioError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Apply env var overrides (FOLIO_LOG_LEVEL, FOLIO_RATE_LIMIT_MAX, etc.)
    fn apply_env_overrides(mut config: FolioConfig) -> FolioConfig {
        if let Ok(v) = std::env::var("FOLIO_LOG_LEVEL") {
            match crate::schema::LogLevel::parse(&v) {
                Some(level) => config.logging.level = level,
                None => warn!(value = %v, "ignoring unknown FOLIO_LOG_LEVEL"),
            }
        }
        if let Ok(v) = std::env::var("FOLIO_RATE_LIMIT_MAX") {
            if let Ok(max) = v.parse::<u32>() {
                config.rate_limit.max_requests = max;
            }
        }
        if let Ok(v) = std::env::var("FOLIO_RATE_LIMIT_WINDOW_MS") {
            if let Ok(window) = v.parse::<u64>() {
                config.rate_limit.window_ms = window;
            }
        }
        if let Ok(v) = std::env::var("FOLIO_EXECUTION_TIMEOUT_MS") {
            if let Ok(timeout) = v.parse::<u64>() {
                config.execution.timeout_ms = timeout;
            }
        }
        config
    }

    /// Reload the config from disk.
    pub fn reload(&self) -> folio_core::Result<()> {
        if !self.config_path.exists() {
            return Err(folio_core::FolioError::Config(format!(
                "config file not found: {}",
                self.config_path.display()
            )));
        }
        let new_config = Self::apply_env_overrides(Self::read(&self.config_path)?);
        new_config.validate().map_err(folio_core::FolioError::Config)?;
        *self.config.write() = new_config;
        info!("configuration reloaded");
        Ok(())
    }
}
