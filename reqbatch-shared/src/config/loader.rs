//! Config file discovery and layered loading.
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults (`#[serde(default)]` on every section)
//! 2. TOML file: the explicit `--config` path, else the first of
//!    `./reqbatch.toml` and `~/.config/reqbatch.toml`
//! 3. Environment variables `REQBATCH__<SECTION>__<KEY>` (a `.env` file is
//!    loaded first when present)

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};

use super::ReqbatchConfig;
use crate::errors::ConfigError;

/// File stem searched in the working directory
pub const CONFIG_FILE_STEM: &str = "reqbatch";
/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "REQBATCH";

const GLOBAL_CONFIG_DIR: &str = ".config";
const GLOBAL_CONFIG_FILENAME: &str = "reqbatch.toml";

/// Builds a validated [`ReqbatchConfig`] from layered sources
#[derive(Debug, Default, Clone)]
pub struct ConfigLoader {
    explicit_path: Option<PathBuf>,
    skip_env: bool,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this file instead of searching; a missing file is an error
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_path = Some(path.into());
        self
    }

    /// Ignore environment overrides and `.env`
    pub fn without_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    pub fn load(&self) -> Result<ReqbatchConfig, ConfigError> {
        if !self.skip_env {
            // A missing .env file is the normal case
            let _ = dotenvy::dotenv();
        }

        let mut builder = Config::builder();

        match &self.explicit_path {
            Some(path) => {
                builder = builder.add_source(File::from(path.as_path()).format(FileFormat::Toml));
            }
            None => {
                if let Some(path) = find_config_file() {
                    tracing::debug!(?path, "Using discovered config file");
                    builder =
                        builder.add_source(File::from(path.as_path()).format(FileFormat::Toml));
                }
            }
        }

        if !self.skip_env {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            );
        }

        let config: ReqbatchConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        tracing::debug!(
            sheet = %config.store.sheet_name,
            buckets = config.classification.buckets.len(),
            "Configuration loaded"
        );
        Ok(config)
    }
}

/// Search for a config file in precedence order.
fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(format!("{CONFIG_FILE_STEM}.toml"));
    if local.is_file() {
        return Some(local);
    }

    if let Some(home) = home_dir() {
        let global = home.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILENAME);
        if global.is_file() {
            return Some(global);
        }
    }

    None
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

/// Load from an explicit path when given, otherwise by discovery
pub fn load_config(path: Option<&Path>) -> Result<ReqbatchConfig, ConfigError> {
    let loader = ConfigLoader::new();
    match path {
        Some(path) => loader.with_path(path).load(),
        None => loader.load(),
    }
}
