//! TOML configuration shared by all jobs.
//!
//! Settings live in `.finguard/config.toml` under the OS config directory.
//! Jobs may point at another file with `--config`; flags override both.

use std::path::{Path, PathBuf};

use crate::{app_dirs, fs_ops};

mod errors;
mod types;


pub use errors::ConfigError;
pub use types::{
    ExplainSettings, FinguardConfig, PathSettings, ReportSettings, SampleSettings,
    TrainingSettings,
};

/// Default filename used to store the configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Resolve the default configuration file path, ensuring its directory exists.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = app_dirs::app_root_dir().map_err(map_app_dir_error)?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// Load the explicit `path` if given, else the default config file.
///
/// A missing default file yields defaults; a missing explicit file is an error.
pub fn load(path: Option<&Path>) -> Result<FinguardConfig, ConfigError> {
    match path {
        Some(path) => load_from_path(path),
        None => load_or_default(),
    }
}

/// Load the default config file, returning defaults if it does not exist.
pub fn load_or_default() -> Result<FinguardConfig, ConfigError> {
    let path = config_path()?;
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file; using defaults");
        return Ok(FinguardConfig::default());
    }
    load_from_path(&path)
}

/// Parse and validate a config file.
pub fn load_from_path(path: &Path) -> Result<FinguardConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: FinguardConfig = toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

/// Persist `config` to the default config file.
pub fn save(config: &FinguardConfig) -> Result<PathBuf, ConfigError> {
    let path = config_path()?;
    save_to_path(config, &path)?;
    Ok(path)
}

/// Write `config` as TOML, atomically replacing any previous file.
pub fn save_to_path(config: &FinguardConfig, path: &Path) -> Result<(), ConfigError> {
    let data = toml::to_string_pretty(config).map_err(|source| ConfigError::SerializeToml {
        path: path.to_path_buf(),
        source,
    })?;
    fs_ops::atomic_write(path, data.as_bytes()).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn map_app_dir_error(error: app_dirs::AppDirError) -> ConfigError {
    match error {
        app_dirs::AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        app_dirs::AppDirError::CreateDir { path, source } => {
            ConfigError::CreateDir { path, source }
        }
    }
}
