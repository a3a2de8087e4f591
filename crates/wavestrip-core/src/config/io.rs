//! YAML configuration loading and saving
//!
//! Generic over the stored type so replay scripts share the same readers.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};

/// Load configuration from a YAML file, falling back to defaults
///
/// A missing file is normal (first run). An unreadable or invalid file is
/// logged and replaced by the default.
///
/// # Type Parameters
/// * `T` - Configuration type that implements `DeserializeOwned` and `Default`
///
/// # Arguments
/// * `path` - Path to the YAML configuration file
///
/// # Example
///
/// ```ignore
/// let config: EngineConfig = load_config(&default_config_path());
/// ```
pub fn load_config<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    log::info!("load_config: Loading from {:?}", path);

    if !path.exists() {
        log::info!("load_config: Config file doesn't exist, using defaults");
        return T::default();
    }

    match read_config(path) {
        Ok(config) => {
            log::info!("load_config: Successfully loaded config from {:?}", path);
            config
        }
        Err(e) => {
            log::warn!("load_config: {}, using defaults", e);
            T::default()
        }
    }
}

/// Read and parse a YAML file, reporting what went wrong
///
/// Unlike [`load_config`] nothing falls back to defaults: a missing file is
/// [`ConfigError::Io`] and malformed YAML is [`ConfigError::Parse`].
///
/// # Arguments
/// * `path` - Path to the YAML file
///
/// # Example
///
/// ```ignore
/// let script: ReplayScript = read_config(Path::new("flick.yaml"))?;
/// ```
pub fn read_config<T>(path: &Path) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Save configuration to a YAML file
///
/// Creates parent directories if they don't exist.
///
/// # Arguments
/// * `config` - Configuration to save
/// * `path` - Path to the YAML configuration file
///
/// # Example
///
/// ```ignore
/// save_config(&EngineConfig::default(), &default_config_path())?;
/// ```
pub fn save_config<T>(config: &T, path: &Path) -> Result<()>
where
    T: Serialize,
{
    log::info!("save_config: Saving to {:?}", path);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;

    std::fs::write(path, yaml)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    log::info!("save_config: Config saved successfully");
    Ok(())
}
