//! Standard locations for wavestrip configuration

use std::path::PathBuf;

/// Per-user configuration directory
///
/// Returns: `<config_dir>/wavestrip` (e.g. `~/.config/wavestrip` on Linux),
/// or `./wavestrip` when the platform reports no config directory.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wavestrip")
}

/// Returns: `<config_dir>/wavestrip/config.yaml`
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.yaml")
}
