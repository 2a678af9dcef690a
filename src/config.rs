//! Locating and loading the photohub configuration file.

use std::path::{Path, PathBuf};

use ph_core::{Config, Result};

/// Locations searched, in order, when no path is given explicitly.
const DEFAULT_PATHS: &[&str] = &[
    "./photohub.toml",
    "~/.config/photohub/config.toml",
    "/etc/photohub/config.toml",
];

/// First default location that exists, with `~` expanded.
pub fn find_default_config() -> Option<PathBuf> {
    DEFAULT_PATHS
        .iter()
        .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()))
        .find(|p| p.exists())
}

/// Load configuration from `custom_path`, or from the first default location
/// that exists, or fall back to built-in defaults.
///
/// An explicit path must exist and parse. Validation warnings are logged but
/// never fatal.
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    let config = match custom_path {
        Some(path) => Config::load(&expand(path))?,
        None => match find_default_config() {
            Some(path) => {
                tracing::debug!("Using config file {}", path.display());
                Config::load(&path)?
            }
            None => Config::default(),
        },
    };

    for warning in config.validate() {
        tracing::warn!("Config: {warning}");
    }
    Ok(config)
}

fn expand(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).as_ref()),
        None => path.to_path_buf(),
    }
}
