// src/config/loader.rs

use std::path::{Path, PathBuf};

use crate::config::model::{RawSiteConfig, SiteConfig};
use crate::errors::{Result, SitesmithError};

/// Load a configuration file from a given path and return the raw
/// `RawSiteConfig`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (directory layout, glob compilation, module decode). Use
/// [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawSiteConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| SitesmithError::io(path, e))?;

    let config: RawSiteConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run full validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks directory layout, stage sections, and every glob.
/// - Decodes the module map once to surface rule errors eagerly.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<SiteConfig> {
    let raw_config = load_from_path(&path)?;
    let config = SiteConfig::try_from(raw_config)?;
    Ok(config)
}

/// Default config file name, resolved against the current directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Sitesmith.toml")
}
