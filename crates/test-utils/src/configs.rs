#![allow(dead_code)]

use sitesmith::config::{RawSiteConfig, SiteConfig};

/// Parse and validate a config from inline TOML.
///
/// Panics on parse or validation errors; tests that exercise those paths
/// should go through `sitesmith::config` directly instead.
pub fn site_config(toml_src: &str) -> SiteConfig {
    let raw: RawSiteConfig = toml::from_str(toml_src).expect("parsing test config TOML");
    SiteConfig::try_from(raw).expect("validating test config")
}
