// src/config/validate.rs

use std::path::Path;

use crate::config::model::{RawSiteConfig, SiteConfig};
use crate::errors::{ConfigError, Result};
use crate::pipeline::patterns::build_globset;
use crate::submodules::rules::decode_modules;

impl TryFrom<RawSiteConfig> for SiteConfig {
    type Error = ConfigError;

    fn try_from(raw: RawSiteConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(SiteConfig::new_unchecked(raw))
    }
}

/// Check everything that can be checked without touching the filesystem:
/// section shapes, directory layout, and every glob in the file. A config
/// that passes here will not fail for configuration reasons mid-build.
fn validate_raw_config(raw: &RawSiteConfig) -> Result<(), ConfigError> {
    validate_build_section(raw)?;
    validate_stage_sections(raw)?;

    // Full module decode, discarded. Catches missing includes, illegal
    // keys, and bad globs before anything runs.
    decode_modules(raw.submodules.clone())?;
    Ok(())
}

fn validate_build_section(raw: &RawSiteConfig) -> Result<(), ConfigError> {
    let build = &raw.build;

    if build.source.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "[build].source must not be empty".to_string(),
        ));
    }
    if build.destination.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "[build].destination must not be empty".to_string(),
        ));
    }

    let source = Path::new(&build.source);
    let destination = Path::new(&build.destination);
    if destination.starts_with(source) || source.starts_with(destination) {
        return Err(ConfigError::Invalid(format!(
            "[build].destination '{}' must not overlap [build].source '{}'",
            build.destination, build.source
        )));
    }

    build_globset(&build.ignore)?;
    Ok(())
}

fn validate_stage_sections(raw: &RawSiteConfig) -> Result<(), ConfigError> {
    if let Some(concat) = &raw.concat {
        if concat.files.is_empty() {
            return Err(ConfigError::Invalid(
                "[concat].files must list at least one pattern".to_string(),
            ));
        }
        if concat.output.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "[concat].output must not be empty".to_string(),
            ));
        }
        build_globset(&concat.files)?;
    }

    for rename in &raw.rename {
        if rename.pattern.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "[[rename]].pattern must not be empty".to_string(),
            ));
        }
        if rename.strip_suffix.is_empty() {
            return Err(ConfigError::Invalid(
                "[[rename]].strip_suffix must not be empty".to_string(),
            ));
        }
        build_globset(std::slice::from_ref(&rename.pattern))?;
    }

    if let Some(gzip) = &raw.gzip {
        if gzip.patterns.is_empty() {
            return Err(ConfigError::Invalid(
                "[gzip].patterns must list at least one pattern".to_string(),
            ));
        }
        build_globset(&gzip.patterns)?;
    }

    Ok(())
}
