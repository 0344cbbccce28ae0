// src/config/mod.rs

//! Configuration loading and validation.
//!
//! `model` maps `Sitesmith.toml` onto raw structs, `validate` turns a
//! [`model::RawSiteConfig`] into a checked [`model::SiteConfig`], and
//! `loader` ties the two together.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{
    BuildSection, ConcatSection, GzipSection, RawSiteConfig, RenameSection, SiteConfig,
};
