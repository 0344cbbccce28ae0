// src/errors.rs

//! Crate-wide error types and the `Result` alias.
//!
//! The three failure families are kept distinct because callers react to
//! them differently:
//! - [`ConfigError`]: malformed configuration, raised eagerly at decode
//!   time, always before any filesystem or process I/O.
//! - [`ProcessError`]: a submodule pre-command could not be spawned, was
//!   killed by a signal, or exited non-zero.
//! - everything else is surfaced through [`SitesmithError`] directly
//!   (I/O with the offending path, TOML parsing, front matter, watching).

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Configuration problems. All of these are detected while decoding and
/// validating configuration, before a build performs any I/O.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("submodules: {key}: missing include pattern")]
    MissingInclude { key: String },

    #[error("submodules: {key}: 'src' may not be set; the map key names the source directory")]
    SrcNotAllowed { key: String },

    #[error("submodules: {key}: precmd must name a command")]
    EmptyPrecmd { key: String },

    #[error("submodules: {key}: both a capture hook and capture_stdout_to are set")]
    CaptureConflict { key: String },

    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("{0}")]
    Invalid(String),
}

/// A submodule pre-command failed.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("failed to spawn '{command}' in {}: {source}", dir.display())]
    Spawn {
        command: String,
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for '{command}': {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' was killed by {signal}")]
    Signal { command: String, signal: String },

    #[error("'{command}' exited with status {code}")]
    Exit { command: String, code: i32 },
}

#[derive(Error, Debug)]
pub enum SitesmithError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("pre-command failed: {0}")]
    Process(#[from] ProcessError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid front matter in {}: {message}", path.display())]
    FrontMatter { path: PathBuf, message: String },

    #[error("file watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SitesmithError {
    /// Attach the offending path to an I/O error.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        SitesmithError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

pub type Result<T, E = SitesmithError> = std::result::Result<T, E>;
