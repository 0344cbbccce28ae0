// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! NOTE: this expects `clap` to be built with the `derive` feature, e.g.:
//! `clap = { version = "4.5.53", features = ["derive"] }` in `Cargo.toml`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `sitesmith`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sitesmith",
    version,
    about = "Build a static site from a source tree and assimilated git submodules.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Sitesmith.toml` in the current working directory. Relative
    /// paths inside the config resolve against the config file's directory,
    /// not against wherever `sitesmith` happens to be invoked from.
    #[arg(long, value_name = "PATH", default_value = "Sitesmith.toml")]
    pub config: String,

    /// Keep running and rebuild whenever the source tree or an assimilated
    /// module tree changes.
    #[arg(long)]
    pub watch: bool,

    /// Parse and validate the config and print the build plan, but don't
    /// run pre-commands or write anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SITESMITH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
