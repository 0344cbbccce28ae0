// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod pipeline;
pub mod plugins;
pub mod submodules;
pub mod watch;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::SiteConfig;
use crate::pipeline::files::SiteMetadata;
use crate::pipeline::{IgnorePatterns, Pipeline};
use crate::plugins::{Concat, Gzip, Rename};
use crate::submodules::{ModuleRule, Patterns, Submodules};

/// Delay after the first change event before rebuilding, so editor save
/// bursts collapse into a single rebuild.
const REBUILD_SETTLE: Duration = Duration::from_millis(50);

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - pipeline assembly
/// - a single build, or the watch loop
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;
    let working_dir = config_root_dir(&config_path);

    let pipeline = assemble_pipeline(&cfg, &working_dir)?;

    if args.dry_run {
        print_dry_run(&cfg, &pipeline);
        return Ok(());
    }

    pipeline.build().await?;

    if args.watch {
        watch_loop(&cfg, &pipeline).await?;
    }

    Ok(())
}

/// Build a [`Pipeline`] from a validated config.
///
/// Stage order is fixed: submodules first (so later stages see assimilated
/// files), then concat, rename, gzip.
pub fn assemble_pipeline(
    cfg: &SiteConfig,
    working_dir: &Path,
) -> crate::errors::Result<Pipeline> {
    let build = cfg.build();
    let mut pipeline = Pipeline::new(working_dir)
        .source(build.source.clone())
        .destination(build.destination.clone())
        .ignore(build.ignore.iter().cloned())
        .clean(build.clean)
        .metadata(SiteMetadata::from(cfg.site().clone()));

    pipeline = pipeline.use_plugin(Submodules::new(cfg.submodules().clone())?);

    if let Some(concat) = cfg.concat() {
        pipeline = pipeline.use_plugin(Concat::new(concat.files.clone(), concat.output.clone())?);
    }
    for rename in cfg.rename() {
        pipeline = pipeline.use_plugin(Rename::new(
            rename.pattern.clone(),
            rename.strip_suffix.clone(),
        )?);
    }
    if let Some(gzip) = cfg.gzip() {
        pipeline = pipeline.use_plugin(Gzip::new(gzip.patterns.clone())?);
    }

    Ok(pipeline)
}

/// Figure out the working directory all relative paths resolve against.
///
/// - If the config path has a non-empty parent (e.g. "site/Sitesmith.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Sitesmith.toml" (parent = ""),
///   we fall back to the current working directory "."
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Rebuild whenever something under the source tree or a module tree
/// changes. Runs until Ctrl-C.
async fn watch_loop(cfg: &SiteConfig, pipeline: &Pipeline) -> Result<()> {
    let mut roots = vec![pipeline.source_dir()];
    for source in cfg.submodules().keys() {
        roots.push(pipeline.working_dir().join(source));
    }

    let ignore = IgnorePatterns::compile(&cfg.build().ignore)?;
    let (_watcher, mut rx) = watch::spawn_watcher(roots, ignore)?;

    info!("watching for changes (Ctrl-C to stop)");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                return Ok(());
            }
            changed = rx.recv() => {
                let Some(first) = changed else {
                    warn!("watcher channel closed");
                    return Ok(());
                };

                // Collapse a burst of events into one rebuild.
                tokio::time::sleep(REBUILD_SETTLE).await;
                let mut changes = 1usize;
                while rx.try_recv().is_ok() {
                    changes += 1;
                }

                info!(trigger = %first.display(), changes, "change detected, rebuilding");
                if let Err(err) = pipeline.build().await {
                    error!(error = %err, "rebuild failed");
                }
            }
        }
    }
}

/// Dry-run output: directories, stages, and module rules.
fn print_dry_run(cfg: &SiteConfig, pipeline: &Pipeline) {
    println!("sitesmith dry-run");
    println!("  source:      {}", pipeline.source_dir().display());
    println!("  destination: {}", pipeline.destination_dir().display());
    println!("  clean:       {}", cfg.build().clean);
    if !cfg.build().ignore.is_empty() {
        println!("  ignore:      {:?}", cfg.build().ignore);
    }
    println!();

    println!("stages: {}", pipeline.stage_names().join(" -> "));
    println!();

    println!("modules ({}):", cfg.submodules().len());
    for (source, rule) in cfg.submodules() {
        println!("  - {source}");
        match rule {
            ModuleRule::Single(pattern) => println!("      include: [{pattern:?}]"),
            ModuleRule::Many(patterns) => println!("      include: {patterns:?}"),
            ModuleRule::Record(record) => {
                match &record.include {
                    Some(Patterns::One(pattern)) => println!("      include: [{pattern:?}]"),
                    Some(Patterns::Many(patterns)) => println!("      include: {patterns:?}"),
                    None => {}
                }
                if let Some(Patterns::One(pattern)) = &record.exclude {
                    println!("      exclude: [{pattern:?}]");
                } else if let Some(Patterns::Many(patterns)) = &record.exclude {
                    println!("      exclude: {patterns:?}");
                }
                if let Some(dest) = &record.dest {
                    println!("      dest: {dest}");
                }
                if let Some(precmd) = &record.precmd {
                    println!("      precmd: {precmd:?}");
                }
                if let Some(key) = &record.capture_stdout_to {
                    println!("      capture_stdout_to: {key}");
                }
            }
        }
    }
}
