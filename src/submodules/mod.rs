// src/submodules/mod.rs

//! Git submodule assimilation.
//!
//! The [`Submodules`] stage pulls files out of checked-out submodule trees
//! and merges them into the build's file set, as if they had been part of
//! the source tree all along. Each module may first run a pre-command (a
//! code generator or minifier living inside the submodule) and optionally
//! capture its stdout into site metadata.
//!
//! Include patterns treat hidden files the shell way: a wildcard include
//! leaves `.git` and other dot entries behind, and a dotfile is merged only
//! when a pattern spells its leading dot.
//!
//! Modules are processed concurrently. The first failure aborts the stage;
//! siblings that are still mid-flight are dropped rather than actively
//! cancelled, and the shared file set only ever receives entries from
//! modules that completed.

use std::path::Path;
use std::sync::Mutex;

use futures::future::{try_join_all, BoxFuture};
use tracing::debug;

use crate::errors::{ConfigError, Result, SitesmithError};
use crate::fs::FileSystem;
use crate::pipeline::files::{join_key, key_to_path, BuildFileSet, SiteMetadata};
use crate::pipeline::front_matter::read_build_file;
use crate::pipeline::patterns::IgnorePatterns;
use crate::pipeline::walk::walk_files;
use crate::pipeline::{BuildContext, Plugin};

pub mod filter;
pub mod precmd;
pub mod rules;

pub use rules::{
    CaptureHook, ModuleMap, ModuleRecord, ModuleRule, ModuleSpec, Patterns, PrecmdSpec,
};

use filter::filter_files;
use precmd::run_precmd;
use rules::decode_modules;

/// Pipeline stage merging submodule trees into the file set.
#[derive(Debug)]
pub struct Submodules {
    modules: Vec<ModuleSpec>,
}

impl Submodules {
    /// Decode and validate a module map.
    ///
    /// All validation happens here, before the stage ever runs: a decode
    /// error means no process was spawned and no file was read.
    pub fn new(map: ModuleMap) -> Result<Self, ConfigError> {
        Ok(Self {
            modules: decode_modules(map)?,
        })
    }

    /// The decoded modules, in processing order.
    pub fn modules(&self) -> &[ModuleSpec] {
        &self.modules
    }
}

impl Plugin for Submodules {
    fn name(&self) -> &str {
        "submodules"
    }

    fn run<'a>(
        &'a self,
        files: &'a mut BuildFileSet,
        ctx: BuildContext<'a>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let BuildContext {
                metadata,
                working_dir,
                ignore,
                fs,
            } = ctx;
            let files = Mutex::new(files);
            let metadata = Mutex::new(metadata);

            let merges = self
                .modules
                .iter()
                .map(|module| assimilate(module, working_dir, ignore, fs, &files, &metadata));
            try_join_all(merges).await?;

            debug!(modules = self.modules.len(), "submodules assimilated");
            Ok(())
        })
    }
}

/// Assimilate one module: pre-command, listing, filtering, merge.
///
/// The file-set lock is only taken once every selected file has been read,
/// so a module that fails partway contributes nothing. Neither lock is ever
/// held across an await.
async fn assimilate(
    module: &ModuleSpec,
    working_dir: &Path,
    ignore: &IgnorePatterns,
    fs: &dyn FileSystem,
    files: &Mutex<&mut BuildFileSet>,
    metadata: &Mutex<&mut SiteMetadata>,
) -> Result<()> {
    let module_dir = working_dir.join(&module.source);

    if let Some(argv) = &module.precmd {
        let capture = module.capture.is_some();
        let stdout = run_precmd(argv, &module_dir, capture).await?;
        if let (Some(hook), Some(stdout)) = (&module.capture, stdout) {
            let mut metadata = metadata.lock().unwrap();
            hook(&stdout, &mut **metadata);
        }
    }

    let names = walk_files(fs, &module_dir).await?;
    let selected = filter_files(module, ignore, &names);
    debug!(
        module = %module.source,
        selected = selected.len(),
        listed = names.len(),
        "merging module files"
    );

    let reads = selected.iter().map(|rel| {
        let path = key_to_path(&module_dir, rel);
        async move {
            let file = read_build_file(fs, &path).await?;
            Ok::<_, SitesmithError>((join_key(&module.dest, rel), file))
        }
    });
    let entries = try_join_all(reads).await?;

    let mut files = files.lock().unwrap();
    for (key, file) in entries {
        files.insert(key, file);
    }
    Ok(())
}
