// src/pipeline/mod.rs

//! The build pipeline.
//!
//! A [`Pipeline`] reads a source tree into a [`BuildFileSet`], runs a
//! sequence of [`Plugin`] stages over it in order, and finally writes the
//! surviving entries to the destination directory. Nothing is written until
//! every stage has succeeded, so a failing build never leaves a half-updated
//! destination behind.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::{try_join_all, BoxFuture};
use tracing::{debug, info};

use crate::errors::{Result, SitesmithError};
use crate::fs::{FileSystem, RealFileSystem};

pub mod files;
pub mod front_matter;
pub mod patterns;
pub mod walk;

pub use files::{BuildFile, BuildFileSet, SiteMetadata};
pub use patterns::IgnorePatterns;

use files::key_to_path;
use front_matter::read_build_file;
use walk::walk_files;

/// Everything a stage can see besides the file set itself.
pub struct BuildContext<'a> {
    /// Site-wide metadata, shared and mutable across stages.
    pub metadata: &'a mut SiteMetadata,
    /// Directory all relative paths in the configuration resolve against.
    pub working_dir: &'a Path,
    /// The build's ignore patterns. Stages that pull in files from outside
    /// the source tree apply these too.
    pub ignore: &'a IgnorePatterns,
    /// Filesystem to perform any I/O through.
    pub fs: &'a dyn FileSystem,
}

/// One stage of the pipeline.
///
/// Stages receive the whole file set and may add, remove, or rewrite
/// entries. Returning an error aborts the build before anything is written.
pub trait Plugin: Send + Sync {
    /// Short stage name used in logs.
    fn name(&self) -> &str;

    /// Run this stage over the file set.
    fn run<'a>(
        &'a self,
        files: &'a mut BuildFileSet,
        ctx: BuildContext<'a>,
    ) -> BoxFuture<'a, Result<()>>;
}

/// An ordered build: source tree, plugin stages, destination.
///
/// All relative paths resolve against the working directory given to
/// [`Pipeline::new`], never against the process working directory, so the
/// same pipeline behaves identically wherever it is invoked from.
pub struct Pipeline {
    working_dir: PathBuf,
    source: String,
    destination: String,
    ignore: Vec<String>,
    clean: bool,
    metadata: SiteMetadata,
    fs: Arc<dyn FileSystem>,
    plugins: Vec<Box<dyn Plugin>>,
}

impl Pipeline {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            source: "src".to_string(),
            destination: "rendered".to_string(),
            ignore: Vec::new(),
            clean: true,
            metadata: SiteMetadata::new(),
            fs: Arc::new(RealFileSystem),
            plugins: Vec::new(),
        }
    }

    /// Source directory, relative to the working directory.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Destination directory, relative to the working directory.
    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = destination.into();
        self
    }

    /// Add ignore patterns. Matching files are dropped when the source tree
    /// is read and are also skipped during submodule assimilation.
    pub fn ignore<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Whether the destination directory is removed before writing.
    pub fn clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    /// Initial site metadata.
    pub fn metadata(mut self, metadata: SiteMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Replace the filesystem implementation.
    pub fn filesystem(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    /// Append a stage. Stages run in the order they were added.
    pub fn use_plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn source_dir(&self) -> PathBuf {
        self.working_dir.join(&self.source)
    }

    pub fn destination_dir(&self) -> PathBuf {
        self.working_dir.join(&self.destination)
    }

    /// Names of the configured stages, in run order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Run the pipeline in memory: read the source tree and apply every
    /// stage, without touching the destination directory.
    pub async fn process(&self) -> Result<BuildFileSet> {
        let ignore = IgnorePatterns::compile(&self.ignore)?;
        let mut metadata = self.metadata.clone();
        let mut files = self.read_source_tree(&ignore).await?;
        debug!(files = files.len(), "source tree read");

        for plugin in &self.plugins {
            debug!(stage = plugin.name(), "running stage");
            let ctx = BuildContext {
                metadata: &mut metadata,
                working_dir: &self.working_dir,
                ignore: &ignore,
                fs: self.fs.as_ref(),
            };
            plugin.run(&mut files, ctx).await?;
        }

        Ok(files)
    }

    /// Run the full build: process in memory, then write the result under
    /// the destination directory (removing it first when `clean` is set).
    pub async fn build(&self) -> Result<BuildFileSet> {
        let files = self.process().await?;
        let dest_dir = self.destination_dir();

        if self.clean {
            self.fs.remove_dir_all(&dest_dir).await?;
        }

        let writes = files.iter().map(|(key, file)| {
            let path = key_to_path(&dest_dir, key);
            async move { self.fs.write(&path, &file.contents).await }
        });
        try_join_all(writes).await?;

        info!(
            files = files.len(),
            destination = %dest_dir.display(),
            "build finished"
        );
        Ok(files)
    }

    async fn read_source_tree(&self, ignore: &IgnorePatterns) -> Result<BuildFileSet> {
        let source_dir = self.source_dir();
        let rel_paths = walk_files(self.fs.as_ref(), &source_dir).await?;

        let reads = rel_paths
            .iter()
            .filter(|rel| !ignore.is_match(rel))
            .map(|rel| {
                let path = key_to_path(&source_dir, rel);
                async move {
                    let file = read_build_file(self.fs.as_ref(), &path).await?;
                    Ok::<_, SitesmithError>((rel.clone(), file))
                }
            });

        let entries = try_join_all(reads).await?;
        Ok(entries.into_iter().collect())
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("working_dir", &self.working_dir)
            .field("source", &self.source)
            .field("destination", &self.destination)
            .field("stages", &self.stage_names())
            .finish_non_exhaustive()
    }
}
