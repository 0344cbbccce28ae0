// src/fs/mod.rs

//! Filesystem abstraction.
//!
//! Every read, directory listing, and write the pipeline performs goes
//! through the [`FileSystem`] trait, so tests can run entire builds against
//! the in-memory implementation in [`mock`] and observe exactly which
//! operations happened. Methods return boxed futures to keep the trait
//! object-safe while remaining async.

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use futures::future::BoxFuture;

use crate::errors::{Result, SitesmithError};

pub mod mock;

/// One entry of a directory listing. `path` is the full path of the entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    /// Read a file's raw contents.
    fn read<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<Vec<u8>>>;

    /// Write `contents` to `path`, creating parent directories as needed.
    fn write<'a>(&'a self, path: &'a Path, contents: &'a [u8]) -> BoxFuture<'a, Result<()>>;

    /// List the entries of a directory (full paths, with a directory flag).
    fn read_dir<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<Vec<DirEntry>>>;

    /// Remove a directory tree. Removing a path that does not exist is not
    /// an error.
    fn remove_dir_all<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<()>>;
}

/// Implementation backed by `tokio::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<Vec<u8>>> {
        Box::pin(async move {
            tokio::fs::read(path)
                .await
                .map_err(|e| SitesmithError::io(path, e))
        })
    }

    fn write<'a>(&'a self, path: &'a Path, contents: &'a [u8]) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| SitesmithError::io(parent, e))?;
            }
            tokio::fs::write(path, contents)
                .await
                .map_err(|e| SitesmithError::io(path, e))
        })
    }

    fn read_dir<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<Vec<DirEntry>>> {
        Box::pin(async move {
            let mut reader = tokio::fs::read_dir(path)
                .await
                .map_err(|e| SitesmithError::io(path, e))?;

            let mut entries = Vec::new();
            while let Some(entry) = reader
                .next_entry()
                .await
                .map_err(|e| SitesmithError::io(path, e))?
            {
                let entry_path = entry.path();
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| SitesmithError::io(&entry_path, e))?;
                entries.push(DirEntry {
                    path: entry_path,
                    is_dir: file_type.is_dir(),
                });
            }
            Ok(entries)
        })
    }

    fn remove_dir_all<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            match tokio::fs::remove_dir_all(path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(SitesmithError::io(path, e)),
            }
        })
    }
}
