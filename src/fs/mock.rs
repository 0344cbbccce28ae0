// src/fs/mock.rs

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;

use super::{DirEntry, FileSystem};
use crate::errors::{Result, SitesmithError};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    /// Directory holding the names of its direct children.
    Dir(Vec<String>),
}

/// In-memory filesystem for tests. Counts every trait-level operation so
/// tests can assert that a code path performed no I/O at all.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
    io_ops: Arc<AtomicUsize>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut files = HashMap::new();
        files.insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));

        Self {
            files: Arc::new(Mutex::new(files)),
            io_ops: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of trait-level operations performed so far. Setup through
    /// [`MockFileSystem::add_file`] is not counted.
    pub fn io_ops(&self) -> usize {
        self.io_ops.load(Ordering::SeqCst)
    }

    /// Contents of a file, if present. Test inspection helper.
    pub fn file_contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let files = self.files.lock().unwrap();
        match files.get(path.as_ref()) {
            Some(MockEntry::File(content)) => Some(content.clone()),
            _ => None,
        }
    }

    /// All file paths currently stored, sorted.
    pub fn file_paths(&self) -> Vec<PathBuf> {
        let files = self.files.lock().unwrap();
        let mut paths: Vec<PathBuf> = files
            .iter()
            .filter_map(|(path, entry)| match entry {
                MockEntry::File(_) => Some(path.clone()),
                MockEntry::Dir(_) => None,
            })
            .collect();
        paths.sort();
        paths
    }

    /// Stores a file and implicitly creates its ancestor directories,
    /// walking from the file up towards the root and linking each entry
    /// into its parent's child list. The walk stops at the first ancestor
    /// that already exists, since everything above it is linked already.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut files = self.files.lock().unwrap();
        files.insert(path.clone(), MockEntry::File(content.into()));

        let mut child = path;
        while let Some(parent) = parent_dir(&child) {
            let existed = files.contains_key(&parent);
            if !existed {
                files.insert(parent.clone(), MockEntry::Dir(Vec::new()));
            }
            link_child(&mut files, &parent, &child);
            if existed {
                break;
            }
            child = parent;
        }
    }

    fn count_op(&self) {
        self.io_ops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Parent of `path`, mapping the empty parent of a bare file name to `.` so
/// top-level entries hang off the pre-seeded root.
fn parent_dir(path: &Path) -> Option<PathBuf> {
    let parent = path.parent()?;
    if parent.as_os_str().is_empty() {
        Some(PathBuf::from("."))
    } else {
        Some(parent.to_path_buf())
    }
}

fn link_child(files: &mut HashMap<PathBuf, MockEntry>, parent: &Path, child: &Path) {
    let Some(name) = child.file_name().and_then(|n| n.to_str()) else {
        return;
    };
    if let Some(MockEntry::Dir(children)) = files.get_mut(parent) {
        if !children.iter().any(|existing| existing == name) {
            children.push(name.to_string());
        }
    }
}

fn not_found(path: &Path) -> SitesmithError {
    SitesmithError::io(
        path,
        io::Error::new(io::ErrorKind::NotFound, "no such file or directory"),
    )
}

impl FileSystem for MockFileSystem {
    fn read<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<Vec<u8>>> {
        Box::pin(async move {
            self.count_op();
            let files = self.files.lock().unwrap();
            match files.get(path) {
                Some(MockEntry::File(content)) => Ok(content.clone()),
                Some(MockEntry::Dir(_)) => Err(SitesmithError::io(
                    path,
                    io::Error::new(io::ErrorKind::IsADirectory, "is a directory"),
                )),
                None => Err(not_found(path)),
            }
        })
    }

    fn write<'a>(&'a self, path: &'a Path, contents: &'a [u8]) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.count_op();
            self.add_file(path, contents);
            Ok(())
        })
    }

    fn read_dir<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<Vec<DirEntry>>> {
        Box::pin(async move {
            self.count_op();
            let files = self.files.lock().unwrap();
            match files.get(path) {
                Some(MockEntry::Dir(children)) => Ok(children
                    .iter()
                    .map(|name| {
                        let child = path.join(name);
                        let is_dir = matches!(files.get(&child), Some(MockEntry::Dir(_)));
                        DirEntry { path: child, is_dir }
                    })
                    .collect()),
                Some(MockEntry::File(_)) => Err(SitesmithError::io(
                    path,
                    io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
                )),
                None => Err(not_found(path)),
            }
        })
    }

    fn remove_dir_all<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.count_op();
            let mut files = self.files.lock().unwrap();
            files.retain(|stored, _| stored != path && !stored.starts_with(path));
            if let Some(parent) = path.parent() {
                let parent = if parent.as_os_str().is_empty() {
                    Path::new(".")
                } else {
                    parent
                };
                if let Some(MockEntry::Dir(children)) = files.get_mut(parent) {
                    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                        children.retain(|child| child != name);
                    }
                }
            }
            Ok(())
        })
    }
}
