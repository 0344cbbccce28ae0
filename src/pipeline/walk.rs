// src/pipeline/walk.rs

use std::path::Path;

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::pipeline::files::normalize_rel;

/// List every file under `root`, recursively.
///
/// Returns sorted `/`-separated paths relative to `root`. Directories are
/// descended into but not listed themselves.
pub async fn walk_files(fs: &dyn FileSystem, root: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for entry in fs.read_dir(&dir).await? {
            if entry.is_dir {
                stack.push(entry.path);
            } else if let Ok(rel) = entry.path.strip_prefix(root) {
                files.push(normalize_rel(rel));
            }
        }
    }

    files.sort();
    Ok(files)
}
