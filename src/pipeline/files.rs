// src/pipeline/files.rs

//! The in-memory representation of a build.
//!
//! A [`BuildFileSet`] maps destination-relative keys (always `/`-separated,
//! never absolute) to [`BuildFile`] entries. Plugins transform the set in
//! place; nothing touches the destination directory until the whole pipeline
//! has run.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// One file travelling through the pipeline: raw contents plus whatever
/// metadata was parsed out of its front matter or added by plugins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildFile {
    pub contents: Vec<u8>,
    pub metadata: toml::Table,
}

impl BuildFile {
    pub fn new(contents: impl Into<Vec<u8>>) -> Self {
        Self {
            contents: contents.into(),
            metadata: toml::Table::new(),
        }
    }

    pub fn with_metadata(contents: impl Into<Vec<u8>>, metadata: toml::Table) -> Self {
        Self {
            contents: contents.into(),
            metadata,
        }
    }
}

/// The set of files a build will write, keyed by destination-relative path.
///
/// Keys are ordered, so iteration (and therefore output) is deterministic.
/// Inserting under an existing key replaces the previous entry; when two
/// sources map to the same key the last write wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildFileSet {
    entries: BTreeMap<String, BuildFile>,
}

impl BuildFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, file: BuildFile) {
        self.entries.insert(key.into(), file);
    }

    pub fn get(&self, key: &str) -> Option<&BuildFile> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut BuildFile> {
        self.entries.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<BuildFile> {
        self.entries.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BuildFile)> {
        self.entries.iter()
    }
}

impl IntoIterator for BuildFileSet {
    type Item = (String, BuildFile);
    type IntoIter = std::collections::btree_map::IntoIter<String, BuildFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(String, BuildFile)> for BuildFileSet {
    fn from_iter<I: IntoIterator<Item = (String, BuildFile)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Site-wide key/value metadata, shared across the whole build and visible
/// to every plugin. Pre-command capture hooks write here.
#[derive(Debug, Clone, Default)]
pub struct SiteMetadata {
    values: BTreeMap<String, toml::Value>,
}

impl SiteMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<toml::Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        self.values.get(key)
    }

    /// Convenience accessor for string-valued metadata.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|v| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &toml::Value)> {
        self.values.iter()
    }
}

impl From<toml::Table> for SiteMetadata {
    fn from(table: toml::Table) -> Self {
        Self {
            values: table.into_iter().collect(),
        }
    }
}

/// Join a destination prefix and a relative path into a file-set key.
///
/// An empty or `.` prefix means "the root of the file set": the relative
/// path is the key. Otherwise the two are joined with exactly one `/`.
pub fn join_key(dest: &str, rel: &str) -> String {
    let dest = dest.trim_end_matches('/');
    let rel = rel.trim_start_matches('/');
    if dest.is_empty() || dest == "." {
        rel.to_string()
    } else {
        format!("{dest}/{rel}")
    }
}

/// Render a relative filesystem path as a `/`-separated file-set key.
/// A leading `.` component is dropped; `components()` already strips the
/// rest.
pub fn normalize_rel(path: &Path) -> String {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolve a `/`-separated file-set key to a path under `base`.
pub fn key_to_path(base: &Path, key: &str) -> PathBuf {
    let mut path = base.to_path_buf();
    for segment in key.split('/') {
        path.push(segment);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_existing_key() {
        let mut set = BuildFileSet::new();
        set.insert("a.txt", BuildFile::new("first"));
        set.insert("a.txt", BuildFile::new("second"));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("a.txt").unwrap().contents, b"second");
    }

    #[test]
    fn keys_iterate_in_sorted_order() {
        let mut set = BuildFileSet::new();
        set.insert("b/x.txt", BuildFile::new(""));
        set.insert("a.txt", BuildFile::new(""));
        set.insert("b/a.txt", BuildFile::new(""));
        let keys: Vec<&String> = set.keys().collect();
        assert_eq!(keys, ["a.txt", "b/a.txt", "b/x.txt"]);
    }

    #[test]
    fn join_key_handles_empty_and_dot_dest() {
        assert_eq!(join_key("", "page.html"), "page.html");
        assert_eq!(join_key(".", "page.html"), "page.html");
        assert_eq!(join_key("s", "page.html"), "s/page.html");
        assert_eq!(join_key("s/", "/page.html"), "s/page.html");
        assert_eq!(join_key("a/b", "c/d.css"), "a/b/c/d.css");
    }

    #[test]
    fn normalize_rel_uses_forward_slashes() {
        assert_eq!(normalize_rel(Path::new("a/b/c.txt")), "a/b/c.txt");
        assert_eq!(normalize_rel(Path::new("./a/b.txt")), "a/b.txt");
        assert_eq!(normalize_rel(Path::new("top.md")), "top.md");
    }

    #[test]
    fn key_to_path_splits_on_slashes() {
        let path = key_to_path(Path::new("out"), "a/b/c.txt");
        assert_eq!(path, Path::new("out").join("a").join("b").join("c.txt"));
    }

    #[test]
    fn metadata_get_str_only_matches_strings() {
        let mut meta = SiteMetadata::new();
        meta.insert("name", "sitesmith");
        meta.insert("count", 3i64);
        assert_eq!(meta.get_str("name"), Some("sitesmith"));
        assert_eq!(meta.get_str("count"), None);
        assert!(meta.get("count").is_some());
    }
}
