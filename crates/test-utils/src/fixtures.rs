#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A site layout on disk for integration tests.
///
/// Backed by a temp directory removed on drop. Paths are relative to the
/// fixture root, which doubles as the pipeline's working directory.
pub struct SiteFixture {
    dir: TempDir,
}

impl SiteFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("creating fixture tempdir"),
        }
    }

    /// Root directory of the fixture.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of a fixture-relative path.
    pub fn path(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Write a file, creating parent directories as needed.
    pub fn write(&self, rel: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> &Self {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("creating fixture dirs");
        }
        fs::write(&path, contents.as_ref()).expect("writing fixture file");
        self
    }

    /// Write an executable script (mode 0o755 on unix).
    pub fn write_script(&self, rel: impl AsRef<Path>, contents: &str) -> &Self {
        let path = self.path(&rel);
        self.write(&rel, contents);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
                .expect("marking fixture script executable");
        }
        self
    }

    /// Create an empty directory.
    pub fn mkdir(&self, rel: impl AsRef<Path>) -> &Self {
        fs::create_dir_all(self.path(rel)).expect("creating fixture dir");
        self
    }

    /// Read a file back.
    pub fn read(&self, rel: impl AsRef<Path>) -> Vec<u8> {
        fs::read(self.path(rel)).expect("reading fixture file")
    }

    /// Read a file back as UTF-8.
    pub fn read_to_string(&self, rel: impl AsRef<Path>) -> String {
        fs::read_to_string(self.path(rel)).expect("reading fixture file")
    }

    /// Whether a fixture-relative path exists.
    pub fn exists(&self, rel: impl AsRef<Path>) -> bool {
        self.path(rel).exists()
    }
}

impl Default for SiteFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Argv for running a small shell script in tests.
pub fn sh(script: &str) -> Vec<String> {
    vec!["sh".to_string(), "-c".to_string(), script.to_string()]
}
