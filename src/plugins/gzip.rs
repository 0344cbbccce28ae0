// src/plugins/gzip.rs

use std::io::Write;

use anyhow::anyhow;
use flate2::write::GzEncoder;
use flate2::Compression;
use futures::future::BoxFuture;
use globset::GlobSet;
use tracing::debug;

use crate::errors::{ConfigError, Result, SitesmithError};
use crate::pipeline::files::{BuildFile, BuildFileSet};
use crate::pipeline::patterns::build_globset;
use crate::pipeline::{BuildContext, Plugin};

/// Adds a gzipped sibling (`<key>.gz`) for every entry matching the
/// patterns. Originals stay in place so a server can content-negotiate.
pub struct Gzip {
    set: GlobSet,
}

impl Gzip {
    pub fn new<I, S>(patterns: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let set = build_globset(&patterns)?;
        Ok(Self { set })
    }
}

impl Plugin for Gzip {
    fn name(&self) -> &str {
        "gzip"
    }

    fn run<'a>(
        &'a self,
        files: &'a mut BuildFileSet,
        _ctx: BuildContext<'a>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let matching: Vec<String> = files
                .keys()
                .filter(|key| self.set.is_match(key.as_str()))
                .cloned()
                .collect();

            for key in &matching {
                let Some(file) = files.get(key) else {
                    continue;
                };
                let compressed = gzip_bytes(&file.contents)
                    .map_err(|e| SitesmithError::Other(anyhow!("compressing '{key}': {e}")))?;
                files.insert(format!("{key}.gz"), BuildFile::new(compressed));
            }

            debug!(compressed = matching.len(), "gzipped entries");
            Ok(())
        })
    }
}

fn gzip_bytes(input: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(input)?;
    encoder.finish()
}
