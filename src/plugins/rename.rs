// src/plugins/rename.rs

use futures::future::BoxFuture;
use globset::GlobSet;
use tracing::debug;

use crate::errors::{ConfigError, Result};
use crate::pipeline::files::BuildFileSet;
use crate::pipeline::patterns::build_globset;
use crate::pipeline::{BuildContext, Plugin};

/// Strips a suffix from the keys matching a pattern.
///
/// `Rename::new("**/*.hbs", ".hbs")` moves `page.html.hbs` to `page.html`.
/// Contents and metadata travel with the entry; a stripped key that
/// collides with an existing entry replaces it.
pub struct Rename {
    pattern: String,
    strip_suffix: String,
    set: GlobSet,
}

impl Rename {
    pub fn new(
        pattern: impl Into<String>,
        strip_suffix: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let pattern = pattern.into();
        let set = build_globset(std::slice::from_ref(&pattern))?;
        Ok(Self {
            pattern,
            strip_suffix: strip_suffix.into(),
            set,
        })
    }
}

impl Plugin for Rename {
    fn name(&self) -> &str {
        "rename"
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

            let mut renamed = 0usize;
            for key in matching {
                let Some(stripped) = key.strip_suffix(&self.strip_suffix) else {
                    continue;
                };
                if stripped.is_empty() {
                    continue;
                }
                if let Some(file) = files.remove(&key) {
                    files.insert(stripped.to_string(), file);
                    renamed += 1;
                }
            }

            debug!(pattern = %self.pattern, renamed, "renamed entries");
            Ok(())
        })
    }
}
