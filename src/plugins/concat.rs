// src/plugins/concat.rs

use anyhow::anyhow;
use futures::future::BoxFuture;
use globset::GlobSet;
use tracing::debug;

use crate::errors::{ConfigError, Result, SitesmithError};
use crate::pipeline::files::{BuildFile, BuildFileSet};
use crate::pipeline::patterns::build_globset;
use crate::pipeline::{BuildContext, Plugin};

/// Joins the entries matching a list of patterns into one output entry.
///
/// Inputs are concatenated with a newline between them, in pattern order
/// and key order within each pattern, then removed from the set. A pattern
/// without glob metacharacters names a required file: matching nothing is
/// an error. Glob patterns may match nothing.
pub struct Concat {
    patterns: Vec<CompiledPattern>,
    output: String,
}

struct CompiledPattern {
    pattern: String,
    set: GlobSet,
    literal: bool,
}

impl Concat {
    pub fn new<I, S>(files: I, output: impl Into<String>) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns = files
            .into_iter()
            .map(|p| {
                let pattern = p.into();
                let set = build_globset(std::slice::from_ref(&pattern))?;
                let literal = !pattern.contains(['*', '?', '[', '{']);
                Ok(CompiledPattern {
                    pattern,
                    set,
                    literal,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Self {
            patterns,
            output: output.into(),
        })
    }
}

impl Plugin for Concat {
    fn name(&self) -> &str {
        "concat"
    }

    fn run<'a>(
        &'a self,
        files: &'a mut BuildFileSet,
        _ctx: BuildContext<'a>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let mut selected: Vec<String> = Vec::new();
            for compiled in &self.patterns {
                let matched: Vec<String> = files
                    .keys()
                    .filter(|key| compiled.set.is_match(key.as_str()))
                    .cloned()
                    .collect();
                if matched.is_empty() && compiled.literal {
                    return Err(SitesmithError::Other(anyhow!(
                        "concat: input '{}' matched no files",
                        compiled.pattern
                    )));
                }
                for key in matched {
                    if !selected.contains(&key) {
                        selected.push(key);
                    }
                }
            }

            let mut combined: Vec<u8> = Vec::new();
            let mut first = true;
            for key in &selected {
                let Some(file) = files.remove(key) else {
                    continue;
                };
                if !first {
                    combined.push(b'\n');
                }
                combined.extend_from_slice(&file.contents);
                first = false;
            }

            debug!(
                inputs = selected.len(),
                output = %self.output,
                "concatenated entries"
            );
            files.insert(self.output.clone(), BuildFile::new(combined));
            Ok(())
        })
    }
}
