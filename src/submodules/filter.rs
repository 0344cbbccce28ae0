// src/submodules/filter.rs

use crate::pipeline::patterns::IgnorePatterns;

use super::rules::ModuleSpec;

/// Select the module-relative paths a module actually merges.
///
/// A path survives when it matches the module's include patterns, none of
/// its exclude patterns, and none of the build's ignore patterns. Input
/// order is preserved.
pub fn filter_files(spec: &ModuleSpec, ignore: &IgnorePatterns, names: &[String]) -> Vec<String> {
    names
        .iter()
        .filter(|name| spec.matches(name) && !ignore.is_match(name))
        .cloned()
        .collect()
}
