// src/submodules/rules.rs

//! Declarative submodule rules and their decoded form.
//!
//! A module map associates source directories (the map keys, relative to the
//! working directory) with rules describing what to pull out of them. Rules
//! come in three shapes: a single include pattern, a list of include
//! patterns, or a full record. Decoding normalizes all three into
//! [`ModuleSpec`] values with eagerly compiled glob sets, so every
//! configuration mistake surfaces before any filesystem or process work
//! starts.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use globset::GlobSet;
use serde::Deserialize;

use crate::errors::ConfigError;
use crate::pipeline::files::SiteMetadata;
use crate::pipeline::patterns::{build_globset, IncludePatterns};

/// Hook invoked with a pre-command's raw captured stdout.
pub type CaptureHook = Arc<dyn Fn(&str, &mut SiteMetadata) + Send + Sync>;

/// One pattern or a list of patterns.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Patterns {
    One(String),
    Many(Vec<String>),
}

impl Patterns {
    fn into_vec(self) -> Vec<String> {
        match self {
            Patterns::One(pattern) => vec![pattern],
            Patterns::Many(patterns) => patterns,
        }
    }
}

/// A pre-command: a bare program name or a full argv list. Commands are
/// spawned directly, never through a shell.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PrecmdSpec {
    Program(String),
    Argv(Vec<String>),
}

impl PrecmdSpec {
    fn into_argv(self) -> Vec<String> {
        match self {
            PrecmdSpec::Program(program) => vec![program],
            PrecmdSpec::Argv(argv) => argv,
        }
    }
}

/// Full record form of a module rule.
#[derive(Clone, Default, Deserialize)]
pub struct ModuleRecord {
    pub include: Option<Patterns>,
    pub exclude: Option<Patterns>,
    /// Prefix the selected files are merged under. Defaults to the module
    /// key, so an unconfigured module keeps its own directory name; `.`
    /// merges at the file-set root.
    pub dest: Option<String>,
    pub precmd: Option<PrecmdSpec>,
    /// Declarative capture: store the pre-command's trimmed stdout under
    /// this site metadata key. Meaningless without `precmd`.
    pub capture_stdout_to: Option<String>,
    /// Programmatic capture hook, set through [`ModuleRecord::capture_stdout`].
    /// Receives the raw stdout. Mutually exclusive with `capture_stdout_to`.
    #[serde(skip)]
    pub capture: Option<CaptureHook>,
    /// Rejected during decode. The map key names the source directory.
    pub src: Option<String>,
}

impl ModuleRecord {
    /// Record selecting the given include patterns.
    pub fn with_include<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include: Some(Patterns::Many(
                patterns.into_iter().map(Into::into).collect(),
            )),
            ..Self::default()
        }
    }

    pub fn exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = Some(Patterns::Many(
            patterns.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn dest(mut self, dest: impl Into<String>) -> Self {
        self.dest = Some(dest.into());
        self
    }

    pub fn precmd<I, S>(mut self, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.precmd = Some(PrecmdSpec::Argv(
            argv.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Install a hook that receives the pre-command's raw stdout.
    pub fn capture_stdout<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &mut SiteMetadata) + Send + Sync + 'static,
    {
        self.capture = Some(Arc::new(hook));
        self
    }

    /// Store the pre-command's trimmed stdout under a site metadata key.
    pub fn capture_stdout_to(mut self, key: impl Into<String>) -> Self {
        self.capture_stdout_to = Some(key.into());
        self
    }
}

impl fmt::Debug for ModuleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRecord")
            .field("include", &self.include)
            .field("exclude", &self.exclude)
            .field("dest", &self.dest)
            .field("precmd", &self.precmd)
            .field("capture_stdout_to", &self.capture_stdout_to)
            .field("capture", &self.capture.as_ref().map(|_| "<hook>"))
            .finish()
    }
}

/// One module rule, in any of its three accepted shapes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ModuleRule {
    /// A single include pattern.
    Single(String),
    /// A list of include patterns.
    Many(Vec<String>),
    /// Full record form.
    Record(ModuleRecord),
}

/// Source directory -> rule. Ordered, so modules decode and run in a
/// deterministic order.
pub type ModuleMap = BTreeMap<String, ModuleRule>;

/// A fully decoded and validated module rule.
#[derive(Clone)]
pub struct ModuleSpec {
    /// Source directory, relative to the working directory.
    pub source: String,
    /// Destination prefix inside the file set. Defaults to the source key;
    /// `.` means the root.
    pub dest: String,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub precmd: Option<Vec<String>>,
    pub capture: Option<CaptureHook>,
    include_set: IncludePatterns,
    exclude_set: Option<GlobSet>,
}

impl ModuleSpec {
    /// Whether a module-relative path is selected by the include patterns
    /// and not rejected by the exclude patterns. Hidden entries follow the
    /// [`IncludePatterns`] dotfile rule: a `.`-initial segment needs an
    /// include pattern spelling the leading dot.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.include_set.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude_set {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }
}

impl fmt::Debug for ModuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleSpec")
            .field("source", &self.source)
            .field("dest", &self.dest)
            .field("include", &self.include)
            .field("exclude", &self.exclude)
            .field("precmd", &self.precmd)
            .finish_non_exhaustive()
    }
}

/// Decode and validate a module map. Every rule is checked and its globs
/// compiled before any module is acted on.
pub fn decode_modules(map: ModuleMap) -> Result<Vec<ModuleSpec>, ConfigError> {
    let mut specs = Vec::with_capacity(map.len());

    for (key, rule) in map {
        let record = match rule {
            ModuleRule::Single(pattern) => ModuleRecord {
                include: Some(Patterns::One(pattern)),
                ..ModuleRecord::default()
            },
            ModuleRule::Many(patterns) => ModuleRecord {
                include: Some(Patterns::Many(patterns)),
                ..ModuleRecord::default()
            },
            ModuleRule::Record(record) => record,
        };

        if record.src.is_some() {
            return Err(ConfigError::SrcNotAllowed { key });
        }
        let Some(include) = record.include else {
            return Err(ConfigError::MissingInclude { key });
        };

        let precmd = match record.precmd.map(PrecmdSpec::into_argv) {
            Some(argv) if argv.first().is_none_or(|c| c.is_empty()) => {
                return Err(ConfigError::EmptyPrecmd { key });
            }
            other => other,
        };

        let capture = match (record.capture, record.capture_stdout_to) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::CaptureConflict { key });
            }
            (Some(hook), None) => Some(hook),
            (None, Some(meta_key)) => Some(trimmed_capture(meta_key)),
            (None, None) => None,
        };

        let include = include.into_vec();
        let exclude = record.exclude.map(Patterns::into_vec).unwrap_or_default();

        let include_set = IncludePatterns::compile(&include)?;
        let exclude_set = if exclude.is_empty() {
            None
        } else {
            Some(build_globset(&exclude)?)
        };

        let dest = record.dest.unwrap_or_else(|| key.clone());
        specs.push(ModuleSpec {
            source: key,
            dest,
            include,
            exclude,
            precmd,
            capture,
            include_set,
            exclude_set,
        });
    }

    Ok(specs)
}

/// The canned hook behind `capture_stdout_to`: trim and store as a string.
fn trimmed_capture(meta_key: String) -> CaptureHook {
    Arc::new(move |stdout: &str, metadata: &mut SiteMetadata| {
        metadata.insert(meta_key.clone(), stdout.trim().to_string());
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_toml(input: &str) -> Result<Vec<ModuleSpec>, ConfigError> {
        let map: ModuleMap = toml::from_str(input).unwrap();
        decode_modules(map)
    }

    #[test]
    fn decodes_all_three_rule_shapes() {
        let specs = decode_toml(
            r#"
            "inc/a" = "**/*.css"
            "inc/b" = ["*.js", "lib/*.js"]

            ["inc/c"]
            include = "fonts/**"
            dest = "assets"
            "#,
        )
        .unwrap();

        assert_eq!(specs.len(), 3);
        assert_eq!(specs[0].source, "inc/a");
        assert_eq!(specs[0].include, ["**/*.css"]);
        assert_eq!(specs[0].dest, "inc/a");
        assert_eq!(specs[1].include, ["*.js", "lib/*.js"]);
        assert_eq!(specs[2].dest, "assets");
    }

    #[test]
    fn record_without_include_is_rejected() {
        let err = decode_toml(
            r#"
            ["inc/a"]
            dest = "s"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingInclude { key } if key == "inc/a"));
    }

    #[test]
    fn src_key_is_rejected() {
        let err = decode_toml(
            r#"
            ["inc/a"]
            include = "*"
            src = "somewhere/else"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::SrcNotAllowed { key } if key == "inc/a"));
    }

    #[test]
    fn empty_precmd_is_rejected() {
        let err = decode_toml(
            r#"
            ["inc/a"]
            include = "*"
            precmd = []
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyPrecmd { key } if key == "inc/a"));
    }

    #[test]
    fn capture_conflict_is_rejected() {
        let map: ModuleMap = toml::from_str(
            r#"
            ["inc/a"]
            include = "*"
            precmd = "./gen"
            capture_stdout_to = "KEY"
            "#,
        )
        .unwrap();
        let map: ModuleMap = map
            .into_iter()
            .map(|(key, rule)| {
                let ModuleRule::Record(record) = rule else {
                    panic!("expected record rule");
                };
                let record = record.capture_stdout(|_, _| {});
                (key, ModuleRule::Record(record))
            })
            .collect();

        let err = decode_modules(map).unwrap_err();
        assert!(matches!(err, ConfigError::CaptureConflict { key } if key == "inc/a"));
    }

    #[test]
    fn capture_stdout_to_installs_trimming_hook() {
        let specs = decode_toml(
            r#"
            ["inc/a"]
            include = "*"
            precmd = "./gen"
            capture_stdout_to = "OUT_DIR"
            "#,
        )
        .unwrap();

        let hook = specs[0].capture.as_ref().unwrap();
        let mut metadata = SiteMetadata::new();
        hook("  build/out \n", &mut metadata);
        assert_eq!(metadata.get_str("OUT_DIR"), Some("build/out"));
    }

    #[test]
    fn matches_applies_include_then_exclude() {
        let specs = decode_toml(
            r#"
            ["inc/a"]
            include = "**/*.css"
            exclude = "vendor/**"
            "#,
        )
        .unwrap();

        let spec = &specs[0];
        assert!(spec.matches("site.css"));
        assert!(spec.matches("nested/site.css"));
        assert!(!spec.matches("vendor/lib.css"));
        assert!(!spec.matches("site.js"));
    }

    #[test]
    fn hidden_files_need_a_spelled_include() {
        let specs = decode_toml(
            r#"
            "inc/a" = "**/*"
            "inc/b" = [".env", "**/*.js"]
            "#,
        )
        .unwrap();

        let wildcard = &specs[0];
        assert!(wildcard.matches("app.js"));
        assert!(!wildcard.matches(".gitignore"));
        assert!(!wildcard.matches(".git/config"));

        let spelled = &specs[1];
        assert!(spelled.matches(".env"));
        assert!(spelled.matches("lib/app.js"));
        assert!(!spelled.matches("lib/.app.js"));
    }

    #[test]
    fn invalid_include_glob_fails_decode() {
        let err = decode_toml(r#""inc/a" = "a[bad""#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGlob { .. }));
    }
}
