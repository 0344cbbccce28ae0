// src/pipeline/patterns.rs

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::errors::ConfigError;

/// Compile glob patterns into a matching set.
///
/// `*` and `?` stay within a single path segment; only `**` crosses
/// directory boundaries. Patterns match against `/`-separated relative
/// paths.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .map_err(|source| ConfigError::InvalidGlob {
                pattern: pat.clone(),
                source,
            })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| ConfigError::Invalid(format!("building glob set: {e}")))
}

/// Compiled include patterns with the conventional dotfile rule.
///
/// Wildcards skip hidden entries: a path with a `.`-initial segment is
/// selected only by a pattern that itself starts a component with a literal
/// `.`, the way shell globbing treats dotfiles. `**/*` therefore pulls in a
/// whole tree except its hidden files, while `.htaccess` or `.well-known/**`
/// name hidden entries on purpose.
#[derive(Debug, Clone)]
pub struct IncludePatterns {
    set: GlobSet,
    spells_dot: Vec<bool>,
}

impl IncludePatterns {
    /// Compile include patterns. Fails eagerly on an invalid pattern.
    pub fn compile(patterns: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            set: build_globset(patterns)?,
            spells_dot: patterns.iter().map(|p| spells_leading_dot(p)).collect(),
        })
    }

    pub fn is_match(&self, rel_path: &str) -> bool {
        if has_hidden_segment(rel_path) {
            self.set
                .matches(rel_path)
                .into_iter()
                .any(|i| self.spells_dot[i])
        } else {
            self.set.is_match(rel_path)
        }
    }
}

/// Whether any segment of a `/`-separated path names a hidden entry.
fn has_hidden_segment(rel_path: &str) -> bool {
    rel_path.split('/').any(|segment| segment.starts_with('.'))
}

/// Whether any component of a pattern begins with a literal `.`.
fn spells_leading_dot(pattern: &str) -> bool {
    pattern.split('/').any(|component| component.starts_with('.'))
}

/// Compiled ignore patterns for a build.
///
/// Paths are matched in relative `/`-separated form against the tree they
/// were listed from, so the same ignore list applies to the source tree and
/// to every assimilated module tree. Ignores are subtractive and match
/// plainly: `**/*~` strikes `.config/state~` too.
#[derive(Debug, Clone, Default)]
pub struct IgnorePatterns {
    set: Option<GlobSet>,
}

impl IgnorePatterns {
    /// Compile an ignore list. Fails eagerly on an invalid pattern.
    pub fn compile(patterns: &[String]) -> Result<Self, ConfigError> {
        let set = if patterns.is_empty() {
            None
        } else {
            Some(build_globset(patterns)?)
        };
        Ok(Self { set })
    }

    /// An ignore list that matches nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_match(&self, rel_path: &str) -> bool {
        self.set.as_ref().is_some_and(|set| set.is_match(rel_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(pats: &[&str]) -> Vec<String> {
        pats.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn star_does_not_cross_directories() {
        let set = build_globset(&patterns(&["*.css"])).unwrap();
        assert!(set.is_match("site.css"));
        assert!(!set.is_match("sub/site.css"));
    }

    #[test]
    fn double_star_crosses_directories() {
        let set = build_globset(&patterns(&["**/*.css"])).unwrap();
        assert!(set.is_match("site.css"));
        assert!(set.is_match("a/b/site.css"));
    }

    #[test]
    fn invalid_pattern_reports_the_pattern() {
        let err = build_globset(&patterns(&["a[unclosed"])).unwrap_err();
        match err {
            ConfigError::InvalidGlob { pattern, .. } => assert_eq!(pattern, "a[unclosed"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn wildcards_skip_hidden_entries() {
        let include = IncludePatterns::compile(&patterns(&["**/*"])).unwrap();
        assert!(include.is_match("app.js"));
        assert!(include.is_match("lib/app.js"));
        assert!(!include.is_match(".gitignore"));
        assert!(!include.is_match(".git/config"));
        assert!(!include.is_match("lib/.cache/app.js"));
    }

    #[test]
    fn spelled_dot_selects_hidden_entries() {
        let include =
            IncludePatterns::compile(&patterns(&[".htaccess", ".well-known/**"])).unwrap();
        assert!(include.is_match(".htaccess"));
        assert!(include.is_match(".well-known/security.txt"));
        assert!(!include.is_match(".hidden"));
    }

    #[test]
    fn interior_dots_are_not_hidden() {
        let include = IncludePatterns::compile(&patterns(&["MathJax.*/**"])).unwrap();
        assert!(include.is_match("MathJax.js/config.js"));
        assert!(!include.is_match("MathJax.js/.travis.yml"));
    }

    #[test]
    fn empty_ignore_matches_nothing() {
        let ignore = IgnorePatterns::empty();
        assert!(!ignore.is_match("anything/at/all.txt"));
    }

    #[test]
    fn ignore_matches_compiled_patterns() {
        let ignore = IgnorePatterns::compile(&patterns(&["*.swp", "drafts/**"])).unwrap();
        assert!(ignore.is_match("notes.swp"));
        assert!(ignore.is_match("drafts/2024/post.md"));
        assert!(!ignore.is_match("posts/final.md"));
    }
}
