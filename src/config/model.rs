// src/config/model.rs

use serde::Deserialize;

use crate::submodules::ModuleMap;

/// Top-level configuration as read from a `Sitesmith.toml` file.
///
/// This is a direct mapping of the file:
///
/// ```toml
/// [site]
/// title = "example.org"
///
/// [build]
/// source = "src"
/// destination = "rendered"
/// ignore = ["**/*.swp"]
///
/// [submodules]
/// "inc/normalize" = "normalize.css"
///
/// [concat]
/// files = ["css/*.css"]
/// output = "css/site.css"
///
/// [[rename]]
/// pattern = "**/*.hbs"
/// strip_suffix = ".hbs"
///
/// [gzip]
/// patterns = ["**/*.html", "**/*.css"]
/// ```
///
/// All sections are optional. Use [`SiteConfig::try_from`] (or
/// [`crate::config::load_and_validate`]) to get the validated form.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawSiteConfig {
    /// Free-form site metadata from `[site]`, exposed to every stage.
    #[serde(default)]
    pub site: toml::Table,

    /// Build directories and ignore patterns from `[build]`.
    #[serde(default)]
    pub build: BuildSection,

    /// Submodule rules from `[submodules]`. Keys are source directories
    /// relative to the config file's directory.
    #[serde(default)]
    pub submodules: ModuleMap,

    /// Optional `[concat]` stage.
    #[serde(default)]
    pub concat: Option<ConcatSection>,

    /// Zero or more `[[rename]]` stages, applied in file order.
    #[serde(default)]
    pub rename: Vec<RenameSection>,

    /// Optional `[gzip]` stage.
    #[serde(default)]
    pub gzip: Option<GzipSection>,
}

/// `[build]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    /// Source directory, relative to the config file's directory.
    #[serde(default = "default_source")]
    pub source: String,

    /// Destination directory, relative to the config file's directory.
    #[serde(default = "default_destination")]
    pub destination: String,

    /// Patterns dropped from the source tree and from every module tree.
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Whether the destination directory is removed before writing.
    #[serde(default = "default_clean")]
    pub clean: bool,
}

fn default_source() -> String {
    "src".to_string()
}

fn default_destination() -> String {
    "rendered".to_string()
}

fn default_clean() -> bool {
    true
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            source: default_source(),
            destination: default_destination(),
            ignore: Vec::new(),
            clean: default_clean(),
        }
    }
}

/// `[concat]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConcatSection {
    /// Patterns selecting the entries to join, in order.
    pub files: Vec<String>,
    /// Key of the combined output entry.
    pub output: String,
}

/// One `[[rename]]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RenameSection {
    pub pattern: String,
    pub strip_suffix: String,
}

/// `[gzip]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct GzipSection {
    pub patterns: Vec<String>,
}

/// Validated configuration.
///
/// Constructed through `TryFrom<RawSiteConfig>`; see `validate`.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    site: toml::Table,
    build: BuildSection,
    submodules: ModuleMap,
    concat: Option<ConcatSection>,
    rename: Vec<RenameSection>,
    gzip: Option<GzipSection>,
}

impl SiteConfig {
    /// Internal constructor used after validation has passed.
    pub(crate) fn new_unchecked(raw: RawSiteConfig) -> Self {
        Self {
            site: raw.site,
            build: raw.build,
            submodules: raw.submodules,
            concat: raw.concat,
            rename: raw.rename,
            gzip: raw.gzip,
        }
    }

    pub fn site(&self) -> &toml::Table {
        &self.site
    }

    pub fn build(&self) -> &BuildSection {
        &self.build
    }

    pub fn submodules(&self) -> &ModuleMap {
        &self.submodules
    }

    pub fn concat(&self) -> Option<&ConcatSection> {
        self.concat.as_ref()
    }

    pub fn rename(&self) -> &[RenameSection] {
        &self.rename
    }

    pub fn gzip(&self) -> Option<&GzipSection> {
        self.gzip.as_ref()
    }
}
