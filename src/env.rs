//! Build environment and target identity.
//!
//! The [`Environment`] carries the global directory layout and flag
//! categories for one generation run. It is constructed once and passed
//! explicitly into every node, so nodes stay testable with synthetic
//! environments instead of reading process-wide state.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;

use crate::paths;

/// Directory the virtual source tree is mounted under.
pub const SOURCE_DIR: &str = ".gen-src";
/// Directory compiled object files are written to.
pub const OBJECT_DIR: &str = ".gen-obj";
/// Directory generated files are mounted under.
pub const GENFILE_DIR: &str = ".gen-files";

/// Flag category consumed by compile rules.
pub const COMPILE_FLAGS: &str = "compile";

/// Ordered flag lists keyed by category name.
pub type Flags = IndexMap<String, Vec<String>>;

/// Global directories and flags for one generation run.
///
/// Read-only once constructed. All directories are repository-relative so
/// the generated Makefile remains relocatable.
#[derive(Debug, Clone)]
pub struct Environment {
    root_dir: Utf8PathBuf,
    source_dir: Utf8PathBuf,
    object_dir: Utf8PathBuf,
    genfile_dir: Utf8PathBuf,
    flags: Flags,
}

impl Environment {
    /// Create an environment rooted at `root` with the standard directory
    /// layout and no flags.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        let root_dir = root.into();
        Self {
            source_dir: paths::join(&root_dir, SOURCE_DIR),
            object_dir: paths::join(&root_dir, OBJECT_DIR),
            genfile_dir: paths::join(&root_dir, GENFILE_DIR),
            root_dir,
            flags: Flags::new(),
        }
    }

    /// Attach flag categories, replacing any existing ones.
    #[must_use]
    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    /// Repository root directory.
    #[must_use]
    pub fn root_dir(&self) -> &Utf8Path {
        &self.root_dir
    }

    /// Virtual source mount directory.
    #[must_use]
    pub fn source_dir(&self) -> &Utf8Path {
        &self.source_dir
    }

    /// Object file output directory.
    #[must_use]
    pub fn object_dir(&self) -> &Utf8Path {
        &self.object_dir
    }

    /// Generated file mount directory.
    #[must_use]
    pub fn genfile_dir(&self) -> &Utf8Path {
        &self.genfile_dir
    }

    /// Ordered flags for `category`, empty when the category is absent.
    #[must_use]
    pub fn flags(&self, category: &str) -> &[String] {
        self.flags.get(category).map_or(&[], Vec::as_slice)
    }
}

/// Identity of a target node: its directory and name within that directory.
///
/// The full path `dir:name` is how declarations reference each other in
/// `deps` lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label {
    dir: Utf8PathBuf,
    name: String,
}

impl Label {
    /// Create a label for `name` declared in `dir`.
    #[must_use]
    pub fn new(dir: impl Into<Utf8PathBuf>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
        }
    }

    /// Directory the target was declared in.
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Target name within its directory.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full reference path, `dir:name`, or just `name` for root targets.
    #[must_use]
    pub fn full_path(&self) -> String {
        if self.dir.as_str().is_empty() || self.dir.as_str() == "." {
            self.name.clone()
        } else {
            format!("{}:{}", self.dir, self.name)
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full_path())
    }
}
