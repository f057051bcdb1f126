//! Target node contract and construction.
//!
//! Every buildable target implements [`Node`]: it declares the files its
//! rules depend on, the object files it contributes toward linking, and how
//! it renders itself into the generated Makefile. Nodes are immutable once
//! constructed from their declaration; rule emission is pure string
//! composition against an already-computed aggregated dependency set, so it
//! cannot fail and is byte-stable for identical inputs.

use std::collections::BTreeSet;
use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::ast::{Declaration, NodeAttrs};
use crate::env::{Environment, Label};
use crate::makefile::Makefile;

mod cc_library;
mod config;

pub use cc_library::CcLibraryNode;
pub use config::ConfigNode;

/// Sorted, deduplicated set of file paths gating a node's rules.
pub type FileSet = BTreeSet<Utf8PathBuf>;

/// A fatal problem with a target declaration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required attribute was absent from the declaration.
    #[error("missing required field `{field}` in {kind} target at {dir}")]
    MissingField {
        /// Directory of the offending target.
        dir: Utf8PathBuf,
        /// Node kind the declaration named.
        kind: &'static str,
        /// The absent attribute.
        field: &'static str,
    },
}

/// Common contract of every buildable target.
pub trait Node: std::fmt::Debug {
    /// The node's identity.
    fn label(&self) -> &Label;

    /// Full-path references to the targets this node depends on.
    fn deps(&self) -> &[String];

    /// Files this node itself contributes to dependents' rule
    /// prerequisites. Does not recurse into sub-targets; transitive
    /// aggregation is the graph's responsibility.
    fn file_dependencies(&self) -> Vec<Utf8PathBuf>;

    /// Artifacts this node contributes toward a final link step.
    fn object_files(&self) -> Vec<Utf8PathBuf>;

    /// Render this node's rules. `deps` is the aggregated dependency file
    /// set: the union of every transitive dependency's file contributions
    /// with this node's own.
    fn write_rules(&self, deps: &FileSet, out: &mut Makefile);

    /// Render removal commands for anything this node creates outside the
    /// object tree. Commands land inside the caller's open `clean` rule.
    fn write_clean(&self, out: &mut Makefile);

    /// Full path to register as a base dependency root with the build
    /// description reader, if this node requires one.
    fn base_dependency(&self) -> Option<String> {
        None
    }
}

/// Build a node from its parsed declaration.
///
/// # Errors
///
/// Returns a [`ConfigError`] when a required attribute is absent.
pub fn from_declaration(
    decl: &Declaration,
    env: Arc<Environment>,
) -> Result<Box<dyn Node>, ConfigError> {
    let label = Label::new(decl.dir.clone(), decl.name.clone());
    match &decl.attrs {
        NodeAttrs::CcLibrary(attrs) => Ok(Box::new(CcLibraryNode::new(
            label,
            decl.deps.clone(),
            attrs.clone(),
            env,
        ))),
        NodeAttrs::Config(attrs) => Ok(Box::new(ConfigNode::new(
            label,
            decl.deps.clone(),
            attrs.clone(),
            env,
        )?)),
    }
}
