//! The target graph and Makefile generation.
//!
//! Nodes live in an arena indexed by their full path, with dependency edges
//! as full-path references rather than owning links. Transitive dependency
//! file sets are aggregated through a memoised traversal before any rules
//! are emitted, and the arena preserves declaration order so generation is
//! deterministic: the same manifest always yields byte-identical output.

use std::collections::HashMap;
use std::sync::Arc;

use camino::Utf8PathBuf;
use indexmap::IndexMap;
use itertools::Itertools;
use thiserror::Error;
use tracing::debug;

use crate::ast::BuildManifest;
use crate::env::Environment;
use crate::makefile::{CommandLine, Makefile, escape};
use crate::node::{self, ConfigError, FileSet, Node};

mod cycle;

/// A fatal problem with the target graph as a whole.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Two declarations resolved to the same full path.
    #[error("duplicate target {full_path}")]
    DuplicateTarget {
        /// The colliding full path.
        full_path: String,
    },

    /// A `deps` entry references a target that was never declared.
    #[error("unknown dependency {dependency} referenced by {dependent}")]
    UnknownDependency {
        /// The referencing target.
        dependent: String,
        /// The undeclared reference.
        dependency: String,
    },

    /// Dependencies form a cycle.
    #[error("dependency cycle detected: {}", join_cycle(.cycle))]
    CircularDependency {
        /// The cycle, starting and ending at the same target.
        cycle: Vec<String>,
    },

    /// A declaration was invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// All target nodes of one build description, ready for generation.
#[derive(Debug)]
pub struct TargetGraph {
    env: Arc<Environment>,
    nodes: IndexMap<String, Box<dyn Node>>,
    base_dependencies: Vec<String>,
}

impl TargetGraph {
    /// Build the graph from a parsed build description.
    ///
    /// # Errors
    ///
    /// Returns a [`GraphError`] for invalid declarations, duplicate
    /// targets, unknown dependency references, or dependency cycles.
    pub fn from_manifest(
        manifest: &BuildManifest,
        env: Arc<Environment>,
    ) -> Result<Self, GraphError> {
        let mut nodes: IndexMap<String, Box<dyn Node>> = IndexMap::new();
        for decl in &manifest.targets {
            let node = node::from_declaration(decl, Arc::clone(&env))?;
            let full_path = node.label().full_path();
            if nodes.contains_key(&full_path) {
                return Err(GraphError::DuplicateTarget { full_path });
            }
            nodes.insert(full_path, node);
        }

        let base_dependencies = nodes
            .values()
            .filter_map(|n| n.base_dependency())
            .collect();

        let graph = Self {
            env,
            nodes,
            base_dependencies,
        };
        graph.check_references()?;
        graph.check_cycles()?;
        Ok(graph)
    }

    fn check_references(&self) -> Result<(), GraphError> {
        for (full_path, node) in &self.nodes {
            for dep in node.deps() {
                if !self.nodes.contains_key(dep) {
                    return Err(GraphError::UnknownDependency {
                        dependent: full_path.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_cycles(&self) -> Result<(), GraphError> {
        let edges: IndexMap<String, Vec<String>> = self
            .nodes
            .iter()
            .map(|(full_path, node)| (full_path.clone(), node.deps().to_vec()))
            .collect();
        match cycle::find_cycle(&edges) {
            Some(cycle) => Err(GraphError::CircularDependency { cycle }),
            None => Ok(()),
        }
    }

    /// The environment this graph was built against.
    #[must_use]
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Look up a node by full path.
    #[must_use]
    pub fn node(&self, full_path: &str) -> Option<&dyn Node> {
        self.nodes.get(full_path).map(|node| &**node)
    }

    /// Full paths registered as base dependency roots by their nodes.
    #[must_use]
    pub fn base_dependencies(&self) -> &[String] {
        &self.base_dependencies
    }

    /// The aggregated dependency file set for `full_path`: the union of
    /// every transitive dependency's file contributions with the node's
    /// own, deduplicated and sorted.
    #[must_use]
    pub fn aggregated_dependencies(&self, full_path: &str) -> FileSet {
        let mut cache = HashMap::new();
        self.closure(full_path, &mut cache)
    }

    fn closure(&self, full_path: &str, cache: &mut HashMap<String, FileSet>) -> FileSet {
        if let Some(hit) = cache.get(full_path) {
            return hit.clone();
        }
        let mut files = FileSet::new();
        if let Some(node) = self.nodes.get(full_path) {
            for dep in node.deps() {
                files.extend(self.closure(dep, cache));
            }
            files.extend(node.file_dependencies());
        }
        cache.insert(full_path.to_owned(), files.clone());
        files
    }

    /// Generate the complete Makefile text.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut out = Makefile::new();
        out.write_line("CXX ?= c++");
        out.write_line("CXXFLAGS ?=");
        out.write_line("");
        out.write_line(".PHONY: all clean");
        out.write_line("");

        let all_prereqs: Vec<String> = self
            .nodes
            .values()
            .flat_map(|node| primary_outputs(node.as_ref()))
            .map(|p| escape(p.as_str()))
            .collect();
        out.start_rule("all", &all_prereqs);
        out.finish_rule();

        let mut cache = HashMap::new();
        for (full_path, node) in &self.nodes {
            let aggregated = self.closure(full_path, &mut cache);
            debug!(target_path = %full_path, files = aggregated.len(), "emitting rules");
            node.write_rules(&aggregated, &mut out);
        }

        out.start_rule("clean", std::iter::empty::<&str>());
        let rm_objects = CommandLine::new()
            .word("rm")
            .word("-rf")
            .path(self.env.object_dir());
        out.write_command(&rm_objects.render());
        for node in self.nodes.values() {
            node.write_clean(&mut out);
        }
        out.finish_rule();

        out.into_contents()
    }

    /// Render the dependency graph in DOT form.
    #[must_use]
    pub fn dot(&self) -> String {
        let mut out = String::from("digraph targets {\n");
        for (full_path, node) in &self.nodes {
            out.push_str(&format!("  \"{full_path}\";\n"));
            for dep in node.deps() {
                out.push_str(&format!("  \"{full_path}\" -> \"{dep}\";\n"));
            }
        }
        out.push_str("}\n");
        out
    }
}

fn join_cycle(cycle: &[String]) -> String {
    cycle.iter().join(" -> ")
}

/// What a node contributes to the default `all` target: its object files,
/// or its declared file dependencies when it compiles nothing.
fn primary_outputs(node: &dyn Node) -> Vec<Utf8PathBuf> {
    let objects = node.object_files();
    if objects.is_empty() {
        node.file_dependencies()
    } else {
        objects
    }
}
