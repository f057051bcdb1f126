//! Component-virtualising configuration target.
//!
//! A config node does not compile anything. It bridges an externally
//! checked-out component tree into the workspace's virtual source and
//! generated-file namespaces via relative symlinks, and gates dependents on
//! timestamp-stable marker files rather than on the linked directories.
//! Directory mtimes change whenever anything inside changes; the marker is
//! touched once on first creation and never again, so edits inside the
//! external tree cannot retrigger this component's dependents.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};

use crate::ast::ConfigAttrs;
use crate::env::{Environment, Label};
use crate::makefile::{CommandLine, Makefile, escape};
use crate::paths;

use super::{ConfigError, FileSet, Node};

const MARKER_NAME: &str = ".dummy";

/// Virtualises an external component's tree into the workspace via
/// symlinks plus marker files.
#[derive(Debug)]
pub struct ConfigNode {
    label: Label,
    deps: Vec<String>,
    env: Arc<Environment>,
    component: String,
    component_root: Utf8PathBuf,
    source_marker: Utf8PathBuf,
    genfile_marker: Utf8PathBuf,
}

impl ConfigNode {
    /// Construct from parsed attributes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when the declaration has no
    /// `component` attribute. An empty `component` is accepted and makes
    /// every emission method a no-op.
    pub fn new(
        label: Label,
        deps: Vec<String>,
        attrs: ConfigAttrs,
        env: Arc<Environment>,
    ) -> Result<Self, ConfigError> {
        let Some(component) = attrs.component else {
            return Err(ConfigError::MissingField {
                dir: label.dir().to_path_buf(),
                kind: "config",
                field: "component",
            });
        };
        let source_marker = marker_file(&mount_dir(&env, "", &component));
        let genfile_marker =
            marker_file(&mount_dir(&env, env.genfile_dir().as_str(), &component));
        Ok(Self {
            label,
            deps,
            env,
            component,
            component_root: attrs.component_root,
            source_marker,
            genfile_marker,
        })
    }

    fn is_inert(&self) -> bool {
        self.component.is_empty()
    }

    /// The virtual source mount for this component.
    #[must_use]
    pub fn source_mount(&self) -> Utf8PathBuf {
        mount_dir(&self.env, "", &self.component)
    }

    /// The virtual generated-file mount for this component.
    #[must_use]
    pub fn genfile_mount(&self) -> Utf8PathBuf {
        mount_dir(&self.env, self.env.genfile_dir().as_str(), &self.component)
    }

    /// Symlink rule plus marker rule for one mount.
    ///
    /// The link target is relative: enough `../` segments to climb from the
    /// mount's parent back to the workspace root, then down into the real
    /// external path. Relative links keep the workspace relocatable.
    fn add_symlink(&self, mount: &Utf8Path, external: &Utf8Path, out: &mut Makefile) {
        let parent = paths::dirname(mount);
        let link = Utf8PathBuf::from(format!("{}{}", paths::ascent(&parent), external));

        out.start_rule(&escape(mount.as_str()), std::iter::empty::<&str>());
        let mkdir = CommandLine::new().word("mkdir").word("-p").path(&parent);
        let ensure_external = CommandLine::new()
            .word("[")
            .word("-f")
            .path(external)
            .word("]")
            .word("||")
            .word("mkdir")
            .word("-p")
            .path(external);
        let symlink = CommandLine::new()
            .word("ln")
            .word("-f")
            .word("-s")
            .path(&link)
            .path(mount);
        out.write_command(&format!(
            "{}; {}; {}",
            mkdir.render(),
            ensure_external.render(),
            symlink.render()
        ));
        out.finish_rule();

        // Marker file, gating dependents on a stable timestamp instead of
        // the directory's. The touch is conditional: once created, the
        // marker is never re-touched.
        let marker = marker_file(mount);
        out.start_rule(&escape(marker.as_str()), [escape(mount.as_str())]);
        let touch = CommandLine::new()
            .word("[")
            .word("-f")
            .path(&marker)
            .word("]")
            .word("||")
            .word("touch")
            .path(&marker);
        out.write_command(&touch.render());
        out.finish_rule();
    }
}

fn mount_dir(env: &Environment, middle: &str, component: &str) -> Utf8PathBuf {
    paths::join(env.source_dir(), paths::join(middle.into(), component))
}

fn marker_file(mount: &Utf8Path) -> Utf8PathBuf {
    mount.join(MARKER_NAME)
}

impl Node for ConfigNode {
    fn label(&self) -> &Label {
        &self.label
    }

    fn deps(&self) -> &[String] {
        &self.deps
    }

    fn file_dependencies(&self) -> Vec<Utf8PathBuf> {
        if self.is_inert() {
            return Vec::new();
        }
        // Exactly the markers, never the mount directories.
        vec![self.source_marker.clone(), self.genfile_marker.clone()]
    }

    fn object_files(&self) -> Vec<Utf8PathBuf> {
        Vec::new()
    }

    fn write_rules(&self, _deps: &FileSet, out: &mut Makefile) {
        if self.is_inert() {
            return;
        }

        // Source namespace: mount the external root itself.
        let external = paths::join(self.label.dir(), &self.component_root);
        self.add_symlink(&self.source_mount(), &external, out);

        // Generated-file namespace: same external root composed with the
        // genfile directory convention.
        let genfile_external = paths::join(self.env.genfile_dir(), external);
        self.add_symlink(&self.genfile_mount(), &genfile_external, out);
    }

    fn write_clean(&self, out: &mut Makefile) {
        if self.is_inert() {
            return;
        }
        for path in [
            self.source_marker.clone(),
            self.source_mount(),
            self.genfile_marker.clone(),
            self.genfile_mount(),
        ] {
            let rm = CommandLine::new().word("rm").word("-rf").path(path);
            out.write_command(&rm.render());
        }
    }

    fn base_dependency(&self) -> Option<String> {
        Some(self.label.full_path())
    }
}
