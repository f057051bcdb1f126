//! Compiling C/C++ library target.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};

use crate::ast::CcLibraryAttrs;
use crate::env::{COMPILE_FLAGS, Environment, Label};
use crate::makefile::{CommandLine, Makefile, escape};
use crate::paths;

use super::{FileSet, Node};

/// Compiles a list of source files into object files, one compile rule per
/// source, against an aggregated dependency set supplied by the graph.
#[derive(Debug)]
pub struct CcLibraryNode {
    label: Label,
    deps: Vec<String>,
    env: Arc<Environment>,
    sources: Vec<Utf8PathBuf>,
    headers: Vec<Utf8PathBuf>,
    objects: Vec<Utf8PathBuf>,
    compile_args: Vec<String>,
}

impl CcLibraryNode {
    /// Construct from parsed attributes. Declared source and header paths
    /// are normalised to repository-relative by joining against the
    /// target's directory; pre-built objects stay as declared and are
    /// joined lazily in [`Node::object_files`].
    #[must_use]
    pub fn new(
        label: Label,
        deps: Vec<String>,
        attrs: CcLibraryAttrs,
        env: Arc<Environment>,
    ) -> Self {
        let sources = resolve(label.dir(), attrs.sources);
        let headers = resolve(label.dir(), attrs.headers);
        Self {
            label,
            deps,
            env,
            sources,
            headers,
            objects: attrs.objects,
            compile_args: attrs.compile_args,
        }
    }

    /// Object file path a source compiles to: `<object_dir>/<source>.o`.
    #[must_use]
    pub fn object_path(&self, source: &Utf8Path) -> Utf8PathBuf {
        paths::join(self.env.object_dir(), format!("{source}.o"))
    }

    fn compile_command(&self, source: &Utf8Path, object: &Utf8Path) -> String {
        let mkdir = CommandLine::new()
            .word("mkdir")
            .word("-p")
            .path(paths::dirname(object));
        let compile = CommandLine::new()
            .word("$(CXX)")
            .word("$(CXXFLAGS)")
            .word("-c")
            .word(format!("-I{}", escape(self.env.root_dir().as_str())))
            .word(format!("-I{}", escape(self.env.genfile_dir().as_str())))
            .word(format!("-I{}", escape(self.env.source_dir().as_str())))
            .words(self.env.flags(COMPILE_FLAGS).iter().cloned())
            .words(self.compile_args.iter().cloned())
            .path(source)
            .word("-o")
            .path(object);
        format!("{}; {}", mkdir.render(), compile.render())
    }
}

fn resolve(dir: &Utf8Path, declared: Vec<Utf8PathBuf>) -> Vec<Utf8PathBuf> {
    declared.into_iter().map(|p| paths::join(dir, p)).collect()
}

impl Node for CcLibraryNode {
    fn label(&self) -> &Label {
        &self.label
    }

    fn deps(&self) -> &[String] {
        &self.deps
    }

    fn file_dependencies(&self) -> Vec<Utf8PathBuf> {
        self.headers.clone()
    }

    fn object_files(&self) -> Vec<Utf8PathBuf> {
        self.sources
            .iter()
            .map(|src| self.object_path(src))
            .chain(
                self.objects
                    .iter()
                    .map(|obj| paths::join(self.label.dir(), obj)),
            )
            .collect()
    }

    fn write_rules(&self, deps: &FileSet, out: &mut Makefile) {
        for src in &self.sources {
            let obj = self.object_path(src);
            let mut prereqs: Vec<String> =
                deps.iter().map(|p| escape(p.as_str())).collect();
            // The source is a prerequisite too, unless the aggregated set
            // already names it.
            if !deps.contains(src) {
                prereqs.push(escape(src.as_str()));
            }
            out.start_rule(&escape(obj.as_str()), &prereqs);
            out.write_command(&self.compile_command(src, &obj));
            out.finish_rule();
        }
    }

    fn write_clean(&self, _out: &mut Makefile) {
        // Objects live under the object directory, which the generated
        // clean rule removes wholesale.
    }
}
