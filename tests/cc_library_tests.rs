//! Unit tests for compile rule generation.

use std::sync::Arc;

use camino::Utf8PathBuf;
use makegen::ast::CcLibraryAttrs;
use makegen::env::{COMPILE_FLAGS, Environment, Flags, Label};
use makegen::makefile::Makefile;
use makegen::node::{CcLibraryNode, FileSet, Node};
use rstest::rstest;

fn attrs(sources: &[&str], headers: &[&str], objects: &[&str]) -> CcLibraryAttrs {
    CcLibraryAttrs {
        sources: sources.iter().map(Utf8PathBuf::from).collect(),
        headers: headers.iter().map(Utf8PathBuf::from).collect(),
        objects: objects.iter().map(Utf8PathBuf::from).collect(),
        compile_args: Vec::new(),
    }
}

fn file_set(paths: &[&str]) -> FileSet {
    paths.iter().map(Utf8PathBuf::from).collect()
}

fn emit(node: &CcLibraryNode, deps: &FileSet) -> String {
    let mut out = Makefile::new();
    node.write_rules(deps, &mut out);
    out.into_contents()
}

#[rstest]
fn two_sources_one_header_yields_two_rules() {
    let node = CcLibraryNode::new(
        Label::new("", "lib"),
        Vec::new(),
        attrs(&["a.cc", "b.cc"], &["a.h"], &[]),
        Arc::new(Environment::new(".")),
    );
    let deps: FileSet = node.file_dependencies().into_iter().collect();
    let text = emit(&node, &deps);
    let expected = concat!(
        ".gen-obj/a.cc.o: a.h a.cc\n",
        "\tmkdir -p .gen-obj; $(CXX) $(CXXFLAGS) -c -I. -I.gen-files -I.gen-src a.cc -o .gen-obj/a.cc.o\n",
        "\n",
        ".gen-obj/b.cc.o: a.h b.cc\n",
        "\tmkdir -p .gen-obj; $(CXX) $(CXXFLAGS) -c -I. -I.gen-files -I.gen-src b.cc -o .gen-obj/b.cc.o\n",
        "\n",
    );
    assert_eq!(text, expected);
}

#[rstest]
fn emission_is_byte_identical_across_runs() {
    let node = CcLibraryNode::new(
        Label::new("pkg", "lib"),
        Vec::new(),
        attrs(&["a.cc", "b.cc"], &["a.h", "b.h"], &[]),
        Arc::new(Environment::new(".")),
    );
    let deps = file_set(&["pkg/a.h", "pkg/b.h", "vendor/v.h"]);
    assert_eq!(emit(&node, &deps), emit(&node, &deps));
}

#[rstest]
fn prerequisites_cover_set_and_source_without_duplicates() {
    let node = CcLibraryNode::new(
        Label::new("", "lib"),
        Vec::new(),
        attrs(&["a.cc"], &[], &[]),
        Arc::new(Environment::new(".")),
    );
    // The aggregated set already names the source file.
    let deps = file_set(&["a.cc", "a.h"]);
    let text = emit(&node, &deps);
    let first_line = text.lines().next().expect("rule line");
    assert_eq!(first_line, ".gen-obj/a.cc.o: a.cc a.h");
}

#[rstest]
fn object_files_count_sources_plus_prebuilt_in_order() {
    let node = CcLibraryNode::new(
        Label::new("pkg", "lib"),
        Vec::new(),
        attrs(&["a.cc", "b.cc"], &[], &["legacy.o"]),
        Arc::new(Environment::new(".")),
    );
    let objects = node.object_files();
    assert_eq!(objects.len(), 3);
    assert_eq!(
        objects,
        [".gen-obj/pkg/a.cc.o", ".gen-obj/pkg/b.cc.o", "pkg/legacy.o"]
    );
}

#[rstest]
fn global_flags_precede_node_arguments() {
    let mut flags = Flags::new();
    flags.insert(COMPILE_FLAGS.to_owned(), vec!["-O2".to_owned()]);
    let node = CcLibraryNode::new(
        Label::new("", "lib"),
        Vec::new(),
        CcLibraryAttrs {
            compile_args: vec!["-DLOCAL".to_owned()],
            ..attrs(&["a.cc"], &[], &[])
        },
        Arc::new(Environment::new(".").with_flags(flags)),
    );
    let text = emit(&node, &FileSet::new());
    assert!(text.contains("-I.gen-src -O2 -DLOCAL a.cc -o"));
}

#[rstest]
fn compile_command_keeps_spacey_paths_as_single_shell_words() {
    let node = CcLibraryNode::new(
        Label::new("", "lib"),
        Vec::new(),
        attrs(&["a b.cc"], &[], &[]),
        Arc::new(Environment::new(".")),
    );
    let text = emit(&node, &FileSet::new());
    let command = text
        .lines()
        .nth(1)
        .expect("command line")
        .trim_start_matches('\t');
    let words = shlex::split(command).expect("split command");
    assert!(words.contains(&"a b.cc".to_owned()));
    assert!(words.contains(&".gen-obj/a b.cc.o".to_owned()));
}

#[rstest]
fn declared_paths_resolve_against_target_directory() {
    let node = CcLibraryNode::new(
        Label::new("pkg", "lib"),
        Vec::new(),
        attrs(&["a.cc"], &["a.h"], &[]),
        Arc::new(Environment::new(".")),
    );
    assert_eq!(node.file_dependencies(), ["pkg/a.h"]);
    let deps: FileSet = node.file_dependencies().into_iter().collect();
    let text = emit(&node, &deps);
    assert!(text.starts_with(".gen-obj/pkg/a.cc.o: pkg/a.h pkg/a.cc\n"));
}
