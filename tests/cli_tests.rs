//! Command line integration tests.

use assert_cmd::Command;
use predicates::prelude::*;

const DESCRIPTION: &str = concat!(
    "makegen_version: \"1.0.0\"\n",
    "targets:\n",
    "  - name: bar\n",
    "    dir: bar\n",
    "    kind: config\n",
    "    component: foo\n",
    "  - name: lib\n",
    "    kind: cc_library\n",
    "    cc_sources: [a.cc]\n",
    "    cc_headers: [a.h]\n",
    "    deps: [\"bar:bar\"]\n",
);

fn makegen() -> Command {
    Command::cargo_bin("makegen").expect("makegen binary")
}

#[test]
fn emit_writes_generated_makefile() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("BUILD.yaml"), DESCRIPTION).expect("write description");

    makegen()
        .current_dir(dir.path())
        .args(["emit", "out.mk"])
        .assert()
        .success();

    let text = std::fs::read_to_string(dir.path().join("out.mk")).expect("read output");
    assert!(text.contains(".PHONY: all clean"));
    assert!(text.contains(".gen-obj/a.cc.o:"));
    assert!(text.contains("[ -f .gen-src/foo/.dummy ] || touch .gen-src/foo/.dummy"));
}

#[test]
fn graph_prints_dot_to_stdout() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("BUILD.yaml"), DESCRIPTION).expect("write description");

    makegen()
        .current_dir(dir.path())
        .arg("graph")
        .assert()
        .success()
        .stdout(predicate::str::contains("digraph targets {"))
        .stdout(predicate::str::contains("\"lib\" -> \"bar:bar\";"));
}

#[test]
fn missing_description_is_a_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    makegen()
        .current_dir(dir.path())
        .args(["emit", "out.mk"])
        .assert()
        .failure();
}

#[test]
fn rejects_out_of_range_jobs() {
    makegen().args(["--jobs", "65", "graph"]).assert().failure();
}
