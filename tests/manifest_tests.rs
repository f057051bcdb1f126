//! Tests for build description parsing.

use makegen::ast::NodeAttrs;
use makegen::manifest::{self, ManifestError};
use rstest::rstest;

#[rstest]
fn parses_both_node_kinds() {
    let yaml = concat!(
        "makegen_version: \"1.2.3\"\n",
        "flags:\n",
        "  compile: [\"-O2\", \"-Wall\"]\n",
        "targets:\n",
        "  - name: lib\n",
        "    dir: pkg\n",
        "    kind: cc_library\n",
        "    cc_sources: [a.cc]\n",
        "    cc_headers: [a.h]\n",
        "    cc_objects: [legacy.o]\n",
        "    cc_compile_args: [\"-DX\"]\n",
        "  - name: icu\n",
        "    dir: third_party/icu\n",
        "    kind: config\n",
        "    component: icu\n",
        "    component_root: source\n",
    );
    let manifest = manifest::from_str(yaml).expect("parse");
    assert_eq!(manifest.makegen_version.to_string(), "1.2.3");
    assert_eq!(manifest.flags["compile"], ["-O2", "-Wall"]);
    assert_eq!(manifest.targets.len(), 2);

    let NodeAttrs::CcLibrary(cc) = &manifest.targets[0].attrs else {
        panic!("expected cc_library attrs");
    };
    assert_eq!(cc.sources, ["a.cc"]);
    assert_eq!(cc.objects, ["legacy.o"]);

    let NodeAttrs::Config(config) = &manifest.targets[1].attrs else {
        panic!("expected config attrs");
    };
    assert_eq!(config.component.as_deref(), Some("icu"));
    assert_eq!(config.component_root, "source");
}

#[rstest]
fn absent_component_parses_as_none() {
    let yaml = concat!(
        "makegen_version: \"1.0.0\"\n",
        "targets:\n",
        "  - name: bar\n",
        "    kind: config\n",
    );
    let manifest = manifest::from_str(yaml).expect("parse");
    let NodeAttrs::Config(config) = &manifest.targets[0].attrs else {
        panic!("expected config attrs");
    };
    assert!(config.component.is_none());
}

#[rstest]
fn scalar_where_list_required_is_rejected() {
    let yaml = concat!(
        "makegen_version: \"1.0.0\"\n",
        "targets:\n",
        "  - name: lib\n",
        "    kind: cc_library\n",
        "    cc_sources: a.cc\n",
    );
    let err = manifest::from_str(yaml).expect_err("scalar source list");
    assert!(matches!(err, ManifestError::Parse { .. }));
}

#[rstest]
fn unknown_kind_is_rejected() {
    let yaml = concat!(
        "makegen_version: \"1.0.0\"\n",
        "targets:\n",
        "  - name: lib\n",
        "    kind: rust_library\n",
    );
    let err = manifest::from_str(yaml).expect_err("unknown kind");
    assert!(matches!(err, ManifestError::Parse { .. }));
}

#[rstest]
fn unknown_attribute_is_rejected() {
    let yaml = concat!(
        "makegen_version: \"1.0.0\"\n",
        "targets:\n",
        "  - name: lib\n",
        "    kind: cc_library\n",
        "    cc_banners: [x]\n",
    );
    let err = manifest::from_str(yaml).expect_err("unknown attribute");
    assert!(matches!(err, ManifestError::Parse { .. }));
}

#[rstest]
fn cross_kind_attributes_are_rejected() {
    let yaml = concat!(
        "makegen_version: \"1.0.0\"\n",
        "targets:\n",
        "  - name: bar\n",
        "    kind: config\n",
        "    component: foo\n",
        "    cc_sources: [a.cc]\n",
    );
    let err = manifest::from_str(yaml).expect_err("cc fields on config");
    assert!(matches!(err, ManifestError::Parse { .. }));
}

#[rstest]
fn future_major_version_is_rejected() {
    let yaml = "makegen_version: \"2.0.0\"\ntargets: []\n";
    let err = manifest::from_str(yaml).expect_err("future version");
    assert!(matches!(err, ManifestError::UnsupportedVersion { .. }));
}
