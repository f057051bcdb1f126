//! Build description Abstract Syntax Tree structures.
//!
//! This module defines the data structures for a parsed `BUILD.yaml`. Each
//! target declaration carries a `kind` tag selecting the node variant plus
//! that variant's recognised attributes; attributes belonging to a different
//! kind are rejected during deserialisation rather than silently ignored.
//!
//! ```rust
//! use makegen::ast::{BuildManifest, NodeAttrs};
//!
//! let yaml = concat!(
//!     "makegen_version: \"1.0.0\"\n",
//!     "targets:\n",
//!     "  - name: foo\n",
//!     "    kind: cc_library\n",
//!     "    cc_sources: [foo.cc]\n",
//! );
//! let manifest: BuildManifest = serde_saphyr::from_str(yaml).expect("parse");
//! assert!(matches!(manifest.targets[0].attrs, NodeAttrs::CcLibrary(_)));
//! ```

use camino::Utf8PathBuf;
use semver::Version;
use serde::{Deserialize, Serialize, de::Deserializer};

use crate::env::Flags;

/// Top-level build description parsed from a `BUILD.yaml`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BuildManifest {
    /// Semantic version of the build description format.
    pub makegen_version: Version,

    /// Global flag categories, e.g. `compile: ["-O2"]`.
    #[serde(default)]
    pub flags: Flags,

    /// Target declarations in file order.
    #[serde(default)]
    pub targets: Vec<Declaration>,
}

/// One target declaration.
#[derive(Debug, Clone, Serialize)]
pub struct Declaration {
    /// Target name within its directory.
    pub name: String,

    /// Directory the target is declared for, repository-relative. Declared
    /// file attributes are resolved against this directory.
    pub dir: Utf8PathBuf,

    /// Full-path references (`dir:name`) to targets this one depends on.
    pub deps: Vec<String>,

    /// Kind-specific attributes.
    pub attrs: NodeAttrs,
}

/// Kind-specific attributes of a declaration.
#[derive(Debug, Clone, Serialize)]
pub enum NodeAttrs {
    /// A compiling C/C++ library target.
    CcLibrary(CcLibraryAttrs),
    /// A component-virtualising configuration target.
    Config(ConfigAttrs),
}

/// Attributes recognised on `cc_library` targets. Paths are as declared,
/// relative to the target's directory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CcLibraryAttrs {
    /// Source files, one compile rule each.
    pub sources: Vec<Utf8PathBuf>,
    /// Header files contributed to dependents.
    pub headers: Vec<Utf8PathBuf>,
    /// Pre-built object files, already materialised under the target's
    /// directory.
    pub objects: Vec<Utf8PathBuf>,
    /// Extra compiler argument tokens in declaration order.
    pub compile_args: Vec<String>,
}

/// Attributes recognised on `config` targets.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigAttrs {
    /// External component token. Required; an empty value declares the
    /// target inert.
    pub component: Option<String>,
    /// Subdirectory of the external tree to mount; empty means its root.
    pub component_root: Utf8PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Kind {
    CcLibrary,
    Config,
}

impl<'de> Deserialize<'de> for Declaration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct RawDeclaration {
            name: String,
            kind: Kind,
            #[serde(default)]
            dir: Utf8PathBuf,
            #[serde(default)]
            deps: Vec<String>,
            #[serde(default)]
            cc_sources: Vec<Utf8PathBuf>,
            #[serde(default)]
            cc_headers: Vec<Utf8PathBuf>,
            #[serde(default)]
            cc_objects: Vec<Utf8PathBuf>,
            #[serde(default)]
            cc_compile_args: Vec<String>,
            component: Option<String>,
            #[serde(default)]
            component_root: Utf8PathBuf,
        }

        let raw = RawDeclaration::deserialize(deserializer)?;

        let config_fields_present =
            raw.component.is_some() || !raw.component_root.as_str().is_empty();
        let cc_fields_present = !raw.cc_sources.is_empty()
            || !raw.cc_headers.is_empty()
            || !raw.cc_objects.is_empty()
            || !raw.cc_compile_args.is_empty();

        let attrs = match raw.kind {
            Kind::CcLibrary => {
                if config_fields_present {
                    return Err(serde::de::Error::custom(format!(
                        "target {}: component fields are not valid on a cc_library target",
                        raw.name
                    )));
                }
                NodeAttrs::CcLibrary(CcLibraryAttrs {
                    sources: raw.cc_sources,
                    headers: raw.cc_headers,
                    objects: raw.cc_objects,
                    compile_args: raw.cc_compile_args,
                })
            }
            Kind::Config => {
                if cc_fields_present {
                    return Err(serde::de::Error::custom(format!(
                        "target {}: cc_* fields are not valid on a config target",
                        raw.name
                    )));
                }
                NodeAttrs::Config(ConfigAttrs {
                    component: raw.component,
                    component_root: raw.component_root,
                })
            }
        };

        Ok(Self {
            name: raw.name,
            dir: raw.dir,
            deps: raw.deps,
            attrs,
        })
    }
}
