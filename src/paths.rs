//! Repository-relative path helpers.
//!
//! All paths handled by makegen are UTF-8 and relative to the repository
//! root; the generated Makefile must stay relocatable, so nothing here ever
//! produces an absolute path.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

/// Join two repository-relative paths.
///
/// A `.` or empty base yields the tail unchanged, and an empty tail yields
/// the base, so joining never introduces `./` noise into generated rule text.
///
/// # Examples
///
/// ```
/// use makegen::paths::join;
///
/// assert_eq!(join(".".into(), "a/b"), "a/b");
/// assert_eq!(join("a".into(), ""), "a");
/// assert_eq!(join("a".into(), "b.cc"), "a/b.cc");
/// ```
#[must_use]
pub fn join(base: &Utf8Path, tail: impl AsRef<Utf8Path>) -> Utf8PathBuf {
    let tail = tail.as_ref();
    if base.as_str().is_empty() || base.as_str() == "." {
        return tail.to_path_buf();
    }
    if tail.as_str().is_empty() {
        return base.to_path_buf();
    }
    base.join(tail)
}

/// Number of real components in a path, ignoring `.` markers.
#[must_use]
pub fn component_count(path: &Utf8Path) -> usize {
    path.components()
        .filter(|c| !matches!(c, Utf8Component::CurDir))
        .count()
}

/// The `../` prefix that climbs from inside `dir` back to the repository
/// root: one `..` segment per component of `dir`.
///
/// # Examples
///
/// ```
/// use makegen::paths::ascent;
///
/// assert_eq!(ascent(".gen-src".into()), "../");
/// assert_eq!(ascent(".gen-src/.gen-files".into()), "../../");
/// ```
#[must_use]
pub fn ascent(dir: &Utf8Path) -> String {
    "../".repeat(component_count(dir))
}

/// Parent directory of a path, or `.` at the top level.
#[must_use]
pub fn dirname(path: &Utf8Path) -> Utf8PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent.to_path_buf(),
        _ => Utf8PathBuf::from("."),
    }
}
