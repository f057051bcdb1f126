//! Makefile rule emitter.
//!
//! This module accumulates Makefile rule text for the generator. Rules are
//! written as `target: prereq ...` lines followed by tab-indented shell
//! commands, blank-line separated. Emission is pure string composition and
//! cannot fail; given the same inputs it always produces byte-identical
//! output so the generated file is diff-stable across runs.

use camino::Utf8Path;
use itertools::Itertools;

/// Escape a path for use in rule text.
///
/// Dollar signs are doubled for Make, and spaces and hashes are
/// backslash-escaped so they survive both Make's word splitting and the
/// shell's.
///
/// # Examples
///
/// ```
/// use makegen::makefile::escape;
///
/// assert_eq!(escape("a b.cc"), "a\\ b.cc");
/// assert_eq!(escape("$x"), "$$x");
/// ```
#[must_use]
pub fn escape(path: &str) -> String {
    path.replace('$', "$$")
        .replace(' ', "\\ ")
        .replace('#', "\\#")
}

/// A shell command assembled from typed tokens.
///
/// Literal words pass through unchanged; paths are escaped. Tokens are
/// joined with a single space, which is the one join policy every emitted
/// command goes through.
#[derive(Debug, Default)]
pub struct CommandLine {
    words: Vec<String>,
}

impl CommandLine {
    /// Start an empty command line.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a literal word.
    #[must_use]
    pub fn word(mut self, word: impl Into<String>) -> Self {
        self.words.push(word.into());
        self
    }

    /// Append literal words.
    #[must_use]
    pub fn words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.words.extend(words.into_iter().map(Into::into));
        self
    }

    /// Append a path token, escaped.
    #[must_use]
    pub fn path(mut self, path: impl AsRef<Utf8Path>) -> Self {
        self.words.push(escape(path.as_ref().as_str()));
        self
    }

    /// Join the tokens into a single shell line.
    #[must_use]
    pub fn render(&self) -> String {
        self.words.iter().join(" ")
    }
}

/// Accumulates rule text for one generated Makefile.
#[derive(Debug, Default)]
pub struct Makefile {
    buf: String,
}

impl Makefile {
    /// Start with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a raw line outside any rule, such as a variable assignment or
    /// a `.PHONY` declaration.
    pub fn write_line(&mut self, line: &str) {
        self.buf.push_str(line);
        self.buf.push('\n');
    }

    /// Begin a rule for `target` with the given prerequisites, already
    /// escaped by the caller.
    pub fn start_rule<I, S>(&mut self, target: &str, prereqs: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.buf.push_str(target);
        self.buf.push(':');
        for prereq in prereqs {
            self.buf.push(' ');
            self.buf.push_str(prereq.as_ref());
        }
        self.buf.push('\n');
    }

    /// Write one tab-indented command line into the current rule.
    pub fn write_command(&mut self, command: &str) {
        self.buf.push('\t');
        self.buf.push_str(command);
        self.buf.push('\n');
    }

    /// Terminate the current rule with a blank separator line.
    pub fn finish_rule(&mut self) {
        self.buf.push('\n');
    }

    /// The accumulated text so far.
    #[must_use]
    pub fn contents(&self) -> &str {
        &self.buf
    }

    /// Consume the emitter, returning the accumulated text.
    #[must_use]
    pub fn into_contents(self) -> String {
        self.buf
    }
}
