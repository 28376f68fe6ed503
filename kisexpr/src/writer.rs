//! Write [`Node`] trees as formatted s-expression text.
//!
//! Childless nodes are written on one line. Nodes with children put their own
//! values on the opening line, each child on its own indented line, and the
//! closing parenthesis on a line of its own:
//!
//! ```text
//! (lib
//!   (version 20211014)
//!   (item A "hello world"
//!     (sub 1 2 3)
//!   )
//! )
//! ```
use smol_str::SmolStr;
use std::collections::HashSet;
use std::io;
use std::path::Path;

use crate::error::Error;
use crate::escape::escape_value;
use crate::node::Node;

/// Tokens that are always written inline when they have no children.
pub const DEFAULT_INLINE_TOKENS: &[&str] = &["version", "generator", "generator_version"];

/// Childless nodes with at most this many values are written inline.
pub const INLINE_VALUE_LIMIT: usize = 3;

/// How a node is laid out by a [`Writer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Token and values on a single line.
    Inline,
    /// Token and values on the opening line, followed by indented children.
    Block,
}

/// A configurable s-expression writer.
#[derive(Debug, Clone)]
pub struct Writer {
    indent: usize,
    inline_tokens: HashSet<SmolStr>,
}

impl Default for Writer {
    fn default() -> Self {
        Self {
            indent: 2,
            inline_tokens: DEFAULT_INLINE_TOKENS.iter().copied().map(SmolStr::new).collect(),
        }
    }
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of spaces per nesting level.
    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Replace the set of tokens that are always written inline.
    pub fn inline_tokens<I>(mut self, tokens: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SmolStr>,
    {
        self.inline_tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// Add a token to the set of tokens that are always written inline.
    pub fn inline_token(mut self, token: impl Into<SmolStr>) -> Self {
        self.inline_tokens.insert(token.into());
        self
    }

    /// The layout this writer chooses for `node`.
    pub fn layout(&self, node: &Node) -> Layout {
        let inline = node.children().is_empty()
            && (node.values().len() <= INLINE_VALUE_LIMIT
                || self.inline_tokens.contains(node.token()));

        if inline {
            Layout::Inline
        } else {
            Layout::Block
        }
    }

    /// Render `node` into a string.
    pub fn to_string(&self, node: &Node) -> String {
        let mut output = String::new();
        self.node(&mut output, node, 0);
        output
    }

    /// Render `node` into an [`io::Write`].
    pub fn write<W: io::Write>(&self, node: &Node, mut output: W) -> io::Result<()> {
        output.write_all(self.to_string(node).as_bytes())?;
        output.flush()
    }

    /// Render `node` into the file at `path`, replacing any existing contents.
    pub fn write_file(&self, node: &Node, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let text = self.to_string(node);

        #[cfg(feature = "tracing")]
        tracing::debug!(path = %path.display(), bytes = text.len(), "writing s-expression file");

        std::fs::write(path, text)?;
        Ok(())
    }

    fn node(&self, output: &mut String, node: &Node, depth: usize) {
        self.pad(output, depth);
        output.push('(');
        output.push_str(node.token());

        for value in node.values() {
            output.push(' ');
            output.push_str(&escape_value(value));
        }

        match self.layout(node) {
            Layout::Block if !node.children().is_empty() => {
                output.push('\n');
                for child in node.children() {
                    self.node(output, child, depth + 1);
                }
                self.pad(output, depth);
                output.push_str(")\n");
            }
            Layout::Inline | Layout::Block => output.push_str(")\n"),
        }
    }

    fn pad(&self, output: &mut String, depth: usize) {
        output.extend(std::iter::repeat(' ').take(depth * self.indent));
    }
}

/// Render `node` into a string with the default writer.
pub fn to_string(node: &Node) -> String {
    Writer::default().to_string(node)
}

/// Render `node` into the file at `path` with the default writer.
pub fn write_file(node: &Node, path: impl AsRef<Path>) -> Result<(), Error> {
    Writer::default().write_file(node, path)
}
