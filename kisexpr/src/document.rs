//! Documents backed by a file on disk.
use delegate::delegate;
use smol_str::SmolStr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::Error;
use crate::node::{ChildrenNamed, Node};
use crate::parser::{ParseError, Parser};
use crate::writer::Writer;

/// A parsed document together with the path it was loaded from.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Node,
    path: Option<PathBuf>,
}

impl Document {
    /// Wrap a tree that has no backing file yet.
    pub fn new(root: Node) -> Self {
        Self { root, path: None }
    }

    /// Read and parse the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::load_with(&Parser::default(), path)
    }

    /// Read and parse the file at `path` with the given parser.
    pub fn load_with(parser: &Parser, path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let root = parser.parse_file(path)?;
        Ok(Self {
            root,
            path: Some(path.to_path_buf()),
        })
    }

    /// Write the document back to the file it was loaded from.
    pub fn save(&self) -> Result<(), Error> {
        self.save_with(&Writer::default())
    }

    /// Write the document back to the file it was loaded from with the given writer.
    pub fn save_with(&self, writer: &Writer) -> Result<(), Error> {
        let path = self.path.as_deref().ok_or(Error::NoPath)?;
        writer.write_file(&self.root, path)
    }

    /// Write the document to `path` and remember it for later saves.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        Writer::default().write_file(&self.root, path)?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    pub fn into_root(self) -> Node {
        self.root
    }

    delegate! {
        to self.root {
            pub fn token(&self) -> &str;
            pub fn values(&self) -> &[SmolStr];
            pub fn children(&self) -> &[Node];
            pub fn child(&self, name: &str) -> Option<&Node>;
            pub fn children_named<'a>(&'a self, name: &'a str) -> ChildrenNamed<'a>;
            pub fn lookup(&self, path: &[&str]) -> Option<&Node>;
            pub fn value(&self, index: usize) -> Option<&str>;
            pub fn value_as_str(&self, index: usize) -> &str;
            pub fn value_as_f64(&self, index: usize) -> f64;
            pub fn value_as_i64(&self, index: usize) -> i64;
            pub fn value_as_bool(&self, index: usize) -> bool;
        }
    }
}

impl FromStr for Document {
    type Err = ParseError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(source.parse()?))
    }
}

impl From<Node> for Document {
    fn from(root: Node) -> Self {
        Self::new(root)
    }
}

#[cfg(test)]
mod test {
    use super::Document;
    use crate::error::Error;
    use crate::Node;

    #[test]
    fn delegates_queries_to_root() {
        let document: Document = "(kicad_symbol_lib (version 20211014) (symbol R) (symbol C))"
            .parse()
            .unwrap();
        assert_eq!(document.token(), "kicad_symbol_lib");
        assert_eq!(document.child("version").map(|v| v.value_as_i64(0)), Some(20211014));
        assert_eq!(document.children_named("symbol").count(), 2);
        assert!(document.path().is_none());
    }

    #[test]
    fn save_without_path_fails() {
        let document = Document::new(Node::new("empty"));
        assert!(matches!(document.save(), Err(Error::NoPath)));
    }
}
