//! The in-memory expression tree.
use smol_str::SmolStr;
use std::fmt::Display;
use std::str::FromStr;

use crate::parser::ParseError;

/// A node of an s-expression document.
///
/// A node has a head `token`, an ordered list of scalar `values` that follow the
/// token in the text, and an ordered list of nested `children`. Values are kept
/// as strings; numeric and boolean interpretation happens at lookup time.
///
/// Nodes only grow: values and children can be appended, and a caller can
/// replace a whole child through [`Node::child_mut`], but nothing is removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node {
    token: SmolStr,
    values: Vec<SmolStr>,
    children: Vec<Node>,
}

impl Node {
    /// Create a node with the given token and no values or children.
    pub fn new(token: impl Into<SmolStr>) -> Self {
        Self {
            token: token.into(),
            values: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a node with the given token and initial values.
    pub fn with_values<I>(token: impl Into<SmolStr>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SmolStr>,
    {
        Self {
            token: token.into(),
            values: values.into_iter().map(Into::into).collect(),
            children: Vec::new(),
        }
    }

    /// The head symbol of this node.
    #[inline]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The scalar values of this node, in order.
    #[inline]
    pub fn values(&self) -> &[SmolStr] {
        &self.values
    }

    /// The immediate children of this node, in order.
    #[inline]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// The first child whose token is `name`.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|child| child.token == name)
    }

    /// Mutable access to the first child whose token is `name`.
    ///
    /// Assigning through the returned reference replaces the child in place.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.children.iter_mut().find(|child| child.token == name)
    }

    /// All children whose token is `name`, in document order.
    ///
    /// The iterator is [`Clone`], so the sequence can be restarted.
    pub fn children_named<'a>(&'a self, name: &'a str) -> ChildrenNamed<'a> {
        ChildrenNamed {
            inner: self.children.iter(),
            name,
        }
    }

    /// Follow a chain of first-child lookups.
    ///
    /// Returns `None` as soon as any step is missing. An empty path returns `self`.
    pub fn lookup(&self, path: &[&str]) -> Option<&Node> {
        path.iter().try_fold(self, |node, name| node.child(name))
    }

    /// The value at `index`, if present.
    #[inline]
    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(SmolStr::as_str)
    }

    /// The value at `index`, or the empty string when absent.
    pub fn value_as_str(&self, index: usize) -> &str {
        self.value(index).unwrap_or_default()
    }

    /// The value at `index` as a float, or `0.0` when absent or not a number.
    pub fn value_as_f64(&self, index: usize) -> f64 {
        self.value(index)
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    /// The value at `index` as an integer, or `0` when absent or not an integer.
    pub fn value_as_i64(&self, index: usize) -> i64 {
        self.value(index)
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    /// Whether the value at `index` is truthy.
    ///
    /// Only `yes` and `true` (in any case) and `1` are truthy; anything else,
    /// including an absent value, is `false`.
    pub fn value_as_bool(&self, index: usize) -> bool {
        self.value(index).is_some_and(is_truthy)
    }

    /// Append a value.
    pub fn add_value(&mut self, value: impl Into<SmolStr>) -> &mut Self {
        self.values.push(value.into());
        self
    }

    /// Append a child and return a reference to it.
    pub fn add_child(&mut self, child: Node) -> &mut Node {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Create a child with the given token and values, append it and return it.
    ///
    /// ```
    /// # use kisexpr::Node;
    /// let mut root = Node::new("footprint");
    /// root.create_child("pad", ["1", "smd", "rect"])
    ///     .create_child("at", ["0", "0"]);
    /// assert_eq!(root.lookup(&["pad", "at"]).map(|at| at.values().len()), Some(2));
    /// ```
    pub fn create_child<I>(&mut self, token: impl Into<SmolStr>, values: I) -> &mut Node
    where
        I: IntoIterator,
        I::Item: Into<SmolStr>,
    {
        self.add_child(Node::with_values(token, values))
    }
}

pub(crate) fn is_truthy(value: &str) -> bool {
    value.eq_ignore_ascii_case("yes") || value.eq_ignore_ascii_case("true") || value == "1"
}

/// Iterator over the children of a [`Node`] with a given token.
#[derive(Debug, Clone)]
pub struct ChildrenNamed<'a> {
    inner: std::slice::Iter<'a, Node>,
    name: &'a str,
}

impl<'a> Iterator for ChildrenNamed<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.name;
        self.inner.find(|child| child.token == name)
    }
}

impl<'a> DoubleEndedIterator for ChildrenNamed<'a> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let name = self.name;
        self.inner.rfind(|child| child.token == name)
    }
}

impl<'a> std::iter::FusedIterator for ChildrenNamed<'a> {}

impl FromStr for Node {
    type Err = ParseError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        crate::parser::parse(source)
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&crate::writer::to_string(self))
    }
}

#[cfg(any(test, feature = "proptest"))]
impl proptest::arbitrary::Arbitrary for Node {
    type Parameters = ();
    type Strategy = proptest::strategy::BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        use proptest::prelude::*;

        let token = "[a-z][a-z0-9_]{0,11}";
        let value = prop_oneof![
            any::<String>(),
            "(?s).{0,12}",
            "[ \t\r\n\u{b}\u{c}\u{85}\u{a0}\"\\\\()a1.+-]{0,8}",
        ]
        .boxed();
        let values = proptest::collection::vec(value, 0..6);

        let leaf = (token, values.clone()).prop_map(|(token, values)| Node::with_values(token, values));
        leaf.prop_recursive(6, 128, 6, move |inner| {
            (token, values.clone(), proptest::collection::vec(inner, 0..6)).prop_map(
                |(token, values, children)| {
                    let mut node = Node::with_values(token, values);
                    for child in children {
                        node.add_child(child);
                    }
                    node
                },
            )
        })
        .boxed()
    }
}
