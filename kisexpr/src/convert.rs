//! Conversions between [`Node`] trees and typed Rust values.
//!
//! Record types implement [`FromNode`] and [`ToNode`], usually through the
//! derive macros of the same name. Scalar fields go through [`FromValue`] and
//! [`ToValue`].
//!
//! Conversions are strict: a missing required value or child, or a number that
//! does not parse, is an error. For lenient reading with defaults use the
//! accessors on [`Node`] directly.
use smol_str::SmolStr;

use crate::node::{is_truthy, Node};

/// Types that can be read from a single node value.
pub trait FromValue: Sized {
    /// Convert the value, which is `None` if the node has no value at that position.
    fn from_value(value: Option<&str>) -> Result<Self, ConversionError>;
}

/// Types that can be written as a single node value.
pub trait ToValue {
    /// The value to append, or `None` to append nothing.
    fn to_value(&self) -> Option<SmolStr>;
}

/// Types that can be constructed from a node.
pub trait FromNode: Sized {
    fn from_node(node: &Node) -> Result<Self, ConversionError>;
}

/// Types that can be written into a node.
pub trait ToNode {
    /// Append this value's values and children to `node`.
    fn write_into(&self, node: &mut Node);

    /// Build a new node with the given token.
    fn to_node(&self, token: impl Into<SmolStr>) -> Node
    where
        Self: Sized,
    {
        let mut node = Node::new(token);
        self.write_into(&mut node);
        node
    }
}

/// Error while converting a node into a typed value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("missing value")]
    MissingValue,
    #[error("invalid value `{value}`, expected {expected}")]
    InvalidValue {
        value: SmolStr,
        expected: &'static str,
    },
    #[error("missing child `{0}`")]
    MissingChild(SmolStr),
    #[error("in `{field}`: {source}")]
    Field {
        field: SmolStr,
        source: Box<ConversionError>,
    },
}

impl ConversionError {
    /// Attach the name of the field that failed to convert.
    pub fn field(field: impl Into<SmolStr>, source: ConversionError) -> Self {
        Self::Field {
            field: field.into(),
            source: Box::new(source),
        }
    }

    fn invalid(value: &str, expected: &'static str) -> Self {
        Self::InvalidValue {
            value: value.into(),
            expected,
        }
    }
}

impl FromValue for String {
    fn from_value(value: Option<&str>) -> Result<Self, ConversionError> {
        value.map(str::to_string).ok_or(ConversionError::MissingValue)
    }
}

impl FromValue for SmolStr {
    fn from_value(value: Option<&str>) -> Result<Self, ConversionError> {
        value.map(SmolStr::new).ok_or(ConversionError::MissingValue)
    }
}

impl FromValue for f64 {
    fn from_value(value: Option<&str>) -> Result<Self, ConversionError> {
        let value = value.ok_or(ConversionError::MissingValue)?;
        value.parse().map_err(|_| ConversionError::invalid(value, "a number"))
    }
}

impl FromValue for i64 {
    fn from_value(value: Option<&str>) -> Result<Self, ConversionError> {
        let value = value.ok_or(ConversionError::MissingValue)?;
        value.parse().map_err(|_| ConversionError::invalid(value, "an integer"))
    }
}

impl FromValue for bool {
    fn from_value(value: Option<&str>) -> Result<Self, ConversionError> {
        value.map(is_truthy).ok_or(ConversionError::MissingValue)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Option<&str>) -> Result<Self, ConversionError> {
        match value {
            Some(_) => T::from_value(value).map(Some),
            None => Ok(None),
        }
    }
}

impl ToValue for String {
    fn to_value(&self) -> Option<SmolStr> {
        Some(SmolStr::new(self))
    }
}

impl ToValue for SmolStr {
    fn to_value(&self) -> Option<SmolStr> {
        Some(self.clone())
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Option<SmolStr> {
        Some(self.to_string().into())
    }
}

impl ToValue for i64 {
    fn to_value(&self) -> Option<SmolStr> {
        Some(self.to_string().into())
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Option<SmolStr> {
        Some(SmolStr::new_inline(if *self { "yes" } else { "no" }))
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Option<SmolStr> {
        self.as_ref().and_then(ToValue::to_value)
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Option<SmolStr> {
        (**self).to_value()
    }
}

/// A scalar read from and written to the first value of its node, as in `(uuid "…")`.
macro_rules! impl_node_by_value {
    ($($ty:ty),*) => {
        $(impl FromNode for $ty {
            fn from_node(node: &Node) -> Result<Self, ConversionError> {
                <$ty as FromValue>::from_value(node.value(0))
            }
        }

        impl ToNode for $ty {
            fn write_into(&self, node: &mut Node) {
                if let Some(value) = self.to_value() {
                    node.add_value(value);
                }
            }
        })*
    };
}

impl_node_by_value!(String, SmolStr, f64, i64, bool);

/// All values of a node, as in `(layers "F.Cu" "F.Mask")`.
impl<T: FromValue> FromNode for Vec<T> {
    fn from_node(node: &Node) -> Result<Self, ConversionError> {
        node.values()
            .iter()
            .map(|value| T::from_value(Some(value.as_str())))
            .collect()
    }
}

impl<T: ToValue> ToNode for Vec<T> {
    fn write_into(&self, node: &mut Node) {
        for value in self.iter().filter_map(ToValue::to_value) {
            node.add_value(value);
        }
    }
}

/// An untyped subtree, cloned with its token.
impl FromNode for Node {
    fn from_node(node: &Node) -> Result<Self, ConversionError> {
        Ok(node.clone())
    }
}

/// Copies the values and children into the target node; the token of `self` is dropped.
impl ToNode for Node {
    fn write_into(&self, node: &mut Node) {
        for value in self.values() {
            node.add_value(value.clone());
        }
        for child in self.children() {
            node.add_child(child.clone());
        }
    }
}

#[cfg(test)]
mod test {
    use super::{ConversionError, FromNode, FromValue, ToNode, ToValue};
    use crate::Node;
    use rstest::rstest;
    use smol_str::SmolStr;

    #[rstest]
    #[case(Some("2.54"), Ok(2.54))]
    #[case(Some("-1"), Ok(-1.0))]
    #[case(None, Err(ConversionError::MissingValue))]
    #[case(Some("wide"), Err(ConversionError::InvalidValue { value: "wide".into(), expected: "a number" }))]
    fn float_values(#[case] value: Option<&str>, #[case] expected: Result<f64, ConversionError>) {
        assert_eq!(f64::from_value(value), expected);
    }

    #[test]
    fn optional_values() {
        assert_eq!(Option::<i64>::from_value(None), Ok(None));
        assert_eq!(Option::<i64>::from_value(Some("4")), Ok(Some(4)));
        assert!(Option::<i64>::from_value(Some("four")).is_err());
        assert_eq!(None::<i64>.to_value(), None);
    }

    #[rstest]
    #[case(true, "yes")]
    #[case(false, "no")]
    fn bools_round_trip(#[case] value: bool, #[case] text: &str) {
        assert_eq!(value.to_value(), Some(SmolStr::new(text)));
        assert_eq!(bool::from_value(Some(text)), Ok(value));
    }

    #[test]
    fn vec_reads_all_values() {
        let node = Node::with_values("layers", ["F.Cu", "F.Mask"]);
        let layers = Vec::<String>::from_node(&node).unwrap();
        assert_eq!(layers, ["F.Cu", "F.Mask"]);
        assert_eq!(layers.to_node("layers"), node);
    }

    #[test]
    fn scalar_nodes_use_first_value() {
        let node = Node::with_values("length", ["2.54"]);
        assert_eq!(f64::from_node(&node), Ok(2.54));
        assert_eq!(2.54_f64.to_node("length"), node);
        assert_eq!(String::from_node(&Node::new("uuid")), Err(ConversionError::MissingValue));
    }

    #[test]
    fn subtrees_keep_token_on_read_and_drop_it_on_write() {
        let mut effects = Node::new("effects");
        effects.create_child("font", Vec::<&str>::new());

        let read = Node::from_node(&effects).unwrap();
        assert_eq!(read.token(), "effects");

        let written = read.to_node("renamed");
        assert_eq!(written.token(), "renamed");
        assert_eq!(written.children(), effects.children());
    }

    #[test]
    fn field_errors_name_the_field() {
        let err = ConversionError::field("at", ConversionError::MissingValue);
        assert_eq!(err.to_string(), "in `at`: missing value");
    }
}
