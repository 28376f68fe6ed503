//! The s-expression document format of KiCad symbol and footprint libraries.
//!
//! # Syntax
//!
//! A document is a single parenthesised expression:
//!
//! - **Expressions** are delimited by `(` and `)`. The first bareword after `(`
//!   is the expression's **token**. It is followed by any mix of values and
//!   nested expressions, separated by whitespace.
//!
//! - **Values** are strings, either bare or enclosed within double quotes. A
//!   bareword extends up to the next whitespace or parenthesis, so `F.Cu`,
//!   `-1.27` and `$net` are single values. Within quoted strings a backslash
//!   makes the following character literal; `\"` and `\\` are the only escapes
//!   the writer produces.
//!
//! There are no comments and no typed literals: numbers and booleans are plain
//! values, interpreted when they are looked up.
//!
//! # Example
//!
//! ```
//! let root = kisexpr::parse(r#"(lib (version 20211014) (item A "hello world"))"#)?;
//! assert_eq!(root.child("version").map(|v| v.value_as_i64(0)), Some(20211014));
//!
//! let text = kisexpr::to_string(&root);
//! assert_eq!(kisexpr::parse(&text)?, root);
//! # Ok::<(), kisexpr::ParseError>(())
//! ```
pub mod convert;
pub mod document;
pub mod error;
pub(crate) mod escape;
pub(crate) mod lexer;
pub mod node;
pub mod parser;
pub mod writer;

pub use convert::{ConversionError, FromNode, FromValue, ToNode, ToValue};
pub use document::Document;
pub use error::Error;
pub use node::Node;
pub use parser::{parse, parse_file, ParseError, ParseErrorKind, Parser};
pub use writer::{to_string, write_file, Layout, Writer};

#[cfg(feature = "macros")]
pub use kisexpr_macros::{FromNode, ToNode};
