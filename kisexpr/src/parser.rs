//! Parse s-expression documents into [`Node`] trees.
//!
//! A document is a single parenthesised expression. The first bareword after
//! `(` is the node's token; the rest are values (barewords or quoted strings)
//! and nested expressions, in any order.
use std::fmt::Display;
use std::ops::Range;
use std::path::Path;

use crate::error::Error;
use crate::lexer::{LexError, LexerToken, TokenStream};
use crate::node::Node;

/// Nesting depth accepted by [`Parser::default`].
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Span within a string.
pub type Span = Range<usize>;

/// A configurable parser.
#[derive(Debug, Clone, Copy)]
pub struct Parser {
    max_depth: Option<usize>,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// A parser without a nesting limit.
    ///
    /// Recursion depth equals nesting depth, so adversarial input can exhaust the stack.
    pub fn unbounded() -> Self {
        Self { max_depth: None }
    }

    /// Fail with [`ParseErrorKind::NestingTooDeep`] beyond `max_depth` nested lists.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Parse a document from a string.
    pub fn parse(&self, source: &str) -> Result<Node> {
        let mut state = State {
            tokens: TokenStream::new(source),
            max_depth: self.max_depth,
        };

        let result = state.document();

        #[cfg(feature = "tracing")]
        if let Err(err) = &result {
            tracing::debug!(offset = err.offset(), "failed to parse s-expression: {}", err);
        }

        result
    }

    /// Read a whole file and parse it.
    ///
    /// A leading UTF-8 byte order mark is skipped.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Node, Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let source = contents.strip_prefix('\u{feff}').unwrap_or(&contents);

        #[cfg(feature = "tracing")]
        tracing::debug!(path = %path.display(), bytes = source.len(), "parsing s-expression file");

        Ok(self.parse(source)?)
    }
}

struct State<'a> {
    tokens: TokenStream<'a>,
    max_depth: Option<usize>,
}

impl<'a> State<'a> {
    fn document(&mut self) -> Result<Node> {
        let open = match self.tokens.next() {
            Some((Ok(LexerToken::Open), span)) => span,
            Some((Err(err), span)) => return Err(lex_error(err, span)),
            Some((_, span)) => return Err(ParseError::new(ParseErrorKind::ExpectedOpen, span.start)),
            None => {
                return Err(ParseError::new(ParseErrorKind::ExpectedOpen, self.tokens.end()));
            }
        };

        let root = self.list(open, 1)?;

        #[cfg(feature = "tracing")]
        if let Some((_, span)) = self.tokens.peek() {
            tracing::debug!(offset = span.start, "ignoring text after the root expression");
        }

        Ok(root)
    }

    /// Parse the remainder of a list whose `(` has been consumed.
    fn list(&mut self, open: Span, depth: usize) -> Result<Node> {
        if self.max_depth.is_some_and(|max_depth| depth > max_depth) {
            return Err(ParseError::new(ParseErrorKind::NestingTooDeep, open.start));
        }

        let mut node = match self.tokens.next() {
            Some((Ok(LexerToken::Bare(token)), _)) => Node::new(token),
            Some((Err(err), span)) => return Err(lex_error(err, span)),
            Some((_, span)) => return Err(ParseError::new(ParseErrorKind::ExpectedToken, span.start)),
            None => return Err(ParseError::new(ParseErrorKind::UnclosedList, self.tokens.end())),
        };

        loop {
            match self.tokens.next() {
                Some((Ok(LexerToken::Open), span)) => {
                    let child = self.list(span, depth + 1)?;
                    node.add_child(child);
                }
                Some((Ok(LexerToken::Close), _)) => return Ok(node),
                Some((Ok(LexerToken::Bare(value) | LexerToken::Quoted(value)), _)) => {
                    node.add_value(value);
                }
                Some((Err(err), span)) => return Err(lex_error(err, span)),
                None => return Err(ParseError::new(ParseErrorKind::UnclosedList, self.tokens.end())),
            }
        }
    }
}

fn lex_error(err: LexError, span: Span) -> ParseError {
    match err {
        LexError::UnterminatedString => ParseError::new(ParseErrorKind::UnterminatedString, span.end),
        LexError::Unrecognized => ParseError::new(ParseErrorKind::ExpectedToken, span.start),
    }
}

/// The kind of grammar violation found while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("expected `(`")]
    ExpectedOpen,
    #[error("expected a token after `(`")]
    ExpectedToken,
    #[error("expected `)` before end of input")]
    UnclosedList,
    #[error("unterminated string")]
    UnterminatedString,
    #[error("lists nested too deeply")]
    NestingTooDeep,
}

/// A parse error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at byte {offset}")]
pub struct ParseError {
    kind: ParseErrorKind,
    offset: usize,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, offset: usize) -> Self {
        ParseError { kind, offset }
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    /// Byte offset into the source where the error was detected.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// One-based line and column of the error within `source`.
    pub fn line_column(&self, source: &str) -> (usize, usize) {
        let before = &source[..floor_char_boundary(source, self.offset)];
        let line = before.matches('\n').count() + 1;
        let column = before
            .rfind('\n')
            .map_or(before, |newline| &before[newline + 1..])
            .chars()
            .count()
            + 1;
        (line, column)
    }

    /// Render the error with its line and column in `source`.
    pub fn display_with<'a>(&'a self, source: &'a str) -> impl Display + 'a {
        struct WithSource<'a>(&'a ParseError, &'a str);

        impl Display for WithSource<'_> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let (line, column) = self.0.line_column(self.1);
                write!(f, "{} at line {}, column {}", self.0.kind, line, column)
            }
        }

        WithSource(self, source)
    }
}

fn floor_char_boundary(source: &str, offset: usize) -> usize {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Shorthand for a result specialised to parse errors.
pub type Result<T, E = ParseError> = std::result::Result<T, E>;

/// Parse a document from a string with the default parser.
pub fn parse(source: &str) -> Result<Node> {
    Parser::default().parse(source)
}

/// Read and parse a document file with the default parser.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Node, Error> {
    Parser::default().parse_file(path)
}

#[cfg(test)]
mod test {
    use super::{parse, ParseErrorKind, Parser, DEFAULT_MAX_DEPTH};
    use crate::Node;
    use rstest::rstest;

    #[test]
    fn parses_nested_document() {
        let root = parse(
            r#"(lib (version 20211014) (generator "Test Gen") (item A "hello world" (sub 1 2 3)))"#,
        )
        .unwrap();

        let mut expected = Node::new("lib");
        expected.create_child("version", ["20211014"]);
        expected.create_child("generator", ["Test Gen"]);
        expected
            .create_child("item", ["A", "hello world"])
            .create_child("sub", ["1", "2", "3"]);

        assert_eq!(root, expected);
    }

    #[test]
    fn values_and_children_interleave() {
        let root = parse("(pin input line (at 0 0 180) (length 2.54) hide)").unwrap();
        assert_eq!(root.token(), "pin");
        assert_eq!(root.values(), ["input", "line", "hide"]);
        assert_eq!(root.children().len(), 2);
    }

    #[test]
    fn whitespace_is_insignificant() {
        let compact = parse("(a (b 1)(c \"x y\"))").unwrap();
        let spread = parse("\r\n\t( a\n\t(b\t1 )\r\n  (c   \"x y\" ) )  ").unwrap();
        assert_eq!(compact, spread);
    }

    #[test]
    fn punctuation_belongs_to_barewords() {
        let root = parse("(layers *.Cu F.Mask $net-1 a\"b)").unwrap();
        assert_eq!(root.values(), ["*.Cu", "F.Mask", "$net-1", "a\"b"]);
    }

    #[test]
    fn only_quote_and_backslash_are_escapes() {
        let root = parse(r#"(s "a\"b" "c\\d" "e\nf" "")"#).unwrap();
        assert_eq!(root.values(), ["a\"b", "c\\d", "enf", ""]);
    }

    #[test]
    fn text_after_root_is_ignored() {
        let root = parse("(a 1) (b 2)").unwrap();
        assert_eq!(root, Node::with_values("a", ["1"]));
    }

    #[rstest]
    #[case("", ParseErrorKind::ExpectedOpen, 0)]
    #[case("   ", ParseErrorKind::ExpectedOpen, 3)]
    #[case("foo)", ParseErrorKind::ExpectedOpen, 0)]
    #[case(")", ParseErrorKind::ExpectedOpen, 0)]
    #[case("(foo", ParseErrorKind::UnclosedList, 4)]
    #[case("(a (b 1)", ParseErrorKind::UnclosedList, 8)]
    #[case("(", ParseErrorKind::UnclosedList, 1)]
    #[case("()", ParseErrorKind::ExpectedToken, 1)]
    #[case("( (a))", ParseErrorKind::ExpectedToken, 2)]
    #[case(r#"("quoted" 1)"#, ParseErrorKind::ExpectedToken, 1)]
    #[case(r#"(a "unterminated)"#, ParseErrorKind::UnterminatedString, 17)]
    #[case(r#"(a "ends in escape\"#, ParseErrorKind::UnterminatedString, 19)]
    fn malformed_documents(
        #[case] source: &str,
        #[case] kind: ParseErrorKind,
        #[case] offset: usize,
    ) {
        let err = parse(source).unwrap_err();
        assert_eq!(err.kind(), kind);
        assert_eq!(err.offset(), offset);
    }

    #[test]
    fn nesting_limit() {
        let source = format!("{}a{}", "(a ".repeat(5), ")".repeat(5));
        assert!(Parser::new().max_depth(5).parse(&source).is_ok());

        let err = Parser::new().max_depth(4).parse(&source).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::NestingTooDeep);
        assert_eq!(err.offset(), 12);
    }

    #[test]
    fn unbounded_parser_accepts_deep_input() {
        let depth = DEFAULT_MAX_DEPTH + 100;
        let source = format!("{})", "(a ".repeat(depth)) + &")".repeat(depth - 1);
        let mut node = &Parser::unbounded().parse(&source).unwrap();
        let mut seen = 1;
        while let Some(child) = node.child("a") {
            node = child;
            seen += 1;
        }
        assert_eq!(seen, depth);

        let err = parse(&source).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::NestingTooDeep);
    }

    #[test]
    fn line_column() {
        let source = "(a\n  (b \"x)\n";
        let err = parse(source).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::UnterminatedString);
        assert_eq!(err.line_column(source), (3, 1));
        assert_eq!(
            err.display_with(source).to_string(),
            "unterminated string at line 3, column 1"
        );
    }
}
