use logos::{Lexer, Logos};
use smol_str::SmolStr;

use crate::parser::Span;

#[derive(Debug, Clone, Default, PartialEq, thiserror::Error)]
pub(crate) enum LexError {
    /// Required by logos as its default error; every character starts some
    /// token, so it is never produced.
    #[default]
    #[error("unrecognized input")]
    Unrecognized,
    #[error("unterminated string")]
    UnterminatedString,
}

#[derive(Debug, Clone, PartialEq, Logos)]
#[logos(error = LexError)]
#[logos(skip r"[ \t\r\n]+")]
pub(crate) enum LexerToken {
    #[token("(")]
    Open,
    #[token(")")]
    Close,
    #[regex(r#"[^ \t\r\n\(\)"][^ \t\r\n\(\)]*"#, |lex| SmolStr::new(lex.slice()))]
    Bare(SmolStr),
    #[token("\"", quoted)]
    Quoted(SmolStr),
}

/// Reads the body of a quoted string after its opening quote.
///
/// A backslash is dropped and the character after it is kept verbatim.
fn quoted(lex: &mut Lexer<'_, LexerToken>) -> Result<SmolStr, LexError> {
    let mut output = String::new();
    let mut escaped = false;

    for (index, c) in lex.remainder().char_indices() {
        if escaped {
            output.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            lex.bump(index + c.len_utf8());
            return Ok(output.into());
        } else {
            output.push(c);
        }
    }

    lex.bump(lex.remainder().len());
    Err(LexError::UnterminatedString)
}

/// Forward-only token stream over a source string with one token of lookahead.
pub(crate) struct TokenStream<'a> {
    lexer: Lexer<'a, LexerToken>,
    peeked: Option<Option<(Result<LexerToken, LexError>, Span)>>,
}

impl<'a> TokenStream<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lexer: LexerToken::lexer(source),
            peeked: None,
        }
    }

    pub fn next(&mut self) -> Option<(Result<LexerToken, LexError>, Span)> {
        match self.peeked.take() {
            Some(peeked) => peeked,
            None => self.advance(),
        }
    }

    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    pub fn peek(&mut self) -> Option<&(Result<LexerToken, LexError>, Span)> {
        if self.peeked.is_none() {
            self.peeked = Some(self.advance());
        }
        self.peeked.as_ref().and_then(Option::as_ref)
    }

    /// Length of the source, used as the offset of end-of-input errors.
    pub fn end(&self) -> usize {
        self.lexer.source().len()
    }

    fn advance(&mut self) -> Option<(Result<LexerToken, LexError>, Span)> {
        let token = self.lexer.next()?;
        Some((token, self.lexer.span()))
    }
}

#[cfg(test)]
mod test {
    use super::{LexError, LexerToken, TokenStream};
    use rstest::rstest;

    fn tokens(source: &str) -> Vec<Result<LexerToken, LexError>> {
        let mut stream = TokenStream::new(source);
        std::iter::from_fn(|| stream.next().map(|(token, _)| token)).collect()
    }

    #[rstest]
    #[case("abc", "abc")]
    #[case("F.Cu", "F.Cu")]
    #[case("-1.27", "-1.27")]
    #[case("$x", "$x")]
    #[case("a\"b", "a\"b")]
    #[case("a\\b", "a\\b")]
    fn bare_words(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(tokens(source), [Ok(LexerToken::Bare(expected.into()))]);
    }

    #[rstest]
    #[case(r#""""#, "")]
    #[case(r#""hello world""#, "hello world")]
    #[case(r#""a\"b""#, "a\"b")]
    #[case(r#""a\\b""#, "a\\b")]
    #[case(r#""a\nb""#, "anb")]
    #[case("\"line\nbreak\"", "line\nbreak")]
    fn quoted_strings(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(tokens(source), [Ok(LexerToken::Quoted(expected.into()))]);
    }

    #[test]
    fn control_characters_are_bare_words() {
        assert_eq!(
            tokens("\u{0}\u{7f}\u{b}\u{85}\u{feff}"),
            [Ok(LexerToken::Bare("\u{0}\u{7f}\u{b}\u{85}\u{feff}".into()))]
        );
    }

    #[test]
    fn parens_delimit_bare_words() {
        assert_eq!(
            tokens("(a(b)c)"),
            [
                Ok(LexerToken::Open),
                Ok(LexerToken::Bare("a".into())),
                Ok(LexerToken::Open),
                Ok(LexerToken::Bare("b".into())),
                Ok(LexerToken::Close),
                Ok(LexerToken::Bare("c".into())),
                Ok(LexerToken::Close),
            ]
        );
    }

    #[test]
    fn unterminated_string_spans_to_end() {
        let source = r#"(a "open"#;
        let mut stream = TokenStream::new(source);
        stream.next();
        stream.next();
        let (token, span) = stream.next().unwrap();
        assert_eq!(token, Err(LexError::UnterminatedString));
        assert_eq!(span.end, source.len());
    }
}
