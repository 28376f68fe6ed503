use std::borrow::Cow;

/// Whether a value has to be written as a quoted string to read back unchanged.
///
/// Barewords are non-empty, free of whitespace, parentheses, quotes and
/// backslashes, and either do not start like a number or are a complete number.
pub fn needs_quotes(value: &str) -> bool {
    let Some(first) = value.chars().next() else {
        return true;
    };

    if value
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '"' | '\\'))
    {
        return true;
    }

    let numeric_start = first.is_ascii_digit() || first == '-' || first == '+';
    numeric_start && value.parse::<f64>().is_err()
}

/// Escape `"` and `\` and wrap in double quotes.
pub fn escape_string(value: &str) -> String {
    let mut output = String::with_capacity(value.len() + 2);
    output.push('"');

    for c in value.chars() {
        match c {
            '"' => output.push_str(r#"\""#),
            '\\' => output.push_str(r#"\\"#),
            c => output.push(c),
        }
    }

    output.push('"');
    output
}

/// A value as it appears in a document.
pub fn escape_value(value: &str) -> Cow<'_, str> {
    if needs_quotes(value) {
        Cow::Owned(escape_string(value))
    } else {
        Cow::Borrowed(value)
    }
}
