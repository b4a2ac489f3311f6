use std::ops::Range;

const OPEN: &str = "[[:";
const CLOSE: &str = ":]]";

/// A piece of a source pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Pattern text passed to the engine as-is.
    Literal(&'a str),
    /// A `[[:name:]]` reference.
    Placeholder { name: &'a str, span: Range<usize> },
}

impl<'a> Token<'a> {
    /// The exact source text this token covers.
    pub fn source_text(&self, source: &'a str) -> &'a str {
        match self {
            Token::Literal(text) => *text,
            Token::Placeholder { span, .. } => &source[span.clone()],
        }
    }
}

/// Split `source` into literals and placeholder references.
///
/// A token whose opening bracket is escaped with a backslash stays literal.
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut literal_start = 0;
    let mut cursor = 0;

    while let Some(offset) = source[cursor..].find(OPEN) {
        let start = cursor + offset;
        cursor = start + 1;

        if is_escaped(source, start) {
            continue;
        }

        let name_start = start + OPEN.len();
        let name_len = identifier_len(&source[name_start..]);
        if name_len == 0 {
            continue;
        }
        let name_end = name_start + name_len;
        if !source[name_end..].starts_with(CLOSE) {
            continue;
        }
        let end = name_end + CLOSE.len();

        if literal_start < start {
            tokens.push(Token::Literal(&source[literal_start..start]));
        }
        tokens.push(Token::Placeholder {
            name: &source[name_start..name_end],
            span: start..end,
        });
        literal_start = end;
        cursor = end;
    }

    if literal_start < source.len() {
        tokens.push(Token::Literal(&source[literal_start..]));
    }
    tokens
}

/// Length of the identifier at the start of `text`, 0 if there is none.
fn identifier_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    match bytes.first() {
        Some(b) if *b == b'_' || b.is_ascii_alphabetic() => {}
        _ => return 0,
    }
    bytes
        .iter()
        .take_while(|b| **b == b'_' || b.is_ascii_alphanumeric())
        .count()
}

/// An odd run of backslashes right before `index` escapes the byte there.
fn is_escaped(source: &str, index: usize) -> bool {
    let backslashes = source.as_bytes()[..index]
        .iter()
        .rev()
        .take_while(|b| **b == b'\\')
        .count();
    backslashes % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names<'a>(tokens: &[Token<'a>]) -> Vec<&'a str> {
        tokens
            .iter()
            .filter_map(|t| match t {
                Token::Placeholder { name, .. } => Some(*name),
                Token::Literal(_) => None,
            })
            .collect()
    }

    #[test]
    fn plain_pattern_is_one_literal() {
        assert_eq!(tokenize(r"\d+-\d+"), vec![Token::Literal(r"\d+-\d+")]);
    }

    #[test]
    fn empty_pattern_has_no_tokens() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn single_placeholder() {
        let tokens = tokenize("[[:email:]]");
        assert_eq!(
            tokens,
            vec![Token::Placeholder {
                name: "email",
                span: 0..11
            }]
        );
    }

    #[test]
    fn placeholders_between_literals() {
        let source = "from [[:email:]] to [[:email:]] at [[:time:]]!";
        let tokens = tokenize(source);

        assert_eq!(names(&tokens), vec!["email", "email", "time"]);
        let rebuilt: String = tokens.iter().map(|t| t.source_text(source)).collect();
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn adjacent_placeholders() {
        let tokens = tokenize("[[:a:]][[:b:]]");
        assert_eq!(names(&tokens), vec!["a", "b"]);
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn non_identifier_tokens_stay_literal() {
        for source in ["[[:9lives:]]", "[[:has-dash:]]", "[[::]]", "[[:open", "[[:x:]"] {
            assert_eq!(tokenize(source), vec![Token::Literal(source)], "{source}");
        }
    }

    #[test]
    fn escaped_bracket_stays_literal() {
        let source = r"\[[:email:]]";
        assert_eq!(tokenize(source), vec![Token::Literal(source)]);

        let source = r"\\[[:email:]]";
        assert_eq!(names(&tokenize(source)), vec!["email"]);
    }

    #[test]
    fn extra_leading_bracket() {
        let source = "[[[:x:]]";
        let tokens = tokenize(source);
        assert_eq!(
            tokens,
            vec![
                Token::Literal("["),
                Token::Placeholder {
                    name: "x",
                    span: 1..8
                }
            ]
        );
    }

    #[test]
    fn non_ascii_literals_are_preserved() {
        let source = "café [[:x:]] ünïcode";
        let tokens = tokenize(source);
        let rebuilt: String = tokens.iter().map(|t| t.source_text(source)).collect();
        assert_eq!(rebuilt, source);
        assert_eq!(names(&tokens), vec!["x"]);
    }
}
