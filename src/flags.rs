//! Engine flags.
//!
//! Flags map onto `RegexBuilder` options and form part of the
//! compiled-pattern cache key. `ASCII` is the exception: it is applied by
//! rewriting Perl classes before the pattern reaches the builder.

use bitflags::bitflags;
use regex::{Regex, RegexBuilder};
use std::borrow::Cow;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flags: u32 {
        /// Case-insensitive matching.
        const IGNORECASE = 1 << 0;
        /// `^` and `$` match at line boundaries.
        const MULTILINE = 1 << 1;
        /// `.` also matches `\n`.
        const DOTALL = 1 << 2;
        /// Insignificant whitespace and `#` comments.
        const VERBOSE = 1 << 3;
        /// ASCII-only Perl classes and word boundaries.
        const ASCII = 1 << 4;
    }
}

impl Default for Flags {
    fn default() -> Self {
        Flags::empty()
    }
}

impl Flags {
    /// Build a compiled regex for `pattern` with these flags applied.
    ///
    /// Unicode mode stays on so `.` and negated classes remain valid over
    /// `&str`; `ASCII` narrows only the Perl classes and word boundaries.
    pub fn compile(self, pattern: &str) -> Result<Regex, regex::Error> {
        let pattern = if self.contains(Flags::ASCII) {
            Cow::Owned(ascii_perl_classes(pattern))
        } else {
            Cow::Borrowed(pattern)
        };
        RegexBuilder::new(&pattern)
            .case_insensitive(self.contains(Flags::IGNORECASE))
            .multi_line(self.contains(Flags::MULTILINE))
            .dot_matches_new_line(self.contains(Flags::DOTALL))
            .ignore_whitespace(self.contains(Flags::VERBOSE))
            .build()
    }

    /// Parse a compact flag string such as `"im"`.
    ///
    /// Letters follow the usual inline-flag spelling: `i`, `m`, `s`, `x`, `a`.
    pub fn from_letters(letters: &str) -> Option<Self> {
        letters.chars().try_fold(Flags::empty(), |flags, letter| {
            let flag = match letter {
                'i' => Flags::IGNORECASE,
                'm' => Flags::MULTILINE,
                's' => Flags::DOTALL,
                'x' => Flags::VERBOSE,
                'a' => Flags::ASCII,
                _ => return None,
            };
            Some(flags | flag)
        })
    }
}

/// Rewrite `\d \D \w \W \s \S` into explicit ASCII classes and `\b`/`\B`
/// (outside brackets) into their `(?-u:...)` forms. Bracketed forms become nested classes,
/// which the engine accepts inside `[...]` as well.
fn ascii_perl_classes(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 16);
    let mut depth = 0usize;
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let Some(next) = chars.next() else {
                    out.push(c);
                    break;
                };
                match next {
                    'd' => out.push_str("[0-9]"),
                    'D' => out.push_str("[^0-9]"),
                    'w' => out.push_str("[0-9A-Za-z_]"),
                    'W' => out.push_str("[^0-9A-Za-z_]"),
                    's' => out.push_str(r"[\t\n\x0B\f\r\x20]"),
                    'S' => out.push_str(r"[^\t\n\x0B\f\r\x20]"),
                    'b' if depth == 0 => out.push_str(r"(?-u:\b)"),
                    'B' if depth == 0 => out.push_str(r"(?-u:\B)"),
                    _ => {
                        out.push(c);
                        out.push(next);
                    }
                }
            }
            '[' => {
                out.push(c);
                depth += 1;
                if chars.peek() == Some(&'^') {
                    out.push('^');
                    chars.next();
                }
                // A leading `]` is a literal member.
                if chars.peek() == Some(&']') {
                    out.push(']');
                    chars.next();
                }
            }
            ']' if depth > 0 => {
                depth -= 1;
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignorecase_is_passed_through() {
        let re = Flags::IGNORECASE.compile("hello").unwrap();
        assert!(re.is_match("HeLLo"));

        let re = Flags::empty().compile("hello").unwrap();
        assert!(!re.is_match("HeLLo"));
    }

    #[test]
    fn multiline_and_dotall() {
        let re = Flags::MULTILINE.compile("^b$").unwrap();
        assert!(re.is_match("a\nb\nc"));

        let re = Flags::DOTALL.compile("a.b").unwrap();
        assert!(re.is_match("a\nb"));
        assert!(!Flags::empty().compile("a.b").unwrap().is_match("a\nb"));
    }

    #[test]
    fn verbose_ignores_whitespace() {
        let re = Flags::VERBOSE.compile("a b # trailing comment\n c").unwrap();
        assert!(re.is_match("abc"));
    }

    #[test]
    fn ascii_restricts_word_class() {
        let re = Flags::ASCII.compile(r"^\w+$").unwrap();
        assert!(re.is_match("plain"));
        assert!(!re.is_match("naïve"));
        assert!(Flags::empty().compile(r"^\w+$").unwrap().is_match("naïve"));
    }

    #[test]
    fn ascii_keeps_dot_and_negated_classes_valid() {
        let re = Flags::ASCII.compile(r"\w+.x").unwrap();
        assert!(re.is_match("abc-x"));

        let re = Flags::ASCII.compile(r"^[^\d\s]+$").unwrap();
        assert!(re.is_match("naïve"));
        assert!(!re.is_match("a1"));
    }

    #[test]
    fn ascii_space_class_survives_verbose() {
        let re = (Flags::ASCII | Flags::VERBOSE).compile(r"a \s b").unwrap();
        assert!(re.is_match("a b"));
        assert!(!re.is_match("a\u{a0}b"));
    }

    #[test]
    fn ascii_word_boundary() {
        let re = Flags::ASCII.compile(r"\bve\b").unwrap();
        assert!(re.is_match("naïve"));
        assert!(!Flags::empty().compile(r"\bve\b").unwrap().is_match("naïve"));

        let never = Flags::ASCII.compile(r"\b\B").unwrap();
        assert!(!never.is_match("naïve words"));
    }

    #[test]
    fn ascii_rewrite_respects_brackets_and_escapes() {
        assert_eq!(ascii_perl_classes(r"[\w-]"), r"[[0-9A-Za-z_]-]");
        assert_eq!(ascii_perl_classes(r"[\b]\b"), r"[\b](?-u:\b)");
        assert_eq!(ascii_perl_classes(r"\\d"), r"\\d");
        assert_eq!(ascii_perl_classes(r"[]\d]"), r"[][0-9]]");
        assert_eq!(ascii_perl_classes(r"\p{L}"), r"\p{L}");
    }

    #[test]
    fn letters_parse() {
        assert_eq!(
            Flags::from_letters("im"),
            Some(Flags::IGNORECASE | Flags::MULTILINE)
        );
        assert_eq!(Flags::from_letters(""), Some(Flags::empty()));
        assert_eq!(Flags::from_letters("q"), None);
    }
}
