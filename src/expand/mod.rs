//! Placeholder expansion.
//!
//! Expansion is a two-phase pipeline: [`tokenize`] splits the source
//! pattern into literals and `[[:name:]]` references, then [`expand`]
//! renders each reference as a uniquely named capture group holding the
//! alternation of the placeholder's sub-patterns.
//!
//! # Group naming
//!
//! The n-th reference to `email` in one pattern becomes group `email_n`
//! (1-based). When a placeholder has several rules, each alternative gets
//! its own sub-group `email_n__alt<i>` so dispatch can tell which rule
//! produced the capture.
//!
//! ```
//! use rex::expand::expand;
//! use rex::registry::Registry;
//!
//! let mut registry = Registry::new();
//! registry.register("digit", r"\d+", None, None).unwrap();
//!
//! let expansion = expand(&registry, "[[:digit:]]-[[:digit:]]").unwrap();
//! assert_eq!(
//!     expansion.pattern(),
//!     r"(?P<digit_1>(?-x:\d+))-(?P<digit_2>(?-x:\d+))"
//! );
//! ```

pub mod token;

use crate::errors::{Result, RexError};
use crate::registry::{is_posix_class, Placeholder, Registry};
use std::collections::HashMap;

pub use token::{tokenize, Token};

/// Body of a placeholder without rules: a word boundary that is also not a
/// word boundary, which no input satisfies under any flag combination.
pub const NEVER_MATCH: &str = r"\b\B";

/// Synthetic capture group produced for one placeholder reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionGroup {
    name: String,
    placeholder: String,
    occurrence: usize,
    alternatives: Vec<String>,
}

impl ExpansionGroup {
    /// Capture group name in the expanded pattern.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// 1-based position among references to the same placeholder.
    pub fn occurrence(&self) -> usize {
        self.occurrence
    }

    /// Per-rule sub-group names, indexed by rule. Empty when the placeholder
    /// has fewer than two rules.
    pub fn alternatives(&self) -> &[String] {
        &self.alternatives
    }
}

/// An engine-ready pattern plus the mapping back to placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    source: String,
    pattern: String,
    groups: Vec<ExpansionGroup>,
}

impl Expansion {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Synthetic groups in the order they appear in the pattern.
    pub fn groups(&self) -> &[ExpansionGroup] {
        &self.groups
    }

    pub fn has_placeholders(&self) -> bool {
        !self.groups.is_empty()
    }

    /// True if `name` is a group this expansion synthesized.
    pub fn is_synthetic(&self, name: &str) -> bool {
        self.groups
            .iter()
            .any(|g| g.name == name || g.alternatives.iter().any(|alt| alt == name))
    }

    pub fn group(&self, name: &str) -> Option<&ExpansionGroup> {
        self.groups.iter().find(|g| g.name == name)
    }
}

/// Rewrite every `[[:name:]]` in `source` into a named capture group.
///
/// A registered placeholder shadows the engine's POSIX class of the same
/// name. Unregistered POSIX class names are left for the engine; any other
/// unregistered name fails with [`RexError::UndefinedPlaceholder`].
pub fn expand(registry: &Registry, source: &str) -> Result<Expansion> {
    let mut pattern = String::with_capacity(source.len());
    let mut groups = Vec::new();
    let mut occurrences: HashMap<&str, usize> = HashMap::new();

    for token in tokenize(source) {
        match token {
            Token::Literal(text) => pattern.push_str(text),
            Token::Placeholder { name, span } => match registry.get(name) {
                Some(placeholder) => {
                    let occurrence = occurrences.entry(name).or_insert(0);
                    *occurrence += 1;
                    let group = render_group(placeholder, *occurrence, &mut pattern);
                    groups.push(group);
                }
                None if is_posix_class(name) => pattern.push_str(&source[span]),
                None => {
                    return Err(RexError::UndefinedPlaceholder {
                        name: name.to_string(),
                        pattern: source.to_string(),
                        suggestion: registry.suggest(name),
                    })
                }
            },
        }
    }

    Ok(Expansion {
        source: source.to_string(),
        pattern,
        groups,
    })
}

fn render_group(placeholder: &Placeholder, occurrence: usize, out: &mut String) -> ExpansionGroup {
    let name = format!("{}_{}", placeholder.name(), occurrence);
    let rules = placeholder.rules();
    let mut alternatives = Vec::new();

    out.push_str("(?P<");
    out.push_str(&name);
    out.push('>');
    match rules {
        [] => out.push_str(NEVER_MATCH),
        [only] => push_body(out, only.pattern()),
        _ => {
            for (index, rule) in rules.iter().enumerate() {
                if index > 0 {
                    out.push('|');
                }
                let alt = format!("{name}__alt{}", index + 1);
                out.push_str("(?P<");
                out.push_str(&alt);
                out.push('>');
                push_body(out, rule.pattern());
                out.push(')');
                alternatives.push(alt);
            }
        }
    }
    out.push(')');

    ExpansionGroup {
        name,
        placeholder: placeholder.name().to_string(),
        occurrence,
        alternatives,
    }
}

/// Sub-patterns were validated without flags, so whitespace mode is turned
/// off inside them.
fn push_body(out: &mut String, pattern: &str) {
    out.push_str("(?-x:");
    out.push_str(pattern);
    out.push(')');
}
