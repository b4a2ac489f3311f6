//! Placeholder registry.
//!
//! Each placeholder owns an ordered list of [`Rule`]s. Registering a name
//! that already exists appends alternatives instead of replacing them, and
//! every sub-pattern is compiled by the engine before anything is stored.

pub mod reserved;

use crate::errors::{Result, RexError};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub use reserved::{is_identifier, is_posix_class, is_reserved, POSIX_CLASSES, RESERVED_SEQUENCES};

/// Transforms a captured value before it reaches buffers and variables.
pub type Callback = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// One registration under a placeholder.
#[derive(Clone)]
pub struct Rule {
    pattern: String,
    callback: Option<Callback>,
    variable: Option<String>,
}

impl Rule {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn callback(&self) -> Option<&Callback> {
        self.callback.as_ref()
    }

    /// Variable name this rule writes to, when aliased.
    pub fn variable(&self) -> Option<&str> {
        self.variable.as_deref()
    }

    /// Run the callback over a captured value, or return it unchanged.
    pub fn apply(&self, captured: &str) -> String {
        match &self.callback {
            Some(callback) => callback(captured),
            None => captured.to_string(),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("pattern", &self.pattern)
            .field("callback", &self.callback.as_ref().map(|_| "<fn>"))
            .field("variable", &self.variable)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Placeholder {
    name: String,
    rules: Vec<Rule>,
}

impl Placeholder {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// One sub-pattern or an ordered set of alternatives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subpatterns(Vec<String>);

impl Subpatterns {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for Subpatterns {
    fn from(pattern: &str) -> Self {
        Subpatterns(vec![pattern.to_string()])
    }
}

impl From<String> for Subpatterns {
    fn from(pattern: String) -> Self {
        Subpatterns(vec![pattern])
    }
}

impl From<&String> for Subpatterns {
    fn from(pattern: &String) -> Self {
        Subpatterns(vec![pattern.clone()])
    }
}

impl<S: Into<String>> From<Vec<S>> for Subpatterns {
    fn from(patterns: Vec<S>) -> Self {
        Subpatterns(patterns.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Subpatterns {
    fn from(patterns: [S; N]) -> Self {
        Subpatterns(patterns.into_iter().map(Into::into).collect())
    }
}

impl From<&[&str]> for Subpatterns {
    fn from(patterns: &[&str]) -> Self {
        Subpatterns(patterns.iter().map(|p| p.to_string()).collect())
    }
}

#[derive(Debug, Default, Clone)]
pub struct Registry {
    placeholders: HashMap<String, Placeholder>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register alternatives for `name`.
    ///
    /// All sub-patterns are validated first; a single failure leaves the
    /// registry untouched. An empty set declares the placeholder without
    /// rules, which expands to a group that never matches.
    pub fn register(
        &mut self,
        name: &str,
        subpatterns: impl Into<Subpatterns>,
        variable: Option<&str>,
        callback: Option<Callback>,
    ) -> Result<()> {
        reserved::check_name(name)?;
        let subpatterns = subpatterns.into().into_vec();

        for pattern in &subpatterns {
            Regex::new(pattern).map_err(|source| RexError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        }

        let count = subpatterns.len();
        let placeholder = self
            .placeholders
            .entry(name.to_string())
            .or_insert_with(|| Placeholder {
                name: name.to_string(),
                rules: Vec::new(),
            });
        placeholder
            .rules
            .extend(subpatterns.into_iter().map(|pattern| Rule {
                pattern,
                callback: callback.clone(),
                variable: variable.map(str::to_string),
            }));

        debug!(
            placeholder = name,
            added = count,
            total = placeholder.rules.len(),
            "registered placeholder rules"
        );
        Ok(())
    }

    /// Declare `name` without any rules.
    pub fn declare(&mut self, name: &str) -> Result<()> {
        self.register(name, Vec::<String>::new(), None, None)
    }

    pub fn get(&self, name: &str) -> Option<&Placeholder> {
        self.placeholders.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.placeholders.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.placeholders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.placeholders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placeholders.is_empty()
    }

    /// Closest registered name to `name`, if any is close enough to suggest.
    pub fn suggest(&self, name: &str) -> Option<String> {
        self.placeholders
            .keys()
            .map(|candidate| (strsim::jaro_winkler(name, candidate), candidate))
            .filter(|(score, _)| *score >= 0.8)
            .max_by(|a, b| a.0.total_cmp(&b.0).then_with(|| b.1.cmp(a.1)))
            .map(|(_, candidate)| candidate.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_single_pattern() {
        let mut registry = Registry::new();
        registry
            .register("email", r"[\w\.-]+@[\w\.-]+\.\w+", None, None)
            .unwrap();

        let placeholder = registry.get("email").unwrap();
        assert_eq!(placeholder.name(), "email");
        assert_eq!(placeholder.rules().len(), 1);
        assert_eq!(placeholder.rules()[0].pattern(), r"[\w\.-]+@[\w\.-]+\.\w+");
    }

    #[test]
    fn reregistering_appends_alternatives() {
        let mut registry = Registry::new();
        registry.register("num", r"\d+", None, None).unwrap();
        registry
            .register("num", [r"0x[0-9a-f]+", r"0b[01]+"], None, None)
            .unwrap();

        let patterns: Vec<_> = registry
            .get("num")
            .unwrap()
            .rules()
            .iter()
            .map(Rule::pattern)
            .collect();
        assert_eq!(patterns, vec![r"\d+", r"0x[0-9a-f]+", r"0b[01]+"]);
    }

    #[test]
    fn reserved_name_is_rejected_without_effect() {
        let mut registry = Registry::new();
        let err = registry.register(r"\d", r"\d+", None, None).unwrap_err();

        assert!(matches!(err, RexError::PatternConflict { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn invalid_identifier_is_a_conflict() {
        let mut registry = Registry::new();
        let err = registry.register("not-valid", "x", None, None).unwrap_err();
        assert!(matches!(err, RexError::PatternConflict { .. }));
    }

    #[test]
    fn invalid_subpattern_is_rejected() {
        let mut registry = Registry::new();
        let err = registry
            .register("invalid", "[unclosed_group", None, None)
            .unwrap_err();

        match err {
            RexError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "[unclosed_group"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!registry.contains("invalid"));
    }

    #[test]
    fn invalid_alternative_leaves_existing_rules_unchanged() {
        let mut registry = Registry::new();
        registry.register("word", "[a-z]+", None, None).unwrap();

        let result = registry.register("word", vec!["[A-Z]+", "(unclosed"], None, None);
        assert!(result.is_err());
        assert_eq!(registry.get("word").unwrap().rules().len(), 1);
    }

    #[test]
    fn declare_creates_empty_placeholder() {
        let mut registry = Registry::new();
        registry.declare("later").unwrap();

        assert!(registry.get("later").unwrap().is_empty());
    }

    #[test]
    fn callback_and_variable_are_stored_per_rule() {
        let mut registry = Registry::new();
        let upper: Callback = Arc::new(|s: &str| s.to_uppercase());
        registry
            .register("tag", "[a-z]+", Some("tag_var"), Some(upper))
            .unwrap();

        let rule = &registry.get("tag").unwrap().rules()[0];
        assert_eq!(rule.variable(), Some("tag_var"));
        assert_eq!(rule.apply("abc"), "ABC");
    }

    #[test]
    fn suggest_close_names() {
        let mut registry = Registry::new();
        registry.register("email", "x", None, None).unwrap();
        registry.register("phone", "y", None, None).unwrap();

        assert_eq!(registry.suggest("emial"), Some("email".to_string()));
        assert_eq!(registry.suggest("zzzzzz"), None);
    }

    #[test]
    fn names_are_sorted() {
        let mut registry = Registry::new();
        registry.register("zeta", "z", None, None).unwrap();
        registry.register("alpha", "a", None, None).unwrap();

        assert_eq!(registry.names(), vec!["alpha", "zeta"]);
    }
}
