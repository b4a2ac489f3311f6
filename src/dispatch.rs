//! Post-match attribution of synthetic groups to placeholders.

use crate::buffer::{BufferEntry, BufferSet};
use crate::compile::CompiledPattern;
use crate::registry::Registry;
use regex::Captures;
use std::collections::HashMap;
use std::ops::Range;
use tracing::trace;

/// A placeholder capture inside a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// Placeholder that produced the capture
    pub placeholder: String,
    /// Synthetic group name, e.g. `email_2`
    pub group: String,
    /// Index of the rule whose alternative matched
    pub rule: usize,
    /// Text as captured by the engine
    pub raw: String,
    /// Text after the rule's callback ran
    pub value: String,
    pub byte_start: usize,
    pub byte_end: usize,
}

/// An owned match with its placeholder captures resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    /// Byte range of the entire match
    pub byte_start: usize,
    pub byte_end: usize,
    /// The matched text
    pub text: String,
    /// Placeholder captures in pattern order
    pub captures: Vec<Capture>,
    /// Named groups written by the caller (synthetic groups excluded)
    pub named: HashMap<String, String>,
    /// Every group by index; index 0 is the whole match
    pub groups: Vec<Option<String>>,
}

impl PatternMatch {
    pub fn range(&self) -> Range<usize> {
        self.byte_start..self.byte_end
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Value of the first capture of `placeholder`.
    pub fn placeholder(&self, placeholder: &str) -> Option<&str> {
        self.captures
            .iter()
            .find(|c| c.placeholder == placeholder)
            .map(|c| c.value.as_str())
    }

    /// Values of every capture of `placeholder`, left to right.
    pub fn placeholder_values<'a>(
        &'a self,
        placeholder: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.captures
            .iter()
            .filter(move |c| c.placeholder == placeholder)
            .map(|c| c.value.as_str())
    }

    /// A caller-written named group.
    pub fn named(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }

    /// A group by index, synthetic groups included.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.groups.get(index).and_then(Option::as_deref)
    }
}

/// Where dispatch writes its side effects.
pub(crate) struct DispatchSink<'a> {
    pub buffers: &'a mut BufferSet,
    pub variables: &'a mut HashMap<String, String>,
}

/// Resolve a successful match back to the placeholders that produced it.
///
/// For every synthetic group that took part in the match, in pattern
/// order: pick the rule whose alternative matched, run its callback, append
/// (placeholder, value) to the active buffer and store the value under the
/// rule's variable name. Matches without synthetic groups pass through
/// without side effects.
pub(crate) fn dispatch(
    registry: &Registry,
    compiled: &CompiledPattern,
    caps: &Captures<'_>,
    sink: DispatchSink<'_>,
) -> PatternMatch {
    let whole = caps.get_match();
    let mut captures = Vec::with_capacity(compiled.groups().len());

    for group in compiled.groups() {
        let Some(m) = caps.name(group.name()) else {
            continue;
        };

        let rule_index = group
            .alternatives()
            .iter()
            .position(|alt| caps.name(alt).is_some())
            .unwrap_or(0);
        let rule = registry
            .get(group.placeholder())
            .and_then(|p| p.rules().get(rule_index));

        let raw = m.as_str();
        let value = rule.map_or_else(|| raw.to_string(), |r| r.apply(raw));
        trace!(
            placeholder = group.placeholder(),
            group = group.name(),
            rule = rule_index,
            value = value.as_str(),
            "dispatching capture"
        );

        sink.buffers
            .record(BufferEntry::new(group.placeholder(), value.as_str()));
        let variable = rule
            .and_then(|r| r.variable())
            .unwrap_or(group.placeholder());
        sink.variables.insert(variable.to_string(), value.clone());

        captures.push(Capture {
            placeholder: group.placeholder().to_string(),
            group: group.name().to_string(),
            rule: rule_index,
            raw: raw.to_string(),
            value,
            byte_start: m.start(),
            byte_end: m.end(),
        });
    }

    PatternMatch {
        byte_start: whole.start(),
        byte_end: whole.end(),
        text: whole.as_str().to_string(),
        captures,
        named: user_groups(compiled, caps),
        groups: caps
            .iter()
            .map(|m| m.map(|m| m.as_str().to_string()))
            .collect(),
    }
}

fn user_groups(compiled: &CompiledPattern, caps: &Captures<'_>) -> HashMap<String, String> {
    compiled
        .regex()
        .capture_names()
        .flatten()
        .filter(|name| !compiled.expansion().is_synthetic(name))
        .filter_map(|name| Some((name.to_string(), caps.name(name)?.as_str().to_string())))
        .collect()
}
