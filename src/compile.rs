use crate::errors::{Result, RexError};
use crate::expand::{expand, Expansion, ExpansionGroup};
use crate::flags::Flags;
use crate::registry::Registry;
use regex::Regex;

/// An expanded pattern compiled by the engine.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    expansion: Expansion,
    regex: Regex,
    flags: Flags,
    anchored: bool,
}

impl CompiledPattern {
    /// Expand `source` against `registry` and compile the result.
    ///
    /// Anchored patterns only match at the start of the haystack.
    pub fn compile(
        registry: &Registry,
        source: &str,
        flags: Flags,
        anchored: bool,
    ) -> Result<Self> {
        let expansion = expand(registry, source)?;
        let engine_pattern = if anchored {
            anchor(expansion.pattern(), flags)
        } else {
            expansion.pattern().to_string()
        };

        let regex = flags
            .compile(&engine_pattern)
            .map_err(|source| RexError::Compile {
                pattern: engine_pattern,
                source,
            })?;

        Ok(Self {
            expansion,
            regex,
            flags,
            anchored,
        })
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn expansion(&self) -> &Expansion {
        &self.expansion
    }

    pub fn groups(&self) -> &[ExpansionGroup] {
        self.expansion.groups()
    }

    pub fn source(&self) -> &str {
        self.expansion.source()
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn is_anchored(&self) -> bool {
        self.anchored
    }
}

/// In verbose mode a trailing `#` comment would swallow the closing
/// parenthesis, so the group is closed on a fresh line.
fn anchor(pattern: &str, flags: Flags) -> String {
    if flags.contains(Flags::VERBOSE) {
        format!("\\A(?:{pattern}\n)")
    } else {
        format!("\\A(?:{pattern})")
    }
}
