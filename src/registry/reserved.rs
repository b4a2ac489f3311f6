//! Placeholder name rules.

use crate::errors::{Result, RexError};

/// Built-in escape sequences that can never be registered as placeholders.
pub const RESERVED_SEQUENCES: &[&str] = &[
    r"\d", r"\w", r"\s", r"\b", r"\B", r"\D", r"\S", r"\W", r"\A", r"\Z", r"\z", r"\t", r"\r",
    r"\n", r"\f", r"\v",
];

/// POSIX bracket classes the engine spells `[[:name:]]`.
///
/// An unregistered token with one of these names is left for the engine.
pub const POSIX_CLASSES: &[&str] = &[
    "alnum", "alpha", "ascii", "blank", "cntrl", "digit", "graph", "lower", "print", "punct",
    "space", "upper", "word", "xdigit",
];

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

pub fn is_reserved(name: &str) -> bool {
    RESERVED_SEQUENCES.contains(&name)
}

pub fn is_posix_class(name: &str) -> bool {
    POSIX_CLASSES.contains(&name)
}

/// Reject names that collide with reserved tokens or are not identifiers.
pub(crate) fn check_name(name: &str) -> Result<()> {
    if is_reserved(name) {
        return Err(RexError::PatternConflict {
            name: name.to_string(),
            reason: "conflicts with a reserved regex sequence".to_string(),
        });
    }
    if !is_identifier(name) {
        return Err(RexError::PatternConflict {
            name: name.to_string(),
            reason: "not a valid identifier ([A-Za-z_][A-Za-z0-9_]*)".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers() {
        assert!(is_identifier("email"));
        assert!(is_identifier("_private"));
        assert!(is_identifier("ipv4_octet2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2fast"));
        assert!(!is_identifier("has-dash"));
        assert!(!is_identifier("naïve"));
    }

    #[test]
    fn every_reserved_sequence_conflicts() {
        for seq in RESERVED_SEQUENCES {
            let err = check_name(seq).unwrap_err();
            assert!(
                matches!(err, RexError::PatternConflict { ref reason, .. } if reason.contains("reserved")),
                "{seq} should be reserved"
            );
        }
    }

    #[test]
    fn posix_names_are_registrable() {
        assert!(is_posix_class("digit"));
        assert!(check_name("digit").is_ok());
    }
}
