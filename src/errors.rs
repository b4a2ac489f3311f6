use thiserror::Error;

/// Errors raised while registering placeholders or compiling patterns.
#[derive(Error, Debug)]
pub enum RexError {
    #[error("placeholder '{name}' rejected: {reason}")]
    PatternConflict { name: String, reason: String },

    #[error("invalid regex pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("undefined placeholder '[[:{name}:]]' in pattern '{pattern}'{}", suggestion_hint(.suggestion))]
    UndefinedPlaceholder {
        name: String,
        pattern: String,
        suggestion: Option<String>,
    },

    #[error("failed to compile pattern '{pattern}': {source}")]
    Compile {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl RexError {
    /// True for failures raised while turning a pattern into a matcher.
    ///
    /// Undefined placeholders count as compile failures: expansion runs
    /// immediately before the engine sees the pattern.
    pub fn is_compile_error(&self) -> bool {
        matches!(
            self,
            RexError::UndefinedPlaceholder { .. } | RexError::Compile { .. }
        )
    }

    /// True for failures raised by placeholder registration.
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            RexError::PatternConflict { .. } | RexError::InvalidPattern { .. }
        )
    }
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean '{name}'?)"),
        None => String::new(),
    }
}

pub type Result<T, E = RexError> = std::result::Result<T, E>;
