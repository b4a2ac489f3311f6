use crate::registry::Callback;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

/// A placeholder library file.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Library {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub placeholders: Vec<PlaceholderDef>,
}

impl Library {
    /// Check every entry and report all problems at once.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.placeholders.is_empty() {
            issues.push(ValidationIssue::EmptyLibrary);
        }

        for (index, def) in self.placeholders.iter().enumerate() {
            if def.name.trim().is_empty() {
                issues.push(ValidationIssue::BlankName { entry: index + 1 });
            }
            match (&def.pattern, def.patterns.is_empty()) {
                (Some(_), false) => issues.push(ValidationIssue::ConflictingPatterns {
                    placeholder: def.label(index),
                }),
                (None, true) => issues.push(ValidationIssue::NoPatterns {
                    placeholder: def.label(index),
                }),
                _ => {}
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlaceholderDef {
    pub name: String,
    /// Single sub-pattern shorthand
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub variable: Option<String>,
    #[serde(default)]
    pub transform: Option<Transform>,
}

impl PlaceholderDef {
    /// Name for diagnostics; unnamed entries are numbered from 1.
    fn label(&self, index: usize) -> String {
        if self.name.trim().is_empty() {
            format!("#{}", index + 1)
        } else {
            self.name.clone()
        }
    }

    /// Sub-patterns in file order, whichever field supplied them.
    pub fn subpatterns(&self) -> Vec<String> {
        match &self.pattern {
            Some(pattern) => vec![pattern.clone()],
            None => self.patterns.clone(),
        }
    }
}

/// Built-in value transforms usable as rule callbacks from a library file.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    Lowercase,
    Uppercase,
    Trim,
}

impl Transform {
    pub fn apply(self, value: &str) -> String {
        match self {
            Transform::Lowercase => value.to_lowercase(),
            Transform::Uppercase => value.to_uppercase(),
            Transform::Trim => value.trim().to_string(),
        }
    }

    pub fn callback(self) -> Callback {
        Arc::new(move |value: &str| self.apply(value))
    }
}

/// Every problem found in a library, in file order.
#[derive(Error, Debug, Clone)]
#[error("{}", render_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

fn render_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    #[error("library declares no placeholders")]
    EmptyLibrary,

    #[error("placeholder entry {entry} has a blank name")]
    BlankName { entry: usize },

    #[error("placeholder '{placeholder}' defines no sub-patterns")]
    NoPatterns { placeholder: String },

    #[error("placeholder '{placeholder}' sets both `pattern` and `patterns`")]
    ConflictingPatterns { placeholder: String },
}
