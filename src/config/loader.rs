use crate::config::schema::{Library, ValidationError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Failure to read, parse, or validate a placeholder library.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read placeholder library {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed placeholder library{}: {source}", located(.path))]
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },

    #[error("rejected placeholder library{}: {source}", located(.path))]
    Validation {
        path: Option<PathBuf>,
        source: ValidationError,
    },
}

impl ConfigError {
    /// Attach the file a string-parsed library came from.
    fn at(self, file: &Path) -> Self {
        match self {
            ConfigError::Toml { path: None, source } => ConfigError::Toml {
                path: Some(file.to_path_buf()),
                source,
            },
            ConfigError::Validation { path: None, source } => ConfigError::Validation {
                path: Some(file.to_path_buf()),
                source,
            },
            other => other,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Io { path, .. } => Some(path),
            ConfigError::Toml { path, .. } | ConfigError::Validation { path, .. } => {
                path.as_deref()
            }
        }
    }
}

fn located(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" {}", p.display()))
        .unwrap_or_default()
}

pub fn load_from_str(input: &str) -> Result<Library, ConfigError> {
    let library: Library = toml_edit::de::from_str(input)
        .map_err(|source| ConfigError::Toml { path: None, source })?;
    library
        .validate()
        .map_err(|source| ConfigError::Validation { path: None, source })?;
    Ok(library)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Library, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let library = load_from_str(&contents).map_err(|error| error.at(path))?;
    debug!(path = %path.display(), library = library.meta.name.as_str(), "read placeholder library");
    Ok(library)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Transform;

    #[test]
    fn parses_both_pattern_forms() {
        let library = load_from_str(
            r#"
[meta]
name = "contacts"

[[placeholders]]
name = "email"
pattern = '[\w.-]+@[\w.-]+\.\w+'
variable = "email_var"
transform = "lowercase"

[[placeholders]]
name = "num"
patterns = ['0x[0-9a-f]+', '\d+']
"#,
        )
        .unwrap();

        assert_eq!(library.meta.name, "contacts");
        assert_eq!(library.placeholders.len(), 2);
        let email = &library.placeholders[0];
        assert_eq!(email.variable.as_deref(), Some("email_var"));
        assert_eq!(email.transform, Some(Transform::Lowercase));
        assert_eq!(library.placeholders[1].subpatterns().len(), 2);
    }

    #[test]
    fn unknown_transform_is_a_toml_error() {
        let err = load_from_str(
            r#"
[[placeholders]]
name = "x"
pattern = "x"
transform = "reverse"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Toml { path: None, .. }));
    }

    #[test]
    fn validation_runs_after_parse() {
        let err = load_from_str("[meta]\nname = \"empty\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
        assert_eq!(
            err.to_string(),
            "rejected placeholder library: library declares no placeholders"
        );
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_from_path("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert_eq!(err.path(), Some(Path::new("/definitely/not/here.toml")));
        assert!(err
            .to_string()
            .starts_with("cannot read placeholder library /definitely/not/here.toml: "));
    }
}
