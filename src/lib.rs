//! rex: regular expressions composed from named placeholders
//!
//! Patterns may contain `[[:name:]]` placeholders. Each occurrence expands
//! into a uniquely named capture group built from the sub-patterns
//! registered under `name`, and every match is dispatched back through the
//! registry: rule callbacks transform the captured text, the result is
//! appended to the active buffer and stored in the variable store.
//!
//! # Architecture
//!
//! - [`registry`] holds placeholder rules (sub-pattern, callback, alias).
//! - [`expand`] rewrites a pattern into engine syntax and records which
//!   synthetic group belongs to which placeholder occurrence.
//! - [`cache`] keeps compiled patterns, cleared on every registry change.
//! - [`dispatch`] walks a match's synthetic groups and routes values.
//! - [`engine`] ties it together behind search, match, find, substitute and
//!   recursive-search operations.
//!
//! # Example
//!
//! ```
//! use rex::Engine;
//!
//! let mut engine = Engine::new();
//! engine
//!     .register_as("email", r"[\w.-]+@[\w.-]+\.\w+", Some("email_var"), None)
//!     .unwrap();
//!
//! let found = engine
//!     .search("Email: [[:email:]]", "Email: support@example.com")
//!     .unwrap()
//!     .unwrap();
//!
//! assert_eq!(found.placeholder("email"), Some("support@example.com"));
//! assert_eq!(engine.variable("email_var"), Some("support@example.com"));
//! ```

pub mod buffer;
pub mod cache;
pub mod compile;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod errors;
pub mod expand;
pub mod flags;
pub mod registry;

// Re-exports
pub use buffer::BufferEntry;
pub use compile::CompiledPattern;
pub use config::{load_from_path, load_from_str, ConfigError, Library, Transform};
pub use dispatch::{Capture, PatternMatch};
pub use engine::{BufferScope, Engine, EngineConfig, Hooks, MatchIter};
pub use errors::{Result, RexError};
pub use expand::{Expansion, ExpansionGroup};
pub use flags::Flags;
pub use registry::{Callback, Placeholder, Registry, Rule, Subpatterns};
