//! The matching session.
//!
//! An [`Engine`] owns the placeholder registry, the compiled-pattern cache,
//! the named buffers and the variable store. Every operation expands the
//! pattern (through the cache), runs the regex engine, and dispatches
//! placeholder captures back into buffers and variables.
//!
//! # Example
//!
//! ```
//! use rex::Engine;
//!
//! let mut engine = Engine::new();
//! engine.register("digit", r"\d+").unwrap();
//!
//! let numbers = engine.find_all("[[:digit:]]", "Numbers: 123, 456, 789.").unwrap();
//! assert_eq!(numbers, vec!["123", "456", "789"]);
//! assert_eq!(engine.variable("digit"), Some("789"));
//! ```

mod data;
mod hooks;
mod iter;
mod scope;

pub use hooks::{Hooks, PostHook, PreHook};
pub use iter::MatchIter;
pub use scope::BufferScope;

use crate::buffer::{BufferEntry, BufferSet};
use crate::cache::{PatternCache, DEFAULT_CAPACITY};
use crate::compile::CompiledPattern;
use crate::config::Library;
use crate::dispatch::{self, DispatchSink, PatternMatch};
use crate::errors::Result;
use crate::expand::{self, Expansion};
use crate::flags::Flags;
use crate::registry::{Callback, Placeholder, Registry, Subpatterns};
use regex::Captures;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum number of compiled patterns kept in the cache
    pub cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug, Default)]
pub struct Engine {
    registry: Registry,
    cache: PatternCache,
    buffers: BufferSet,
    variables: HashMap<String, String>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            cache: PatternCache::new(config.cache_capacity),
            ..Self::default()
        }
    }

    // ----- registration -----

    /// Register one sub-pattern or a set of alternatives under `name`.
    pub fn register(&mut self, name: &str, subpatterns: impl Into<Subpatterns>) -> Result<()> {
        self.register_as(name, subpatterns, None, None)
    }

    /// Register with a callback that transforms each captured value.
    pub fn register_with(
        &mut self,
        name: &str,
        subpatterns: impl Into<Subpatterns>,
        callback: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Result<()> {
        self.register_as(name, subpatterns, None, Some(Arc::new(callback)))
    }

    /// Register with an optional variable alias and callback.
    ///
    /// Captures are stored in the variable store under `variable`, or under
    /// `name` when no alias is given.
    pub fn register_as(
        &mut self,
        name: &str,
        subpatterns: impl Into<Subpatterns>,
        variable: Option<&str>,
        callback: Option<Callback>,
    ) -> Result<()> {
        self.registry
            .register(name, subpatterns, variable, callback)?;
        self.invalidate();
        Ok(())
    }

    /// Declare a placeholder with no rules; it expands to a never-matching
    /// group until rules are registered.
    pub fn declare(&mut self, name: &str) -> Result<()> {
        self.registry.declare(name)?;
        self.invalidate();
        Ok(())
    }

    /// Register every placeholder of a library file.
    ///
    /// Entries are registered in file order; on error, entries before the
    /// failing one stay registered and the cache is still cleared. Returns
    /// the number of entries loaded.
    pub fn load_library(&mut self, library: &Library) -> Result<usize> {
        for def in &library.placeholders {
            let callback = def.transform.map(|t| t.callback());
            let registered = self.registry.register(
                &def.name,
                def.subpatterns(),
                def.variable.as_deref(),
                callback,
            );
            if let Err(err) = registered {
                self.invalidate();
                return Err(err);
            }
        }
        self.invalidate();
        debug!(
            library = library.meta.name.as_str(),
            placeholders = library.placeholders.len(),
            "loaded placeholder library"
        );
        Ok(library.placeholders.len())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn placeholder(&self, name: &str) -> Option<&Placeholder> {
        self.registry.get(name)
    }

    fn invalidate(&mut self) {
        if !self.cache.is_empty() {
            debug!(entries = self.cache.len(), "registry changed, clearing pattern cache");
            self.cache.clear();
        }
    }

    // ----- expansion -----

    /// Expand placeholders without compiling.
    pub fn expand(&self, pattern: &str) -> Result<Expansion> {
        expand::expand(&self.registry, pattern)
    }

    /// Expand and compile, going through the cache.
    pub fn compile(&mut self, pattern: &str, flags: Flags) -> Result<Arc<CompiledPattern>> {
        self.compiled(pattern, flags, false)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    fn compiled(
        &mut self,
        pattern: &str,
        flags: Flags,
        anchored: bool,
    ) -> Result<Arc<CompiledPattern>> {
        self.cache
            .get_or_compile(&self.registry, pattern, flags, anchored)
    }

    pub(crate) fn dispatch(
        &mut self,
        compiled: &CompiledPattern,
        caps: &Captures<'_>,
    ) -> PatternMatch {
        dispatch::dispatch(
            &self.registry,
            compiled,
            caps,
            DispatchSink {
                buffers: &mut self.buffers,
                variables: &mut self.variables,
            },
        )
    }

    // ----- matching -----

    /// Find the first match anywhere in `haystack`.
    pub fn search(&mut self, pattern: &str, haystack: &str) -> Result<Option<PatternMatch>> {
        self.search_with(pattern, haystack, Flags::empty(), Hooks::new())
    }

    pub fn search_with(
        &mut self,
        pattern: &str,
        haystack: &str,
        flags: Flags,
        hooks: Hooks<'_>,
    ) -> Result<Option<PatternMatch>> {
        self.run_single(pattern, haystack, flags, false, hooks)
    }

    /// Match only at the start of `haystack`.
    pub fn match_at_start(
        &mut self,
        pattern: &str,
        haystack: &str,
    ) -> Result<Option<PatternMatch>> {
        self.match_at_start_with(pattern, haystack, Flags::empty(), Hooks::new())
    }

    pub fn match_at_start_with(
        &mut self,
        pattern: &str,
        haystack: &str,
        flags: Flags,
        hooks: Hooks<'_>,
    ) -> Result<Option<PatternMatch>> {
        self.run_single(pattern, haystack, flags, true, hooks)
    }

    fn run_single(
        &mut self,
        pattern: &str,
        haystack: &str,
        flags: Flags,
        anchored: bool,
        mut hooks: Hooks<'_>,
    ) -> Result<Option<PatternMatch>> {
        let haystack = hooks.preprocess(haystack);
        let compiled = self.compiled(pattern, flags, anchored)?;

        let Some(caps) = compiled.regex().captures(&haystack) else {
            return Ok(None);
        };
        let found = self.dispatch(&compiled, &caps);
        hooks.postprocess(&found);
        Ok(Some(found))
    }

    /// All matched substrings, left to right, non-overlapping.
    ///
    /// Every match is dispatched.
    pub fn find_all(&mut self, pattern: &str, haystack: &str) -> Result<Vec<String>> {
        self.find_all_with(pattern, haystack, Flags::empty())
    }

    pub fn find_all_with(
        &mut self,
        pattern: &str,
        haystack: &str,
        flags: Flags,
    ) -> Result<Vec<String>> {
        Ok(self
            .find_iter_with(pattern, haystack, flags)?
            .map(|m| m.text)
            .collect())
    }

    /// Lazily iterate over matches.
    ///
    /// Each match is dispatched when the iterator produces it, not when the
    /// caller inspects it. Buffer and variable writes for matches already
    /// produced remain in place if iteration stops early; matches never
    /// produced are never dispatched.
    pub fn find_iter<'e, 'h>(
        &'e mut self,
        pattern: &str,
        haystack: &'h str,
    ) -> Result<MatchIter<'e, 'h>> {
        self.find_iter_with(pattern, haystack, Flags::empty())
    }

    pub fn find_iter_with<'e, 'h>(
        &'e mut self,
        pattern: &str,
        haystack: &'h str,
        flags: Flags,
    ) -> Result<MatchIter<'e, 'h>> {
        let compiled = self.compiled(pattern, flags, false)?;
        Ok(MatchIter::new(self, compiled, haystack))
    }

    // ----- substitution -----

    /// Replace every match with `replacement`.
    ///
    /// `$name` and `${n}` in `replacement` expand as the regex engine
    /// defines them. No dispatch happens.
    pub fn substitute(
        &mut self,
        pattern: &str,
        replacement: &str,
        haystack: &str,
    ) -> Result<String> {
        self.substitute_with(pattern, replacement, haystack, 0, Flags::empty())
    }

    /// Replace at most `limit` matches (`0` replaces all).
    pub fn substitute_with(
        &mut self,
        pattern: &str,
        replacement: &str,
        haystack: &str,
        limit: usize,
        flags: Flags,
    ) -> Result<String> {
        let compiled = self.compiled(pattern, flags, false)?;
        Ok(compiled
            .regex()
            .replacen(haystack, limit, replacement)
            .into_owned())
    }

    /// Replace every match with `transform(matched_text)`.
    pub fn substitute_fn(
        &mut self,
        pattern: &str,
        haystack: &str,
        transform: impl FnMut(&str) -> String,
    ) -> Result<String> {
        self.substitute_fn_with(pattern, haystack, 0, Flags::empty(), transform)
    }

    pub fn substitute_fn_with(
        &mut self,
        pattern: &str,
        haystack: &str,
        limit: usize,
        flags: Flags,
        mut transform: impl FnMut(&str) -> String,
    ) -> Result<String> {
        let compiled = self.compiled(pattern, flags, false)?;
        Ok(compiled
            .regex()
            .replacen(haystack, limit, |caps: &Captures<'_>| {
                transform(caps.get_match().as_str())
            })
            .into_owned())
    }

    // ----- buffers -----

    /// Create `name`, emptying it if it exists.
    pub fn add_buffer(&mut self, name: &str) {
        self.buffers.create(name);
    }

    /// Entries of `name`; empty when it does not exist.
    pub fn buffer(&self, name: &str) -> &[BufferEntry] {
        self.buffers.get(name)
    }

    pub fn take_buffer(&mut self, name: &str) -> Vec<BufferEntry> {
        self.buffers.take(name)
    }

    pub fn clear_buffer(&mut self, name: &str) {
        self.buffers.clear(name);
    }

    pub fn remove_buffer(&mut self, name: &str) -> Option<Vec<BufferEntry>> {
        self.buffers.remove(name)
    }

    pub fn buffer_names(&self) -> Vec<&str> {
        self.buffers.names().collect()
    }

    pub fn active_buffer(&self) -> Option<&str> {
        self.buffers.active()
    }

    /// Make `name` the active buffer until the returned scope is dropped.
    ///
    /// The scope derefs to the engine, so operations run through it
    /// dispatch into `name`. Scopes nest; dropping one restores whichever
    /// buffer was active before it, on every exit path.
    pub fn buffer_scope(&mut self, name: &str) -> BufferScope<'_> {
        BufferScope::enter(self, name)
    }

    /// Run `f` with `name` as the active buffer.
    pub fn with_buffer<R>(&mut self, name: &str, f: impl FnOnce(&mut Engine) -> R) -> R {
        let mut scope = self.buffer_scope(name);
        f(&mut scope)
    }

    // ----- variables -----

    /// Most recent value captured for `name`.
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    pub fn variables(&self) -> &HashMap<String, String> {
        &self.variables
    }

    pub fn clear_variables(&mut self) {
        self.variables.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RexError;

    const EMAIL: &str = r"[\w\.-]+@[\w\.-]+\.\w+";

    #[test]
    fn search_assigns_variable() {
        let mut engine = Engine::new();
        engine
            .register_as("email", EMAIL, Some("email_var"), None)
            .unwrap();

        let m = engine
            .search("[[:email:]]", "Contact us at support@example.com")
            .unwrap()
            .unwrap();

        assert_eq!(m.text, "support@example.com");
        assert_eq!(engine.variable("email_var"), Some("support@example.com"));
        assert_eq!(engine.variable("email"), None);
    }

    #[test]
    fn match_at_start_is_anchored() {
        let mut engine = Engine::new();
        engine.register("digit", r"\d+").unwrap();

        let m = engine
            .match_at_start("[[:digit:]]", "12345 is a number")
            .unwrap()
            .unwrap();
        assert_eq!(m.text, "12345");
        assert_eq!(engine.variable("digit"), Some("12345"));

        assert!(engine
            .match_at_start("[[:digit:]]", "a number: 12345")
            .unwrap()
            .is_none());
    }

    #[test]
    fn no_match_has_no_side_effects() {
        let mut engine = Engine::new();
        engine.register("digit", r"\d+").unwrap();

        let mut scope = engine.buffer_scope("log");
        assert!(scope.search("[[:digit:]]", "no numbers").unwrap().is_none());
        drop(scope);

        assert!(engine.buffer("log").is_empty());
        assert!(engine.variables().is_empty());
    }

    #[test]
    fn pre_and_post_hooks() {
        let mut engine = Engine::new();
        engine.register("word", "[A-Z]+").unwrap();

        let mut seen = Vec::new();
        let m = engine
            .search_with(
                "[[:word:]]",
                "hello",
                Flags::empty(),
                Hooks::new()
                    .pre(|s| s.to_uppercase())
                    .post(|m| seen.push(m.text.clone())),
            )
            .unwrap();

        assert_eq!(m.map(|m| m.text), Some("HELLO".to_string()));
        assert_eq!(seen, vec!["HELLO".to_string()]);
    }

    #[test]
    fn post_hook_not_called_without_match() {
        let mut engine = Engine::new();
        let mut calls = 0;
        engine
            .search_with(
                "xyz",
                "abc",
                Flags::empty(),
                Hooks::new().post(|_| calls += 1),
            )
            .unwrap();
        assert_eq!(calls, 0);
    }

    #[test]
    fn flags_are_passed_through() {
        let mut engine = Engine::new();
        engine.register("word", "hello").unwrap();

        assert!(engine.search("[[:word:]]", "HELLO").unwrap().is_none());
        assert!(engine
            .search_with("[[:word:]]", "HELLO", Flags::IGNORECASE, Hooks::new())
            .unwrap()
            .is_some());
    }

    #[test]
    fn registration_invalidates_cache() {
        let mut engine = Engine::new();
        engine.register("pet", "cat").unwrap();

        assert_eq!(engine.find_all("[[:pet:]]", "cat dog").unwrap(), vec!["cat"]);
        assert_eq!(engine.cache_len(), 1);

        engine.register("pet", "dog").unwrap();
        assert_eq!(engine.cache_len(), 0);
        assert_eq!(
            engine.find_all("[[:pet:]]", "cat dog").unwrap(),
            vec!["cat", "dog"]
        );
    }

    #[test]
    fn first_registered_alternative_wins_at_same_position() {
        let mut engine = Engine::new();
        engine.register("num", "0x[0-9a-f]+").unwrap();
        engine.register("num", r"\d+").unwrap();
        assert_eq!(
            engine.find_all("[[:num:]]", "1 a 0xff").unwrap(),
            vec!["1", "0xff"]
        );
    }

    #[test]
    fn undefined_placeholder_surfaces_as_compile_error() {
        let mut engine = Engine::new();
        let err = engine.search("[[:ghost:]]", "boo").unwrap_err();

        assert!(matches!(err, RexError::UndefinedPlaceholder { .. }));
        assert!(err.is_compile_error());
    }

    #[test]
    fn substitute_fn_transforms_each_match() {
        let mut engine = Engine::new();
        engine.register("digit", r"\d+").unwrap();

        let out = engine
            .substitute_fn("[[:digit:]]", "a1 b22 c333", |m| m.len().to_string())
            .unwrap();
        assert_eq!(out, "a1 b2 c3");
    }

    #[test]
    fn substitute_limit() {
        let mut engine = Engine::new();
        engine.register("digit", r"\d+").unwrap();

        let out = engine
            .substitute_with("[[:digit:]]", "#", "1 2 3", 2, Flags::empty())
            .unwrap();
        assert_eq!(out, "# # 3");
    }

    #[test]
    fn substitute_does_not_dispatch() {
        let mut engine = Engine::new();
        engine.register("digit", r"\d+").unwrap();

        let mut scope = engine.buffer_scope("log");
        scope.substitute("[[:digit:]]", "#", "1 2").unwrap();
        drop(scope);

        assert!(engine.buffer("log").is_empty());
        assert!(engine.variable("digit").is_none());
    }

    #[test]
    fn substitute_can_reference_synthetic_groups() {
        let mut engine = Engine::new();
        engine.register("digit", r"\d+").unwrap();

        let out = engine
            .substitute("[[:digit:]]-[[:digit:]]", "${digit_2}-${digit_1}", "12-34")
            .unwrap();
        assert_eq!(out, "34-12");
    }

    #[test]
    fn with_buffer_collects_dispatch() {
        let mut engine = Engine::new();
        engine.register("digit", r"\d+").unwrap();

        let found = engine
            .with_buffer("nums", |engine| engine.find_all("[[:digit:]]", "7 8"))
            .unwrap();

        assert_eq!(found, vec!["7", "8"]);
        assert_eq!(engine.active_buffer(), None);
        let values: Vec<_> = engine.buffer("nums").iter().map(|e| e.value.as_str()).collect();
        assert_eq!(values, vec!["7", "8"]);
    }

    #[test]
    fn with_config_sets_capacity() {
        let mut engine = Engine::with_config(EngineConfig { cache_capacity: 1 });
        engine.compile("a", Flags::empty()).unwrap();
        engine.compile("b", Flags::empty()).unwrap();
        assert_eq!(engine.cache_len(), 1);
    }
}
