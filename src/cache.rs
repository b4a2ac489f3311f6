//! Compiled pattern cache.
//!
//! Caches expanded-and-compiled patterns per engine to avoid redundant
//! expansion and regex compilation. Keys include the flags and anchoring,
//! since the same source compiles differently under each. Expansion output
//! depends on the registry, so the owner must call [`PatternCache::clear`]
//! whenever a placeholder is registered.

use crate::compile::CompiledPattern;
use crate::errors::Result;
use crate::flags::Flags;
use crate::registry::Registry;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::trace;

pub const DEFAULT_CAPACITY: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    pattern: String,
    flags: Flags,
    anchored: bool,
}

/// Bounded least-recently-used cache of compiled patterns.
#[derive(Debug)]
pub struct PatternCache {
    entries: LruCache<CacheKey, Arc<CompiledPattern>>,
}

impl PatternCache {
    /// Create a cache holding at most `capacity` patterns (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Get a compiled pattern from cache, or expand, compile and cache it.
    ///
    /// Failures are not cached.
    pub fn get_or_compile(
        &mut self,
        registry: &Registry,
        pattern: &str,
        flags: Flags,
        anchored: bool,
    ) -> Result<Arc<CompiledPattern>> {
        let key = CacheKey {
            pattern: pattern.to_string(),
            flags,
            anchored,
        };

        if let Some(compiled) = self.entries.get(&key) {
            trace!(pattern, "pattern cache hit");
            return Ok(Arc::clone(compiled));
        }

        trace!(pattern, "pattern cache miss");
        let compiled = Arc::new(CompiledPattern::compile(registry, pattern, flags, anchored)?);
        self.entries.put(key, Arc::clone(&compiled));
        Ok(compiled)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }
}

impl Default for PatternCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
