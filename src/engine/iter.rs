use super::Engine;
use crate::compile::CompiledPattern;
use crate::dispatch::PatternMatch;
use std::sync::Arc;

/// Lazy, dispatching iterator over successive non-overlapping matches.
///
/// Created by [`Engine::find_iter`]. Each call to `next` runs one engine
/// search starting where the previous match ended and dispatches the result
/// before returning it.
pub struct MatchIter<'e, 'h> {
    engine: &'e mut Engine,
    compiled: Arc<CompiledPattern>,
    haystack: &'h str,
    pos: usize,
    last_end: Option<usize>,
}

impl<'e, 'h> MatchIter<'e, 'h> {
    pub(crate) fn new(
        engine: &'e mut Engine,
        compiled: Arc<CompiledPattern>,
        haystack: &'h str,
    ) -> Self {
        Self {
            engine,
            compiled,
            haystack,
            pos: 0,
            last_end: None,
        }
    }

    pub fn pattern(&self) -> &CompiledPattern {
        &self.compiled
    }
}

impl Iterator for MatchIter<'_, '_> {
    type Item = PatternMatch;

    fn next(&mut self) -> Option<PatternMatch> {
        loop {
            if self.pos > self.haystack.len() {
                return None;
            }
            let caps = self.compiled.regex().captures_at(self.haystack, self.pos)?;
            let whole = caps.get_match();

            // An empty match right where the previous match ended would
            // overlap it; step one character forward and retry.
            if whole.is_empty() && Some(whole.end()) == self.last_end {
                self.pos = next_char_boundary(self.haystack, self.pos);
                continue;
            }

            self.pos = whole.end();
            self.last_end = Some(whole.end());
            return Some(self.engine.dispatch(&self.compiled, &caps));
        }
    }
}

/// Byte offset just past the character at `pos`; one past the end when
/// `pos` is already at the end.
fn next_char_boundary(haystack: &str, pos: usize) -> usize {
    haystack[pos..]
        .chars()
        .next()
        .map_or(haystack.len() + 1, |c| pos + c.len_utf8())
}
