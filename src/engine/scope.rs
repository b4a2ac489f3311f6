use super::Engine;
use crate::buffer::BufferEntry;
use std::ops::{Deref, DerefMut};

/// RAII activation of a named buffer.
///
/// While the scope lives, its buffer receives dispatch output from every
/// operation run through it. Dropping the scope pops the activation, so the
/// previously active buffer (or none) is restored on normal exit, early
/// return, `?` propagation and unwinding alike.
///
/// ```
/// use rex::Engine;
///
/// let mut engine = Engine::new();
/// engine.register("digit", r"\d+").unwrap();
///
/// {
///     let mut outer = engine.buffer_scope("outer");
///     outer.search("[[:digit:]]", "1").unwrap();
///     {
///         let mut inner = outer.buffer_scope("inner");
///         inner.search("[[:digit:]]", "2").unwrap();
///     }
///     outer.search("[[:digit:]]", "3").unwrap();
/// }
///
/// assert_eq!(engine.buffer("outer").len(), 2);
/// assert_eq!(engine.buffer("inner").len(), 1);
/// assert_eq!(engine.active_buffer(), None);
/// ```
pub struct BufferScope<'e> {
    engine: &'e mut Engine,
    name: String,
}

impl<'e> BufferScope<'e> {
    pub(crate) fn enter(engine: &'e mut Engine, name: &str) -> Self {
        engine.buffers.push_active(name);
        Self {
            engine,
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entries recorded in this scope's buffer so far.
    pub fn entries(&self) -> &[BufferEntry] {
        self.engine.buffers.get(&self.name)
    }

    /// Append an entry by hand.
    pub fn record(&mut self, placeholder: &str, value: &str) {
        self.engine
            .buffers
            .append(&self.name, BufferEntry::new(placeholder, value));
    }
}

impl Deref for BufferScope<'_> {
    type Target = Engine;

    fn deref(&self) -> &Engine {
        &*self.engine
    }
}

impl DerefMut for BufferScope<'_> {
    fn deref_mut(&mut self) -> &mut Engine {
        &mut *self.engine
    }
}

impl Drop for BufferScope<'_> {
    fn drop(&mut self) {
        self.engine.buffers.pop_active();
    }
}
