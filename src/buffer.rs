//! Named capture logs.
//!
//! A [`BufferSet`] holds any number of named buffers plus a stack of
//! active names. Dispatch writes to the top of the stack only; pushing a
//! name makes it active and popping restores whichever buffer was active
//! before.

use std::collections::BTreeMap;

/// One dispatched capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferEntry {
    pub placeholder: String,
    pub value: String,
}

impl BufferEntry {
    pub fn new(placeholder: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct BufferSet {
    buffers: BTreeMap<String, Vec<BufferEntry>>,
    active: Vec<String>,
}

impl BufferSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `name`, emptying it if it already exists.
    pub fn create(&mut self, name: &str) {
        self.buffers.insert(name.to_string(), Vec::new());
    }

    /// Create `name` unless it already exists.
    pub fn ensure(&mut self, name: &str) {
        self.buffers.entry(name.to_string()).or_default();
    }

    /// Entries of `name`; empty when the buffer does not exist.
    pub fn get(&self, name: &str) -> &[BufferEntry] {
        self.buffers.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.buffers.contains_key(name)
    }

    /// Move the entries out of `name`, leaving it empty.
    pub fn take(&mut self, name: &str) -> Vec<BufferEntry> {
        self.buffers
            .get_mut(name)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    pub fn clear(&mut self, name: &str) {
        if let Some(entries) = self.buffers.get_mut(name) {
            entries.clear();
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<BufferEntry>> {
        self.buffers.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.buffers.keys().map(String::as_str)
    }

    /// Buffer currently receiving dispatch output.
    pub fn active(&self) -> Option<&str> {
        self.active.last().map(String::as_str)
    }

    /// Number of nested activations.
    pub fn depth(&self) -> usize {
        self.active.len()
    }

    pub fn push_active(&mut self, name: &str) {
        self.ensure(name);
        self.active.push(name.to_string());
    }

    pub fn pop_active(&mut self) -> Option<String> {
        self.active.pop()
    }

    /// Append to `name`, creating it if needed.
    pub fn append(&mut self, name: &str, entry: BufferEntry) {
        self.buffers.entry(name.to_string()).or_default().push(entry);
    }

    /// Append to the active buffer. Returns false when none is active.
    pub fn record(&mut self, entry: BufferEntry) -> bool {
        match self.active.last() {
            Some(name) => {
                self.buffers.entry(name.clone()).or_default().push(entry);
                true
            }
            None => false,
        }
    }
}
