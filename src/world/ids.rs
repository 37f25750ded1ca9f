//! Entity id allocation
//!
//! Ids are handed out by an injected allocator instead of a process-wide
//! counter, so every store (and every test) owns its own sequence.

use super::EntityId;

/// Source of fresh entity ids
pub trait IdAllocator {
    /// Next unused id. Never returns 0.
    fn next_id(&mut self) -> EntityId;

    /// Record that `id` is already in use so it is never handed out again
    fn observe(&mut self, id: EntityId);
}

/// Monotonic allocator: 1, 2, 3, ...
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    last: u32,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocator whose first id is `last + 1`
    pub fn starting_after(last: u32) -> Self {
        Self { last }
    }

    /// Most recently allocated (or observed) id
    pub fn last(&self) -> u32 {
        self.last
    }
}

impl IdAllocator for SequentialIds {
    fn next_id(&mut self) -> EntityId {
        self.last = self.last.saturating_add(1);
        EntityId(self.last)
    }

    fn observe(&mut self, id: EntityId) {
        self.last = self.last.max(id.0);
    }
}
