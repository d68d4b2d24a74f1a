//! Entry identifier generation.
//!
//! # Invariants
//! - Generated ids are strictly increasing for one generator.
//! - Generated ids are greater than every id the generator has observed.

use super::entry::EntryId;
use std::time::{SystemTime, UNIX_EPOCH};

/// Millisecond-clock id source that never repeats.
///
/// Two creations within the same millisecond get consecutive ids instead of
/// colliding.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    last: EntryId,
    clock: fn() -> EntryId,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::with_clock(now_epoch_ms)
    }

    /// Uses a caller-provided clock; tests pin it to force same-millisecond adds.
    pub fn with_clock(clock: fn() -> EntryId) -> Self {
        Self { last: 0, clock }
    }

    /// Raises the floor above ids already present in stored collections.
    pub fn observe(&mut self, existing: impl IntoIterator<Item = EntryId>) {
        if let Some(max) = existing.into_iter().max() {
            self.last = self.last.max(max);
        }
    }

    pub fn next_id(&mut self) -> EntryId {
        let id = (self.clock)().max(self.last.saturating_add(1));
        self.last = id;
        id
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn now_epoch_ms() -> EntryId {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| EntryId::try_from(elapsed.as_millis()).unwrap_or(EntryId::MAX))
        .unwrap_or(0)
}
