//! In-context publish/subscribe for content slot changes.

use super::registry::HandlerRegistry;
use super::Subscription;
use crate::repo::slots::ContentSlot;

/// Where a slot change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// Written through a repository in this context.
    Local,
    /// Signalled by the store on behalf of another context.
    External,
}

/// One slot changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentEvent {
    pub slot: ContentSlot,
    pub origin: ChangeOrigin,
}

/// Event bus owned by a `ContentRepository`.
#[derive(Clone)]
pub struct ChangeBus {
    handlers: HandlerRegistry<ContentEvent>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self {
            handlers: HandlerRegistry::new(),
        }
    }

    pub fn subscribe(&self, handler: impl Fn(&ContentEvent) + 'static) -> Subscription {
        self.handlers.subscribe(handler)
    }

    /// Returns the number of handlers notified.
    pub fn publish(&self, event: ContentEvent) -> usize {
        self.handlers.emit(&event)
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}
