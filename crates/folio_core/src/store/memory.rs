//! In-memory key-value backend shared between contexts.
//!
//! # Responsibility
//! - Model browser storage: one backing map per origin, many contexts.
//! - Queue change signals for every context other than the writer.
//!
//! # Invariants
//! - Signals are queued only when a value actually changes.
//! - Dropping a context discards its pending signals.

use super::{entry_bytes, KeyValueStore, StorageError, StoreResult, Subscription};
use super::DEFAULT_QUOTA_BYTES;
use crate::notify::registry::HandlerRegistry;
use log::debug;
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

struct Backing {
    slots: BTreeMap<String, String>,
    available: bool,
    quota_bytes: usize,
    next_context: u64,
    pending: BTreeMap<u64, VecDeque<String>>,
}

impl Backing {
    fn used_bytes(&self) -> usize {
        self.slots
            .iter()
            .map(|(key, value)| entry_bytes(key, value))
            .sum()
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.slots
            .iter()
            .filter(|(stored_key, _)| stored_key.as_str() != key)
            .map(|(stored_key, value)| entry_bytes(stored_key, value))
            .sum()
    }

    fn signal_others(&mut self, writer: u64, key: &str) {
        for (context, queue) in self.pending.iter_mut() {
            if *context != writer {
                queue.push_back(key.to_string());
            }
        }
    }
}

/// One context's handle on a shared in-memory backing.
pub struct MemoryKvStore {
    backing: Rc<RefCell<Backing>>,
    context: u64,
    external: HandlerRegistry<str>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::with_quota(DEFAULT_QUOTA_BYTES)
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        let mut pending = BTreeMap::new();
        pending.insert(0, VecDeque::new());
        Self {
            backing: Rc::new(RefCell::new(Backing {
                slots: BTreeMap::new(),
                available: true,
                quota_bytes,
                next_context: 1,
                pending,
            })),
            context: 0,
            external: HandlerRegistry::new(),
        }
    }

    /// Opens another context (another tab) on the same backing.
    pub fn open_context(&self) -> Self {
        let context = {
            let mut backing = self.backing.borrow_mut();
            let context = backing.next_context;
            backing.next_context += 1;
            backing.pending.insert(context, VecDeque::new());
            context
        };
        Self {
            backing: Rc::clone(&self.backing),
            context,
            external: HandlerRegistry::new(),
        }
    }

    /// Enables or disables storage for every context of this backing.
    pub fn set_available(&self, available: bool) {
        self.backing.borrow_mut().available = available;
    }

    pub fn used_bytes(&self) -> usize {
        self.backing.borrow().used_bytes()
    }
}

impl Default for MemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MemoryKvStore {
    fn drop(&mut self) {
        self.backing.borrow_mut().pending.remove(&self.context);
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Option<String> {
        let backing = self.backing.borrow();
        if !backing.available {
            return None;
        }
        backing.slots.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut backing = self.backing.borrow_mut();
        if !backing.available {
            return Err(StorageError::Unavailable);
        }

        let bytes = backing.used_bytes_without(key) + entry_bytes(key, value);
        if bytes > backing.quota_bytes {
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
                bytes,
                quota: backing.quota_bytes,
            });
        }

        let previous = backing.slots.insert(key.to_string(), value.to_string());
        if previous.as_deref() != Some(value) {
            backing.signal_others(self.context, key);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut backing = self.backing.borrow_mut();
        if !backing.available {
            return Err(StorageError::Unavailable);
        }
        if backing.slots.remove(key).is_some() {
            backing.signal_others(self.context, key);
        }
        Ok(())
    }

    fn subscribe_external(&self, handler: Box<dyn Fn(&str)>) -> Subscription {
        self.external.subscribe(handler)
    }

    fn dispatch_external_changes(&self) -> usize {
        let keys: Vec<String> = {
            let mut backing = self.backing.borrow_mut();
            match backing.pending.get_mut(&self.context) {
                Some(queue) => queue.drain(..).collect(),
                None => Vec::new(),
            }
        };
        for key in &keys {
            debug!(
                "event=external_change module=store status=ok backend=memory context={} key={}",
                self.context, key
            );
            self.external.emit(key.as_str());
        }
        keys.len()
    }
}
