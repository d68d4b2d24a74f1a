//! Typed content access over key-value storage.
//!
//! # Responsibility
//! - Map each content collection to its durable slot.
//! - Own default seeding and corruption recovery.
//!
//! # Invariants
//! - Loads never fail; absent or corrupt slots yield (and persist) defaults.
//! - Saves replace whole slot values; there is no partial update.

pub mod content_repo;
pub mod slots;
