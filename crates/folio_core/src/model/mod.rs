//! Typed content model for the portfolio store.
//!
//! # Responsibility
//! - Define the canonical shapes of every durable content slot.
//! - Keep serialized field names compatible with the stored JSON format.
//!
//! # Invariants
//! - Every collection entry is identified by a unique `EntryId`.
//! - Entries are never mutated in place; collections are replaced whole.

pub mod entry;
pub mod id;
pub mod seed;
