//! Operator-facing use cases.
//!
//! # Responsibility
//! - Validate operator input before any write.
//! - Read-modify-write whole collections through `ContentRepository`.
//!
//! # Invariants
//! - A rejected operation leaves durable state untouched.
//! - Deletion always passes through a blocking confirmation.

pub mod editor;
pub mod gate;
pub mod image;
