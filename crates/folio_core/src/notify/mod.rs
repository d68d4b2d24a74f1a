//! Change notification between the editor and independent content views.
//!
//! # Responsibility
//! - Fan out local writes to in-context readers through `ChangeBus`.
//! - Let each view re-read its slot on signal or on a fixed poll deadline.
//!
//! # Invariants
//! - Handlers are removed when their `Subscription` is dropped.
//! - A watcher reports a change only when the fresh value differs by value.

pub mod bus;
pub(crate) mod registry;
pub mod watcher;

pub use registry::Subscription;
