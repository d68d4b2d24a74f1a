//! Read-only helpers for content sections.
//!
//! Views treat loaded collections as immutable data for a render pass.

pub mod filter;
