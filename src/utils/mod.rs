//! Utility functions for working with A2A types.
//!
//! Helpers for building messages, reading parts and recognizing approval
//! requests.

pub mod message;
pub mod parts;

pub use message::*;
pub use parts::*;
