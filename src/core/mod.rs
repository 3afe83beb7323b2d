//! Core runtime components.
//!
//! Holds the provider traits the agent framework plugs into, currently the
//! operator input path.

pub mod providers;
