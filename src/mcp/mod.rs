//! Tool discovery filtering for agents.
//!
//! A tool server (local or remote) lists namespaced tools; each agent only
//! sees the ones its domain patterns admit.

pub mod filters;

pub use filters::{
    is_admitted, namespace_of, DomainPattern, DomainPatternSet, DomainToolFilter, ToolFilter,
};
