//! Scope-level policy and persistence.

pub mod service;

pub use service::ScopeService;
