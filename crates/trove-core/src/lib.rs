//! # trove-core
//!
//! Core crate for Trove. Contains the unified error system, typed
//! identifiers, revision paging primitives, configuration schemas and the
//! traits implemented by the cache and render collaborators.
//!
//! This crate has **no** internal dependencies on other Trove crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
