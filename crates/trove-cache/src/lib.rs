//! # trove-cache
//!
//! Cache providers for Trove and the render cache gateway built on them.
//!
//! - **memory**: in-process cache using [moka](https://crates.io/crates/moka)
//!
//! The provider is selected at runtime from `cache.provider`.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
pub mod render;

pub use provider::CacheManager;
pub use render::CachedRenderGateway;
