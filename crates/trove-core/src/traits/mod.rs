//! Core traits defined in `trove-core` and implemented by other crates.

pub mod cache;
pub mod render;

pub use cache::CacheProvider;
pub use render::RenderCacheGateway;
