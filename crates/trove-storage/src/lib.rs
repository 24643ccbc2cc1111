//! # trove-storage
//!
//! Resolves where a file version's bytes can be fetched from. Trove never
//! moves bytes itself; the storage worker does, and this crate builds the
//! endpoints and hook answers that point at it.

pub mod resolver;
pub mod worker;

pub use resolver::{HookLocation, StorageLocationResolver};
pub use worker::WorkerLocationResolver;
