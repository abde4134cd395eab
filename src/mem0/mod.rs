//! Mem0 platform API access.
//!
//! - [`store`] - the [`MemoryStore`] trait and its structured error
//! - [`client`] - the `reqwest` implementation
//! - [`cache`] - per-api-key client cache

pub mod cache;
pub mod client;
pub mod store;

pub use cache::{ClientCache, StoreFactory};
pub use client::Mem0Client;
pub use store::{Mem0Error, MemoryStore, StoreResult};
