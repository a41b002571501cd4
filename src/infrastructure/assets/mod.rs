//! Static asset lookup for page requests.
//!
//! Provides an [`AssetStore`] trait with two implementations:
//! - [`DirAssetStore`] - Built single-page app served from a directory
//! - [`MemoryAssetStore`] - In-memory assets for tests and embedded shells

mod dir_store;
mod memory_store;
mod store;

pub use dir_store::DirAssetStore;
pub use memory_store::MemoryAssetStore;
pub use store::AssetStore;

#[cfg(test)]
pub use store::MockAssetStore;
