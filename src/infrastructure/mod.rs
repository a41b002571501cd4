//! Infrastructure adapters used by the edge router.
//!
//! - [`assets`] - Static asset stores (directory on disk, in-memory)
//! - [`upstream`] - HTTP client for the upstream API origin

pub mod assets;
pub mod upstream;
