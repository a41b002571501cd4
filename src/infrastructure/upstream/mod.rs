//! Outbound HTTP to the upstream API origin.
//!
//! The router never talks to `reqwest` directly; it goes through
//! [`UpstreamClient`], which owns the connection pool, the fixed outbound
//! headers and the timeout.

mod client;
mod error;

pub use client::UpstreamClient;
pub use error::ProxyError;
