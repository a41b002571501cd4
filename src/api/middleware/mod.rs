//! Middleware applied to every request handled by the edge router.

pub mod tracing;
