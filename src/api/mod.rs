//! HTTP layer of the edge router.
//!
//! # Modules
//!
//! - [`handlers`] - Request dispatch, API proxy and static resolver
//! - [`middleware`] - Request tracing

pub mod handlers;
pub mod middleware;
