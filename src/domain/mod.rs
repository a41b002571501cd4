//! Domain layer containing the edge router's request classification rules.
//!
//! Everything here is pure: no I/O, no HTTP client, no asset store. Handlers in
//! [`crate::api::handlers`] call into these rules and act on the outcome.
//!
//! # Request Flow
//!
//! 1. [`route::RouteKind::classify`] decides between the API proxy and the static resolver
//! 2. API requests are rewritten with [`route::upstream_path`]
//! 3. Static misses consult [`route::is_client_route`] before trying the SPA shell

pub mod route;
