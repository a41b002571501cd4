//! Request handlers for the edge router.
//!
//! Every request enters through [`edge_handler`], which classifies it and hands
//! it to exactly one of [`proxy_handler`] or [`static_handler`].

pub mod edge;
pub mod proxy;
pub mod static_files;

pub use edge::edge_handler;
pub use proxy::proxy_handler;
pub use static_files::static_handler;
