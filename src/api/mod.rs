//! API Module
//!
//! HTTP handlers and routing that expose the cache and the cached user lookup.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
