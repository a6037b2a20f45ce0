//! API server module exposing the recommendation pipeline over REST

pub mod csrf;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod session;
pub mod types;

pub use server::build_router;
pub use server::serve_api;
