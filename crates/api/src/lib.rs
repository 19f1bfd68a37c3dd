//! HRFlow API server library.
//!
//! Exposes the building blocks (config, state, error handling, engines,
//! routes) so integration tests and the binary entrypoint share them.

pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod multipart;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
