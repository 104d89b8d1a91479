//! dingle-web library target.
//!
//! Exposes the router, state and server for the binary and for
//! integration tests.

pub mod config;
pub mod routes;
pub mod server;
pub mod state;

pub use config::HttpServerConfig;
pub use server::HttpServer;
pub use state::{AppState, TierLocks};
