//! Paygate checkout API server library.
//!
//! The binary in `main.rs` wires configuration, tracing and Sentry around
//! [`routes::router`]; everything else lives here so it can be tested and
//! reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod stripe;

#[cfg(test)]
mod testing;

pub use config::ServerConfig;
pub use error::AppError;
pub use state::AppState;
