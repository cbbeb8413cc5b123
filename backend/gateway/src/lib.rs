//! modbot HTTP gateway
//!
//! Hosts the webhook router behind axum and exposes a health endpoint.

pub mod health_api;
pub mod server;

pub use server::{build_app, shutdown_signal, start_server, GatewayState};
