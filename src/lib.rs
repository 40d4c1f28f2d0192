//! Tideway - event-driven HTTP connection core
//!
//! Per-connection lifecycle for a non-blocking HTTP server: one socket, one
//! exchange, buffered output, guaranteed teardown.

pub mod app;
pub mod config;
pub mod http;
pub mod reactor;
pub mod server;
pub mod transport;
