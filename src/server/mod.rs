//! TCP front end: accepts sockets and feeds readiness to connections.

pub mod listener;
