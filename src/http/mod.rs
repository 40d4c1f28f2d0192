//! HTTP connection core.
//!
//! A [`connection::Connection`] owns one client socket and drives it through
//! exactly one exchange: read, parse, call the application, respond, close.
//! There is no keep-alive; every exchange ends with the socket closed.
//!
//! # Architecture
//!
//! - **`connection`**: read pump, state machine and teardown
//! - **`parser`**: parses a request out of the bytes received so far
//! - **`request`**: request side of an exchange, builds the [`env::Env`]
//! - **`response`**: response side of an exchange, head serialization
//! - **`content_length`**: decides whether to synthesize `Content-Length`
//! - **`writer`**: output buffer with threshold-triggered flushing
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │ Initialized │
//!        └──────┬──────┘
//!               │ start(): attach read interest
//!               ▼
//!        ┌──────────────┐  partial request
//!        │ AwaitingData │ ◄──────────────┐
//!        └──────┬───────┴────────────────┘
//!               │ request complete
//!               ▼
//!        ┌─────────────────┐
//!        │ RequestComplete │
//!        └──────┬──────────┘
//!               │ call application
//!               ▼
//!        ┌────────────┐
//!        │ Processing │
//!        └──────┬─────┘
//!               │ (status, headers, body)
//!               ▼
//!        ┌────────────┐
//!        │ Responding │ ← chunks appended to the output buffer
//!        └──────┬─────┘
//!               │ final flush
//!               ▼
//!        ┌───────────────────┐
//!        │ ClosingAfterWrite │
//!        └──────┬────────────┘
//!               ▼
//!        ┌────────┐
//!        │ Closed │ ← also reached directly from any failure
//!        └────────┘
//! ```

pub mod body;
pub mod connection;
pub mod content_length;
pub mod env;
pub mod error;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
