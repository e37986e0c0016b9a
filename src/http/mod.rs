//! HTTP transport layer.
//!
//! The orchestrator talks to the console API and the auction engine only
//! through the [`client::Transport`] trait, so tests can substitute a
//! scripted transport for the real `reqwest` client.

pub mod client;

pub use client::{ApiRequest, ApiResponse, HttpConfig, HttpTransport, Method, Transport, TransportError};
