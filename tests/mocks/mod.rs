//! Mock implementations for testing without network access.
//!
//! Provides a scripted transport that answers by HTTP method and URL suffix
//! and records every request it receives.

pub mod transport;

pub use transport::*;
