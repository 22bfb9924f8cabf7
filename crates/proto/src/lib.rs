//! Shared wire types for the quill publish/subscribe protocol.
//!
//! This crate defines the payloads exchanged between wiki views and the
//! remote article source: subscription stream messages, the conditional
//! write request, and its acknowledgement. Payloads are JSON on the wire;
//! timestamps travel as epoch milliseconds.

#![warn(missing_docs)]

pub mod types;

pub use types::*;
