//! # Client Module
//!
//! Outbound-call lifetime management.
//!
//! This component is independent of schema validation: it owns the shutdown
//! story for outbound calls made through a pluggable [`Transport`]. Every call
//! runs under its own [`CancelToken`] derived from the caller's context, and
//! [`ClosingClient::close`] implements a bounded shutdown protocol — refuse
//! new calls, cancel in-flight ones, release idle connections, wait for the
//! in-flight count to reach zero, then tear the transport down.

mod cancel;
mod closing;

pub use cancel::CancelToken;
pub use closing::{ClientError, ClosingClient, OutboundRequest, OutboundResponse, Transport};
