//! # Router Module
//!
//! The route/handler registration gate.
//!
//! [`bind_routes`] drives the classification engine once per registered route,
//! at startup, never per request: each route's request type is validated
//! against the route path (so every `:name` placeholder is provably bound) and
//! its response type is validated independently. Any failure is fatal before
//! a single route becomes servable, which amortizes all validation to a
//! one-time cost and leaves the resulting [`BoundRoute`] table immutable and
//! lock-free for the serving phase.

mod core;

pub use self::core::{bind_routes, BoundRoute, Route};
pub use crate::schema::path_placeholders;
