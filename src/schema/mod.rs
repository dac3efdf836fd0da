//! # Schema Module
//!
//! Field classification and validation: the part of the crate where every
//! invariant about a service's wire contract is enforced.
//!
//! ## Overview
//!
//! A message type declares its fields through a [`MessageDescriptor`] (usually
//! via the [`ApiMessage`] trait). Each field carries a declared [`FieldType`]
//! and a set of [`Annotation`]s; [`build_schema`] classifies every field into
//! exactly one [`LocationKind`] and rejects any declaration that could corrupt
//! a running service: two fields claiming the response status, a path
//! parameter never bound to the route pattern, a body field whose type cannot
//! be encoded as chosen.
//!
//! ## Annotation vocabulary
//!
//! | Annotation | Location | Direction | Type constraint |
//! |---|---|---|---|
//! | none / `json` | aggregate body | both | any serializable |
//! | `query` | query string | request | scalar |
//! | `header` | header | both | scalar |
//! | `cookie` | cookie | both | request: string; response: cookie descriptor |
//! | `url` | path placeholder | request | must match a `:name` segment |
//! | `use_as_status` | status code | response | exact integer |
//! | `use_as_body` | whole body | both | per `is_protobuf`/`is_raw`/`is_stream` |
//!
//! Validation runs once per route/type pair at startup; the resulting
//! [`MessageSchema`] is immutable and read lock-free by every consumer
//! afterwards.

mod build;
mod types;

pub use build::{build_schema, path_placeholders};
pub use types::{
    Annotation, ApiMessage, Applicability, BodyEncoding, Direction, FieldBinding, FieldSpec,
    FieldType, LocationKind, MessageDescriptor, MessageSchema,
};
