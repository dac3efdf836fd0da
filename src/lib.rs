//! # wirebind
//!
//! **wirebind** derives HTTP wire-binding schemas from declarative message
//! descriptors and enforces them at service-registration time, so a
//! misdeclared message fails loudly at startup rather than corrupting traffic
//! at runtime.
//!
//! ## Overview
//!
//! A service describes each request and response message once, as a
//! [`MessageDescriptor`](schema::MessageDescriptor): a list of fields, each
//! carrying annotations that place it on the wire (JSON body member, query
//! parameter, header, cookie, URL path parameter, whole-body, status code).
//! [`schema::build_schema`] classifies every field into exactly one wire
//! location, rejecting ambiguous or direction-inappropriate declarations, and
//! the router's registration gate ([`router::bind_routes`]) runs that
//! derivation for every route before anything is served. Downstream consumers
//! (the transport layer, the OpenAPI generator) trust the derived
//! [`MessageSchema`](schema::MessageSchema) completely.
//!
//! ## Architecture
//!
//! - **[`schema`]** - Field descriptors, annotations and the schema-derivation
//!   engine
//! - **[`handler`]** - Late-bound service references, method tables and erased
//!   handler descriptors
//! - **[`router`]** - Route declarations and the registration gate
//! - **[`generator`]** - Consumers of the validated route table (OpenAPI
//!   document assembly, blacklist filtering)
//! - **[`client`]** - Outbound-call lifetime management with a bounded
//!   shutdown protocol
//! - **[`config`]** - Explicit client configuration with a validating
//!   constructor
//! - **[`error`]** - Schema and registration error taxonomies
//!
//! ## Quick Start
//!
//! ```no_run
//! use wirebind::schema::{build_schema, Direction, FieldSpec, FieldType, MessageDescriptor};
//!
//! let descriptor = MessageDescriptor::new("EchoRequest")
//!     .field(FieldSpec::new("user", FieldType::String).url("user"))
//!     .field(FieldSpec::new("text", FieldType::String).json("text"));
//!
//! let schema = build_schema(&descriptor, Direction::Request, "/echo/:user")
//!     .expect("EchoRequest binds cleanly");
//! assert_eq!(schema.path_params().count(), 1);
//! ```
//!
//! Handlers are resolved by name against a [`ServiceRef`](handler::ServiceRef)
//! that may still be empty at registration time; the concrete service instance
//! is installed later, and calls made before that fail with
//! [`InvokeError::ServiceUnavailable`](handler::InvokeError::ServiceUnavailable).

pub mod client;
pub mod config;
pub mod error;
pub mod generator;
pub mod handler;
pub mod router;
pub mod schema;

pub use config::Config;
pub use error::{RegistrationError, SchemaError};
pub use schema::{
    build_schema, ApiMessage, Direction, FieldSpec, FieldType, MessageDescriptor, MessageSchema,
};
