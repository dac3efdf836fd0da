//! # Error Module
//!
//! Structured errors for schema derivation and route registration.
//!
//! Every failure here is fatal at registration/generation time: the caller is
//! expected to abort startup (or the generation run) on the first error, before
//! any route becomes servable or any artifact is emitted. Request-serving
//! errors are a different concern and never pass through these types; a
//! handler's own error is propagated unchanged by
//! [`InvokeError::Handler`](crate::handler::InvokeError).
//!
//! [`SchemaError`] identifies the classification rule a field violated and the
//! offending field/type/placeholder. [`SchemaError::rule`] returns the stable
//! rule name, which is what tests and diagnostics key on.

use crate::schema::{Direction, FieldType};
use thiserror::Error;

/// A field-classification failure produced by
/// [`build_schema`](crate::schema::build_schema).
///
/// Each variant names the rule that was violated and carries enough context to
/// point at the offending field without re-running validation.
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    /// A field carries two or more distinct location annotations.
    #[error("field `{field}` carries conflicting location annotations ({keys}); a field maps to exactly one wire location")]
    AmbiguousFieldLocation {
        /// Offending field name
        field: String,
        /// The conflicting annotation keys, comma separated
        keys: String,
    },

    /// A second field claims the response status.
    #[error("field `{field}` claims the response status, already claimed by `{previous}`")]
    DuplicateStatusField { field: String, previous: String },

    /// `use_as_status` appeared on a request message.
    #[error("field `{field}`: use_as_status is only valid on response messages")]
    StatusOnlyOnResponse { field: String },

    /// The status field's declared type is not an exact integer kind.
    #[error("field `{field}`: use_as_status requires an integer type, got {ty}")]
    InvalidStatusType { field: String, ty: FieldType },

    /// A second field claims the explicit body.
    #[error("field `{field}` claims the message body, already claimed by `{previous}`")]
    DuplicateBodyField { field: String, previous: String },

    /// More than one body-encoding sub-annotation on the explicit body field.
    #[error("field `{field}` carries more than one body encoding annotation ({keys})")]
    AmbiguousBodyEncoding { field: String, keys: String },

    /// The explicit body field's declared type does not satisfy its encoding.
    #[error("field `{field}`: {encoding} body requires {expected}, got {ty}")]
    InvalidBodyType {
        field: String,
        encoding: &'static str,
        expected: &'static str,
        ty: FieldType,
    },

    /// `query` appeared on a response message.
    #[error("field `{field}`: query fields are only valid on request messages")]
    QueryOnlyOnRequest { field: String },

    /// A cookie field's declared type does not satisfy the direction-specific rule.
    #[error("field `{field}`: cookie fields on {direction} messages require {expected}, got {ty}")]
    InvalidCookieType {
        field: String,
        direction: Direction,
        expected: &'static str,
        ty: FieldType,
    },

    /// `url` appeared on a response message.
    #[error("field `{field}`: url fields are only valid on request messages")]
    PathParamOnlyOnRequest { field: String },

    /// A `url` field names a placeholder the route path does not contain.
    #[error("field `{field}`: route path `{path}` has no `:{placeholder}` placeholder")]
    UnboundPathParam {
        field: String,
        placeholder: String,
        path: String,
    },

    /// A route-path placeholder is not bound by exactly one request field.
    #[error("route path `{path}`: placeholder `:{placeholder}` {reason}")]
    UnboundPathPlaceholder {
        placeholder: String,
        path: String,
        reason: &'static str,
    },

    /// The explicit-body and aggregate-body strategies cannot coexist.
    #[error("field `{field}` {reason}")]
    ConflictingBodyRepresentation { field: String, reason: String },
}

impl SchemaError {
    /// Stable rule name for the violated classification rule.
    ///
    /// Diagnostics and tests match on this instead of the display string.
    #[must_use]
    pub fn rule(&self) -> &'static str {
        match self {
            SchemaError::AmbiguousFieldLocation { .. } => "AmbiguousFieldLocation",
            SchemaError::DuplicateStatusField { .. } => "DuplicateStatusField",
            SchemaError::StatusOnlyOnResponse { .. } => "StatusOnlyOnResponse",
            SchemaError::InvalidStatusType { .. } => "InvalidStatusType",
            SchemaError::DuplicateBodyField { .. } => "DuplicateBodyField",
            SchemaError::AmbiguousBodyEncoding { .. } => "AmbiguousBodyEncoding",
            SchemaError::InvalidBodyType { .. } => "InvalidBodyType",
            SchemaError::QueryOnlyOnRequest { .. } => "QueryOnlyOnRequest",
            SchemaError::InvalidCookieType { .. } => "InvalidCookieType",
            SchemaError::PathParamOnlyOnRequest { .. } => "PathParamOnlyOnRequest",
            SchemaError::UnboundPathParam { .. } => "UnboundPathParam",
            SchemaError::UnboundPathPlaceholder { .. } => "UnboundPathPlaceholder",
            SchemaError::ConflictingBodyRepresentation { .. } => "ConflictingBodyRepresentation",
        }
    }
}

/// A failure while resolving a handler or binding a route table.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The declared service type has no method of the requested name.
    #[error("method `{method}` not found on {service}")]
    MethodNotFound {
        /// Full path of the declared service type
        service: String,
        /// Requested method name
        method: String,
    },

    /// A route's request or response type failed schema derivation.
    ///
    /// An ill-shaped method signature surfaces here, at the registration gate,
    /// rather than as a resolver failure: the resolver hands the declared
    /// request/response types over untouched and the gate derives their
    /// schemas.
    #[error("invalid method signature for {handler} ({http_method} {path}): {direction} message `{type_name}`: {source}")]
    InvalidMethodSignature {
        /// Owning handler, as `path::Type::method`
        handler: String,
        /// HTTP method of the offending route
        http_method: http::Method,
        /// Path pattern of the offending route
        path: String,
        /// Which of the two messages failed
        direction: Direction,
        /// The failing message type
        type_name: String,
        /// The underlying classification failure
        #[source]
        source: SchemaError,
    },
}
