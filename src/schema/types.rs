use std::fmt;

/// Which of the two messages of a method a schema describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Request,
    Response,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Request => write!(f, "request"),
            Direction::Response => write!(f, "response"),
        }
    }
}

/// Where a field's value is carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    /// Unannotated (or `json`-annotated) fields, combined into one structured body
    AggregateBody,
    /// A single field designated as the entire body
    ExplicitBody,
    /// Query-string parameter (requests only)
    Query,
    /// HTTP header (both directions)
    Header,
    /// Cookie (request: value; response: full cookie descriptor)
    Cookie,
    /// Named `:placeholder` segment of the route path (requests only)
    PathParam,
    /// HTTP response status code (responses only)
    Status,
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LocationKind::AggregateBody => "aggregate body",
            LocationKind::ExplicitBody => "body",
            LocationKind::Query => "query",
            LocationKind::Header => "header",
            LocationKind::Cookie => "cookie",
            LocationKind::PathParam => "path",
            LocationKind::Status => "status",
        };
        write!(f, "{}", s)
    }
}

/// How a body is serialized on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    /// Structured JSON (the default, and the only aggregate-body encoding)
    Json,
    /// A protocol-buffer message
    Protobuf,
    /// Raw bytes, written as-is
    Raw,
    /// A streaming payload, copied through without buffering
    Stream,
}

impl fmt::Display for BodyEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BodyEncoding::Json => "json",
            BodyEncoding::Protobuf => "protobuf",
            BodyEncoding::Raw => "raw",
            BodyEncoding::Stream => "stream",
        };
        write!(f, "{}", s)
    }
}

/// Declared semantic type of a message field.
///
/// This is the structural shape the classification engine checks constraints
/// against; it never carries a value. Indirection is explicit ([`Ptr`]) so the
/// engine can require a pointer where one is mandatory (protobuf bodies) and
/// reject one where it is not (stream bodies, status fields).
///
/// [`Ptr`]: FieldType::Ptr
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    /// Signed integer of any width
    Int,
    /// Unsigned integer of any width
    Uint,
    Float,
    String,
    /// An exact byte sequence (`Vec<u8>`)
    Bytes,
    /// A streaming-reader capability, held by value
    ByteStream,
    /// A concrete protocol-buffer message type, by name
    Message(String),
    /// A polymorphic protobuf-message-capable value
    AnyMessage,
    /// A cookie descriptor carrying name, value and attributes
    Cookie,
    /// Any other body-serializable composite, by name
    Struct(String),
    /// Explicit indirection to the inner type
    Ptr(Box<FieldType>),
}

impl FieldType {
    /// Shorthand for [`FieldType::Ptr`].
    #[must_use]
    pub fn ptr(inner: FieldType) -> FieldType {
        FieldType::Ptr(Box::new(inner))
    }

    /// Shorthand for a named [`FieldType::Message`].
    #[must_use]
    pub fn message(name: impl Into<String>) -> FieldType {
        FieldType::Message(name.into())
    }

    /// Shorthand for a named [`FieldType::Struct`].
    #[must_use]
    pub fn structure(name: impl Into<String>) -> FieldType {
        FieldType::Struct(name.into())
    }

    /// True for exact integer kinds, the only types a status field may have.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(self, FieldType::Int | FieldType::Uint)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Bool => write!(f, "bool"),
            FieldType::Int => write!(f, "i64"),
            FieldType::Uint => write!(f, "u64"),
            FieldType::Float => write!(f, "f64"),
            FieldType::String => write!(f, "String"),
            FieldType::Bytes => write!(f, "Vec<u8>"),
            FieldType::ByteStream => write!(f, "ByteStream"),
            FieldType::Message(name) => write!(f, "{}", name),
            FieldType::AnyMessage => write!(f, "dyn Message"),
            FieldType::Cookie => write!(f, "Cookie"),
            FieldType::Struct(name) => write!(f, "{}", name),
            FieldType::Ptr(inner) => write!(f, "&{}", inner),
        }
    }
}

/// One recognized per-field annotation.
///
/// The location keys (`json`, `query`, `header`, `cookie`, `url`,
/// `use_as_body`, `use_as_status`) are mutually exclusive on a field; the
/// encoding keys (`is_protobuf`, `is_raw`, `is_stream`) refine `use_as_body`
/// and are mutually exclusive among themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// Aggregate-body member with an explicit wire name
    Json(String),
    /// Query-string parameter of the given name
    Query(String),
    /// HTTP header of the given name
    Header(String),
    /// Cookie of the given name
    Cookie(String),
    /// Route-path placeholder of the given name
    Url(String),
    /// The field is the entire body
    UseAsBody,
    /// The field carries the response status code
    UseAsStatus,
    /// `use_as_body` refinement: protobuf encoding
    Protobuf,
    /// `use_as_body` refinement: raw bytes
    Raw,
    /// `use_as_body` refinement: streaming payload
    Stream,
}

impl Annotation {
    /// The annotation key as written in a declaration.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Annotation::Json(_) => "json",
            Annotation::Query(_) => "query",
            Annotation::Header(_) => "header",
            Annotation::Cookie(_) => "cookie",
            Annotation::Url(_) => "url",
            Annotation::UseAsBody => "use_as_body",
            Annotation::UseAsStatus => "use_as_status",
            Annotation::Protobuf => "is_protobuf",
            Annotation::Raw => "is_raw",
            Annotation::Stream => "is_stream",
        }
    }

    /// Whether this key selects a wire location (as opposed to refining one).
    ///
    /// `json` participates: a field annotated both `json` and `query` is
    /// ambiguous, not a query field that also serializes to the body.
    #[must_use]
    pub fn is_location(&self) -> bool {
        !matches!(
            self,
            Annotation::Protobuf | Annotation::Raw | Annotation::Stream
        )
    }
}

/// Declarative description of one message field: name, declared type and the
/// annotations present on it.
///
/// Built with the fluent methods below; this is the explicit registration
/// surface standing in for field-level attribute reflection.
///
/// ```
/// use wirebind::schema::{FieldSpec, FieldType};
///
/// let field = FieldSpec::new("user", FieldType::String).url("user");
/// ```
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub ty: FieldType,
    pub annotations: Vec<Annotation>,
}

impl FieldSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        FieldSpec {
            name: name.into(),
            ty,
            annotations: Vec::new(),
        }
    }

    fn with(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Aggregate-body member serialized under `wire_name`.
    #[must_use]
    pub fn json(self, wire_name: impl Into<String>) -> Self {
        self.with(Annotation::Json(wire_name.into()))
    }

    /// Query-string parameter.
    #[must_use]
    pub fn query(self, wire_name: impl Into<String>) -> Self {
        self.with(Annotation::Query(wire_name.into()))
    }

    /// HTTP header.
    #[must_use]
    pub fn header(self, wire_name: impl Into<String>) -> Self {
        self.with(Annotation::Header(wire_name.into()))
    }

    /// Cookie.
    #[must_use]
    pub fn cookie(self, wire_name: impl Into<String>) -> Self {
        self.with(Annotation::Cookie(wire_name.into()))
    }

    /// Route-path placeholder binding.
    #[must_use]
    pub fn url(self, placeholder: impl Into<String>) -> Self {
        self.with(Annotation::Url(placeholder.into()))
    }

    /// The field is the entire body.
    #[must_use]
    pub fn use_as_body(self) -> Self {
        self.with(Annotation::UseAsBody)
    }

    /// The field carries the response status code.
    #[must_use]
    pub fn use_as_status(self) -> Self {
        self.with(Annotation::UseAsStatus)
    }

    /// Refine the body encoding to protobuf.
    #[must_use]
    pub fn protobuf(self) -> Self {
        self.with(Annotation::Protobuf)
    }

    /// Refine the body encoding to raw bytes.
    #[must_use]
    pub fn raw(self) -> Self {
        self.with(Annotation::Raw)
    }

    /// Refine the body encoding to a streaming payload.
    #[must_use]
    pub fn stream(self) -> Self {
        self.with(Annotation::Stream)
    }
}

/// The ordered field list of one message type, as declared.
#[derive(Debug, Clone)]
pub struct MessageDescriptor {
    pub type_name: String,
    pub fields: Vec<FieldSpec>,
}

impl MessageDescriptor {
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        MessageDescriptor {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field declaration. Order is preserved through validation.
    #[must_use]
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }
}

/// Ties a Rust message type to its declared field descriptor.
///
/// Request and response types of every exposed service method implement this;
/// the registration gate pulls the descriptors through the resolved handler
/// and derives their schemas at startup.
pub trait ApiMessage {
    fn descriptor() -> MessageDescriptor;
}

/// Which directions a classified field applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applicability {
    RequestOnly,
    ResponseOnly,
    Both,
}

/// One validated field of a message schema.
#[derive(Debug, Clone)]
pub struct FieldBinding {
    /// Declared field name
    pub name: String,
    /// Name on the wire (query/header/cookie name, JSON key or placeholder)
    pub wire_name: String,
    /// Declared semantic type
    pub ty: FieldType,
    /// Resolved wire location
    pub location: LocationKind,
    /// Body encoding; present exactly for [`LocationKind::ExplicitBody`]
    pub encoding: Option<BodyEncoding>,
}

impl FieldBinding {
    /// Directions this binding is valid for, derived from its location.
    #[must_use]
    pub fn applicability(&self) -> Applicability {
        match self.location {
            LocationKind::Query | LocationKind::PathParam => Applicability::RequestOnly,
            LocationKind::Status => Applicability::ResponseOnly,
            _ => Applicability::Both,
        }
    }
}

/// The validated wire schema of one message type in one direction.
///
/// Immutable once built; a successful schema upholds every structural
/// invariant (at most one explicit body, at most one status field, explicit
/// and aggregate body mutually exclusive, every path placeholder bound), so
/// consumers read it without re-checking.
#[derive(Debug, Clone)]
pub struct MessageSchema {
    type_name: String,
    direction: Direction,
    fields: Vec<FieldBinding>,
    explicit_body: Option<usize>,
    status: Option<usize>,
    path_params: Vec<usize>,
}

impl MessageSchema {
    pub(crate) fn new(
        type_name: String,
        direction: Direction,
        fields: Vec<FieldBinding>,
    ) -> Self {
        let mut explicit_body = None;
        let mut status = None;
        let mut path_params = Vec::new();
        for (idx, field) in fields.iter().enumerate() {
            match field.location {
                LocationKind::ExplicitBody => explicit_body = Some(idx),
                LocationKind::Status => status = Some(idx),
                LocationKind::PathParam => path_params.push(idx),
                _ => {}
            }
        }
        MessageSchema {
            type_name,
            direction,
            fields,
            explicit_body,
            status,
            path_params,
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// All bindings, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldBinding] {
        &self.fields
    }

    /// The single explicit-body field, if one was designated.
    #[must_use]
    pub fn explicit_body(&self) -> Option<&FieldBinding> {
        self.explicit_body.map(|i| &self.fields[i])
    }

    /// The single status field, if one was designated (responses only).
    #[must_use]
    pub fn status_field(&self) -> Option<&FieldBinding> {
        self.status.map(|i| &self.fields[i])
    }

    /// Fields bound to route-path placeholders (requests only).
    pub fn path_params(&self) -> impl Iterator<Item = &FieldBinding> {
        self.path_params.iter().map(|&i| &self.fields[i])
    }

    /// Whether any field joined the aggregate body.
    #[must_use]
    pub fn has_aggregate_body(&self) -> bool {
        self.fields
            .iter()
            .any(|f| f.location == LocationKind::AggregateBody)
    }

    /// Fields that joined the aggregate body, in declaration order.
    pub fn aggregate_fields(&self) -> impl Iterator<Item = &FieldBinding> {
        self.fields
            .iter()
            .filter(|f| f.location == LocationKind::AggregateBody)
    }

    /// How the body of this message is encoded.
    ///
    /// An explicit body reports its resolved encoding; everything else is the
    /// aggregated JSON body (possibly empty).
    #[must_use]
    pub fn body_encoding(&self) -> BodyEncoding {
        self.explicit_body()
            .and_then(|f| f.encoding)
            .unwrap_or(BodyEncoding::Json)
    }

    /// Look up a binding by declared field name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldBinding> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_spec_builder_preserves_annotation_order() {
        let f = FieldSpec::new("payload", FieldType::Bytes).use_as_body().raw();
        assert_eq!(f.annotations[0], Annotation::UseAsBody);
        assert_eq!(f.annotations[1], Annotation::Raw);
    }

    #[test]
    fn encoding_keys_are_not_locations() {
        assert!(Annotation::Json("x".into()).is_location());
        assert!(Annotation::UseAsStatus.is_location());
        assert!(!Annotation::Protobuf.is_location());
        assert!(!Annotation::Raw.is_location());
        assert!(!Annotation::Stream.is_location());
    }

    #[test]
    fn field_type_display_shows_indirection() {
        let ty = FieldType::ptr(FieldType::message("Timestamp"));
        assert_eq!(ty.to_string(), "&Timestamp");
    }
}
