use super::types::{
    Annotation, BodyEncoding, Direction, FieldBinding, FieldSpec, FieldType, LocationKind,
    MessageDescriptor, MessageSchema,
};
use crate::error::SchemaError;
use tracing::debug;

/// Extract the named `:placeholder` segments of a route path, in order.
///
/// A placeholder is a whole path segment beginning with `:`; a bare `:` is not
/// one. Duplicates are preserved so the caller can detect them.
#[must_use]
pub fn path_placeholders(path: &str) -> Vec<&str> {
    path.split('/')
        .filter_map(|segment| segment.strip_prefix(':'))
        .filter(|name| !name.is_empty())
        .collect()
}

/// Classify every field of `descriptor` into exactly one wire location and
/// enforce all structural invariants.
///
/// `path` is the route's path pattern and is consulted only for
/// [`Direction::Request`]: every `url` field must name one of its placeholders
/// and every placeholder must be bound by exactly one `url` field. Response
/// schemas ignore the path entirely.
///
/// Classification is purely structural and deterministic; it runs once per
/// route/type pair at registration time and the resulting [`MessageSchema`]
/// is immutable and freely shareable.
///
/// # Errors
///
/// The first rule violation is returned as a [`SchemaError`] naming the
/// offending field; nothing is produced on failure.
pub fn build_schema(
    descriptor: &MessageDescriptor,
    direction: Direction,
    path: &str,
) -> Result<MessageSchema, SchemaError> {
    let mut fields: Vec<FieldBinding> = Vec::with_capacity(descriptor.fields.len());

    for spec in &descriptor.fields {
        let binding = classify_field(spec, direction, path, &fields)?;
        fields.push(binding);
    }

    // The two body strategies are mutually exclusive regardless of the order
    // the fields were declared in.
    if let Some(body) = fields.iter().find(|f| f.location == LocationKind::ExplicitBody) {
        if let Some(member) = fields.iter().find(|f| f.location == LocationKind::AggregateBody) {
            return Err(SchemaError::ConflictingBodyRepresentation {
                field: member.name.clone(),
                reason: format!(
                    "cannot join the aggregate body: field `{}` already provides the whole body",
                    body.name
                ),
            });
        }
    }

    if direction == Direction::Request {
        check_placeholders(path, &fields)?;
    }

    debug!(
        type_name = %descriptor.type_name,
        %direction,
        fields = fields.len(),
        "message schema derived"
    );

    Ok(MessageSchema::new(
        descriptor.type_name.clone(),
        direction,
        fields,
    ))
}

/// A location annotation with its encoding refinements stripped away; matching
/// on this instead of [`Annotation`] keeps classification exhaustive.
enum Placement<'a> {
    Json(&'a str),
    Query(&'a str),
    Header(&'a str),
    Cookie(&'a str),
    Url(&'a str),
    Body,
    Status,
}

impl Placement<'_> {
    fn key(&self) -> &'static str {
        match self {
            Placement::Json(_) => "json",
            Placement::Query(_) => "query",
            Placement::Header(_) => "header",
            Placement::Cookie(_) => "cookie",
            Placement::Url(_) => "url",
            Placement::Body => "use_as_body",
            Placement::Status => "use_as_status",
        }
    }
}

fn split_annotations(spec: &FieldSpec) -> (Vec<Placement<'_>>, Vec<&Annotation>) {
    let mut placements = Vec::new();
    let mut encodings = Vec::new();
    for annotation in &spec.annotations {
        match annotation {
            Annotation::Json(wire) => placements.push(Placement::Json(wire)),
            Annotation::Query(wire) => placements.push(Placement::Query(wire)),
            Annotation::Header(wire) => placements.push(Placement::Header(wire)),
            Annotation::Cookie(wire) => placements.push(Placement::Cookie(wire)),
            Annotation::Url(placeholder) => placements.push(Placement::Url(placeholder)),
            Annotation::UseAsBody => placements.push(Placement::Body),
            Annotation::UseAsStatus => placements.push(Placement::Status),
            Annotation::Protobuf | Annotation::Raw | Annotation::Stream => {
                encodings.push(annotation);
            }
        }
    }
    (placements, encodings)
}

fn classify_field(
    spec: &FieldSpec,
    direction: Direction,
    path: &str,
    classified: &[FieldBinding],
) -> Result<FieldBinding, SchemaError> {
    let (placements, encodings) = split_annotations(spec);
    if placements.len() > 1 {
        return Err(SchemaError::AmbiguousFieldLocation {
            field: spec.name.clone(),
            keys: join_keys(placements.iter().map(Placement::key)),
        });
    }

    let primary = placements.first();

    // Encoding refinements only make sense on the explicit body field.
    if !encodings.is_empty() && !matches!(primary, Some(Placement::Body)) {
        return Err(SchemaError::ConflictingBodyRepresentation {
            field: spec.name.clone(),
            reason: format!(
                "claims a body encoding (`{}`) without use_as_body",
                encodings[0].key()
            ),
        });
    }

    let (wire_name, location, encoding) = match primary {
        Some(Placement::Status) => {
            if direction != Direction::Response {
                return Err(SchemaError::StatusOnlyOnResponse {
                    field: spec.name.clone(),
                });
            }
            if !spec.ty.is_integer() {
                return Err(SchemaError::InvalidStatusType {
                    field: spec.name.clone(),
                    ty: spec.ty.clone(),
                });
            }
            if let Some(previous) = classified.iter().find(|f| f.location == LocationKind::Status)
            {
                return Err(SchemaError::DuplicateStatusField {
                    field: spec.name.clone(),
                    previous: previous.name.clone(),
                });
            }
            (spec.name.clone(), LocationKind::Status, None)
        }
        Some(Placement::Body) => {
            if let Some(previous) = classified
                .iter()
                .find(|f| f.location == LocationKind::ExplicitBody)
            {
                return Err(SchemaError::DuplicateBodyField {
                    field: spec.name.clone(),
                    previous: previous.name.clone(),
                });
            }
            let encoding = resolve_body_encoding(spec, &encodings)?;
            (spec.name.clone(), LocationKind::ExplicitBody, Some(encoding))
        }
        Some(Placement::Query(wire)) => {
            if direction != Direction::Request {
                return Err(SchemaError::QueryOnlyOnRequest {
                    field: spec.name.clone(),
                });
            }
            ((*wire).to_string(), LocationKind::Query, None)
        }
        Some(Placement::Cookie(wire)) => {
            let expected = match direction {
                Direction::Request => ("a string value", FieldType::String),
                Direction::Response => ("a cookie descriptor", FieldType::Cookie),
            };
            if spec.ty != expected.1 {
                return Err(SchemaError::InvalidCookieType {
                    field: spec.name.clone(),
                    direction,
                    expected: expected.0,
                    ty: spec.ty.clone(),
                });
            }
            ((*wire).to_string(), LocationKind::Cookie, None)
        }
        Some(Placement::Url(placeholder)) => {
            if direction != Direction::Request {
                return Err(SchemaError::PathParamOnlyOnRequest {
                    field: spec.name.clone(),
                });
            }
            if !path_placeholders(path).contains(placeholder) {
                return Err(SchemaError::UnboundPathParam {
                    field: spec.name.clone(),
                    placeholder: (*placeholder).to_string(),
                    path: path.to_string(),
                });
            }
            ((*placeholder).to_string(), LocationKind::PathParam, None)
        }
        Some(Placement::Header(wire)) => ((*wire).to_string(), LocationKind::Header, None),
        Some(Placement::Json(wire)) => ((*wire).to_string(), LocationKind::AggregateBody, None),
        None => (spec.name.clone(), LocationKind::AggregateBody, None),
    };

    Ok(FieldBinding {
        name: spec.name.clone(),
        wire_name,
        ty: spec.ty.clone(),
        location,
        encoding,
    })
}

fn resolve_body_encoding(
    spec: &FieldSpec,
    encodings: &[&Annotation],
) -> Result<BodyEncoding, SchemaError> {
    if encodings.len() > 1 {
        return Err(SchemaError::AmbiguousBodyEncoding {
            field: spec.name.clone(),
            keys: join_keys(encodings.iter().map(|a| a.key())),
        });
    }
    match encodings.first() {
        Some(Annotation::Protobuf) => {
            let ok = matches!(&spec.ty, FieldType::Ptr(inner) if matches!(**inner, FieldType::Message(_)))
                || spec.ty == FieldType::AnyMessage;
            if !ok {
                return Err(SchemaError::InvalidBodyType {
                    field: spec.name.clone(),
                    encoding: "protobuf",
                    expected: "a pointer to a protobuf message type or a polymorphic message value",
                    ty: spec.ty.clone(),
                });
            }
            Ok(BodyEncoding::Protobuf)
        }
        Some(Annotation::Raw) => {
            if spec.ty != FieldType::Bytes {
                return Err(SchemaError::InvalidBodyType {
                    field: spec.name.clone(),
                    encoding: "raw",
                    expected: "an exact byte sequence",
                    ty: spec.ty.clone(),
                });
            }
            Ok(BodyEncoding::Raw)
        }
        Some(Annotation::Stream) => {
            if spec.ty != FieldType::ByteStream {
                return Err(SchemaError::InvalidBodyType {
                    field: spec.name.clone(),
                    encoding: "stream",
                    expected: "a streaming reader held by value",
                    ty: spec.ty.clone(),
                });
            }
            Ok(BodyEncoding::Stream)
        }
        _ => Ok(BodyEncoding::Json),
    }
}

/// Request-only pass: every placeholder in the path must be bound by exactly
/// one `url` field. `url` fields naming an absent placeholder were already
/// rejected during classification.
fn check_placeholders(path: &str, fields: &[FieldBinding]) -> Result<(), SchemaError> {
    for placeholder in path_placeholders(path) {
        let bound = fields
            .iter()
            .filter(|f| f.location == LocationKind::PathParam && f.wire_name == placeholder)
            .count();
        match bound {
            1 => {}
            0 => {
                return Err(SchemaError::UnboundPathPlaceholder {
                    placeholder: placeholder.to_string(),
                    path: path.to_string(),
                    reason: "is not bound by any request field",
                })
            }
            _ => {
                return Err(SchemaError::UnboundPathPlaceholder {
                    placeholder: placeholder.to_string(),
                    path: path.to_string(),
                    reason: "is bound by more than one request field",
                })
            }
        }
    }
    Ok(())
}

fn join_keys(keys: impl Iterator<Item = &'static str>) -> String {
    keys.collect::<Vec<_>>().join(", ")
}
