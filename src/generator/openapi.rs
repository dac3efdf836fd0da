//! OpenAPI 3.0 document assembly from the validated route table.
//!
//! Only schema population is handled here: paths, parameters, request bodies
//! and response schemas are derived from each route's [`MessageSchema`]s.
//! Colon placeholders become `{brace}` segments, query and path fields become
//! `parameters`, aggregate bodies become object schemas under
//! `components/schemas`.

use super::{filter_routes, BlacklistRule};
use crate::router::BoundRoute;
use crate::schema::{FieldType, LocationKind, MessageSchema};
use anyhow::Context;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use tracing::info;

/// Options for one generation run.
#[derive(Debug, Clone)]
pub struct GenConfig {
    pub title: String,
    pub version: String,
    pub blacklist: Vec<BlacklistRule>,
}

impl Default for GenConfig {
    fn default() -> Self {
        GenConfig {
            title: "api".to_string(),
            version: "0.0.0".to_string(),
            blacklist: Vec::new(),
        }
    }
}

/// Convert `/echo/:user` to `/echo/{user}`.
#[must_use]
pub fn colon_path_to_braces(path: &str) -> String {
    path.split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) if !name.is_empty() => format!("{{{name}}}"),
            _ => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn scalar_schema(ty: &FieldType) -> Value {
    let kind = match ty {
        FieldType::Bool => "boolean",
        FieldType::Int | FieldType::Uint => "integer",
        FieldType::Float => "number",
        // Everything else serializes as a string in a parameter position.
        _ => "string",
    };
    json!({ "type": kind })
}

/// Object schema for a message's body: the aggregate members as properties,
/// or the explicit body field's own type.
fn body_schema(schema: &MessageSchema) -> Value {
    if let Some(body) = schema.explicit_body() {
        return match &body.ty {
            FieldType::Bytes | FieldType::ByteStream => {
                json!({ "type": "string", "format": "binary" })
            }
            other => scalar_schema(other),
        };
    }
    let mut properties = Map::new();
    for field in schema.aggregate_fields() {
        properties.insert(field.wire_name.clone(), scalar_schema(&field.ty));
    }
    json!({ "type": "object", "properties": Value::Object(properties) })
}

fn route_parameters(route: &BoundRoute) -> Value {
    let mut parameters = Vec::new();
    for field in route.request_schema.fields() {
        let location = match field.location {
            LocationKind::Query => "query",
            LocationKind::PathParam => "path",
            LocationKind::Header => "header",
            LocationKind::Cookie => "cookie",
            _ => continue,
        };
        parameters.push(json!({
            "name": field.wire_name,
            "in": location,
            "required": field.location == LocationKind::PathParam,
            "schema": scalar_schema(&field.ty),
        }));
    }
    Value::Array(parameters)
}

/// Assemble the OpenAPI document for every non-blacklisted route.
#[must_use]
pub fn build_document(routes: &[BoundRoute], config: &GenConfig) -> Value {
    let mut paths = Map::new();
    let mut schemas = Map::new();
    let mut request_bodies = Map::new();

    for route in filter_routes(routes, &config.blacklist) {
        let info = route.handler.func_info();
        let request_name = route.request_schema.type_name().to_string();
        let response_name = route.response_schema.type_name().to_string();

        schemas.insert(request_name.clone(), body_schema(&route.request_schema));
        schemas.insert(response_name.clone(), body_schema(&route.response_schema));

        let mut operation = Map::new();
        operation.insert("tags".to_string(), json!([info.package]));
        operation.insert("parameters".to_string(), route_parameters(route));
        if route.method != http::Method::GET {
            request_bodies.insert(
                request_name.clone(),
                json!({
                    "content": { "application/json": {
                        "schema": { "$ref": format!("#/components/schemas/{request_name}") }
                    }}
                }),
            );
            operation.insert(
                "requestBody".to_string(),
                json!({ "$ref": format!("#/components/requestBodies/{request_name}") }),
            );
        }
        operation.insert(
            "responses".to_string(),
            json!({
                "200": {
                    "description": "info",
                    "content": { "application/json": {
                        "schema": { "$ref": format!("#/components/schemas/{response_name}") }
                    }}
                }
            }),
        );

        let braced = colon_path_to_braces(&route.path);
        let item = paths
            .entry(braced)
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(item) = item {
            item.insert(
                route.method.as_str().to_lowercase(),
                Value::Object(operation),
            );
        }
    }

    json!({
        "openapi": "3.0.0",
        "info": { "title": config.title, "version": config.version },
        "paths": Value::Object(paths),
        "components": {
            "schemas": Value::Object(schemas),
            "requestBodies": Value::Object(request_bodies),
        }
    })
}

/// Build the document and write it as `openapi.json` under `out_dir`.
///
/// # Errors
///
/// File-system failures only; the routes were already validated by the gate.
pub fn write_document(
    routes: &[BoundRoute],
    config: &GenConfig,
    out_dir: &Path,
) -> anyhow::Result<PathBuf> {
    let document = build_document(routes, config);
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    let out_path = out_dir.join("openapi.json");
    let content = serde_json::to_string_pretty(&document)?;
    std::fs::write(&out_path, content)
        .with_context(|| format!("writing {}", out_path.display()))?;
    info!(path = %out_path.display(), "OpenAPI document written");
    Ok(out_path)
}
