use crate::error::RegistrationError;
use crate::handler::HandlerDescriptor;
use crate::schema::{build_schema, Direction, MessageSchema};
use http::Method;
use tracing::{debug, info};

/// One route as registered: HTTP method, path pattern and resolved handler.
///
/// The path pattern may contain `:name` placeholder segments, e.g.
/// `/echo/:user`.
#[derive(Debug, Clone)]
pub struct Route {
    pub method: Method,
    pub path: String,
    pub handler: HandlerDescriptor,
}

impl Route {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>, handler: HandlerDescriptor) -> Self {
        Route {
            method,
            path: path.into(),
            handler,
        }
    }
}

/// A route that passed the registration gate: both message schemas derived
/// and every structural invariant enforced.
///
/// Read-only for the lifetime of the process (or generation run); safe to
/// share across request-handling threads without locking. This is the single
/// source of truth handed to the HTTP dispatcher, the client generators and
/// the OpenAPI emitter.
#[derive(Debug, Clone)]
pub struct BoundRoute {
    pub method: Method,
    pub path: String,
    pub handler: HandlerDescriptor,
    pub request_schema: MessageSchema,
    pub response_schema: MessageSchema,
}

/// Validate every route, deriving request and response schemas.
///
/// Runs once, single-threaded, at server startup or at the start of a
/// generation run. The request schema is derived against the route's path
/// (placeholder binding included); the response schema ignores the path.
///
/// # Errors
///
/// The first failure aborts the whole run with
/// [`RegistrationError::InvalidMethodSignature`] naming the route, the
/// direction and the violated rule. A misconfigured route never serves a
/// request and no artifact is emitted.
pub fn bind_routes(routes: Vec<Route>) -> Result<Vec<BoundRoute>, RegistrationError> {
    let mut bound = Vec::with_capacity(routes.len());
    for route in routes {
        let request_schema = derive(&route, Direction::Request, &route.path)?;
        let response_schema = derive(&route, Direction::Response, "")?;
        debug!(
            method = %route.method,
            path = %route.path,
            handler = %route.handler.func_info(),
            "route validated"
        );
        bound.push(BoundRoute {
            method: route.method,
            path: route.path,
            handler: route.handler,
            request_schema,
            response_schema,
        });
    }
    info!(routes = bound.len(), "route table validated");
    Ok(bound)
}

fn derive(
    route: &Route,
    direction: Direction,
    path: &str,
) -> Result<MessageSchema, RegistrationError> {
    let descriptor = match direction {
        Direction::Request => route.handler.request_descriptor(),
        Direction::Response => route.handler.response_descriptor(),
    };
    build_schema(descriptor, direction, path).map_err(|source| {
        RegistrationError::InvalidMethodSignature {
            handler: route.handler.func_info().to_string(),
            http_method: route.method.clone(),
            path: route.path.clone(),
            direction,
            type_name: descriptor.type_name.clone(),
            source,
        }
    })
}
