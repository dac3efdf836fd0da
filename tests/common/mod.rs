#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::sync::Once;
use wirebind::handler::{resolve, CallContext, Exposed, MethodTable, ServiceRef};
use wirebind::router::Route;
use wirebind::schema::{ApiMessage, FieldSpec, FieldType, MessageDescriptor};

static TRACING: Once = Once::new();

/// Install a test subscriber once per binary; later calls are no-ops.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HelloRequest {
    pub key: String,
}

impl ApiMessage for HelloRequest {
    fn descriptor() -> MessageDescriptor {
        MessageDescriptor::new("HelloRequest")
            .field(FieldSpec::new("key", FieldType::String).json("key"))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HelloResponse {
    pub session: String,
}

impl ApiMessage for HelloResponse {
    fn descriptor() -> MessageDescriptor {
        MessageDescriptor::new("HelloResponse")
            .field(FieldSpec::new("session", FieldType::String).json("session"))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EchoRequest {
    pub user: String,
    pub text: String,
}

impl ApiMessage for EchoRequest {
    fn descriptor() -> MessageDescriptor {
        MessageDescriptor::new("EchoRequest")
            .field(FieldSpec::new("user", FieldType::String).url("user"))
            .field(FieldSpec::new("text", FieldType::String).json("text"))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EchoResponse {
    pub text: String,
}

impl ApiMessage for EchoResponse {
    fn descriptor() -> MessageDescriptor {
        MessageDescriptor::new("EchoResponse")
            .field(FieldSpec::new("text", FieldType::String).json("text"))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SinceRequest {
    pub since: i64,
}

impl ApiMessage for SinceRequest {
    fn descriptor() -> MessageDescriptor {
        MessageDescriptor::new("SinceRequest")
            .field(FieldSpec::new("since", FieldType::Int).query("since"))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SinceResponse {
    pub count: i64,
}

impl ApiMessage for SinceResponse {
    fn descriptor() -> MessageDescriptor {
        MessageDescriptor::new("SinceResponse")
            .field(FieldSpec::new("count", FieldType::Int).json("count"))
    }
}

/// Deliberately ill-formed: a query field on a response message.
#[derive(Debug, Serialize, Deserialize)]
pub struct BadLookupResponse {
    pub q: String,
}

impl ApiMessage for BadLookupResponse {
    fn descriptor() -> MessageDescriptor {
        MessageDescriptor::new("BadLookupResponse")
            .field(FieldSpec::new("q", FieldType::String).query("q"))
    }
}

/// Concrete fixture service. The prefix makes instance identity observable
/// through an invocation.
pub struct EchoService {
    pub prefix: String,
}

impl EchoService {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        EchoService {
            prefix: prefix.into(),
        }
    }
}

impl Exposed for EchoService {
    fn method_table() -> MethodTable<Self> {
        MethodTable::new()
            .method(
                "Hello",
                |svc: &EchoService, _ctx: &CallContext, req: HelloRequest| {
                    Ok(HelloResponse {
                        session: format!("{}{}", svc.prefix, req.key),
                    })
                },
            )
            .method(
                "Echo",
                |svc: &EchoService, _ctx: &CallContext, req: EchoRequest| {
                    Ok(EchoResponse {
                        text: format!("{}{} from {}", svc.prefix, req.text, req.user),
                    })
                },
            )
            .method(
                "Since",
                |_svc: &EchoService, _ctx: &CallContext, req: SinceRequest| {
                    Ok(SinceResponse { count: req.since })
                },
            )
    }
}

/// Trait-object variant of the same service, for late binding through
/// `ServiceRef<dyn EchoApi>`.
pub trait EchoApi: Send + Sync {
    fn hello(&self, req: HelloRequest) -> anyhow::Result<HelloResponse>;
}

impl EchoApi for EchoService {
    fn hello(&self, req: HelloRequest) -> anyhow::Result<HelloResponse> {
        Ok(HelloResponse {
            session: format!("{}{}", self.prefix, req.key),
        })
    }
}

impl Exposed for dyn EchoApi {
    fn method_table() -> MethodTable<Self> {
        MethodTable::new().method(
            "Hello",
            |svc: &(dyn EchoApi + 'static), _ctx: &CallContext, req: HelloRequest| svc.hello(req),
        )
    }
}

/// The standard fixture route table: one JSON POST, one path-parameter POST,
/// one query GET.
pub fn echo_routes(service: &ServiceRef<EchoService>) -> Vec<Route> {
    vec![
        Route::new(
            http::Method::POST,
            "/hello",
            resolve(service, "Hello").expect("Hello resolves"),
        ),
        Route::new(
            http::Method::POST,
            "/echo/:user",
            resolve(service, "Echo").expect("Echo resolves"),
        ),
        Route::new(
            http::Method::GET,
            "/since",
            resolve(service, "Since").expect("Since resolves"),
        ),
    ]
}
