//! Late-bound method resolution: metadata invariance, name lookup and the
//! empty-slot invocation path.

mod common;

use common::{EchoApi, EchoService, HelloResponse};
use serde_json::json;
use std::sync::Arc;
use wirebind::handler::{resolve, CallContext, Exposed, InvokeError, ServiceRef};
use wirebind::RegistrationError;

#[test]
fn test_func_info_concrete_populated_slot() {
    common::init_tracing();
    let service = ServiceRef::new(Arc::new(EchoService::with_prefix("")));
    let handler = resolve(&service, "Hello").expect("Hello resolves");
    let info = handler.func_info();
    assert_eq!(info.type_name, "EchoService");
    assert_eq!(info.method, "Hello");
    assert_eq!(info.package, "common");
}

#[test]
fn test_func_info_identical_for_empty_slot() {
    // Resolution consults only the declared type; the slot's contents must
    // not matter.
    let empty: ServiceRef<EchoService> = ServiceRef::empty();
    let populated = ServiceRef::new(Arc::new(EchoService::with_prefix("x")));
    let a = resolve(&empty, "Hello").expect("resolves on empty slot");
    let b = resolve(&populated, "Hello").expect("resolves on populated slot");
    assert_eq!(a.func_info(), b.func_info());
}

#[test]
fn test_func_info_trait_object_slot() {
    let empty: ServiceRef<dyn EchoApi> = ServiceRef::empty();
    let handler = resolve(&empty, "Hello").expect("resolves against trait object");
    let info = handler.func_info();
    assert_eq!(info.type_name, "EchoApi");
    assert_eq!(info.method, "Hello");
}

#[test]
fn test_method_table_lists_methods_in_registration_order() {
    let names: Vec<&str> = EchoService::method_table().method_names().collect();
    assert_eq!(names, ["Hello", "Echo", "Since"]);

    let dyn_names: Vec<&str> = <dyn EchoApi as Exposed>::method_table()
        .method_names()
        .collect();
    assert_eq!(dyn_names, ["Hello"]);
}

#[test]
fn test_unknown_method_is_rejected() {
    let service: ServiceRef<EchoService> = ServiceRef::empty();
    let err = resolve(&service, "Goodbye").unwrap_err();
    match err {
        RegistrationError::MethodNotFound { service, method } => {
            assert!(service.ends_with("EchoService"), "service: {service}");
            assert_eq!(method, "Goodbye");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_invoke_before_install_fails_then_succeeds() {
    let slot: ServiceRef<EchoService> = ServiceRef::empty();
    let handler = resolve(&slot, "Hello").expect("Hello resolves");
    let ctx = CallContext::new();

    let err = handler
        .invoke(&ctx, json!({ "key": "abc" }))
        .unwrap_err();
    assert!(matches!(err, InvokeError::ServiceUnavailable));

    slot.set(Arc::new(EchoService::with_prefix("s-")));
    let value = handler
        .invoke(&ctx, json!({ "key": "abc" }))
        .expect("invoke after install");
    let response: HelloResponse = serde_json::from_value(value).expect("decode response");
    assert_eq!(response.session, "s-abc");
}

#[test]
fn test_invoke_sees_replaced_instance() {
    let slot = ServiceRef::new(Arc::new(EchoService::with_prefix("old-")));
    let handler = resolve(&slot, "Hello").expect("Hello resolves");
    let ctx = CallContext::new();

    let first = handler
        .invoke(&ctx, json!({ "key": "k" }))
        .expect("first invoke");
    assert_eq!(first["session"], "old-k");

    slot.set(Arc::new(EchoService::with_prefix("new-")));
    let second = handler
        .invoke(&ctx, json!({ "key": "k" }))
        .expect("second invoke");
    assert_eq!(second["session"], "new-k");
}

#[test]
fn test_invoke_through_trait_object() {
    let slot: ServiceRef<dyn EchoApi> = ServiceRef::empty();
    let handler = resolve(&slot, "Hello").expect("Hello resolves");
    slot.set(Arc::new(EchoService::with_prefix("dyn-")));
    let value = handler
        .invoke(&CallContext::new(), json!({ "key": "k" }))
        .expect("invoke");
    assert_eq!(value["session"], "dyn-k");
}

#[test]
fn test_malformed_request_value_is_a_decode_error() {
    let slot = ServiceRef::new(Arc::new(EchoService::with_prefix("")));
    let handler = resolve(&slot, "Hello").expect("Hello resolves");
    let err = handler
        .invoke(&CallContext::new(), json!({ "key": 42 }))
        .unwrap_err();
    assert!(matches!(err, InvokeError::Decode(_)), "got: {err}");
}

#[test]
fn test_clearing_the_slot_restores_unavailable() {
    let slot = ServiceRef::new(Arc::new(EchoService::with_prefix("")));
    let handler = resolve(&slot, "Hello").expect("Hello resolves");
    slot.clear();
    let err = handler
        .invoke(&CallContext::new(), json!({ "key": "k" }))
        .unwrap_err();
    assert!(matches!(err, InvokeError::ServiceUnavailable));
}
