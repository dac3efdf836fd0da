//! # Handler Module
//!
//! Method/handler descriptor resolution with late binding.
//!
//! ## Overview
//!
//! A route binds a *method of a declared service type*, not a live object.
//! [`ServiceRef`] is a shared slot that may be empty while routes are being
//! registered; [`resolve`] looks the method up in the type's [`MethodTable`]
//! (its declared capability set) and produces a [`HandlerDescriptor`] whose
//! invocation thunk re-reads the slot on every call. Deferred wiring and
//! mutually referencing services fall out of this for free.
//!
//! ## Registering a service
//!
//! ```rust,ignore
//! impl Exposed for EchoService {
//!     fn method_table() -> MethodTable<Self> {
//!         MethodTable::new()
//!             .method("Hello", |svc: &Self, _ctx, req: HelloRequest| Ok(svc.hello(&req)))
//!             .method("Echo", |svc: &Self, _ctx, req: EchoRequest| svc.echo(&req))
//!     }
//! }
//!
//! let service: ServiceRef<EchoService> = ServiceRef::empty();
//! let handler = handler::resolve(&service, "Hello")?;   // resolves while empty
//! service.set(Arc::new(EchoService::default()));        // wired later
//! ```
//!
//! Trait objects work the same way: implement [`Exposed`] for `dyn MyApi` and
//! hold a `ServiceRef<dyn MyApi>`.

mod core;

pub use self::core::{
    resolve, CallContext, Exposed, FuncInfo, HandlerDescriptor, InvokeError, MethodTable,
    ServiceRef,
};
