use crate::client::CancelToken;
use crate::error::RegistrationError;
use crate::schema::{ApiMessage, MessageDescriptor};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

/// Per-call context handed to every handler invocation.
///
/// Carries the call's cancellation token; outbound calls made on behalf of
/// this one should derive their own tokens from it.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    pub cancel: CancelToken,
}

impl CallContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cancel(cancel: CancelToken) -> Self {
        CallContext { cancel }
    }
}

/// A failure while invoking a resolved handler.
///
/// A handler's own error passes through [`InvokeError::Handler`] unchanged;
/// this crate never interprets per-request errors.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The service slot held no instance at call time.
    #[error("service instance is not installed")]
    ServiceUnavailable,
    /// The erased request value did not decode into the declared request type.
    #[error("failed to decode request message: {0}")]
    Decode(#[source] serde_json::Error),
    /// The response failed to encode.
    #[error("failed to encode response message: {0}")]
    Encode(#[source] serde_json::Error),
    /// The handler itself failed; propagated unchanged.
    #[error(transparent)]
    Handler(anyhow::Error),
}

/// A shared slot holding the current instance of a service.
///
/// Routes are frequently registered before the concrete service object exists
/// (deferred wiring, services referencing each other), so resolution works
/// purely against the slot's *declared* type `S` and never inspects its
/// contents. The invocation thunk captures the slot, not an instance, and
/// dereferences it afresh on every call: whichever instance the slot holds at
/// call time is the one invoked.
///
/// `S` may be a concrete service type or a trait object (`ServiceRef<dyn T>`).
pub struct ServiceRef<S: ?Sized> {
    slot: Arc<RwLock<Option<Arc<S>>>>,
}

impl<S: ?Sized> Clone for ServiceRef<S> {
    fn clone(&self) -> Self {
        ServiceRef {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<S: ?Sized> Default for ServiceRef<S> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<S: ?Sized> fmt::Debug for ServiceRef<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRef")
            .field("set", &self.is_set())
            .finish()
    }
}

impl<S: ?Sized> ServiceRef<S> {
    /// An empty slot; routes resolved against it become servable once
    /// [`set`](ServiceRef::set) installs an instance.
    #[must_use]
    pub fn empty() -> Self {
        ServiceRef {
            slot: Arc::new(RwLock::new(None)),
        }
    }

    /// A slot already holding `instance`.
    #[must_use]
    pub fn new(instance: Arc<S>) -> Self {
        ServiceRef {
            slot: Arc::new(RwLock::new(Some(instance))),
        }
    }

    /// Install or replace the current instance.
    pub fn set(&self, instance: Arc<S>) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(instance);
    }

    /// Remove the current instance; subsequent invocations fail until a new
    /// one is installed.
    pub fn clear(&self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// The instance held right now, if any.
    #[must_use]
    pub fn get(&self) -> Option<Arc<S>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

/// Stable identification of a bound service method.
///
/// Used for diagnostics, blacklist matching in the generators, and grouping
/// routes by owning service. Derived from the *declared* type, so it is
/// identical whether or not the service slot currently holds an instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FuncInfo {
    /// Full module path of the owning type (e.g. `my_app::services`)
    pub full_path: String,
    /// Last path segment (e.g. `services`)
    pub package: String,
    /// Owning type name, without any `dyn` prefix
    pub type_name: String,
    /// Method name
    pub method: String,
}

impl fmt::Display for FuncInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.full_path.is_empty() {
            write!(f, "{}::{}", self.type_name, self.method)
        } else {
            write!(f, "{}::{}::{}", self.full_path, self.type_name, self.method)
        }
    }
}

/// Split `std::any::type_name` output into (module path, package, type name).
fn type_metadata(raw: &str) -> (String, String, String) {
    let raw = raw.strip_prefix("dyn ").unwrap_or(raw);
    // Drop generic arguments; the base path is what identifies the type.
    let base = raw.split('<').next().unwrap_or(raw);
    let mut parts: Vec<&str> = base.split("::").collect();
    let type_name = parts.pop().unwrap_or(base).to_string();
    let package = parts.last().copied().unwrap_or("").to_string();
    (parts.join("::"), package, type_name)
}

type ErasedMethod<S> = Arc<dyn Fn(&S, &CallContext, Value) -> Result<Value, InvokeError> + Send + Sync>;

struct MethodEntry<S: ?Sized> {
    name: &'static str,
    request: fn() -> MessageDescriptor,
    response: fn() -> MessageDescriptor,
    invoke: ErasedMethod<S>,
}

/// The capability set of a declared service type: its identifying metadata
/// plus one entry per exposed method.
///
/// Built once per type by [`Exposed::method_table`]; resolution looks methods
/// up here by name, never on a live instance.
pub struct MethodTable<S: ?Sized> {
    full_path: String,
    package: String,
    type_name: String,
    methods: Vec<MethodEntry<S>>,
}

impl<S: ?Sized + Send + Sync + 'static> Default for MethodTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ?Sized + Send + Sync + 'static> MethodTable<S> {
    /// An empty table for `S`, with metadata derived from the declared type.
    #[must_use]
    pub fn new() -> Self {
        let (full_path, package, type_name) = type_metadata(std::any::type_name::<S>());
        MethodTable {
            full_path,
            package,
            type_name,
            methods: Vec::new(),
        }
    }

    /// Register a method.
    ///
    /// `f` receives the current instance, the call context and the decoded
    /// request, and returns the typed response or its own error, which is
    /// later propagated unchanged. The request and response types bring their
    /// wire descriptors along via [`ApiMessage`].
    #[must_use]
    pub fn method<Req, Resp, F>(mut self, name: &'static str, f: F) -> Self
    where
        Req: ApiMessage + DeserializeOwned + 'static,
        Resp: ApiMessage + Serialize + 'static,
        F: Fn(&S, &CallContext, Req) -> Result<Resp, anyhow::Error> + Send + Sync + 'static,
    {
        let invoke: ErasedMethod<S> = Arc::new(move |service, ctx, raw| {
            let request: Req = serde_json::from_value(raw).map_err(InvokeError::Decode)?;
            let response = f(service, ctx, request).map_err(InvokeError::Handler)?;
            serde_json::to_value(response).map_err(InvokeError::Encode)
        });
        self.methods.push(MethodEntry {
            name,
            request: Req::descriptor,
            response: Resp::descriptor,
            invoke,
        });
        self
    }

    /// Names of all registered methods, in registration order.
    pub fn method_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.methods.iter().map(|m| m.name)
    }

    fn qualified_name(&self) -> String {
        if self.full_path.is_empty() {
            self.type_name.clone()
        } else {
            format!("{}::{}", self.full_path, self.type_name)
        }
    }
}

/// A service type (concrete or trait object) that exposes methods for route
/// binding.
pub trait Exposed: Send + Sync {
    /// The declared capability set of this type.
    fn method_table() -> MethodTable<Self>;
}

type ErasedThunk = Arc<dyn Fn(&CallContext, Value) -> Result<Value, InvokeError> + Send + Sync>;

/// A resolved, invocable binding of one service method.
///
/// Created once per registered route at startup and immutable afterwards. The
/// embedded thunk is late-bound: it holds the [`ServiceRef`], not an instance.
#[derive(Clone)]
pub struct HandlerDescriptor {
    info: FuncInfo,
    request: MessageDescriptor,
    response: MessageDescriptor,
    invoke: ErasedThunk,
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("info", &self.info)
            .field("request", &self.request.type_name)
            .field("response", &self.response.type_name)
            .finish()
    }
}

impl HandlerDescriptor {
    /// Identifying metadata of the bound method.
    #[must_use]
    pub fn func_info(&self) -> &FuncInfo {
        &self.info
    }

    /// Declared field list of the request message.
    #[must_use]
    pub fn request_descriptor(&self) -> &MessageDescriptor {
        &self.request
    }

    /// Declared field list of the response message.
    #[must_use]
    pub fn response_descriptor(&self) -> &MessageDescriptor {
        &self.response
    }

    /// Invoke the bound method against whatever instance the service slot
    /// holds right now.
    ///
    /// # Errors
    ///
    /// [`InvokeError::ServiceUnavailable`] when the slot is empty; decode and
    /// encode failures for malformed erased values; the handler's own error,
    /// unchanged, otherwise.
    pub fn invoke(&self, ctx: &CallContext, request: Value) -> Result<Value, InvokeError> {
        (self.invoke)(ctx, request)
    }
}

/// Resolve `method` against the declared type behind `service`.
///
/// Resolution succeeds even when the slot is empty; only the declared type's
/// [`MethodTable`] is consulted. The returned descriptor's thunk dereferences
/// the slot afresh at every call.
///
/// # Errors
///
/// [`RegistrationError::MethodNotFound`] when the declared type exposes no
/// method of that name.
pub fn resolve<S>(
    service: &ServiceRef<S>,
    method: &str,
) -> Result<HandlerDescriptor, RegistrationError>
where
    S: Exposed + ?Sized + 'static,
{
    let table = S::method_table();
    let entry = table
        .methods
        .iter()
        .find(|m| m.name == method)
        .ok_or_else(|| RegistrationError::MethodNotFound {
            service: table.qualified_name(),
            method: method.to_string(),
        })?;

    let info = FuncInfo {
        full_path: table.full_path.clone(),
        package: table.package.clone(),
        type_name: table.type_name.clone(),
        method: entry.name.to_string(),
    };
    let slot = service.clone();
    let erased = Arc::clone(&entry.invoke);
    let thunk: ErasedThunk = Arc::new(move |ctx, request| {
        let instance = slot.get().ok_or(InvokeError::ServiceUnavailable)?;
        (erased)(instance.as_ref(), ctx, request)
    });

    Ok(HandlerDescriptor {
        info,
        request: (entry.request)(),
        response: (entry.response)(),
        invoke: thunk,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_metadata_splits_paths() {
        let (path, pkg, name) = type_metadata("my_app::services::EchoService");
        assert_eq!(path, "my_app::services");
        assert_eq!(pkg, "services");
        assert_eq!(name, "EchoService");
    }

    #[test]
    fn type_metadata_strips_dyn_and_generics() {
        let (path, pkg, name) = type_metadata("dyn my_app::api::EchoApi");
        assert_eq!(path, "my_app::api");
        assert_eq!(pkg, "api");
        assert_eq!(name, "EchoApi");

        let (_, _, name) = type_metadata("my_app::Wrapper<alloc::string::String>");
        assert_eq!(name, "Wrapper");
    }

    #[test]
    fn type_metadata_handles_bare_names() {
        let (path, pkg, name) = type_metadata("Standalone");
        assert_eq!(path, "");
        assert_eq!(pkg, "");
        assert_eq!(name, "Standalone");
    }
}
