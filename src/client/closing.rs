use super::cancel::CancelToken;
use crate::config::Config;
use crate::handler::CallContext;
use std::collections::HashMap;
use std::sync::{Condvar, Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, info};

/// An outbound-call failure.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Shutdown has begun; the call was refused without touching the transport.
    #[error("client is closing")]
    Closing,
    /// The call observed cancellation while in flight.
    #[error("call cancelled")]
    Cancelled,
    /// The underlying transport failed.
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

/// One outbound request, transport-agnostic.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: http::Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl OutboundRequest {
    #[must_use]
    pub fn new(method: http::Method, url: impl Into<String>) -> Self {
        OutboundRequest {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }
}

/// One outbound response, transport-agnostic.
#[derive(Debug, Clone)]
pub struct OutboundResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// The seam for the actual wire transport.
///
/// Implementations must observe `cancel` while a roundtrip is in flight and
/// return [`ClientError::Cancelled`] promptly once it fires; that is what
/// makes the bounded shutdown protocol of [`ClosingClient`] possible.
pub trait Transport: Send + Sync {
    /// Perform one request/response exchange.
    fn roundtrip(
        &self,
        request: OutboundRequest,
        cancel: &CancelToken,
    ) -> Result<OutboundResponse, ClientError>;

    /// Release idle connections. Called during shutdown.
    fn close_idle(&self) {}

    /// Tear down any closeable underlying resources. Called once, last.
    fn shutdown(&self) -> Result<(), ClientError> {
        Ok(())
    }
}

#[derive(Default)]
struct CallState {
    closing: bool,
    next_key: u64,
    cancels: HashMap<u64, CancelToken>,
    in_flight: usize,
}

/// An outbound client with a bounded shutdown protocol.
///
/// Tracks one cancellation handle per in-flight call, keyed by a monotonically
/// increasing counter. [`close`](ClosingClient::close) (a) marks the client as
/// closing so later calls fail immediately, (b) fires every registered
/// cancellation handle, (c) releases idle connections, (d) blocks until the
/// in-flight count reaches zero and (e) shuts the transport down — so it never
/// returns while a call is still executing and never leaks a handle for a
/// completed call.
pub struct ClosingClient<T: Transport> {
    transport: T,
    config: Config,
    state: Mutex<CallState>,
    drained: Condvar,
}

impl<T: Transport> ClosingClient<T> {
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, Config::default())
    }

    #[must_use]
    pub fn with_config(transport: T, config: Config) -> Self {
        ClosingClient {
            transport,
            config,
            state: Mutex::new(CallState::default()),
            drained: Condvar::new(),
        }
    }

    /// Perform one outbound call.
    ///
    /// The call derives its own cancellable context from the caller's,
    /// registers its cancellation handle for the duration of the roundtrip and
    /// counts as in flight from entry to return — including the refusal path,
    /// so `close` cannot slip past a call that has already entered.
    ///
    /// # Errors
    ///
    /// [`ClientError::Closing`] once shutdown has begun; otherwise whatever
    /// the transport returns, reported through the configured error hook.
    pub fn call(
        &self,
        ctx: &CallContext,
        mut request: OutboundRequest,
    ) -> Result<OutboundResponse, ClientError> {
        let _flight = FlightGuard::enter(self);

        let cancel = ctx.cancel.child();
        let key = {
            let mut state = self.lock_state();
            if state.closing {
                return Err(ClientError::Closing);
            }
            let key = state.next_key;
            state.next_key += 1;
            state.cancels.insert(key, cancel.clone());
            key
        };

        if let Some(authorization) = &self.config.authorization {
            request
                .headers
                .push(("Authorization".to_string(), authorization.clone()));
        }

        let result = self.transport.roundtrip(request, &cancel);

        self.lock_state().cancels.remove(&key);

        if let Err(err) = &result {
            self.config.report_error(&format!("outbound call failed: {err}"));
        }
        result
    }

    /// Begin and complete the shutdown protocol. Idempotent; blocks until
    /// every in-flight call has returned.
    ///
    /// # Errors
    ///
    /// Whatever the transport's final teardown returns.
    pub fn close(&self) -> Result<(), ClientError> {
        {
            let mut state = self.lock_state();
            if !state.closing {
                state.closing = true;
                let handles = state.cancels.drain().collect::<Vec<_>>();
                drop(state);
                info!(in_flight = handles.len(), "outbound client closing");
                for (_, handle) in handles {
                    handle.cancel();
                }
            }
        }

        self.transport.close_idle();

        let mut state = self.lock_state();
        while state.in_flight > 0 {
            state = self
                .drained
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        drop(state);
        debug!("outbound client drained");

        self.transport.shutdown()
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Whether shutdown has begun.
    #[must_use]
    pub fn is_closing(&self) -> bool {
        self.lock_state().closing
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, CallState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Counts a call as in flight for its whole duration, refusal included.
struct FlightGuard<'a, T: Transport> {
    client: &'a ClosingClient<T>,
}

impl<'a, T: Transport> FlightGuard<'a, T> {
    fn enter(client: &'a ClosingClient<T>) -> Self {
        client.lock_state().in_flight += 1;
        FlightGuard { client }
    }
}

impl<T: Transport> Drop for FlightGuard<'_, T> {
    fn drop(&mut self) {
        let mut state = self.client.lock_state();
        state.in_flight -= 1;
        if state.in_flight == 0 {
            self.client.drained.notify_all();
        }
    }
}
