//! # Config Module
//!
//! Explicit, fully-named client configuration.
//!
//! These knobs are orthogonal to schema validation: an error-reporting hook,
//! an outbound `Authorization` header value and a maximum body-size ceiling.
//! The custom-transport knob is the [`Transport`](crate::client::Transport)
//! type parameter of the outbound client rather than a field here.
//!
//! [`Config::new`] validates its inputs; an invalid configuration never
//! reaches a running client.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

/// Default body-size ceiling: 10 MiB.
pub const DEFAULT_MAX_BODY_BYTES: u64 = 10 * 1024 * 1024;

/// Callback receiving formatted error reports.
pub type ErrorHook = Arc<dyn Fn(&str) + Send + Sync>;

/// An invalid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("max_body_bytes must be positive")]
    ZeroBodyCeiling,
    #[error("authorization header value is empty")]
    EmptyAuthorization,
}

/// Client/consumer configuration.
#[derive(Clone)]
pub struct Config {
    /// `Authorization` header attached to every outbound call, if set.
    pub authorization: Option<String>,
    /// Ceiling on accepted body sizes, in bytes. Consumers enforce it.
    pub max_body_bytes: u64,
    /// Error-reporting callback; errors go to `tracing` when unset.
    pub error_hook: Option<ErrorHook>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            authorization: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            error_hook: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("authorization", &self.authorization.as_deref().map(|_| "<set>"))
            .field("max_body_bytes", &self.max_body_bytes)
            .field("error_hook", &self.error_hook.as_ref().map(|_| "<set>"))
            .finish()
    }
}

impl Config {
    /// Validating constructor.
    ///
    /// # Errors
    ///
    /// Rejects a zero body ceiling and an empty authorization value.
    pub fn new(
        authorization: Option<String>,
        max_body_bytes: u64,
        error_hook: Option<ErrorHook>,
    ) -> Result<Self, ConfigError> {
        if max_body_bytes == 0 {
            return Err(ConfigError::ZeroBodyCeiling);
        }
        if matches!(&authorization, Some(value) if value.is_empty()) {
            return Err(ConfigError::EmptyAuthorization);
        }
        Ok(Config {
            authorization,
            max_body_bytes,
            error_hook,
        })
    }

    /// Report an error through the hook, or to `tracing` when none is set.
    pub(crate) fn report_error(&self, message: &str) {
        match &self.error_hook {
            Some(hook) => hook(message),
            None => error!("{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ceiling_is_ten_mib() {
        assert_eq!(Config::default().max_body_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn constructor_rejects_bad_values() {
        assert!(matches!(
            Config::new(None, 0, None),
            Err(ConfigError::ZeroBodyCeiling)
        ));
        assert!(matches!(
            Config::new(Some(String::new()), 1024, None),
            Err(ConfigError::EmptyAuthorization)
        ));
        assert!(Config::new(Some("Bearer t".into()), 1024, None).is_ok());
    }
}
