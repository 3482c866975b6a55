// Router configuration and builder

use crate::events::{ErrorEvent, Listener};
use crate::{HttpStatus, Router};
use std::env;

pub const ENV_DEFAULT_STATUS: &str = "CHAINROUTE_DEFAULT_STATUS";
pub const ENV_DEFAULT_ERROR_LISTENER: &str = "CHAINROUTE_DEFAULT_ERROR_LISTENER";
pub const ENV_LOG_DISPATCH: &str = "CHAINROUTE_LOG_DISPATCH";

/// Router configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// Status given to responses that don't set one
    pub default_status: u16,

    /// Install the fallback `error` listener at construction
    pub default_error_listener: bool,

    /// Emit `debug!`/`trace!` records while dispatching
    pub enable_logging: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            default_status: HttpStatus::Ok.code(),
            default_error_listener: true,
            enable_logging: true,
        }
    }
}

impl RouterConfig {
    /// Load from `CHAINROUTE_*` environment variables. Missing or malformed
    /// values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(status) = lookup(ENV_DEFAULT_STATUS)
            .and_then(|v| v.trim().parse::<u16>().ok())
            .filter(|s| (100..=599).contains(s))
        {
            config.default_status = status;
        }
        if let Some(enabled) = lookup(ENV_DEFAULT_ERROR_LISTENER).and_then(|v| parse_flag(&v)) {
            config.default_error_listener = enabled;
        }
        if let Some(enabled) = lookup(ENV_LOG_DISPATCH).and_then(|v| parse_flag(&v)) {
            config.enable_logging = enabled;
        }

        config
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Builder for [`Router`]
///
/// ```
/// use chainroute_core::{HttpStatus, Router};
///
/// let router: Router<()> = Router::builder()
///     .default_status(HttpStatus::NoContent)
///     .enable_logging(false)
///     .build();
///
/// assert_eq!(router.config().default_status, 204);
/// assert!(router.error_fallback_active());
/// ```
pub struct RouterBuilder<S> {
    config: RouterConfig,
    error_listener: Option<Listener<S>>,
}

impl<S: Send + 'static> RouterBuilder<S> {
    pub fn new() -> Self {
        Self {
            config: RouterConfig::default(),
            error_listener: None,
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn default_status(mut self, status: impl Into<u16>) -> Self {
        self.config.default_status = status.into();
        self
    }

    /// Use `listener` as the fallback `error` listener instead of the
    /// logging one. It is retired like the built-in one.
    pub fn default_error_listener<F>(mut self, listener: F) -> Self
    where
        F: Fn(ErrorEvent<'_, S>) + Send + Sync + 'static,
    {
        self.config.default_error_listener = true;
        self.error_listener = Some(Listener::error(listener));
        self
    }

    pub fn disable_default_error_listener(mut self) -> Self {
        self.config.default_error_listener = false;
        self.error_listener = None;
        self
    }

    /// Enable/disable dispatch logging
    pub fn enable_logging(mut self, enabled: bool) -> Self {
        self.config.enable_logging = enabled;
        self
    }

    pub fn build(self) -> Router<S> {
        Router::from_parts(self.config, self.error_listener)
    }
}

impl<S: Send + 'static> Default for RouterBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}
