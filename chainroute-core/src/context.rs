//! Per-call routing context.
//!
//! A [`Context`] wraps the caller's own state `S` and adds the fields the
//! router manages: the execution [`Mode`] of the call and the path
//! parameters captured by matching routes. It derefs to `S`, so middleware
//! read and write caller fields directly:
//!
//! ```
//! use chainroute_core::{Context, Mode};
//!
//! #[derive(Default)]
//! struct Session {
//!     user: Option<String>,
//! }
//!
//! let mut ctx = Context::new(Session::default(), Mode::Sync);
//! ctx.user = Some("alice".to_string());
//! assert_eq!(ctx.user.as_deref(), Some("alice"));
//! assert!(ctx.mode().is_sync());
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Execution discipline of one routing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Sync,
    Async,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Sync => "sync",
            Mode::Async => "async",
        }
    }

    pub fn is_sync(&self) -> bool {
        matches!(self, Mode::Sync)
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Mode::Async)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named values captured from the request URL by path patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    values: HashMap<String, String>,
}

impl PathParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Later captures overwrite earlier ones with the same name.
    pub fn extend(&mut self, other: PathParams) {
        self.values.extend(other.values);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Caller state plus the router-managed fields for a single call.
#[derive(Debug, Clone)]
pub struct Context<S = ()> {
    state: S,
    mode: Mode,
    params: PathParams,
}

impl<S> Context<S> {
    pub fn new(state: S, mode: Mode) -> Self {
        Self {
            state,
            mode,
            params: PathParams::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut PathParams {
        &mut self.params
    }

    /// Get a captured path parameter by name
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    pub fn into_state(self) -> S {
        self.state
    }
}

impl<S> Deref for Context<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.state
    }
}

impl<S> DerefMut for Context<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.state
    }
}
