// Error types for the chainroute router

use crate::HttpStatus;
use thiserror::Error;

/// Boxed error carried through unchanged from a failing middleware.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    /// A registration call received an inconsistent combination of arguments.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The request did not normalize to an absolute URL.
    #[error("Request URL must be absolute: {0}")]
    InvalidRequest(String),

    #[error("No middleware returned a response for the request.")]
    NoMatch,

    #[error(
        "A middleware returned a response asynchronously while the request was being handled synchronously."
    )]
    SyncViolation,

    /// Failure raised by a middleware. Display and source are forwarded as-is.
    #[error(transparent)]
    Middleware(BoxError),
}

impl Error {
    /// Wrap an arbitrary error raised inside a middleware.
    pub fn middleware<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Error::Middleware(error.into())
    }

    /// Build a middleware failure from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Error::Middleware(message.into().into())
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, Error::NoMatch)
    }

    pub fn is_sync_violation(&self) -> bool {
        matches!(self, Error::SyncViolation)
    }

    pub fn is_invalid_request(&self) -> bool {
        matches!(self, Error::InvalidRequest(_))
    }

    pub fn is_middleware(&self) -> bool {
        matches!(self, Error::Middleware(_))
    }

    /// Get the HTTP status code a caller would typically answer with
    pub fn status_code(&self) -> u16 {
        self.http_status().code()
    }

    /// Get the HttpStatus enum for this error
    pub fn http_status(&self) -> HttpStatus {
        match self {
            Error::InvalidArguments(_) | Error::InvalidRequest(_) => HttpStatus::BadRequest,
            Error::NoMatch => HttpStatus::NotFound,
            Error::SyncViolation | Error::Middleware(_) => HttpStatus::InternalServerError,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::middleware(error)
    }
}
