// Middleware contract for the dispatch chain

use crate::{Context, Error, Request, ResponseInit, Result};
use futures_util::future::BoxFuture;
use std::future::Future;

/// Outcome of an eventual middleware reply: a response, or no opinion.
pub type PendingOutcome = Result<Option<ResponseInit>, Error>;

/// What a middleware produces for one request.
///
/// The lifetime ties a pending reply to the request and context borrows, so
/// an asynchronous handler may keep using the context across suspension
/// points.
pub enum Reply<'a> {
    /// No opinion; dispatch moves on to the next middleware.
    Empty,
    /// A response produced synchronously.
    Ready(ResponseInit),
    /// A response (or no opinion) produced asynchronously.
    Pending(BoxFuture<'a, PendingOutcome>),
}

impl<'a> Reply<'a> {
    pub fn empty() -> Self {
        Reply::Empty
    }

    pub fn respond(response: impl Into<ResponseInit>) -> Self {
        Reply::Ready(response.into())
    }

    /// Wrap a future resolving to a response or to no opinion.
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = PendingOutcome> + Send + 'a,
    {
        Reply::Pending(Box::pin(future))
    }

    /// Wrap a future that always resolves to a response.
    pub fn deferred<F, R>(future: F) -> Self
    where
        F: Future<Output = Result<R, Error>> + Send + 'a,
        R: Into<ResponseInit>,
    {
        Reply::Pending(Box::pin(async move { future.await.map(|r| Some(r.into())) }))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Reply::Empty)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Reply::Pending(_))
    }
}

impl From<ResponseInit> for Reply<'_> {
    fn from(response: ResponseInit) -> Self {
        Reply::Ready(response)
    }
}

impl From<Option<ResponseInit>> for Reply<'_> {
    fn from(response: Option<ResponseInit>) -> Self {
        response.map_or(Reply::Empty, Reply::Ready)
    }
}

impl std::fmt::Debug for Reply<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reply::Empty => f.write_str("Empty"),
            Reply::Ready(response) => f.debug_tuple("Ready").field(response).finish(),
            Reply::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// A link in the router's chain.
///
/// Returning `Err` fails the routing call with that error, unchanged.
pub trait Middleware<S>: Send + Sync + 'static {
    fn handle<'a>(&'a self, request: &'a Request, context: &'a mut Context<S>)
    -> Result<Reply<'a>>;
}

impl<S, F> Middleware<S> for F
where
    F: for<'a> Fn(&'a Request, &'a mut Context<S>) -> Result<Reply<'a>> + Send + Sync + 'static,
{
    fn handle<'a>(
        &'a self,
        request: &'a Request,
        context: &'a mut Context<S>,
    ) -> Result<Reply<'a>> {
        self(request, context)
    }
}
