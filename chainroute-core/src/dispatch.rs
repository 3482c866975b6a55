// Suspension strategies shared by the sync and async entry points

use crate::middleware::PendingOutcome;
use crate::{Error, Mode};
use futures_util::future::BoxFuture;
use std::future::Future;

/// How the dispatch loop settles a pending middleware reply.
///
/// Both entry points run the same dispatch future; only this strategy
/// differs between them.
pub(crate) trait Suspension {
    const MODE: Mode;

    fn settle<'a>(
        pending: BoxFuture<'a, PendingOutcome>,
    ) -> impl Future<Output = PendingOutcome> + Send + 'a;
}

/// Sync mode. A pending reply is a fault; the future is dropped unpolled.
pub(crate) struct Blocking;

impl Suspension for Blocking {
    const MODE: Mode = Mode::Sync;

    fn settle<'a>(
        pending: BoxFuture<'a, PendingOutcome>,
    ) -> impl Future<Output = PendingOutcome> + Send + 'a {
        drop(pending);
        std::future::ready(Err(Error::SyncViolation))
    }
}

/// Async mode. A pending reply is awaited.
pub(crate) struct Awaiting;

impl Suspension for Awaiting {
    const MODE: Mode = Mode::Async;

    fn settle<'a>(
        pending: BoxFuture<'a, PendingOutcome>,
    ) -> impl Future<Output = PendingOutcome> + Send + 'a {
        pending
    }
}
