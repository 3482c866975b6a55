// Matching middleware built from a method pattern, a path pattern and a responder

use crate::{
    Context, HttpStatus, MethodPattern, Middleware, PathPattern, Reply, Request, Response,
    ResponseInit, Result,
};
use std::fmt;
use std::sync::Arc;

/// What a route does once its patterns match: answer with a fixed response,
/// or delegate to a handler.
pub enum Responder<S> {
    Static(ResponseInit),
    Handler(Arc<dyn Middleware<S>>),
}

impl<S: 'static> Responder<S> {
    /// Build a handler responder from a closure.
    ///
    /// ```
    /// use chainroute_core::{Reply, Responder, ResponseInit};
    ///
    /// let responder: Responder<()> = Responder::handler(|req, _ctx| {
    ///     Ok(Reply::respond(ResponseInit::ok().with_body(req.path())))
    /// });
    /// # let _ = responder;
    /// ```
    pub fn handler<F>(handler: F) -> Self
    where
        F: for<'a> Fn(&'a Request, &'a mut Context<S>) -> Result<Reply<'a>>
            + Send
            + Sync
            + 'static,
    {
        Responder::Handler(Arc::new(handler))
    }

    pub fn middleware<M: Middleware<S>>(middleware: M) -> Self {
        Responder::Handler(Arc::new(middleware))
    }

    pub fn fixed(response: impl Into<ResponseInit>) -> Self {
        Responder::Static(response.into())
    }
}

impl<S> Clone for Responder<S> {
    fn clone(&self) -> Self {
        match self {
            Responder::Static(response) => Responder::Static(response.clone()),
            Responder::Handler(handler) => Responder::Handler(Arc::clone(handler)),
        }
    }
}

impl<S> fmt::Debug for Responder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Responder::Static(response) => f.debug_tuple("Static").field(response).finish(),
            Responder::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

impl<S> From<ResponseInit> for Responder<S> {
    fn from(response: ResponseInit) -> Self {
        Responder::Static(response)
    }
}

impl<S> From<Response> for Responder<S> {
    fn from(response: Response) -> Self {
        Responder::Static(response.into())
    }
}

impl<S> From<HttpStatus> for Responder<S> {
    fn from(status: HttpStatus) -> Self {
        Responder::Static(status.into())
    }
}

/// Middleware that only answers requests matching its patterns.
///
/// Named segments captured by the path pattern are merged into the context
/// before the responder runs.
pub struct Route<S> {
    method: MethodPattern,
    path: PathPattern,
    responder: Responder<S>,
}

impl<S> Route<S> {
    pub fn new(
        method: impl Into<MethodPattern>,
        path: impl Into<PathPattern>,
        responder: impl Into<Responder<S>>,
    ) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            responder: responder.into(),
        }
    }

    pub fn method(&self) -> &MethodPattern {
        &self.method
    }

    pub fn path(&self) -> &PathPattern {
        &self.path
    }

    pub fn responder(&self) -> &Responder<S> {
        &self.responder
    }
}

impl<S> fmt::Debug for Route<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path.as_str())
            .field("responder", &self.responder)
            .finish()
    }
}

impl<S: Send + 'static> Middleware<S> for Route<S> {
    fn handle<'a>(
        &'a self,
        request: &'a Request,
        context: &'a mut Context<S>,
    ) -> Result<Reply<'a>> {
        if !self.method.matches(&request.method) {
            return Ok(Reply::Empty);
        }
        let Some(params) = self.path.captures(&request.url) else {
            return Ok(Reply::Empty);
        };
        context.params_mut().extend(params);

        match &self.responder {
            Responder::Static(response) => Ok(Reply::Ready(response.clone())),
            Responder::Handler(handler) => handler.handle(request, context),
        }
    }
}
