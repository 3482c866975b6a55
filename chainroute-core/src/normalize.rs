// Coercion of partial inputs into canonical request, response and context

use crate::{Context, Error, HttpMethod, Mode, Request, RequestInit, Response, ResponseInit, Result};
use url::Url;

/// Turn a partial request into a canonical [`Request`].
///
/// Fails with [`Error::InvalidRequest`] unless the URL parses as an absolute
/// URL with a host.
pub fn normalise_request(init: RequestInit) -> Result<Request> {
    let url = match Url::parse(&init.url) {
        Ok(url) if url.has_host() => url,
        _ => return Err(Error::InvalidRequest(init.url)),
    };

    let method = match init.method {
        Some(method) if !method.trim().is_empty() => method,
        _ => HttpMethod::GET.as_str().to_string(),
    };

    Ok(Request {
        method,
        url,
        headers: init.headers,
        body: init.body,
    })
}

/// Fill in the status and keep every caller-supplied field.
pub fn normalise_response(init: ResponseInit, default_status: u16) -> Response {
    Response {
        status: init.status.unwrap_or(default_status),
        headers: init.headers,
        body: init.body,
        fields: init.fields,
    }
}

/// Build the per-call context from caller state and the call's mode.
pub fn normalise_context<S>(state: S, mode: Mode) -> Context<S> {
    Context::new(state, mode)
}
