//! The single request/response cycle.
//!
//! # Design
//! `prepare` applies options and request hooks and produces the outgoing
//! `HttpRequest`; `run` dispatches it, runs response hooks over a buffered
//! copy of the body, decodes into the caller's result, and releases the
//! body exactly once whatever happened in between. Release failures only
//! surface when nothing failed before them.

use std::io;

use log::{debug, trace, warn};
use serde::de::DeserializeOwned;

use crate::context::Context;
use crate::decode::decode_into;
use crate::error::{Error, HookStage, TransportError};
use crate::http::{HttpRequest, HttpResponse};
use crate::option::{with_url, RequestOption};
use crate::params::{Parameters, RequestHook};
use crate::transport::{self, RawResponse};

/// Builds parameters from the option chain and runs the request hooks.
pub(crate) fn prepare<'a>(
    url: &str,
    options: impl IntoIterator<Item = &'a RequestOption>,
) -> Result<Parameters, Error> {
    let mut params = Parameters::default();
    with_url(url).apply(&mut params);
    for option in options {
        option.apply(&mut params);
    }

    let hooks = std::mem::take(&mut params.request_hooks);
    let mut index = 0;
    for hook in &hooks {
        match hook {
            RequestHook::Encode => params.encode()?,
            RequestHook::Custom(hook) => {
                hook(&mut params).map_err(|source| Error::Hook {
                    stage: HookStage::Request,
                    index,
                    source,
                })?;
                index += 1;
            }
        }
    }
    params.request_hooks = hooks;
    Ok(params)
}

pub(crate) fn run<T: DeserializeOwned>(
    ctx: &Context,
    params: Parameters,
    result: Option<&mut T>,
) -> Result<(), Error> {
    let request = params.request();
    if let Some(err) = ctx.err() {
        return Err(transport_error(&request, err.into()));
    }

    let agent = transport::agent(&params, ctx.cap(params.timeout()));
    debug!(method = request.method.as_str(), url = request.url.as_str(); "Dispatching request");
    let RawResponse {
        status,
        headers,
        mut body,
    } = transport::dispatch_until_done(ctx, agent, &request).map_err(|source| transport_error(&request, source))?;
    debug!(status = status, url = request.url.as_str(); "Received response");

    let outcome = consume(ctx, &params, &request, status, headers, &mut body, result);
    settle(outcome, body.release())
}

/// Folds the body release into the call outcome. A release failure is only
/// reported when nothing failed before it.
fn settle(outcome: Result<(), Error>, released: io::Result<u64>) -> Result<(), Error> {
    match (outcome, released) {
        (Ok(()), Ok(discarded)) => {
            if discarded > 0 {
                trace!(bytes = discarded; "Discarded response body");
            }
            Ok(())
        }
        (Ok(()), Err(source)) => Err(Error::Close { source }),
        (Err(err), Ok(_)) => Err(err),
        (Err(err), Err(close)) => {
            warn!(error:% = close; "Response body release failed after an earlier error");
            Err(err)
        }
    }
}

fn consume<T: DeserializeOwned>(
    ctx: &Context,
    params: &Parameters,
    request: &HttpRequest,
    status: u16,
    headers: Vec<(String, String)>,
    body: &mut transport::ResponseBody,
    result: Option<&mut T>,
) -> Result<(), Error> {
    if let Some(err) = ctx.err() {
        return Err(transport_error(request, err.into()));
    }

    let mut buffered = None;
    if !params.response_hooks.is_empty() {
        let bytes = body
            .read_all()
            .map_err(|source| transport_error(request, source.into()))?;
        let response = HttpResponse {
            status,
            headers,
            body: bytes,
        };
        for (index, hook) in params.response_hooks.iter().enumerate() {
            hook(&response).map_err(|source| Error::Hook {
                stage: HookStage::Response,
                index,
                source,
            })?;
        }
        buffered = Some(response.body);
    }

    // No target: the body is drained on release.
    let Some(target) = result else {
        return Ok(());
    };
    let bytes = match buffered {
        Some(bytes) => bytes,
        None => body
            .read_all()
            .map_err(|source| transport_error(request, source.into()))?,
    };
    decode_into(&bytes, target)
}

fn transport_error(request: &HttpRequest, source: TransportError) -> Error {
    Error::Transport {
        method: request.method,
        url: request.url.clone(),
        source,
    }
}
