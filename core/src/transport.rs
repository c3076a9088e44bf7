//! Blocking dispatch of an `HttpRequest` over `ureq`.
//!
//! # Design
//! Each call gets an agent configured from its own parameters (timeout,
//! TLS, keep-alive), so no transport state leaks between requests. Status
//! codes are returned as data; only failures to obtain a response are
//! errors here.
//!
//! The blocking send runs on a worker thread while the caller waits on its
//! `Context`. A cancelled caller returns at once; the worker's response, if
//! it ever arrives, is dropped and its connection closed with it.

use std::io;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use log::debug;

use ureq::typestate::{WithBody, WithoutBody};
use ureq::{Agent, Body, RequestBuilder};

use crate::context::Context;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest};
use crate::params::Parameters;

/// How often a caller blocked on a response re-checks its context.
const CANCEL_POLL: Duration = Duration::from_millis(10);

/// Response head plus the still-unread body.
pub(crate) struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: ResponseBody,
}

/// Response body that is released exactly once, by value.
pub(crate) struct ResponseBody {
    inner: Body,
    exhausted: bool,
}

impl ResponseBody {
    pub fn read_all(&mut self) -> Result<Vec<u8>, ureq::Error> {
        let bytes = self.inner.read_to_vec()?;
        self.exhausted = true;
        Ok(bytes)
    }

    /// Drains whatever was not read and drops the body. Returns the number
    /// of bytes discarded.
    pub fn release(mut self) -> io::Result<u64> {
        if self.exhausted {
            return Ok(0);
        }
        io::copy(&mut self.inner.as_reader(), &mut io::sink())
    }
}

pub(crate) fn agent(params: &Parameters, timeout: Option<Duration>) -> Agent {
    let mut config = Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(timeout);
    if params.disable_keep_alive() {
        config = config.max_idle_connections(0).max_idle_connections_per_host(0);
    }
    if let Some(tls) = params.tls_config() {
        config = config.tls_config(tls.clone());
    }
    config.build().new_agent()
}

/// Sends `request` and waits for the response head, giving up as soon as
/// `ctx` is cancelled or past its deadline.
pub(crate) fn dispatch_until_done(
    ctx: &Context,
    agent: Agent,
    request: &HttpRequest,
) -> Result<RawResponse, TransportError> {
    let (tx, rx) = mpsc::channel();
    let outgoing = request.clone();
    thread::Builder::new()
        .name("xhttp-dispatch".to_string())
        .spawn(move || {
            // Fails only when the caller already gave up.
            let _ = tx.send(dispatch(&agent, &outgoing));
        })?;

    loop {
        match rx.recv_timeout(CANCEL_POLL) {
            Ok(response) => return Ok(response?),
            Err(RecvTimeoutError::Timeout) => {
                if let Some(err) = ctx.err() {
                    debug!(url = request.url.as_str(), reason:% = err; "Abandoning in-flight request");
                    return Err(err.into());
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(io::Error::other("dispatch worker exited without a response").into());
            }
        }
    }
}

pub(crate) fn dispatch(agent: &Agent, request: &HttpRequest) -> Result<RawResponse, ureq::Error> {
    let url = request.url.as_str();
    let response = match request.method {
        HttpMethod::Get => send_without_body(agent.get(url), request),
        HttpMethod::Delete => send_without_body(agent.delete(url), request),
        HttpMethod::Post => send_with_body(agent.post(url), request),
        HttpMethod::Put => send_with_body(agent.put(url), request),
    }?;

    let (parts, body) = response.into_parts();
    let headers = parts
        .headers
        .iter()
        .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
        .collect();
    Ok(RawResponse {
        status: parts.status.as_u16(),
        headers,
        body: ResponseBody {
            inner: body,
            exhausted: false,
        },
    })
}

fn with_headers<B>(mut builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
    for (key, value) in &request.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    builder
}

fn send_without_body(
    builder: RequestBuilder<WithoutBody>,
    request: &HttpRequest,
) -> Result<ureq::http::Response<Body>, ureq::Error> {
    let builder = with_headers(builder, request);
    match &request.body {
        Some(body) => builder.force_send_body().send(body.as_slice()),
        None => builder.call(),
    }
}

fn send_with_body(
    builder: RequestBuilder<WithBody>,
    request: &HttpRequest,
) -> Result<ureq::http::Response<Body>, ureq::Error> {
    let builder = with_headers(builder, request);
    match &request.body {
        Some(body) => builder.send(body.as_slice()),
        None => builder.send_empty(),
    }
}
