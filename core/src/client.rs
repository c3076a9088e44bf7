//! Blocking HTTP client driven by request options.
//!
//! # Design
//! `Client` holds only options bound at construction (for example a shared
//! TLS config) and carries no per-request state: every call builds fresh
//! `Parameters` from `with_url(url)`, the bound options, the call's options
//! and, for `get`/`post`, the forced method, in that order.

use serde::de::DeserializeOwned;

use crate::context::Context;
use crate::error::Error;
use crate::http::{HttpMethod, HttpRequest};
use crate::option::{with_method, RequestOption};
use crate::pipeline;

#[derive(Debug, Clone, Default)]
pub struct Client {
    options: Vec<RequestOption>,
}

impl Client {
    pub fn new() -> Self {
        Self::default()
    }

    /// A client that applies `options` to every call before the call's own.
    pub fn with_options(options: Vec<RequestOption>) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &[RequestOption] {
        &self.options
    }

    /// Runs the options and request hooks and returns the request that
    /// would be sent, without sending it.
    pub fn prepare(&self, url: &str, options: Vec<RequestOption>) -> Result<HttpRequest, Error> {
        let params = pipeline::prepare(url, self.options.iter().chain(&options))?;
        Ok(params.request())
    }

    /// Sends one request. With `result` set to `None` the response body is
    /// read and discarded.
    pub fn execute<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        url: &str,
        result: Option<&mut T>,
        options: Vec<RequestOption>,
    ) -> Result<(), Error> {
        let params = pipeline::prepare(url, self.options.iter().chain(&options))?;
        pipeline::run(ctx, params, result)
    }

    pub fn get<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        url: &str,
        result: &mut T,
        options: Vec<RequestOption>,
    ) -> Result<(), Error> {
        self.execute(ctx, url, Some(result), forced(options, HttpMethod::Get))
    }

    pub fn post<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        url: &str,
        result: &mut T,
        options: Vec<RequestOption>,
    ) -> Result<(), Error> {
        self.execute(ctx, url, Some(result), forced(options, HttpMethod::Post))
    }
}

fn forced(mut options: Vec<RequestOption>, method: HttpMethod) -> Vec<RequestOption> {
    options.push(with_method(method));
    options
}

/// `GET` with a fresh default client.
pub fn get<T: DeserializeOwned>(
    ctx: &Context,
    url: &str,
    result: &mut T,
    options: Vec<RequestOption>,
) -> Result<(), Error> {
    Client::new().get(ctx, url, result, options)
}

/// `POST` with a fresh default client.
pub fn post<T: DeserializeOwned>(
    ctx: &Context,
    url: &str,
    result: &mut T,
    options: Vec<RequestOption>,
) -> Result<(), Error> {
    Client::new().post(ctx, url, result, options)
}
