//! Per-request configuration assembled by options.
//!
//! # Design
//! A fresh `Parameters` is built for every call, mutated by the option chain
//! and the request hooks, and consumed once by the pipeline. The body is
//! kept as a serializer closure so that serialization failures surface in
//! the encode step rather than when the option is constructed.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use ureq::tls::TlsConfig;
use url::Url;

use crate::error::{BoxError, Error};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::logger::Logger;

/// Client timeout applied when no `with_timeout` option is given.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

pub(crate) type BodyEncoder = Arc<dyn Fn() -> serde_json::Result<Vec<u8>> + Send + Sync>;
pub(crate) type CustomRequestHook = Arc<dyn Fn(&mut Parameters) -> Result<(), BoxError> + Send + Sync>;
pub(crate) type ResponseHook = Arc<dyn Fn(&HttpResponse) -> Result<(), BoxError> + Send + Sync>;

#[derive(Clone)]
pub(crate) enum RequestHook {
    /// Merges the query into the URL and serializes the body.
    Encode,
    Custom(CustomRequestHook),
}

pub struct Parameters {
    pub(crate) url: String,
    pub(crate) method: HttpMethod,
    pub(crate) timeout: Duration,
    pub(crate) headers: BTreeMap<String, String>,
    pub(crate) query: BTreeMap<String, Value>,
    pub(crate) body: Option<BodyEncoder>,
    pub(crate) payload: Option<Vec<u8>>,
    pub(crate) request_hooks: Vec<RequestHook>,
    pub(crate) response_hooks: Vec<ResponseHook>,
    pub(crate) tls_config: Option<TlsConfig>,
    pub(crate) disable_keep_alive: bool,
    pub(crate) logger: Option<Arc<dyn Logger>>,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: HttpMethod::Get,
            timeout: DEFAULT_TIMEOUT,
            headers: BTreeMap::from([("Content-Type".to_string(), DEFAULT_CONTENT_TYPE.to_string())]),
            query: BTreeMap::new(),
            body: None,
            payload: None,
            request_hooks: vec![RequestHook::Encode],
            response_hooks: Vec::new(),
            tls_config: None,
            disable_keep_alive: false,
            logger: None,
        }
    }
}

impl fmt::Debug for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameters")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("timeout", &self.timeout)
            .field("headers", &self.headers)
            .field("query", &self.query)
            .field("has_body", &self.body.is_some())
            .field("payload_len", &self.payload.as_ref().map(Vec::len))
            .field("request_hooks", &self.request_hooks.len())
            .field("response_hooks", &self.response_hooks.len())
            .field("disable_keep_alive", &self.disable_keep_alive)
            .finish_non_exhaustive()
    }
}

impl Parameters {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Sets `key`, replacing any entry whose name differs only in case.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&key));
        self.headers.insert(key, value.into());
    }

    pub fn query(&self) -> &BTreeMap<String, Value> {
        &self.query
    }

    /// Bytes that will be sent as the request body. Filled by the encode
    /// hook when a body was given, so later hooks can see it.
    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    pub fn set_payload(&mut self, payload: impl Into<Vec<u8>>) {
        self.payload = Some(payload.into());
    }

    pub fn tls_config(&self) -> Option<&TlsConfig> {
        self.tls_config.as_ref()
    }

    pub fn disable_keep_alive(&self) -> bool {
        self.disable_keep_alive
    }

    pub(crate) fn log(&self, message: &str, fields: &[(&str, &str)]) {
        if let Some(logger) = &self.logger {
            logger.log(message, fields);
        }
    }

    /// Built-in first request hook.
    pub(crate) fn encode(&mut self) -> Result<(), Error> {
        if !self.query.is_empty() {
            let mut url = Url::parse(&self.url).map_err(|source| Error::Encoding {
                what: format!("query for url {:?}", self.url),
                source: source.into(),
            })?;
            let kept: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(key, _)| !self.query.contains_key(key.as_ref()))
                .map(|(key, value)| (key.into_owned(), value.into_owned()))
                .collect();
            {
                let mut pairs = url.query_pairs_mut();
                pairs.clear().extend_pairs(&kept);
                for (key, value) in &self.query {
                    pairs.append_pair(key, &scalar_to_string(value));
                }
            }
            self.url = String::from(url);
            self.log("Get url", &[("url", self.url.as_str())]);
        }

        if let Some(body) = &self.body {
            let data = body().map_err(|source| Error::Encoding {
                what: format!("body for url {:?}", self.url),
                source: source.into(),
            })?;
            let text = String::from_utf8_lossy(&data);
            self.log("Put url", &[("url", self.url.as_str()), ("body", text.as_ref())]);
            self.payload = Some(data);
        }
        Ok(())
    }

    pub(crate) fn request(&self) -> HttpRequest {
        HttpRequest {
            method: self.method,
            url: self.url.clone(),
            headers: self
                .headers
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            body: self.payload.clone(),
        }
    }
}

/// Renders a query value the way it appears in the URL.
pub(crate) fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
