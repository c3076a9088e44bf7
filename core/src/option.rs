//! Named, composable mutators over `Parameters`.
//!
//! Options are values: they can be cloned, stored on a `Client` or `Rpc`,
//! and applied to many requests. Applying an option never performs I/O.
//! Scalar options overwrite, `with_query`/`with_header` merge by key, and
//! hook options append.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use ureq::tls::TlsConfig;

use crate::error::BoxError;
use crate::http::{HttpMethod, HttpResponse};
use crate::logger::Logger;
use crate::params::{BodyEncoder, CustomRequestHook, Parameters, RequestHook, ResponseHook};

#[derive(Clone)]
pub struct RequestOption {
    name: &'static str,
    apply: Arc<dyn Fn(&mut Parameters) + Send + Sync>,
}

impl RequestOption {
    fn new(name: &'static str, apply: impl Fn(&mut Parameters) + Send + Sync + 'static) -> Self {
        Self {
            name,
            apply: Arc::new(apply),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn apply(&self, params: &mut Parameters) {
        (self.apply)(params)
    }
}

impl fmt::Debug for RequestOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RequestOption").field(&self.name).finish()
    }
}

pub fn with_url(url: impl Into<String>) -> RequestOption {
    let url = url.into();
    RequestOption::new("url", move |params| params.url = url.clone())
}

pub fn with_method(method: HttpMethod) -> RequestOption {
    RequestOption::new("method", move |params| params.method = method)
}

/// Client timeout for the whole call. `Duration::ZERO` disables it.
pub fn with_timeout(timeout: Duration) -> RequestOption {
    RequestOption::new("timeout", move |params| params.timeout = timeout)
}

/// Merges entries into the query; a key given again replaces the earlier value.
pub fn with_query<I, K, V>(query: I) -> RequestOption
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    let query: Vec<(String, Value)> = query.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
    RequestOption::new("query", move |params| {
        for (key, value) in &query {
            params.query.insert(key.clone(), value.clone());
        }
    })
}

/// JSON request body, serialized when the request is encoded.
pub fn with_body<T>(body: T) -> RequestOption
where
    T: Serialize + Send + Sync + 'static,
{
    let body = Arc::new(body);
    RequestOption::new("body", move |params| {
        let body = Arc::clone(&body);
        let encoder: BodyEncoder = Arc::new(move || serde_json::to_vec(&*body));
        params.body = Some(encoder);
    })
}

/// Sends `bytes` untouched. A later `with_body` takes precedence.
pub fn with_raw_body(bytes: impl Into<Vec<u8>>) -> RequestOption {
    let bytes = bytes.into();
    RequestOption::new("raw_body", move |params| params.payload = Some(bytes.clone()))
}

pub fn with_header<I, K, V>(headers: I) -> RequestOption
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let headers: Vec<(String, String)> = headers.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
    RequestOption::new("header", move |params| {
        for (key, value) in &headers {
            params.set_header(key.as_str(), value.as_str());
        }
    })
}

/// Runs `hook` before dispatch, after the built-in query/body encoding and
/// any hooks registered earlier.
pub fn with_request_hook<F>(hook: F) -> RequestOption
where
    F: Fn(&mut Parameters) -> Result<(), BoxError> + Send + Sync + 'static,
{
    let hook: CustomRequestHook = Arc::new(hook);
    RequestOption::new("request_hook", move |params| {
        params.request_hooks.push(RequestHook::Custom(hook.clone()));
    })
}

/// Runs `hook` on the buffered response before it is decoded.
pub fn with_response_hook<F>(hook: F) -> RequestOption
where
    F: Fn(&HttpResponse) -> Result<(), BoxError> + Send + Sync + 'static,
{
    let hook: ResponseHook = Arc::new(hook);
    RequestOption::new("response_hook", move |params| {
        params.response_hooks.push(hook.clone());
    })
}

pub fn with_tls_config(config: TlsConfig) -> RequestOption {
    RequestOption::new("tls_config", move |params| {
        params.tls_config = Some(config.clone());
    })
}

pub fn with_disable_keep_alive(disable: bool) -> RequestOption {
    RequestOption::new("disable_keep_alive", move |params| {
        params.disable_keep_alive = disable;
    })
}

pub fn with_logger(logger: impl Logger + 'static) -> RequestOption {
    let logger: Arc<dyn Logger> = Arc::new(logger);
    RequestOption::new("logger", move |params| {
        params.logger = Some(Arc::clone(&logger));
    })
}
