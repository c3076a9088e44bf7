//! RPC convenience layer over `Client`.
//!
//! # Design
//! A typed parameter value is serialized with serde and handed to a
//! transform that produces a flat string-keyed map. `get` sends the map as
//! the query string, `post` as the JSON body. Key names follow the
//! parameter type's serde attributes, and nested structs marked
//! `#[serde(flatten)]` land at the top level. Both transforms can be
//! replaced, independently, on any `Rpc` value.
//!
//! Maps and structs serialize to the same JSON object, so a transform sees
//! both. The default transform returns an object unchanged, which is what
//! keeps a map parameter as-is; a custom transform is responsible for
//! passing maps through if it wants that.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::client::Client;
use crate::context::Context;
use crate::error::{BoxError, Error};
use crate::option::{with_body, with_query, RequestOption};

/// Flat parameter map produced by a transform.
pub type Params = serde_json::Map<String, Value>;

pub type Transform = Arc<dyn Fn(&Value) -> Result<Params, BoxError> + Send + Sync>;

/// Default transform: `null` becomes an empty map, an object is used as-is,
/// anything else is rejected.
pub fn flatten(value: &Value) -> Result<Params, BoxError> {
    match value {
        Value::Null => Ok(Params::new()),
        Value::Object(map) => Ok(map.clone()),
        other => Err(format!("rpc parameter must serialize to an object, got {}", kind(other)).into()),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Clone)]
pub struct Rpc {
    client: Client,
    options: Vec<RequestOption>,
    query_transform: Transform,
    body_transform: Transform,
}

impl Default for Rpc {
    fn default() -> Self {
        Self {
            client: Client::new(),
            options: Vec::new(),
            query_transform: Arc::new(flatten),
            body_transform: Arc::new(flatten),
        }
    }
}

impl fmt::Debug for Rpc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rpc")
            .field("client", &self.client)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Rpc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Options applied to every call, before the parameter map.
    pub fn with_options(mut self, options: Vec<RequestOption>) -> Self {
        self.options = options;
        self
    }

    /// Replaces both the query and the body transform.
    pub fn with_transform<F>(self, transform: F) -> Self
    where
        F: Fn(&Value) -> Result<Params, BoxError> + Send + Sync + 'static,
    {
        let transform: Transform = Arc::new(transform);
        Self {
            query_transform: Arc::clone(&transform),
            body_transform: transform,
            ..self
        }
    }

    pub fn with_query_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&Value) -> Result<Params, BoxError> + Send + Sync + 'static,
    {
        self.query_transform = Arc::new(transform);
        self
    }

    pub fn with_body_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&Value) -> Result<Params, BoxError> + Send + Sync + 'static,
    {
        self.body_transform = Arc::new(transform);
        self
    }

    /// Sends `param` as the query string of a GET.
    pub fn get<P, T>(
        &self,
        ctx: &Context,
        url: &str,
        param: Option<&P>,
        result: &mut T,
        options: Vec<RequestOption>,
    ) -> Result<(), Error>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let params = to_params(param, &self.query_transform)?;
        let mut all = self.options.clone();
        if !params.is_empty() {
            all.push(with_query(params));
        }
        all.extend(options);
        self.client.get(ctx, url, result, all)
    }

    /// Sends `param` as the JSON body of a POST. `None` sends `{}`.
    pub fn post<P, T>(
        &self,
        ctx: &Context,
        url: &str,
        param: Option<&P>,
        result: &mut T,
        options: Vec<RequestOption>,
    ) -> Result<(), Error>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let params = to_params(param, &self.body_transform)?;
        let mut all = self.options.clone();
        all.push(with_body(Value::Object(params)));
        all.extend(options);
        self.client.post(ctx, url, result, all)
    }
}

fn to_params<P: Serialize + ?Sized>(param: Option<&P>, transform: &Transform) -> Result<Params, Error> {
    let Some(param) = param else {
        return Ok(Params::new());
    };
    let value = serde_json::to_value(param).map_err(|source| Error::Transform { source: source.into() })?;
    transform(&value).map_err(|source| Error::Transform { source })
}

/// `Rpc::get` on a default `Rpc`.
pub fn get<P, T>(
    ctx: &Context,
    url: &str,
    param: Option<&P>,
    result: &mut T,
    options: Vec<RequestOption>,
) -> Result<(), Error>
where
    P: Serialize + ?Sized,
    T: DeserializeOwned,
{
    Rpc::new().get(ctx, url, param, result, options)
}

/// `Rpc::post` on a default `Rpc`.
pub fn post<P, T>(
    ctx: &Context,
    url: &str,
    param: Option<&P>,
    result: &mut T,
    options: Vec<RequestOption>,
) -> Result<(), Error>
where
    P: Serialize + ?Sized,
    T: DeserializeOwned,
{
    Rpc::new().post(ctx, url, param, result, options)
}
