//! Blocking HTTP client configured through composable request options, with
//! a thin RPC layer on top.
//!
//! # Overview
//! A call takes a URL, an optional result target and a list of
//! `RequestOption`s. The pipeline applies the options, encodes the query
//! and JSON body, runs caller request hooks, sends one request over `ureq`,
//! runs caller response hooks and decodes the body into the target: JSON
//! when the body is JSON, the raw text when the target accepts a string.
//!
//! # Design
//! - `Client` is stateless apart from options bound at construction; every
//!   call builds its own `Parameters`.
//! - `Context` carries caller cancellation and deadline.
//! - `rpc::Rpc` turns typed parameter values into a query map (GET) or a
//!   JSON body (POST) before delegating to `Client`.
//! - `ClientPool` is an explicit, caller-owned pool; there is no global one.
//!
//! ```no_run
//! use serde::Deserialize;
//! use xhttp_core::{get, with_query, Context};
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct Ret {
//!     code: i64,
//!     data: Vec<i64>,
//! }
//!
//! let mut ret = Ret::default();
//! get(&Context::background(), "http://127.0.0.1:8081/json", &mut ret, vec![with_query([("a", "A")])])?;
//! # Ok::<(), xhttp_core::Error>(())
//! ```

pub mod client;
pub mod context;
mod decode;
pub mod error;
pub mod http;
pub mod logger;
pub mod option;
pub mod params;
mod pipeline;
pub mod pool;
pub mod rpc;
mod transport;

pub use client::{get, post, Client};
pub use context::{Context, ContextError};
pub use error::{BoxError, Error, HookStage, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use logger::{LogFacade, Logger};
pub use option::{
    with_body, with_disable_keep_alive, with_header, with_logger, with_method, with_query, with_raw_body,
    with_request_hook, with_response_hook, with_timeout, with_tls_config, with_url, RequestOption,
};
pub use params::{Parameters, DEFAULT_CONTENT_TYPE, DEFAULT_TIMEOUT};
pub use pool::{ClientPool, PooledClient};
pub use rpc::Rpc;
pub use ureq::tls::TlsConfig;
