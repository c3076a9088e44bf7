//! Error types for the request pipeline and the RPC adapter.
//!
//! # Design
//! Every failure a call can hit maps to one `Error` variant, tagged with the
//! pipeline stage that produced it. Caller-supplied hooks and transforms
//! report failures as `BoxError`; the pipeline wraps them with the stage and
//! position so the original cause stays reachable through `source()`.

use std::fmt;

use thiserror::Error;

use crate::context::ContextError;
use crate::http::HttpMethod;

/// Boxed error returned by caller-supplied hooks and transforms.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by `Client` and `Rpc` calls.
#[derive(Debug, Error)]
pub enum Error {
    /// The query could not be merged into the URL, or the body could not be
    /// serialized to JSON.
    #[error("failed to encode {what}: {source}")]
    Encoding {
        what: String,
        #[source]
        source: BoxError,
    },

    /// A caller-registered request or response hook failed. Hooks after it
    /// did not run.
    #[error("{stage} hook #{index} failed: {source}")]
    Hook {
        stage: HookStage,
        index: usize,
        #[source]
        source: BoxError,
    },

    /// The request never produced a complete response: connection, TLS,
    /// timeout, body read, or caller cancellation.
    #[error("{method} {url} failed: {source}")]
    Transport {
        method: HttpMethod,
        url: String,
        #[source]
        source: TransportError,
    },

    /// The response body is JSON but does not fit the result type, or is
    /// not valid UTF-8 text.
    #[error("failed to decode response body into {type_name}: {source}")]
    Decoding {
        type_name: &'static str,
        #[source]
        source: BoxError,
    },

    /// The response body is plain text and the result type cannot hold a
    /// string.
    #[error("response body is not JSON and {type_name} cannot hold raw text")]
    ResultType { type_name: &'static str },

    /// The RPC adapter could not turn a parameter value into a flat map.
    #[error("failed to transform rpc parameter: {source}")]
    Transform {
        #[source]
        source: BoxError,
    },

    /// Releasing the response body failed after an otherwise successful call.
    #[error("failed to release response body: {source}")]
    Close {
        #[source]
        source: std::io::Error,
    },
}

/// Which hook chain an `Error::Hook` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    Request,
    Response,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookStage::Request => write!(f, "request"),
            HookStage::Response => write!(f, "response"),
        }
    }
}

/// Underlying cause of an `Error::Transport`.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] ureq::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Context(#[from] ContextError),
}

impl Error {
    /// True when the call was stopped by the caller's context rather than
    /// by the network.
    pub fn is_context(&self) -> bool {
        matches!(
            self,
            Error::Transport {
                source: TransportError::Context(_),
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn hook_error_keeps_cause() {
        let err = Error::Hook {
            stage: HookStage::Response,
            index: 2,
            source: "boom".into(),
        };
        assert_eq!(err.to_string(), "response hook #2 failed: boom");
        assert_eq!(err.source().unwrap().to_string(), "boom");
    }

    #[test]
    fn transport_error_names_request() {
        let err = Error::Transport {
            method: HttpMethod::Post,
            url: "http://h/json".to_string(),
            source: ContextError::Cancelled.into(),
        };
        assert_eq!(err.to_string(), "POST http://h/json failed: context cancelled");
        assert!(err.is_context());
    }

    #[test]
    fn result_type_error_names_type() {
        let err = Error::ResultType { type_name: "Ret" };
        assert!(err.to_string().contains("Ret cannot hold raw text"));
        assert!(!err.is_context());
    }
}
