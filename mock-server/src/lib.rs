use std::{collections::BTreeMap, time::Duration};

use axum::{
    body::Bytes,
    http::{header, HeaderMap, Method, Uri},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Delay applied by the `/slow` route.
pub const SLOW_DELAY: Duration = Duration::from_millis(500);

/// What the `/echo` route saw of the incoming request.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/json", get(json_envelope).post(json_envelope))
        .route("/string", any(json_string))
        .route("/text", any(plain_text))
        .route("/empty", any(empty))
        .route("/echo", any(echo))
        .route("/slow", any(slow))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Wraps the request body into `{"code":1,"msg":...,"data":[3]}`.
async fn json_envelope(body: Bytes) -> Json<Value> {
    let msg = if body.is_empty() {
        Value::String(String::new())
    } else {
        serde_json::from_slice(&body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
    };
    Json(json!({ "code": 1, "msg": msg, "data": [3] }))
}

async fn json_string() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], r#""hello world""#)
}

async fn plain_text() -> &'static str {
    "hello world\n"
}

async fn empty() {}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
        .collect();
    Json(Echo {
        method: method.as_str().to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn slow() -> &'static str {
    tokio::time::sleep(SLOW_DELAY).await;
    "finally"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_serializes_to_json() {
        let echo = Echo {
            method: "GET".to_string(),
            path: "/echo".to_string(),
            query: Some("a=A".to_string()),
            headers: BTreeMap::new(),
            body: String::new(),
        };
        let json = serde_json::to_value(&echo).unwrap();
        assert_eq!(json["method"], "GET");
        assert_eq!(json["query"], "a=A");
        assert_eq!(json["body"], "");
    }

    #[test]
    fn echo_roundtrips_through_json() {
        let echo = Echo {
            method: "POST".to_string(),
            path: "/echo".to_string(),
            query: None,
            headers: BTreeMap::from([("x-trace".to_string(), "1".to_string())]),
            body: r#"{"a":"A"}"#.to_string(),
        };
        let json = serde_json::to_string(&echo).unwrap();
        let back: Echo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, echo);
    }

    #[tokio::test]
    async fn envelope_embeds_json_body() {
        let Json(value) = json_envelope(Bytes::from_static(br#"{"a":"A"}"#)).await;
        assert_eq!(value, json!({ "code": 1, "msg": { "a": "A" }, "data": [3] }));
    }

    #[tokio::test]
    async fn envelope_uses_empty_msg_without_body() {
        let Json(value) = json_envelope(Bytes::new()).await;
        assert_eq!(value["msg"], "");
    }

    #[tokio::test]
    async fn envelope_keeps_non_json_body_as_text() {
        let Json(value) = json_envelope(Bytes::from_static(b"plain")).await;
        assert_eq!(value["msg"], "plain");
    }
}
