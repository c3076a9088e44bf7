use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Echo};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder().method(method).uri(uri).body(String::new()).unwrap()
}

// --- json ---

#[tokio::test]
async fn json_get_returns_envelope() {
    let resp = app().oneshot(empty_request("GET", "/json")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let value: serde_json::Value = body_json(resp).await;
    assert_eq!(value, serde_json::json!({ "code": 1, "msg": "", "data": [3] }));
}

#[tokio::test]
async fn json_post_echoes_body_into_msg() {
    let resp = app()
        .oneshot(json_request("POST", "/json?a=A", r#"{"a":"A"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let value: serde_json::Value = body_json(resp).await;
    assert_eq!(value["msg"]["a"], "A");
    assert_eq!(value["data"], serde_json::json!([3]));
}

#[tokio::test]
async fn json_rejects_put() {
    let resp = app().oneshot(empty_request("PUT", "/json")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// --- string / text / empty ---

#[tokio::test]
async fn string_returns_quoted_json_string() {
    let resp = app().oneshot(empty_request("GET", "/string")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(&body_bytes(resp).await[..], br#""hello world""#);
}

#[tokio::test]
async fn text_returns_plain_text() {
    let resp = app().oneshot(empty_request("GET", "/text")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(&body_bytes(resp).await[..], b"hello world\n");
}

#[tokio::test]
async fn empty_returns_no_body() {
    let resp = app().oneshot(empty_request("POST", "/empty")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_bytes(resp).await.is_empty());
}

// --- echo ---

#[tokio::test]
async fn echo_reports_request() {
    let resp = app()
        .oneshot(json_request("POST", "/echo?b=2&a=1", r#"{"k":"v"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.path, "/echo");
    assert_eq!(echo.query.as_deref(), Some("b=2&a=1"));
    assert_eq!(echo.headers["content-type"], "application/json");
    assert_eq!(echo.body, r#"{"k":"v"}"#);
}

#[tokio::test]
async fn echo_without_query() {
    let resp = app().oneshot(empty_request("DELETE", "/echo")).await.unwrap();

    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "DELETE");
    assert!(echo.query.is_none());
    assert!(echo.body.is_empty());
}

// --- unknown ---

#[tokio::test]
async fn unknown_route_returns_404() {
    let resp = app().oneshot(empty_request("GET", "/missing")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
