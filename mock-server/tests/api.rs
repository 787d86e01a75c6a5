use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_requiring_auth, recording_app};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
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
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- read ---

#[tokio::test]
async fn empty_store_reads_as_null() {
    let resp = app().oneshot(empty_request("GET", "/posts.json")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, Value::Null);
}

#[tokio::test]
async fn read_ignores_query_params() {
    let resp = app()
        .oneshot(empty_request("GET", "/posts.json?print=pretty&another=param"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

// --- create ---

#[tokio::test]
async fn create_returns_generated_key() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/posts.json",
            r#"{"title":"Hello","content":"World"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let ack = body_json(resp).await;
    let key = ack["name"].as_str().unwrap();
    assert!(key.starts_with('-'));
}

#[tokio::test]
async fn create_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/posts.json", r#"{"not_title":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- unknown routes ---

#[tokio::test]
async fn other_collections_are_not_served() {
    let resp = app().oneshot(empty_request("GET", "/recipes.json")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- credential ---

#[tokio::test]
async fn missing_credential_is_rejected() {
    let resp = app_requiring_auth("Bearer xyz")
        .oneshot(empty_request("GET", "/posts.json"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Permission denied");
}

#[tokio::test]
async fn wrong_credential_is_rejected() {
    let req = Request::builder()
        .uri("/posts.json")
        .header("Auth", "Bearer nope")
        .body(String::new())
        .unwrap();
    let resp = app_requiring_auth("Bearer xyz").oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn credential_among_repeated_headers_is_accepted() {
    let req = Request::builder()
        .uri("/posts.json")
        .header("Custom-Header", "Hello")
        .header("Auth", "Bearer stale")
        .header("Auth", "Bearer xyz")
        .body(String::new())
        .unwrap();
    let resp = app_requiring_auth("Bearer xyz").oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn recording_store_logs_rejected_and_accepted_requests() {
    let (router, log) = recording_app("Bearer xyz");
    let rejected = empty_request("DELETE", "/posts.json");
    let accepted = Request::builder()
        .uri("/posts.json?print=pretty")
        .header("Custom-Header", "Hello")
        .header("Auth", "Bearer xyz")
        .body(String::new())
        .unwrap();

    let resp = router.clone().oneshot(rejected).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let resp = router.oneshot(accepted).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let seen = log.read().await;
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].method, "DELETE");
    assert_eq!(seen[0].header("auth"), None);
    assert_eq!(seen[1].method, "GET");
    assert_eq!(seen[1].query.as_deref(), Some("print=pretty"));
    assert_eq!(seen[1].header("custom-header"), Some("Hello"));
    assert_eq!(seen[1].header("auth"), Some("Bearer xyz"));
}

// --- full lifecycle ---

#[tokio::test]
async fn create_read_delete_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create two, in order
    let mut keys = Vec::new();
    for (title, content) in [("First", "one"), ("Second", "two")] {
        let body = format!(r#"{{"title":"{title}","content":"{content}"}}"#);
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request("POST", "/posts.json", &body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let ack = body_json(resp).await;
        keys.push(ack["name"].as_str().unwrap().to_string());
    }

    // read — keyed object in insertion order
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/posts.json"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let posts = body_json(resp).await;
    let posts = posts.as_object().unwrap();
    let stored_keys: Vec<&String> = posts.keys().collect();
    assert_eq!(stored_keys, keys.iter().collect::<Vec<_>>());
    assert_eq!(posts[&keys[0]]["title"], "First");
    assert_eq!(posts[&keys[1]]["content"], "two");

    // delete everything
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", "/posts.json"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(&body_bytes(resp).await[..], b"null");

    // read after delete — null again
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/posts.json"))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await, Value::Null);
}
