//! Stateless request builder and response parser for the posts store.
//!
//! # Design
//! `PostsClient` holds only its `StoreConfig` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. Interceptors and the network round-trip happen in between,
//! outside this type.

use crate::config::StoreConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transcode;
use crate::types::{CreatedKey, NewPost, Post};

#[derive(Debug, Clone)]
pub struct PostsClient {
    config: StoreConfig,
}

impl PostsClient {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn build_create_post(&self, input: &NewPost) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.config.collection_url(),
            query: Vec::new(),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn build_fetch_posts(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.config.collection_url(),
            query: self.config.fetch_query.clone(),
            headers: self.config.fetch_headers.clone(),
            body: None,
        }
    }

    pub fn build_delete_posts(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.config.collection_url(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Returns the key the store assigned to the new post.
    pub fn parse_create_post(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response)?;
        let key: CreatedKey = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        Ok(key.name)
    }

    pub fn parse_fetch_posts(&self, response: HttpResponse) -> Result<Vec<Post>, ApiError> {
        check_status(&response)?;
        let raw = transcode::decode_collection(&response.body)?;
        Ok(transcode::to_collection(raw))
    }

    pub fn parse_delete_posts(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)?;
        Ok(())
    }
}

/// Map non-2xx responses to `ApiError::HttpError`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> PostsClient {
        PostsClient::new(StoreConfig::new("http://localhost:3000"))
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_create_post_produces_correct_request() {
        let input = NewPost {
            title: "Hello".to_string(),
            content: "World".to_string(),
        };
        let req = client().build_create_post(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/posts.json");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"title": "Hello", "content": "World"}));
    }

    #[test]
    fn build_create_post_accepts_empty_fields() {
        let input = NewPost {
            title: String::new(),
            content: String::new(),
        };
        let req = client().build_create_post(&input).unwrap();
        assert_eq!(req.body.as_deref(), Some(r#"{"title":"","content":""}"#));
    }

    #[test]
    fn build_fetch_posts_without_extras() {
        let req = client().build_fetch_posts();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/posts.json");
        assert!(req.headers.is_empty());
        assert!(req.query.is_empty());
        assert!(req.body.is_none());
    }

    #[test]
    fn build_fetch_posts_carries_configured_extras() {
        let config = StoreConfig::new("http://localhost:3000")
            .with_fetch_header("Custom-Header", "Hello")
            .with_fetch_param("print", "pretty")
            .with_fetch_param("another", "param");
        let req = PostsClient::new(config).build_fetch_posts();
        assert_eq!(req.header("Custom-Header"), Some("Hello"));
        assert_eq!(
            req.query,
            vec![
                ("print".to_string(), "pretty".to_string()),
                ("another".to_string(), "param".to_string()),
            ]
        );
    }

    #[test]
    fn build_delete_posts_targets_whole_collection() {
        let req = client().build_delete_posts();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:3000/posts.json");
        assert!(req.body.is_none());
    }

    #[test]
    fn parse_create_post_returns_assigned_key() {
        let key = client()
            .parse_create_post(response(200, r#"{"name":"-NabcDEF"}"#))
            .unwrap();
        assert_eq!(key, "-NabcDEF");
    }

    #[test]
    fn parse_create_post_wrong_status() {
        let err = client()
            .parse_create_post(response(500, "internal error"))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, .. }));
    }

    #[test]
    fn parse_fetch_posts_success() {
        let body = r#"{"id1":{"title":"A","content":"x"},"id2":{"title":"B","content":"y"}}"#;
        let posts = client().parse_fetch_posts(response(200, body)).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id.as_deref(), Some("id1"));
        assert_eq!(posts[1].title, "B");
    }

    #[test]
    fn parse_fetch_posts_null_body_is_empty() {
        let posts = client().parse_fetch_posts(response(200, "null")).unwrap();
        assert!(posts.is_empty());
    }

    #[test]
    fn parse_fetch_posts_unauthorized() {
        let err = client()
            .parse_fetch_posts(response(401, r#"{"error":"Permission denied"}"#))
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn parse_fetch_posts_bad_json() {
        let err = client().parse_fetch_posts(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn parse_delete_posts_success() {
        assert!(client().parse_delete_posts(response(200, "null")).is_ok());
        assert!(client().parse_delete_posts(response(204, "")).is_ok());
    }

    #[test]
    fn parse_delete_posts_failure() {
        let err = client().parse_delete_posts(response(503, "")).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 503, .. }));
    }
}
