use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const AUTH_HEADER: &str = "auth";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Keyed collection in insertion order, exactly as served.
pub type Db = Arc<RwLock<Map<String, Value>>>;

/// Requests seen by a recording store, oldest first.
pub type RequestLog = Arc<RwLock<Vec<RecordedRequest>>>;

/// What arrived at the store, before the credential check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    /// Raw query string, if the URI had one.
    pub query: Option<String>,
    /// Header names are lowercase; non-UTF-8 values are left out.
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Clone)]
struct AppState {
    db: Db,
    required_auth: Option<String>,
    log: Option<RequestLog>,
}

/// Store that accepts any request.
pub fn app() -> Router {
    router(None, None)
}

/// Store that answers 401 unless one of the request's `Auth` headers equals
/// `credential`.
pub fn app_requiring_auth(credential: &str) -> Router {
    router(Some(credential.to_string()), None)
}

/// Like [`app_requiring_auth`], and also records every request it receives.
pub fn recording_app(credential: &str) -> (Router, RequestLog) {
    let log = RequestLog::default();
    let router = router(Some(credential.to_string()), Some(Arc::clone(&log)));
    (router, log)
}

fn router(required_auth: Option<String>, log: Option<RequestLog>) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Map::new())),
        required_auth,
        log,
    };
    Router::new()
        .route(
            "/posts.json",
            get(list_posts).post(create_post).delete(delete_posts),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .route_layer(middleware::from_fn_with_state(state.clone(), record_request))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, app()).await
}

pub async fn serve(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

async fn record_request(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(log) = &state.log {
        let headers = request
            .headers()
            .iter()
            .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
            .collect();
        log.write().await.push(RecordedRequest {
            method: request.method().to_string(),
            query: request.uri().query().map(str::to_string),
            headers,
        });
    }
    next.run(request).await
}

async fn require_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(expected) = &state.required_auth {
        let authorized = request
            .headers()
            .get_all(AUTH_HEADER)
            .iter()
            .any(|value| value.as_bytes() == expected.as_bytes());
        if !authorized {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "Permission denied"})),
            )
                .into_response();
        }
    }
    next.run(request).await
}

/// An empty store reads as `null`, not `{}`.
async fn list_posts(State(state): State<AppState>) -> Json<Value> {
    let posts = state.db.read().await;
    if posts.is_empty() {
        return Json(Value::Null);
    }
    Json(Value::Object(posts.clone()))
}

async fn create_post(
    State(state): State<AppState>,
    Json(input): Json<NewPost>,
) -> (StatusCode, Json<Value>) {
    let key = format!("-{}", Uuid::new_v4().simple());
    let entry = json!({"title": input.title, "content": input.content});
    state.db.write().await.insert(key.clone(), entry);
    info!(%key, "post created");
    (StatusCode::OK, Json(json!({ "name": key })))
}

async fn delete_posts(State(state): State<AppState>) -> Json<Value> {
    let mut posts = state.db.write().await;
    let removed = posts.len();
    posts.clear();
    info!(removed, "posts deleted");
    Json(Value::Null)
}
