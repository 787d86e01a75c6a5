//! Remote operations on the posts collection.
//!
//! # Design
//! `PostsGateway` wires the sans-IO `PostsClient` to a `Transport`. Every
//! request passes through the interceptor chain (the credential interceptor
//! is always first) before it is executed. Each call initiates exactly one
//! request and ends in exactly one outcome; there is no retry, no timeout
//! and no cancellation at this layer.
//!
//! Failure reporting:
//! - `create_and_store` / `store_post`: the failure is published on the
//!   `ErrorBus` and goes nowhere else.
//! - `fetch_all` / `delete_all`: the failure is published on the bus and
//!   also returned to the caller.
//!
//! Calls may overlap; their outcomes arrive in whatever order the network
//! completes them.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::bus::{ErrorBus, ErrorEvent};
use crate::client::PostsClient;
use crate::config::StoreConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::interceptor::{apply_chain, AuthInterceptor, RequestInterceptor};
use crate::transport::Transport;
use crate::types::{NewPost, Post};

pub struct PostsGateway<T> {
    client: PostsClient,
    transport: Arc<T>,
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
    errors: ErrorBus,
}

impl<T> Clone for PostsGateway<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            transport: Arc::clone(&self.transport),
            interceptors: self.interceptors.clone(),
            errors: self.errors.clone(),
        }
    }
}

impl<T: Transport> PostsGateway<T> {
    pub fn new(config: StoreConfig, transport: T) -> Self {
        let auth: Arc<dyn RequestInterceptor> = Arc::new(AuthInterceptor::from_config(&config));
        Self {
            client: PostsClient::new(config),
            transport: Arc::new(transport),
            interceptors: vec![auth],
            errors: ErrorBus::new(),
        }
    }

    /// Append an interceptor; it runs after the ones already installed.
    pub fn with_interceptor(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Publish failures on `bus` instead of the gateway's own bus.
    pub fn with_error_bus(mut self, bus: ErrorBus) -> Self {
        self.errors = bus;
        self
    }

    pub fn errors(&self) -> &ErrorBus {
        &self.errors
    }

    pub fn client(&self) -> &PostsClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Store a new post in the background.
    ///
    /// Nothing is reported back to the caller; failures go to the error bus.
    /// The returned handle may be dropped. Must be called from within a
    /// Tokio runtime.
    pub fn create_and_store(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> JoinHandle<()> {
        let gateway = self.clone();
        let post = Post::new(title, content);
        tokio::spawn(async move { gateway.store_post(&post).await })
    }

    /// Awaitable body of `create_and_store`. Never fails.
    pub async fn store_post(&self, post: &Post) {
        match self.try_store(post).await {
            Ok(key) => debug!(%key, "post stored"),
            Err(err) => self.report("create", &err),
        }
    }

    pub async fn fetch_all(&self) -> Result<Vec<Post>, ApiError> {
        let result = self.try_fetch().await;
        if let Ok(posts) = &result {
            debug!(count = posts.len(), "posts fetched");
        }
        self.surface("fetch", result)
    }

    /// Remove the whole collection. The caller should only drop its local
    /// copy once this returns `Ok`.
    pub async fn delete_all(&self) -> Result<(), ApiError> {
        let result = self.try_delete().await;
        if result.is_ok() {
            debug!("posts deleted");
        }
        self.surface("delete", result)
    }

    async fn try_store(&self, post: &Post) -> Result<String, ApiError> {
        let request = self.client.build_create_post(&NewPost::from(post))?;
        let response = self.dispatch(request).await?;
        self.client.parse_create_post(response)
    }

    async fn try_fetch(&self) -> Result<Vec<Post>, ApiError> {
        let response = self.dispatch(self.client.build_fetch_posts()).await?;
        self.client.parse_fetch_posts(response)
    }

    async fn try_delete(&self) -> Result<(), ApiError> {
        let response = self.dispatch(self.client.build_delete_posts()).await?;
        self.client.parse_delete_posts(response)
    }

    async fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let request = apply_chain(&self.interceptors, request);
        debug!(method = request.method.as_str(), path = %request.path, "dispatching");
        self.transport.execute(request).await
    }

    fn surface<R>(&self, operation: &str, result: Result<R, ApiError>) -> Result<R, ApiError> {
        if let Err(err) = &result {
            self.report(operation, err);
        }
        result
    }

    fn report(&self, operation: &str, err: &ApiError) {
        warn!(operation, status = ?err.status(), error = %err, "request failed");
        self.errors.publish(ErrorEvent::from(err));
    }
}
