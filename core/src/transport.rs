//! Executes plain-data requests against the network.
//!
//! # Design
//! `Transport` is the only seam through which the gateway touches I/O.
//! `UreqTransport` runs a blocking ureq agent on tokio's blocking pool and
//! reports every status code as data, so `PostsClient` stays the one place
//! that decides what counts as a failure.
//!
//! No timeout is configured here; ureq's own defaults apply. An issued
//! request cannot be cancelled.

use std::future::Future;

use ureq::{Agent, RequestBuilder};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub trait Transport: Send + Sync + 'static {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, ApiError>> + Send;
}

#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || execute_blocking(&agent, request))
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?
    }
}

fn execute_blocking(agent: &Agent, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let result = match (req.method, req.body.as_deref()) {
        (HttpMethod::Get, _) => decorate(agent.get(&req.path), &req).call(),
        (HttpMethod::Delete, _) => decorate(agent.delete(&req.path), &req).call(),
        (HttpMethod::Post, Some(body)) => decorate(agent.post(&req.path), &req).send(body.as_bytes()),
        (HttpMethod::Post, None) => decorate(agent.post(&req.path), &req).send_empty(),
        (HttpMethod::Put, Some(body)) => decorate(agent.put(&req.path), &req).send(body.as_bytes()),
        (HttpMethod::Put, None) => decorate(agent.put(&req.path), &req).send_empty(),
    };
    let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

/// Copy query parameters and headers onto a ureq builder. Headers are added
/// one by one, so repeated names are all sent.
fn decorate<B>(builder: RequestBuilder<B>, req: &HttpRequest) -> RequestBuilder<B> {
    let builder = req
        .query
        .iter()
        .fold(builder, |b, (key, value)| b.query(key, value));
    req.headers
        .iter()
        .fold(builder, |b, (name, value)| b.header(name.as_str(), value.as_str()))
}
