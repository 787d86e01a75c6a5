//! Request interceptors applied to every outgoing request.
//!
//! An interceptor receives a borrowed request and returns a new one. The
//! input is never modified, so interceptors compose in a chain without one
//! observing another's edits through a shared reference.

use std::sync::Arc;

use tracing::debug;

use crate::config::StoreConfig;
use crate::http::HttpRequest;

/// Rewrites an outgoing request. Must be total: there is no error path.
pub trait RequestInterceptor: Send + Sync {
    fn intercept(&self, request: &HttpRequest) -> HttpRequest;
}

/// Appends a fixed credential header to every request.
///
/// Existing headers with the same name are kept; the credential is added
/// alongside them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthInterceptor {
    header: String,
    value: String,
}

impl AuthInterceptor {
    pub fn new(header: &str, value: &str) -> Self {
        Self {
            header: header.to_string(),
            value: value.to_string(),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(&config.auth_header, &config.auth_token)
    }
}

impl Default for AuthInterceptor {
    fn default() -> Self {
        Self::from_config(&StoreConfig::default())
    }
}

impl RequestInterceptor for AuthInterceptor {
    fn intercept(&self, request: &HttpRequest) -> HttpRequest {
        request.with_header(&self.header, &self.value)
    }
}

/// Traces each request as it leaves and forwards an unmodified copy.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingInterceptor;

impl RequestInterceptor for LoggingInterceptor {
    fn intercept(&self, request: &HttpRequest) -> HttpRequest {
        debug!(
            method = request.method.as_str(),
            path = %request.path,
            headers = request.headers.len(),
            "outgoing request"
        );
        request.clone()
    }
}

/// Run `request` through `chain` in order.
pub fn apply_chain(chain: &[Arc<dyn RequestInterceptor>], request: HttpRequest) -> HttpRequest {
    chain
        .iter()
        .fold(request, |req, interceptor| interceptor.intercept(&req))
}
