//! Error types for the posts data-access layer.
//!
//! # Design
//! Every failure is a transport failure from the caller's point of view, but
//! the variants keep the status code and body around for debugging. Only the
//! `Display` string survives the trip through the `ErrorBus`, so the
//! `Transport` variant displays its message verbatim.

use thiserror::Error;

/// Errors returned by `PostsClient` parse methods, transports and the gateway.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The store answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The request never produced a response (unreachable host, reset, ...).
    #[error("{0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

impl ApiError {
    /// Status code of the failed response, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }
}
