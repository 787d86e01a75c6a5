//! Client-side data access for a remote keyed JSON store of posts.
//!
//! # Overview
//! Creates, fetches and deletes posts over HTTP, reshapes the store's keyed
//! object into an ordered list, attaches a credential header to every
//! request and broadcasts failures to any number of observers.
//!
//! # Design
//! - `PostsClient` is sans-IO: `build_*` produces an `HttpRequest`, `parse_*`
//!   consumes an `HttpResponse`.
//! - Every request passes through the `RequestInterceptor` chain; each
//!   interceptor returns a modified copy and never mutates its input.
//! - `PostsGateway` executes requests through a `Transport` and publishes
//!   failures on an `ErrorBus`, a synchronous multicast with no replay.
//! - `PostsView` is a headless consumer of the gateway and the bus.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod bus;
pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod interceptor;
pub mod transcode;
pub mod transport;
pub mod types;
pub mod view;

pub use bus::{ErrorBus, ErrorEvent, Subscription};
pub use client::PostsClient;
pub use config::StoreConfig;
pub use error::ApiError;
pub use gateway::PostsGateway;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use interceptor::{AuthInterceptor, LoggingInterceptor, RequestInterceptor};
pub use transcode::{decode_collection, to_collection, RawPosts};
pub use transport::{Transport, UreqTransport};
pub use types::{CreatedKey, NewPost, Post};
pub use view::{PostsView, ViewState};
