//! Process-wide settings for reaching the remote store.
//!
//! The endpoint and the credential are injected into the gateway through
//! `StoreConfig` so tests can point it at a fake backend.

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_COLLECTION: &str = "posts";
pub const DEFAULT_AUTH_HEADER: &str = "Auth";
pub const DEFAULT_AUTH_TOKEN: &str = "Bearer xyz";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Root URL of the store, without a trailing slash.
    pub base_url: String,
    /// Collection name; requests go to `<base_url>/<collection>.json`.
    pub collection: String,
    pub auth_header: String,
    pub auth_token: String,
    /// Extra headers attached to reads, ahead of any interceptor.
    pub fetch_headers: Vec<(String, String)>,
    /// Informational query parameters attached to reads.
    pub fetch_query: Vec<(String, String)>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            auth_header: DEFAULT_AUTH_HEADER.to_string(),
            auth_token: DEFAULT_AUTH_TOKEN.to_string(),
            fetch_headers: Vec::new(),
            fetch_query: Vec::new(),
        }
    }
}

impl StoreConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    /// Read `POSTS_STORE_URL`, `POSTS_COLLECTION` and `POSTS_AUTH_TOKEN`,
    /// falling back to the defaults for anything unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            base_url: lookup("POSTS_STORE_URL").unwrap_or(defaults.base_url),
            collection: lookup("POSTS_COLLECTION").unwrap_or(defaults.collection),
            auth_token: lookup("POSTS_AUTH_TOKEN").unwrap_or(defaults.auth_token),
            ..defaults
        }
    }

    pub fn with_fetch_header(mut self, name: &str, value: &str) -> Self {
        self.fetch_headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_fetch_param(mut self, name: &str, value: &str) -> Self {
        self.fetch_query.push((name.to_string(), value.to_string()));
        self
    }

    /// Full URL of the collection resource.
    pub fn collection_url(&self) -> String {
        format!(
            "{}/{}.json",
            self.base_url.trim_end_matches('/'),
            self.collection
        )
    }
}
