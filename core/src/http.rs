//! HTTP transport types shared by the client, interceptors and transports.
//!
//! # Design
//! Requests and responses are plain data. `PostsClient` builds `HttpRequest`
//! values, interceptors produce modified copies of them, and a `Transport`
//! turns one into an `HttpResponse`. Nothing here touches the network.
//!
//! Headers are an ordered list of pairs rather than a map so that a header
//! can appear more than once. Interceptors append, they never replace.

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
///
/// `path` is the absolute URL without a query string; query parameters live
/// in `query` and are encoded by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// All values of the header `name`, compared case-insensitively, in the
    /// order they were attached.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// First value of the header `name`, if any.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Copy of this request with one more header appended.
    pub fn with_header(&self, name: &str, value: &str) -> HttpRequest {
        let mut copy = self.clone();
        copy.headers.push((name.to_string(), value.to_string()));
        copy
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
