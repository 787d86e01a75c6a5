//! Conversion from the store's keyed-object wire format to an ordered
//! collection of posts.
//!
//! The store answers a read with `{"<key>": {"title": .., "content": ..}, ..}`
//! or with `null` when nothing is stored. Decoding keeps the keys in the
//! order they appear in the body (`serde_json` is built with
//! `preserve_order`), and each key becomes the `id` of its post.

use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::types::Post;

/// Raw keyed collection as delivered by the store.
pub type RawPosts = Map<String, Value>;

/// Decode a read body into the raw keyed collection.
///
/// An empty body and a `null` body both mean "nothing stored" and decode to
/// `None`. Any other top-level value that is not an object is an error.
pub fn decode_collection(body: &str) -> Result<Option<RawPosts>, ApiError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let value: Value =
        serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))?;
    match value {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        other => Err(ApiError::DeserializationError(format!(
            "expected a keyed object, got {}",
            kind(&other)
        ))),
    }
}

/// Turn the raw keyed collection into posts, one per entry, in key order.
///
/// Every entry of the map becomes a post; a decoded JSON object holds only
/// its own entries, so there is nothing to filter out. Malformed entries pass
/// through: a value that is not an object, or an object missing `title` or
/// `content`, yields empty strings for what is missing. A field holding a
/// non-string value keeps that value rendered as JSON text.
pub fn to_collection(raw: Option<RawPosts>) -> Vec<Post> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    raw.into_iter()
        .map(|(key, value)| Post {
            title: field_text(&value, "title"),
            content: field_text(&value, "content"),
            id: Some(key),
        })
        .collect()
}

fn field_text(entry: &Value, name: &str) -> String {
    match entry.get(name) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
