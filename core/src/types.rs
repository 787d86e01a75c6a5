//! Domain DTOs for the posts store.
//!
//! # Design
//! The store keeps posts under server-generated keys, so a `Post` only has an
//! `id` once it has been read back. The write path sends `NewPost`, which has
//! no id at all, and the store acknowledges with the generated key.

use serde::{Deserialize, Serialize};

/// A post as held by the caller.
///
/// `id` is `None` for a post that has not been persisted yet and `Some(key)`
/// for every post produced by a fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Post {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            id: None,
        }
    }
}

/// Request payload for storing a post. Only the raw fields are sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
}

impl From<&Post> for NewPost {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            content: post.content.clone(),
        }
    }
}

/// The store's acknowledgement of a create: the key it assigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedKey {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsaved_post_omits_id() {
        let json = serde_json::to_value(Post::new("A", "x")).unwrap();
        assert_eq!(json, serde_json::json!({"title": "A", "content": "x"}));
    }

    #[test]
    fn new_post_drops_the_id() {
        let post = Post {
            title: "A".to_string(),
            content: "x".to_string(),
            id: Some("k1".to_string()),
        };
        let json = serde_json::to_value(NewPost::from(&post)).unwrap();
        assert!(json.get("id").is_none());
    }
}
