//! Forum entities as returned by the remote API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pagination::PaginationInfo;

/// Lightweight user record, as used in references and listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub created: Option<DateTime<Utc>>,

    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,

    #[serde(default)]
    pub thread_count: u64,

    #[serde(default)]
    pub message_count: u64,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            title: None,
            created: None,
            last_seen: None,
            thread_count: 0,
            message_count: 0,
        }
    }
}

/// A category; categories form a tree on the home page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub display_order: i32,

    #[serde(default)]
    pub thread_count: u64,

    #[serde(default)]
    pub message_count: u64,

    #[serde(default)]
    pub children: Vec<Category>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub thread_count: u64,

    #[serde(default)]
    pub message_count: u64,
}

/// Pointer to the most recent message of a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestMessage {
    pub id: String,
    pub created: DateTime<Utc>,

    #[serde(default)]
    pub created_by: Option<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: String,
    pub name: String,
    pub created: DateTime<Utc>,

    #[serde(default)]
    pub created_by: Option<User>,

    #[serde(default)]
    pub pinned: bool,

    #[serde(default)]
    pub tags: Vec<Tag>,

    #[serde(default)]
    pub category_ids: Vec<String>,

    #[serde(default)]
    pub message_count: u64,

    #[serde(default)]
    pub visited_count: u64,

    #[serde(default)]
    pub latest_message: Option<LatestMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub message_id: String,
    pub content: String,
    pub created: DateTime<Utc>,

    #[serde(default)]
    pub created_by: Option<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub thread_id: String,
    pub content: String,
    pub created: DateTime<Utc>,

    #[serde(default)]
    pub created_by: Option<User>,

    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,

    #[serde(default)]
    pub parent_id: Option<String>,

    #[serde(default)]
    pub vote_score: i64,

    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub size: u64,

    pub created: DateTime<Utc>,

    #[serde(default)]
    pub created_by: Option<User>,

    #[serde(default)]
    pub approved: bool,

    #[serde(default)]
    pub download_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateMessage {
    pub id: String,
    pub source: User,
    pub destination: User,
    pub created: DateTime<Utc>,
    pub content: String,
}

/// Forum-wide counters shown in the statistics panel.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    #[serde(default)]
    pub user_count: u64,
    #[serde(default)]
    pub thread_count: u64,
    #[serde(default)]
    pub message_count: u64,
    #[serde(default)]
    pub attachment_count: u64,
    #[serde(default)]
    pub online_user_count: u64,
}

/// A named, markdown-formatted document such as the privacy policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub name: String,
    pub content: String,
}

/// One page of an API collection.
///
/// The item key differs per endpoint (`threads`, `messages`, ...), all of
/// them land in `items`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection<T> {
    #[serde(
        alias = "threads",
        alias = "messages",
        alias = "users",
        alias = "tags",
        alias = "attachments",
        alias = "comments",
        alias = "privateMessages",
        default = "Vec::new"
    )]
    pub items: Vec<T>,

    #[serde(default)]
    pub page: usize,

    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default)]
    pub total_count: usize,
}

fn default_page_size() -> usize {
    20
}

impl<T> Collection<T> {
    pub fn pagination(&self) -> PaginationInfo {
        PaginationInfo::new(self.page, self.page_size, self.total_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_accepts_endpoint_specific_key() {
        let json = r#"{
            "threads": [{"id": "t1", "name": "Hello", "created": "2024-01-01T10:00:00Z"}],
            "page": 1,
            "pageSize": 10,
            "totalCount": 11
        }"#;
        let collection: Collection<Thread> = serde_json::from_str(json).unwrap();
        assert_eq!(collection.items.len(), 1);
        assert_eq!(collection.items[0].name, "Hello");
        assert_eq!(collection.pagination().page_count(), 2);
    }

    #[test]
    fn test_user_optional_fields() {
        let user: User = serde_json::from_str(r#"{"id": "u1", "name": "alice"}"#).unwrap();
        assert_eq!(user, User::new("u1", "alice"));
    }
}
