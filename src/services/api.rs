// src/services/api.rs

//! Remote forum API.
//!
//! Every call is JSON over HTTP. Response bodies start with a fixed sentinel
//! that is checked and stripped before parsing.

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{
    ApiConfig, Attachment, Category, Collection, Comment, Document, ListState, Message,
    PrivateMessage, SortOrder, Statistics, Tag, Thread, User,
};
use crate::utils::http::{create_async_client, decode_body, error_message};

/// Order used for the "recent threads" panel.
pub const RECENT_THREADS_ORDER: &str = "latestmessagecreated";

/// Which threads a thread list shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadFilter {
    All,
    Category(String),
    Tag(String),
    User(String),
}

impl ThreadFilter {
    fn endpoint(&self) -> String {
        match self {
            ThreadFilter::All => "threads".to_string(),
            ThreadFilter::Category(id) => format!("threads/category/{id}"),
            ThreadFilter::Tag(id) => format!("threads/tag/{id}"),
            ThreadFilter::User(id) => format!("threads/user/{id}"),
        }
    }
}

/// Operations the client needs from the forum backend.
#[async_trait]
pub trait ForumApi: Send + Sync {
    async fn get_threads(
        &self,
        filter: &ThreadFilter,
        state: &ListState,
    ) -> Result<Collection<Thread>>;

    async fn get_thread(&self, thread_id: &str) -> Result<Thread>;

    async fn get_tag(&self, tag_id: &str) -> Result<Tag>;

    async fn get_thread_messages(
        &self,
        thread_id: &str,
        state: &ListState,
    ) -> Result<Collection<Message>>;

    async fn get_latest_messages(&self, state: &ListState) -> Result<Collection<Message>>;

    async fn get_users(&self, state: &ListState) -> Result<Collection<User>>;

    async fn get_tags(&self, state: &ListState) -> Result<Collection<Tag>>;

    async fn get_attachments(&self, state: &ListState) -> Result<Collection<Attachment>>;

    async fn get_comments(&self, state: &ListState) -> Result<Collection<Comment>>;

    async fn get_private_messages(&self, state: &ListState)
    -> Result<Collection<PrivateMessage>>;

    /// Root categories, each carrying its children.
    async fn get_categories(&self) -> Result<Vec<Category>>;

    async fn get_recent_threads(&self) -> Result<Vec<Thread>>;

    async fn get_statistics(&self) -> Result<Statistics>;

    /// The logged in user, `None` for anonymous sessions.
    async fn get_current_user(&self) -> Result<Option<User>>;

    async fn get_document(&self, name: &str) -> Result<Document>;

    /// Resolve a batch of user ids in one request. Unknown ids are omitted.
    async fn search_users_by_ids(&self, ids: &[String]) -> Result<Vec<User>>;

    /// Resolve a batch of user names in one request. Unknown names are omitted.
    async fn search_users_by_names(&self, names: &[String]) -> Result<Vec<User>>;

    async fn add_message(
        &self,
        thread_id: &str,
        content: &str,
        parent_id: Option<&str>,
    ) -> Result<Message>;

    async fn edit_message(&self, message_id: &str, content: &str) -> Result<()>;

    async fn delete_message(&self, message_id: &str) -> Result<()>;

    async fn add_comment(&self, message_id: &str, content: &str) -> Result<Comment>;

    async fn rename_thread(&self, thread_id: &str, name: &str) -> Result<()>;

    async fn delete_thread(&self, thread_id: &str) -> Result<()>;

    async fn rename_attachment(&self, attachment_id: &str, name: &str) -> Result<()>;

    async fn send_private_message(&self, destination_id: &str, content: &str) -> Result<()>;
}

#[derive(Deserialize)]
struct CategoryList {
    #[serde(default)]
    categories: Vec<Category>,
}

#[derive(Deserialize)]
struct CurrentUser {
    #[serde(default)]
    user: Option<User>,
}

#[derive(Deserialize)]
struct Created<T> {
    #[serde(alias = "message", alias = "comment")]
    item: T,
}

/// [`ForumApi`] over HTTP.
pub struct HttpForumApi {
    client: Client,
    base_url: Url,
    prefix: String,
}

impl HttpForumApi {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut base_url = Url::parse(&config.base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client: create_async_client(config)?,
            base_url,
            prefix: config.response_prefix.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.endpoint(path)?;
        log::debug!("GET {url}");
        let response = self.client.get(url).query(query).send().await?;
        self.read(response).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        log::debug!("{method} {url}");
        let response = self.client.request(method, url).form(form).send().await?;
        self.read(response).await
    }

    async fn read<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let message = error_message(&body, &self.prefix);
            log::warn!("API call failed with {status}: {message}");
            return Err(AppError::api(status.as_u16(), message));
        }
        decode_body(&body, &self.prefix)
    }

    async fn collection<T: DeserializeOwned>(
        &self,
        path: &str,
        state: &ListState,
    ) -> Result<Collection<T>> {
        self.get(path, &state.query()).await
    }
}

#[async_trait]
impl ForumApi for HttpForumApi {
    async fn get_threads(
        &self,
        filter: &ThreadFilter,
        state: &ListState,
    ) -> Result<Collection<Thread>> {
        self.collection(&filter.endpoint(), state).await
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Thread> {
        self.get(&format!("threads/{thread_id}"), &[]).await
    }

    async fn get_tag(&self, tag_id: &str) -> Result<Tag> {
        self.get(&format!("tags/{tag_id}"), &[]).await
    }

    async fn get_thread_messages(
        &self,
        thread_id: &str,
        state: &ListState,
    ) -> Result<Collection<Message>> {
        self.collection(&format!("thread_messages/thread/{thread_id}"), state)
            .await
    }

    async fn get_latest_messages(&self, state: &ListState) -> Result<Collection<Message>> {
        self.collection("thread_messages", state).await
    }

    async fn get_users(&self, state: &ListState) -> Result<Collection<User>> {
        self.collection("users", state).await
    }

    async fn get_tags(&self, state: &ListState) -> Result<Collection<Tag>> {
        self.collection("tags", state).await
    }

    async fn get_attachments(&self, state: &ListState) -> Result<Collection<Attachment>> {
        self.collection("attachments", state).await
    }

    async fn get_comments(&self, state: &ListState) -> Result<Collection<Comment>> {
        self.collection("thread_message_comments", state).await
    }

    async fn get_private_messages(
        &self,
        state: &ListState,
    ) -> Result<Collection<PrivateMessage>> {
        self.collection("private_messages", state).await
    }

    async fn get_categories(&self) -> Result<Vec<Category>> {
        let list: CategoryList = self.get("categories/root", &[]).await?;
        Ok(list.categories)
    }

    async fn get_recent_threads(&self) -> Result<Vec<Thread>> {
        let state = ListState {
            order_by: Some(RECENT_THREADS_ORDER.to_string()),
            sort_order: SortOrder::Descending,
            page: 0,
        };
        let threads: Collection<Thread> = self.collection("threads", &state).await?;
        Ok(threads.items)
    }

    async fn get_statistics(&self) -> Result<Statistics> {
        self.get("statistics", &[]).await
    }

    async fn get_current_user(&self) -> Result<Option<User>> {
        let current: CurrentUser = self.get("users/current", &[]).await?;
        Ok(current.user)
    }

    async fn get_document(&self, name: &str) -> Result<Document> {
        self.get(&format!("documents/{name}"), &[]).await
    }

    async fn search_users_by_ids(&self, ids: &[String]) -> Result<Vec<User>> {
        let users: Collection<User> = self.get("users/ids", &[("ids", ids.join(","))]).await?;
        Ok(users.items)
    }

    async fn search_users_by_names(&self, names: &[String]) -> Result<Vec<User>> {
        let users: Collection<User> = self
            .get("users/names", &[("names", names.join(","))])
            .await?;
        Ok(users.items)
    }

    async fn add_message(
        &self,
        thread_id: &str,
        content: &str,
        parent_id: Option<&str>,
    ) -> Result<Message> {
        let mut form = vec![("content", content)];
        if let Some(parent_id) = parent_id {
            form.push(("parentId", parent_id));
        }
        let created: Created<Message> = self
            .send(Method::POST, &format!("thread_messages/{thread_id}"), &form)
            .await?;
        Ok(created.item)
    }

    async fn edit_message(&self, message_id: &str, content: &str) -> Result<()> {
        let _: IgnoredAny = self
            .send(
                Method::PUT,
                &format!("thread_messages/{message_id}/content"),
                &[("content", content)],
            )
            .await?;
        Ok(())
    }

    async fn delete_message(&self, message_id: &str) -> Result<()> {
        let _: IgnoredAny = self
            .send(Method::DELETE, &format!("thread_messages/{message_id}"), &[])
            .await?;
        Ok(())
    }

    async fn add_comment(&self, message_id: &str, content: &str) -> Result<Comment> {
        let created: Created<Comment> = self
            .send(
                Method::POST,
                &format!("thread_message_comments/{message_id}"),
                &[("content", content)],
            )
            .await?;
        Ok(created.item)
    }

    async fn rename_thread(&self, thread_id: &str, name: &str) -> Result<()> {
        let _: IgnoredAny = self
            .send(
                Method::PUT,
                &format!("threads/{thread_id}/name"),
                &[("name", name)],
            )
            .await?;
        Ok(())
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        let _: IgnoredAny = self
            .send(Method::DELETE, &format!("threads/{thread_id}"), &[])
            .await?;
        Ok(())
    }

    async fn rename_attachment(&self, attachment_id: &str, name: &str) -> Result<()> {
        let _: IgnoredAny = self
            .send(
                Method::PUT,
                &format!("attachments/{attachment_id}/name"),
                &[("name", name)],
            )
            .await?;
        Ok(())
    }

    async fn send_private_message(&self, destination_id: &str, content: &str) -> Result<()> {
        let _: IgnoredAny = self
            .send(
                Method::POST,
                &format!("private_messages/{destination_id}"),
                &[("content", content)],
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory [`ForumApi`] that records every call.

    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::{ForumApi, ThreadFilter};
    use crate::error::{AppError, Result};
    use crate::models::{
        Attachment, Category, Collection, Comment, Document, ListState, Message, PrivateMessage,
        Statistics, Tag, Thread, User,
    };

    pub struct FakeForumApi {
        pub page_size: usize,
        pub users: Mutex<Vec<User>>,
        pub threads: Mutex<Vec<Thread>>,
        pub messages: Mutex<Vec<Message>>,
        pub tags: Mutex<Vec<Tag>>,
        pub attachments: Mutex<Vec<Attachment>>,
        pub comments: Mutex<Vec<Comment>>,
        pub private_messages: Mutex<Vec<PrivateMessage>>,
        pub categories: Mutex<Vec<Category>>,
        pub documents: Mutex<Vec<Document>>,
        pub statistics: Mutex<Statistics>,
        pub current_user: Mutex<Option<User>>,
        /// When set, every call fails with this status and message
        pub failure: Mutex<Option<(u16, String)>>,
        /// Artificial latency of collection calls, keyed by requested page
        pub page_delays: Mutex<HashMap<usize, Duration>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeForumApi {
        pub fn new() -> Self {
            Self {
                page_size: 2,
                users: Mutex::default(),
                threads: Mutex::default(),
                messages: Mutex::default(),
                tags: Mutex::default(),
                attachments: Mutex::default(),
                comments: Mutex::default(),
                private_messages: Mutex::default(),
                categories: Mutex::default(),
                documents: Mutex::default(),
                statistics: Mutex::default(),
                current_user: Mutex::default(),
                failure: Mutex::default(),
                page_delays: Mutex::default(),
                calls: Mutex::default(),
            }
        }

        pub fn with_users(users: Vec<User>) -> Self {
            let api = Self::new();
            *api.users.lock().unwrap() = users;
            api
        }

        pub fn fail_with(&self, status: u16, message: &str) {
            *self.failure.lock().unwrap() = Some((status, message.to_string()));
        }

        pub fn recover(&self) {
            *self.failure.lock().unwrap() = None;
        }

        /// Number of calls made to `method`.
        pub fn calls(&self, method: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.as_str() == method)
                .count()
        }

        pub fn total_calls(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn record(&self, method: &str) -> Result<()> {
            self.calls.lock().unwrap().push(method.to_string());
            match self.failure.lock().unwrap().as_ref() {
                Some((status, message)) => Err(AppError::api(*status, message.clone())),
                None => Ok(()),
            }
        }

        async fn page<T: Clone>(
            &self,
            method: &str,
            items: &Mutex<Vec<T>>,
            state: &ListState,
        ) -> Result<Collection<T>> {
            let delay = self.page_delays.lock().unwrap().get(&state.page).copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.record(method)?;

            let items = items.lock().unwrap();
            let start = (state.page * self.page_size).min(items.len());
            let end = (start + self.page_size).min(items.len());
            Ok(Collection {
                items: items[start..end].to_vec(),
                page: state.page,
                page_size: self.page_size,
                total_count: items.len(),
            })
        }
    }

    #[async_trait]
    impl ForumApi for FakeForumApi {
        async fn get_threads(
            &self,
            _filter: &ThreadFilter,
            state: &ListState,
        ) -> Result<Collection<Thread>> {
            self.page("get_threads", &self.threads, state).await
        }

        async fn get_thread(&self, thread_id: &str) -> Result<Thread> {
            self.record("get_thread")?;
            self.threads
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.id == thread_id)
                .cloned()
                .ok_or_else(|| AppError::api(404, format!("no thread {thread_id}")))
        }

        async fn get_tag(&self, tag_id: &str) -> Result<Tag> {
            self.record("get_tag")?;
            self.tags
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.id == tag_id)
                .cloned()
                .ok_or_else(|| AppError::api(404, format!("no tag {tag_id}")))
        }

        async fn get_thread_messages(
            &self,
            thread_id: &str,
            state: &ListState,
        ) -> Result<Collection<Message>> {
            let mut collection = self.page("get_thread_messages", &self.messages, state).await?;
            collection.items.retain(|m| m.thread_id == thread_id);
            Ok(collection)
        }

        async fn get_latest_messages(&self, state: &ListState) -> Result<Collection<Message>> {
            self.page("get_latest_messages", &self.messages, state).await
        }

        async fn get_users(&self, state: &ListState) -> Result<Collection<User>> {
            self.page("get_users", &self.users, state).await
        }

        async fn get_tags(&self, state: &ListState) -> Result<Collection<Tag>> {
            self.page("get_tags", &self.tags, state).await
        }

        async fn get_attachments(&self, state: &ListState) -> Result<Collection<Attachment>> {
            self.page("get_attachments", &self.attachments, state).await
        }

        async fn get_comments(&self, state: &ListState) -> Result<Collection<Comment>> {
            self.page("get_comments", &self.comments, state).await
        }

        async fn get_private_messages(
            &self,
            state: &ListState,
        ) -> Result<Collection<PrivateMessage>> {
            self.page("get_private_messages", &self.private_messages, state)
                .await
        }

        async fn get_categories(&self) -> Result<Vec<Category>> {
            self.record("get_categories")?;
            Ok(self.categories.lock().unwrap().clone())
        }

        async fn get_recent_threads(&self) -> Result<Vec<Thread>> {
            self.record("get_recent_threads")?;
            Ok(self.threads.lock().unwrap().clone())
        }

        async fn get_statistics(&self) -> Result<Statistics> {
            self.record("get_statistics")?;
            Ok(self.statistics.lock().unwrap().clone())
        }

        async fn get_current_user(&self) -> Result<Option<User>> {
            self.record("get_current_user")?;
            Ok(self.current_user.lock().unwrap().clone())
        }

        async fn get_document(&self, name: &str) -> Result<Document> {
            self.record("get_document")?;
            self.documents
                .lock()
                .unwrap()
                .iter()
                .find(|d| d.name == name)
                .cloned()
                .ok_or_else(|| AppError::api(404, format!("no document {name}")))
        }

        async fn search_users_by_ids(&self, ids: &[String]) -> Result<Vec<User>> {
            self.record("search_users_by_ids")?;
            let users = self.users.lock().unwrap();
            Ok(users
                .iter()
                .filter(|u| ids.contains(&u.id))
                .cloned()
                .collect())
        }

        async fn search_users_by_names(&self, names: &[String]) -> Result<Vec<User>> {
            self.record("search_users_by_names")?;
            let users = self.users.lock().unwrap();
            Ok(users
                .iter()
                .filter(|u| names.contains(&u.name))
                .cloned()
                .collect())
        }

        async fn add_message(
            &self,
            thread_id: &str,
            content: &str,
            parent_id: Option<&str>,
        ) -> Result<Message> {
            self.record("add_message")?;
            let mut messages = self.messages.lock().unwrap();
            let message = Message {
                id: format!("m{}", messages.len() + 1),
                thread_id: thread_id.to_string(),
                content: content.to_string(),
                created: Utc::now(),
                created_by: self.current_user.lock().unwrap().clone(),
                last_updated: None,
                parent_id: parent_id.map(str::to_string),
                vote_score: 0,
                comments: Vec::new(),
            };
            messages.push(message.clone());
            Ok(message)
        }

        async fn edit_message(&self, message_id: &str, content: &str) -> Result<()> {
            self.record("edit_message")?;
            let mut messages = self.messages.lock().unwrap();
            if let Some(message) = messages.iter_mut().find(|m| m.id == message_id) {
                message.content = content.to_string();
            }
            Ok(())
        }

        async fn delete_message(&self, message_id: &str) -> Result<()> {
            self.record("delete_message")?;
            self.messages.lock().unwrap().retain(|m| m.id != message_id);
            Ok(())
        }

        async fn add_comment(&self, message_id: &str, content: &str) -> Result<Comment> {
            self.record("add_comment")?;
            let mut comments = self.comments.lock().unwrap();
            let comment = Comment {
                id: format!("c{}", comments.len() + 1),
                message_id: message_id.to_string(),
                content: content.to_string(),
                created: Utc::now(),
                created_by: self.current_user.lock().unwrap().clone(),
            };
            comments.push(comment.clone());
            Ok(comment)
        }

        async fn rename_thread(&self, thread_id: &str, name: &str) -> Result<()> {
            self.record("rename_thread")?;
            let mut threads = self.threads.lock().unwrap();
            if let Some(thread) = threads.iter_mut().find(|t| t.id == thread_id) {
                thread.name = name.to_string();
            }
            Ok(())
        }

        async fn delete_thread(&self, thread_id: &str) -> Result<()> {
            self.record("delete_thread")?;
            self.threads.lock().unwrap().retain(|t| t.id != thread_id);
            Ok(())
        }

        async fn rename_attachment(&self, attachment_id: &str, name: &str) -> Result<()> {
            self.record("rename_attachment")?;
            let mut attachments = self.attachments.lock().unwrap();
            if let Some(attachment) = attachments.iter_mut().find(|a| a.id == attachment_id) {
                attachment.name = name.to_string();
            }
            Ok(())
        }

        async fn send_private_message(&self, destination_id: &str, content: &str) -> Result<()> {
            self.record("send_private_message")?;
            let users = self.users.lock().unwrap();
            let destination = users
                .iter()
                .find(|u| u.id == destination_id)
                .cloned()
                .ok_or_else(|| AppError::api(404, "unknown user"))?;
            let source = self
                .current_user
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| User::new("anonymous", "anonymous"));
            let mut private_messages = self.private_messages.lock().unwrap();
            let id = format!("pm{}", private_messages.len() + 1);
            private_messages.push(PrivateMessage {
                id,
                source,
                destination,
                created: Utc::now(),
                content: content.to_string(),
            });
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_filter_endpoints() {
        assert_eq!(ThreadFilter::All.endpoint(), "threads");
        assert_eq!(
            ThreadFilter::Tag("t1".into()).endpoint(),
            "threads/tag/t1"
        );
        assert_eq!(
            ThreadFilter::User("u1".into()).endpoint(),
            "threads/user/u1"
        );
    }

    #[test]
    fn test_base_url_keeps_path_prefix() {
        let config = ApiConfig {
            base_url: "https://forum.example.com/api/v1".into(),
            ..ApiConfig::default()
        };
        let api = HttpForumApi::new(&config).unwrap();
        assert_eq!(
            api.endpoint("/threads").unwrap().as_str(),
            "https://forum.example.com/api/v1/threads"
        );
    }

    #[test]
    fn test_created_item_accepts_either_key() {
        let json = r#"{"comment": {"id": "c1", "messageId": "m1", "content": "hi", "created": "2024-01-01T00:00:00Z"}}"#;
        let created: Created<Comment> = serde_json::from_str(json).unwrap();
        assert_eq!(created.item.id, "c1");
    }
}
