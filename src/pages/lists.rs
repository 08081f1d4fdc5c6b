//! The forum's list pages.

use std::collections::HashSet;

use async_trait::async_trait;

use super::actions::{ActionOutcome, PageAction};
use super::context::AppContext;
use super::list::ListSource;
use crate::dom::Element;
use crate::error::{AppError, Result};
use crate::models::{
    Attachment, Category, Collection, Comment, ListState, LocaleConfig, Message, PrivateMessage,
    Tag, Thread, User,
};
use crate::services::{Field, ForumApi, ThreadFilter};
use crate::utils::url::{category_path, tag_path, thread_path, user_path};
use crate::views::attachments::attachment_table;
use crate::views::messages::{comment_list, composer, message_list, private_message_list};
use crate::views::threads::{tag_table, thread_table};
use crate::views::users::user_table;
use crate::views::{Crumb, SortOption, ViewContext};

const THREAD_SORT: &[SortOption] = &[
    SortOption::new("name", "Name"),
    SortOption::new("created", "Created"),
    SortOption::new("messagecount", "Messages"),
    SortOption::new("latestmessagecreated", "Latest message"),
];

const USER_SORT: &[SortOption] = &[
    SortOption::new("name", "Name"),
    SortOption::new("created", "Joined"),
    SortOption::new("lastseen", "Last seen"),
    SortOption::new("threadcount", "Threads"),
    SortOption::new("messagecount", "Messages"),
];

const TAG_SORT: &[SortOption] = &[
    SortOption::new("name", "Name"),
    SortOption::new("threadcount", "Threads"),
    SortOption::new("messagecount", "Messages"),
];

const ATTACHMENT_SORT: &[SortOption] = &[
    SortOption::new("name", "Name"),
    SortOption::new("size", "Size"),
    SortOption::new("created", "Uploaded"),
    SortOption::new("approved", "Approved"),
];

fn message_contents(messages: &[Message]) -> Vec<&str> {
    messages.iter().map(|m| m.content.as_str()).collect()
}

fn find_category<'a>(categories: &'a [Category], id: &str) -> Option<&'a Category> {
    categories.iter().find_map(|category| {
        if category.id == id {
            Some(category)
        } else {
            find_category(&category.children, id)
        }
    })
}

/// Threads, either all of them or those of one category, tag or user.
pub struct ThreadsSource {
    filter: ThreadFilter,
    path: String,
    name: Option<String>,
}

impl ThreadsSource {
    pub fn all() -> Self {
        Self {
            filter: ThreadFilter::All,
            path: "/threads".to_string(),
            name: None,
        }
    }

    pub fn category(id: &str, name: &str) -> Self {
        Self {
            filter: ThreadFilter::Category(id.to_string()),
            path: category_path(name, id),
            name: Some(name.to_string()),
        }
    }

    pub fn tag(id: &str, name: &str) -> Self {
        Self {
            filter: ThreadFilter::Tag(id.to_string()),
            path: tag_path(name, id),
            name: Some(name.to_string()),
        }
    }

    pub fn user(id: &str, name: &str) -> Self {
        Self {
            filter: ThreadFilter::User(id.to_string()),
            path: user_path(name, id),
            name: Some(name.to_string()),
        }
    }

    pub fn filter(&self) -> &ThreadFilter {
        &self.filter
    }
}

#[async_trait]
impl ListSource for ThreadsSource {
    type Item = Thread;

    fn resource_path(&self) -> String {
        self.path.clone()
    }

    fn title(&self, locale: &LocaleConfig) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| locale.titles.threads.clone())
    }

    fn breadcrumbs(&self, locale: &LocaleConfig, title: &str) -> Vec<Crumb> {
        let mut crumbs = vec![Crumb::link(&locale.titles.home, "/")];
        if self.name.is_some() {
            crumbs.push(Crumb::link(&locale.titles.threads, "/threads"));
        }
        crumbs.push(Crumb::current(title));
        crumbs
    }

    async fn entity_name(&self, ctx: &AppContext) -> Result<Option<String>> {
        let name = match &self.filter {
            ThreadFilter::All => None,
            ThreadFilter::Tag(id) => Some(ctx.api.get_tag(id).await?.name),
            ThreadFilter::Category(id) => {
                let categories = ctx.api.get_categories().await?;
                find_category(&categories, id).map(|c| c.name.clone())
            }
            ThreadFilter::User(id) => {
                if ctx.users.resolve_by_id(id).is_none() {
                    ctx.users.warm(&HashSet::from([id.clone()])).await?;
                }
                ctx.users.resolve_by_id(id).map(|u| u.name)
            }
        };
        Ok(name)
    }

    fn sort_options(&self) -> &'static [SortOption] {
        THREAD_SORT
    }

    async fn fetch(&self, api: &dyn ForumApi, state: &ListState) -> Result<Collection<Thread>> {
        api.get_threads(&self.filter, state).await
    }

    fn render(&self, items: &[Thread], view: &ViewContext<'_>) -> Element {
        thread_table(items, view.locale)
    }
}

/// Messages of one thread, plus the mutations offered on them.
pub struct ThreadMessagesSource {
    thread_id: String,
    name: String,
}

impl ThreadMessagesSource {
    pub fn new(thread_id: &str, name: &str) -> Self {
        Self {
            thread_id: thread_id.to_string(),
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl ListSource for ThreadMessagesSource {
    type Item = Message;

    fn resource_path(&self) -> String {
        thread_path(&self.name, &self.thread_id)
    }

    fn title(&self, _locale: &LocaleConfig) -> String {
        self.name.clone()
    }

    fn breadcrumbs(&self, locale: &LocaleConfig, title: &str) -> Vec<Crumb> {
        vec![
            Crumb::link(&locale.titles.home, "/"),
            Crumb::link(&locale.titles.threads, "/threads"),
            Crumb::current(title),
        ]
    }

    async fn entity_name(&self, ctx: &AppContext) -> Result<Option<String>> {
        Ok(Some(ctx.api.get_thread(&self.thread_id).await?.name))
    }

    async fn fetch(&self, api: &dyn ForumApi, state: &ListState) -> Result<Collection<Message>> {
        api.get_thread_messages(&self.thread_id, state).await
    }

    fn contents<'a>(&self, items: &'a [Message]) -> Vec<&'a str> {
        message_contents(items)
    }

    fn render(&self, items: &[Message], view: &ViewContext<'_>) -> Element {
        message_list(items, view)
    }

    fn footer(&self) -> Option<Element> {
        Some(composer())
    }

    async fn handle_action(&self, ctx: &AppContext, action: &PageAction) -> Result<ActionOutcome> {
        let labels = &ctx.locale.messages;
        match action {
            PageAction::AddMessage { content, parent_id } => {
                ctx.validator.check(Field::MessageContent, content)?;
                ctx.api
                    .add_message(&self.thread_id, content, parent_id.as_deref())
                    .await?;
                Ok(ActionOutcome::Refresh(labels.saved.clone()))
            }
            PageAction::EditMessage {
                message_id,
                content,
            } => {
                ctx.validator.check(Field::MessageContent, content)?;
                ctx.api.edit_message(message_id, content).await?;
                Ok(ActionOutcome::Refresh(labels.saved.clone()))
            }
            PageAction::DeleteMessage { message_id } => {
                ctx.api.delete_message(message_id).await?;
                Ok(ActionOutcome::Refresh(labels.deleted.clone()))
            }
            PageAction::AddComment {
                message_id,
                content,
            } => {
                ctx.validator.check(Field::Comment, content)?;
                ctx.api.add_comment(message_id, content).await?;
                Ok(ActionOutcome::Refresh(labels.saved.clone()))
            }
            PageAction::RenameThread { name } => {
                let name = name.trim();
                ctx.validator.check(Field::ThreadName, name)?;
                ctx.api.rename_thread(&self.thread_id, name).await?;
                Ok(ActionOutcome::Navigate(thread_path(name, &self.thread_id)))
            }
            PageAction::DeleteThread => {
                ctx.api.delete_thread(&self.thread_id).await?;
                Ok(ActionOutcome::Navigate("/threads".to_string()))
            }
            _ => Ok(ActionOutcome::Unhandled),
        }
    }
}

/// Latest messages across all threads.
pub struct LatestMessagesSource;

#[async_trait]
impl ListSource for LatestMessagesSource {
    type Item = Message;

    fn resource_path(&self) -> String {
        "/messages".to_string()
    }

    fn title(&self, locale: &LocaleConfig) -> String {
        locale.titles.messages.clone()
    }

    async fn fetch(&self, api: &dyn ForumApi, state: &ListState) -> Result<Collection<Message>> {
        api.get_latest_messages(state).await
    }

    fn contents<'a>(&self, items: &'a [Message]) -> Vec<&'a str> {
        message_contents(items)
    }

    fn render(&self, items: &[Message], view: &ViewContext<'_>) -> Element {
        message_list(items, view)
    }
}

pub struct UsersSource;

#[async_trait]
impl ListSource for UsersSource {
    type Item = User;

    fn resource_path(&self) -> String {
        "/users".to_string()
    }

    fn title(&self, locale: &LocaleConfig) -> String {
        locale.titles.users.clone()
    }

    fn sort_options(&self) -> &'static [SortOption] {
        USER_SORT
    }

    async fn fetch(&self, api: &dyn ForumApi, state: &ListState) -> Result<Collection<User>> {
        api.get_users(state).await
    }

    fn render(&self, items: &[User], view: &ViewContext<'_>) -> Element {
        user_table(items, view.locale)
    }
}

pub struct TagsSource;

#[async_trait]
impl ListSource for TagsSource {
    type Item = Tag;

    fn resource_path(&self) -> String {
        "/tags".to_string()
    }

    fn title(&self, locale: &LocaleConfig) -> String {
        locale.titles.tags.clone()
    }

    fn sort_options(&self) -> &'static [SortOption] {
        TAG_SORT
    }

    async fn fetch(&self, api: &dyn ForumApi, state: &ListState) -> Result<Collection<Tag>> {
        api.get_tags(state).await
    }

    fn render(&self, items: &[Tag], _view: &ViewContext<'_>) -> Element {
        tag_table(items)
    }
}

pub struct AttachmentsSource;

#[async_trait]
impl ListSource for AttachmentsSource {
    type Item = Attachment;

    fn resource_path(&self) -> String {
        "/attachments".to_string()
    }

    fn title(&self, locale: &LocaleConfig) -> String {
        locale.titles.attachments.clone()
    }

    fn sort_options(&self) -> &'static [SortOption] {
        ATTACHMENT_SORT
    }

    async fn fetch(&self, api: &dyn ForumApi, state: &ListState) -> Result<Collection<Attachment>> {
        api.get_attachments(state).await
    }

    fn render(&self, items: &[Attachment], view: &ViewContext<'_>) -> Element {
        attachment_table(items, view.locale)
    }

    async fn handle_action(&self, ctx: &AppContext, action: &PageAction) -> Result<ActionOutcome> {
        let PageAction::RenameAttachment {
            attachment_id,
            name,
        } = action
        else {
            return Ok(ActionOutcome::Unhandled);
        };
        let name = name.trim();
        ctx.validator.check(Field::AttachmentName, name)?;
        ctx.api.rename_attachment(attachment_id, name).await?;
        Ok(ActionOutcome::Refresh(ctx.locale.messages.saved.clone()))
    }
}

pub struct CommentsSource;

#[async_trait]
impl ListSource for CommentsSource {
    type Item = Comment;

    fn resource_path(&self) -> String {
        "/comments".to_string()
    }

    fn title(&self, locale: &LocaleConfig) -> String {
        locale.titles.comments.clone()
    }

    async fn fetch(&self, api: &dyn ForumApi, state: &ListState) -> Result<Collection<Comment>> {
        api.get_comments(state).await
    }

    fn render(&self, items: &[Comment], view: &ViewContext<'_>) -> Element {
        comment_list(items, view)
    }
}

/// Private messages of the logged in user; new ones are addressed by name.
pub struct PrivateMessagesSource;

impl PrivateMessagesSource {
    async fn resolve_recipient(ctx: &AppContext, name: &str) -> Result<User> {
        if let Some(user) = ctx.users.resolve_by_name(name) {
            return Ok(user);
        }
        let names = HashSet::from([name.to_string()]);
        ctx.users.warm_by_name(&names).await?;
        ctx.users.resolve_by_name(name).ok_or_else(|| {
            AppError::validation(ctx.locale.errors.unknown_recipient.replace("{name}", name))
        })
    }
}

#[async_trait]
impl ListSource for PrivateMessagesSource {
    type Item = PrivateMessage;

    fn resource_path(&self) -> String {
        "/private_messages".to_string()
    }

    fn title(&self, locale: &LocaleConfig) -> String {
        locale.titles.private_messages.clone()
    }

    async fn fetch(
        &self,
        api: &dyn ForumApi,
        state: &ListState,
    ) -> Result<Collection<PrivateMessage>> {
        api.get_private_messages(state).await
    }

    fn contents<'a>(&self, items: &'a [PrivateMessage]) -> Vec<&'a str> {
        items.iter().map(|m| m.content.as_str()).collect()
    }

    fn render(&self, items: &[PrivateMessage], view: &ViewContext<'_>) -> Element {
        private_message_list(items, view)
    }

    fn footer(&self) -> Option<Element> {
        Some(composer())
    }

    async fn handle_action(&self, ctx: &AppContext, action: &PageAction) -> Result<ActionOutcome> {
        let PageAction::SendPrivateMessage { recipient, content } = action else {
            return Ok(ActionOutcome::Unhandled);
        };
        let recipient = recipient.trim();
        ctx.validator.check(Field::UserName, recipient)?;
        ctx.validator.check(Field::PrivateMessage, content)?;

        let destination = Self::resolve_recipient(ctx, recipient).await?;
        ctx.api.send_private_message(&destination.id, content).await?;
        Ok(ActionOutcome::Refresh(ctx.locale.messages.message_sent.clone()))
    }
}
