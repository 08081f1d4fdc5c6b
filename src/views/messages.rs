//! Messages, comments, private messages and the composer preview.
//!
//! Message content is expanded here but not adjusted: the page adjusts it
//! once the list is attached (see
//! [`adjust_attached_content`](crate::content::adjust::adjust_attached_content)).

use crate::content::quote_markdown;
use crate::dom::{Element, ids};
use crate::models::{Comment, Message, PrivateMessage};

use super::ViewContext;
use super::common::{time, user_link};

pub const QUOTE: &str = "quote";
pub const REPLY: &str = "reply";
pub const ADD_COMMENT: &str = "add-comment";

fn action(name: &str, message_id: &str, label: &str) -> Element {
    Element::new("a")
        .attr("data-action", name)
        .attr("data-message-id", message_id)
        .text(label)
}

fn comment_item(comment: &Comment, view: &ViewContext<'_>) -> Element {
    Element::new("li")
        .class("comment")
        .id(format!("comment-{}", comment.id))
        .child(user_link(comment.created_by.as_ref(), view.locale))
        .child(" ")
        .child(time(&comment.created))
        .child(Element::new("p").text(&comment.content))
}

pub fn comment_list(comments: &[Comment], view: &ViewContext<'_>) -> Element {
    Element::new("ul")
        .class("comments")
        .children(comments.iter().map(|c| comment_item(c, view)))
}

fn message_item(message: &Message, view: &ViewContext<'_>) -> Element {
    let mut header = Element::new("div")
        .class("message-header")
        .child(user_link(message.created_by.as_ref(), view.locale))
        .child(" ")
        .child(time(&message.created));
    if let Some(updated) = &message.last_updated {
        header.push(
            Element::new("span")
                .class("message-edited")
                .child(" (")
                .child(time(updated))
                .child(")"),
        );
    }
    header.push(
        Element::new("span")
            .class("vote-score")
            .text(message.vote_score.to_string()),
    );

    let mut item = Element::new("div")
        .class("message")
        .id(format!("message-{}", message.id))
        .child(header)
        .child(view.expander.expand_element(&message.content));

    if !message.comments.is_empty() {
        item.push(comment_list(&message.comments, view));
    }

    let labels = &view.locale.messages;
    item.child(
        Element::new("div")
            .class("message-actions")
            .child(
                action(QUOTE, &message.id, &labels.quote)
                    .attr("data-quote", quote_markdown(message)),
            )
            .child(action(REPLY, &message.id, &labels.reply))
            .child(action(ADD_COMMENT, &message.id, &labels.comment)),
    )
}

pub fn message_list(messages: &[Message], view: &ViewContext<'_>) -> Element {
    Element::new("div")
        .class("message-list")
        .children(messages.iter().map(|m| message_item(m, view)))
}

pub fn private_message_list(messages: &[PrivateMessage], view: &ViewContext<'_>) -> Element {
    let items = messages.iter().map(|message| {
        Element::new("div")
            .class("private-message")
            .id(format!("private-message-{}", message.id))
            .child(
                Element::new("div")
                    .class("message-header")
                    .child(user_link(Some(&message.source), view.locale))
                    .child(" \u{2192} ")
                    .child(user_link(Some(&message.destination), view.locale))
                    .child(" ")
                    .child(time(&message.created)),
            )
            .child(view.expander.expand_element(&message.content))
    });
    Element::new("div").class("private-message-list").children(items)
}

/// Message composer with an empty preview area.
pub fn composer() -> Element {
    Element::new("div")
        .class("composer")
        .child(Element::new("textarea").attr("name", "content"))
        .child(Element::new("div").id(ids::MESSAGE_PREVIEW))
}

/// Live preview of the message being written.
pub fn composer_preview(content: &str, view: &ViewContext<'_>) -> Element {
    Element::new("div")
        .id(ids::MESSAGE_PREVIEW)
        .class("message-preview")
        .child(Element::new("h4").text(&view.locale.messages.preview))
        .child(view.expander.expand_element(content))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;
    use crate::content::{CommonMarkRenderer, ContentExpander, PlainHighlighter};
    use crate::models::{Config, LocaleConfig, User};
    use crate::services::api::fake::FakeForumApi;
    use crate::services::cache::UserCache;

    fn expander() -> ContentExpander {
        ContentExpander::new(
            Arc::new(CommonMarkRenderer::new(Arc::new(PlainHighlighter))),
            Arc::new(UserCache::new(Arc::new(FakeForumApi::new()))),
            &LocaleConfig::default(),
        )
    }

    fn message(id: &str, content: &str) -> Message {
        Message {
            id: id.into(),
            thread_id: "t1".into(),
            content: content.into(),
            created: Utc::now(),
            created_by: Some(User::new("u1", "alice")),
            last_updated: None,
            parent_id: None,
            vote_score: 2,
            comments: vec![Comment {
                id: "c1".into(),
                message_id: id.into(),
                content: "<i>nice</i>".into(),
                created: Utc::now(),
                created_by: None,
            }],
        }
    }

    #[test]
    fn test_message_list_expands_content() {
        let (config, locale, expander) = (Config::default(), LocaleConfig::default(), expander());
        let view = ViewContext {
            config: &config,
            locale: &locale,
            expander: &expander,
        };
        let list = message_list(&[message("m1", "**bold**")], &view);

        let item = list.find_by_id("message-m1").unwrap();
        assert_eq!(item.find_by_tag("strong")[0].text_content(), "bold");
        let quote = item.find_all(|e| e.get_attr("data-action") == Some(QUOTE))[0];
        assert_eq!(quote.get_attr("data-message-id"), Some("m1"));
        assert_eq!(quote.text_content(), "Quote");
        assert!(list.to_html().contains("&lt;i&gt;nice&lt;/i&gt;"));
        assert!(quote.get_attr("data-quote").unwrap().contains("@u1@"));
    }

    #[test]
    fn test_action_labels_follow_locale() {
        let (config, expander) = (Config::default(), expander());
        let mut locale = LocaleConfig::default();
        locale.messages.reply = "Antworten".into();
        let view = ViewContext {
            config: &config,
            locale: &locale,
            expander: &expander,
        };

        let list = message_list(&[message("m1", "hallo")], &view);
        let reply = list.find_all(|e| e.get_attr("data-action") == Some(REPLY))[0];
        assert_eq!(reply.text_content(), "Antworten");
    }

    #[test]
    fn test_composer_preview() {
        let (config, locale, expander) = (Config::default(), LocaleConfig::default(), expander());
        let view = ViewContext {
            config: &config,
            locale: &locale,
            expander: &expander,
        };
        let preview = composer_preview("# Title", &view);
        assert_eq!(preview.get_id(), Some(ids::MESSAGE_PREVIEW));
        assert_eq!(preview.find_by_tag("h1").len(), 1);
    }
}
