//! Side panels refreshed by pollers.

use unicode_segmentation::UnicodeSegmentation;

use crate::dom::{Element, ids};
use crate::models::{LocaleConfig, Message, Statistics, Thread};
use crate::utils::url::thread_path;

use super::common::{time, user_link};

/// Graphemes of message source shown in the recent messages panel.
const EXCERPT_LENGTH: usize = 60;

fn excerpt(content: &str) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut graphemes = flat.graphemes(true);
    let head: String = graphemes.by_ref().take(EXCERPT_LENGTH).collect();
    if graphemes.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

pub fn statistics_panel(statistics: &Statistics, locale: &LocaleConfig) -> Element {
    let rows = [
        ("Users", statistics.user_count),
        ("Online", statistics.online_user_count),
        ("Threads", statistics.thread_count),
        ("Messages", statistics.message_count),
        ("Attachments", statistics.attachment_count),
    ]
    .map(|(label, count)| {
        Element::new("li")
            .child(Element::new("span").class("stat-label").text(label))
            .child(" ")
            .child(Element::new("span").class("stat-value").text(count.to_string()))
    });

    Element::new("section")
        .id(ids::STATISTICS)
        .child(Element::new("h3").text(&locale.titles.statistics))
        .child(Element::new("ul").class("statistics").children(rows))
}

pub fn recent_threads_panel(threads: &[Thread], locale: &LocaleConfig) -> Element {
    let items = threads.iter().map(|thread| {
        let at = thread
            .latest_message
            .as_ref()
            .map_or(&thread.created, |latest| &latest.created);
        Element::new("li")
            .child(
                Element::new("a")
                    .attr("href", thread_path(&thread.name, &thread.id))
                    .text(&thread.name),
            )
            .child(" ")
            .child(time(at))
    });

    Element::new("section")
        .id(ids::RECENT_THREADS)
        .child(Element::new("h3").text(&locale.titles.recent_threads))
        .child(Element::new("ul").class("recent-threads").children(items))
}

/// Latest messages across the forum. Messages carry no thread name, so
/// the link slug is generic until the thread page resolves the real one.
pub fn recent_messages_panel(messages: &[Message], locale: &LocaleConfig) -> Element {
    let items = messages.iter().map(|message| {
        Element::new("li")
            .child(user_link(message.created_by.as_ref(), locale))
            .child(" ")
            .child(time(&message.created))
            .child(
                Element::new("a")
                    .class("message-excerpt")
                    .attr("href", thread_path("thread", &message.thread_id))
                    .text(excerpt(&message.content)),
            )
    });

    Element::new("section")
        .id(ids::RECENT_MESSAGES)
        .child(Element::new("h3").text(&locale.titles.recent_messages))
        .child(Element::new("ul").class("recent-messages").children(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_panel_keeps_its_id() {
        let stats = Statistics {
            user_count: 12,
            ..Statistics::default()
        };
        let panel = statistics_panel(&stats, &LocaleConfig::default());
        assert_eq!(panel.get_id(), Some(ids::STATISTICS));
        assert!(panel.text_content().contains("12"));
    }

    #[test]
    fn test_excerpt_is_cut_on_graphemes() {
        assert_eq!(excerpt("short\n\ntext"), "short text");

        let long = "e\u{301}".repeat(EXCERPT_LENGTH + 5);
        let cut = excerpt(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.graphemes(true).count(), EXCERPT_LENGTH + 3);
    }
}
