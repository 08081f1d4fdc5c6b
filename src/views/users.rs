//! User table.

use crate::dom::Element;
use crate::models::{LocaleConfig, User};

use super::common::{time, user_link};

pub fn user_table(users: &[User], locale: &LocaleConfig) -> Element {
    let rows = users.iter().map(|user| {
        let mut name = Element::new("td").child(user_link(Some(user), locale));
        if let Some(title) = user.title.as_deref().filter(|t| !t.is_empty()) {
            name.push(Element::new("span").class("user-title").text(title));
        }
        let cell = |at: Option<&chrono::DateTime<chrono::Utc>>| match at {
            Some(at) => Element::new("td").child(time(at)),
            None => Element::new("td"),
        };

        Element::new("tr")
            .id(format!("user-{}", user.id))
            .child(name)
            .child(cell(user.created.as_ref()))
            .child(cell(user.last_seen.as_ref()))
            .child(Element::new("td").text(user.thread_count.to_string()))
            .child(Element::new("td").text(user.message_count.to_string()))
    });

    Element::new("table")
        .class("uk-table user-list")
        .child(
            Element::new("thead").child(Element::new("tr").children(
                ["User", "Joined", "Last seen", "Threads", "Messages"]
                    .map(|l| Element::new("th").text(l)),
            )),
        )
        .child(Element::new("tbody").children(rows))
}
