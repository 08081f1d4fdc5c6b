//! Thread tables, the category tree and tag lists.

use crate::dom::Element;
use crate::models::{Category, LocaleConfig, Tag, Thread};
use crate::utils::url::{category_path, tag_path, thread_path};

use super::common::{time, user_link};

pub fn tag_link(tag: &Tag) -> Element {
    Element::new("a")
        .class("uk-label")
        .attr("href", tag_path(&tag.name, &tag.id))
        .text(&tag.name)
}

fn thread_row(thread: &Thread, locale: &LocaleConfig) -> Element {
    let mut name = Element::new("td").class("thread-name");
    if thread.pinned {
        name.push(Element::new("span").class("pinned").attr("title", "pinned"));
    }
    name.push(
        Element::new("a")
            .attr("href", thread_path(&thread.name, &thread.id))
            .text(&thread.name),
    );
    for tag in &thread.tags {
        name.push(" ");
        name.push(tag_link(tag));
    }

    let latest = match &thread.latest_message {
        Some(latest) => Element::new("td")
            .class("latest-message")
            .child(user_link(latest.created_by.as_ref(), locale))
            .child(" ")
            .child(time(&latest.created)),
        None => Element::new("td").class("latest-message"),
    };

    Element::new("tr")
        .id(format!("thread-{}", thread.id))
        .child(name)
        .child(
            Element::new("td")
                .child(user_link(thread.created_by.as_ref(), locale))
                .child(" ")
                .child(time(&thread.created)),
        )
        .child(Element::new("td").text(thread.message_count.to_string()))
        .child(Element::new("td").text(thread.visited_count.to_string()))
        .child(latest)
}

pub fn thread_table(threads: &[Thread], locale: &LocaleConfig) -> Element {
    let head = Element::new("thead").child(
        Element::new("tr").children(
            ["Thread", "Created", "Messages", "Visits", "Latest message"]
                .map(|label| Element::new("th").text(label)),
        ),
    );
    Element::new("table")
        .class("uk-table thread-list")
        .child(head)
        .child(Element::new("tbody").children(threads.iter().map(|t| thread_row(t, locale))))
}

fn category_item(category: &Category) -> Element {
    let mut item = Element::new("li").child(
        Element::new("a")
            .attr("href", category_path(&category.name, &category.id))
            .text(&category.name),
    );
    if !category.description.is_empty() {
        item.push(
            Element::new("p")
                .class("category-description")
                .text(&category.description),
        );
    }
    item.push(
        Element::new("span")
            .class("category-stats")
            .text(format!(
                "{} threads, {} messages",
                category.thread_count, category.message_count
            )),
    );
    if !category.children.is_empty() {
        item.push(category_tree(&category.children));
    }
    item
}

/// Nested list of categories, ordered by their display order.
pub fn category_tree(categories: &[Category]) -> Element {
    let mut ordered: Vec<&Category> = categories.iter().collect();
    ordered.sort_by_key(|c| c.display_order);
    Element::new("ul")
        .class("category-tree")
        .children(ordered.into_iter().map(category_item))
}

pub fn tag_table(tags: &[Tag]) -> Element {
    let rows = tags.iter().map(|tag| {
        Element::new("tr")
            .child(Element::new("td").child(tag_link(tag)))
            .child(Element::new("td").text(tag.thread_count.to_string()))
            .child(Element::new("td").text(tag.message_count.to_string()))
    });
    Element::new("table")
        .class("uk-table tag-list")
        .child(
            Element::new("thead").child(
                Element::new("tr")
                    .children(["Tag", "Threads", "Messages"].map(|l| Element::new("th").text(l))),
            ),
        )
        .child(Element::new("tbody").children(rows))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn category(id: &str, order: i32, children: Vec<Category>) -> Category {
        Category {
            id: id.into(),
            name: format!("Category {id}"),
            description: String::new(),
            display_order: order,
            thread_count: 0,
            message_count: 0,
            children,
        }
    }

    #[test]
    fn test_thread_row_links_and_escapes() {
        let thread = Thread {
            id: "t1".into(),
            name: "<b>Hello</b> world".into(),
            created: Utc::now(),
            created_by: None,
            pinned: true,
            tags: vec![Tag {
                id: "g1".into(),
                name: "rust".into(),
                thread_count: 1,
                message_count: 1,
            }],
            category_ids: Vec::new(),
            message_count: 3,
            visited_count: 10,
            latest_message: None,
        };
        let table = thread_table(&[thread], &LocaleConfig::default());
        let html = table.to_html();

        assert!(html.contains("href=\"/thread/b-Hello-b-world/t1\""));
        assert!(html.contains("&lt;b&gt;Hello&lt;/b&gt; world"));
        assert!(html.contains("href=\"/tag/rust/g1\""));
        assert_eq!(table.find_all(|e| e.has_class("pinned")).len(), 1);
    }

    #[test]
    fn test_category_tree_is_nested_and_ordered() {
        let tree = category_tree(&[
            category("b", 2, Vec::new()),
            category("a", 1, vec![category("a1", 1, Vec::new())]),
        ]);
        let top: Vec<&Element> = tree
            .child_nodes()
            .iter()
            .filter_map(|n| n.as_element())
            .collect();
        assert!(top[0].text_content().starts_with("Category a"));
        assert_eq!(tree.find_by_tag("ul").len(), 1);
    }
}
