//! The page document.

use super::{Element, Node};

/// Element ids of the page skeleton.
pub mod ids {
    pub const PAGE_CONTENT: &str = "page-content";
    pub const PAGE_HEADER: &str = "page-header";
    pub const STATISTICS: &str = "statistics-panel";
    pub const RECENT_THREADS: &str = "recent-threads-panel";
    pub const RECENT_MESSAGES: &str = "recent-messages-panel";
    pub const BUSY_OVERLAY: &str = "busy-overlay";
    pub const BUSY_SPINNER: &str = "busy-spinner";
    pub const LIST_CONTAINER: &str = "list-container";
    pub const MESSAGE_PREVIEW: &str = "message-preview";
}

/// A rendered page: a `body` element with a fixed skeleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    body: Element,
}

impl Document {
    pub fn new() -> Self {
        let body = Element::new("body")
            .child(Element::new("main").id(ids::PAGE_CONTENT))
            .child(
                Element::new("aside")
                    .child(Element::new("section").id(ids::STATISTICS))
                    .child(Element::new("section").id(ids::RECENT_THREADS))
                    .child(Element::new("section").id(ids::RECENT_MESSAGES)),
            );
        Self { body }
    }

    pub fn body(&self) -> &Element {
        &self.body
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<&Element> {
        self.body.find_by_id(id)
    }

    pub fn get_element_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.body.find_by_id_mut(id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.get_element_by_id(id).is_some()
    }

    pub fn replace_by_id(&mut self, id: &str, replacement: Element) -> bool {
        self.body.replace_by_id(id, replacement)
    }

    pub fn remove_by_id(&mut self, id: &str) -> Option<Element> {
        self.body.remove_by_id(id)
    }

    /// Append a node to the element with the given id.
    pub fn append_to_id(&mut self, id: &str, node: impl Into<Node>) -> bool {
        match self.get_element_by_id_mut(id) {
            Some(parent) => {
                parent.push(node);
                true
            }
            None => false,
        }
    }

    /// Append a node to the body itself.
    pub fn append_to_body(&mut self, node: impl Into<Node>) {
        self.body.push(node);
    }

    /// Replace everything inside the main content area.
    pub fn set_content(&mut self, content: Element) {
        if let Some(main) = self.get_element_by_id_mut(ids::PAGE_CONTENT) {
            main.clear();
            main.push(content);
        }
    }

    /// Page content area, if the skeleton is intact.
    pub fn content(&self) -> Option<&Element> {
        self.get_element_by_id(ids::PAGE_CONTENT)
    }

    pub fn to_html(&self) -> String {
        self.body.to_html()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skeleton() {
        let doc = Document::new();
        assert!(doc.contains_id(ids::PAGE_CONTENT));
        assert!(doc.contains_id(ids::STATISTICS));
        assert!(!doc.contains_id(ids::LIST_CONTAINER));
    }

    #[test]
    fn test_set_content_replaces_previous() {
        let mut doc = Document::new();
        doc.set_content(Element::new("div").id("first"));
        doc.set_content(Element::new("div").id("second"));
        assert!(!doc.contains_id("first"));
        assert!(doc.contains_id("second"));
    }

    #[test]
    fn test_append_to_id() {
        let mut doc = Document::new();
        assert!(doc.append_to_id(ids::STATISTICS, Element::new("p").text("42 users")));
        assert!(!doc.append_to_id("missing", Element::new("p")));
        assert_eq!(
            doc.get_element_by_id(ids::STATISTICS).unwrap().text_content(),
            "42 users"
        );
    }
}
