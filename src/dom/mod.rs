//! Typed in-memory DOM.
//!
//! User data enters the tree only as [`Node::Text`] or attribute values, both
//! escaped on serialization. [`Node::Raw`] carries trusted literal markup and
//! is written verbatim.

mod document;
mod parse;

use std::fmt;

pub use document::{Document, ids};
pub use parse::parse_fragment;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Escape text content.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a double-quoted attribute value.
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Untrusted text, escaped on output
    Text(String),
    /// Trusted markup, written verbatim
    Raw(String),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn raw(html: impl Into<String>) -> Self {
        Node::Raw(html.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Element(e) => e.write_html(out),
            Node::Text(t) => out.push_str(&escape_text(t)),
            Node::Raw(r) => out.push_str(r),
        }
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Element(e) => e.children.iter().for_each(|c| c.collect_text(out)),
            Node::Text(t) => out.push_str(t),
            Node::Raw(_) => {}
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    // --- Builders ---

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    pub fn class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    /// Append escaped text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Append trusted markup.
    pub fn raw(mut self, html: impl Into<String>) -> Self {
        self.children.push(Node::Raw(html.into()));
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children<I, N>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children.extend(nodes.into_iter().map(Into::into));
        self
    }

    // --- Accessors ---

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn get_id(&self) -> Option<&str> {
        self.get_attr("id")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .is_some_and(|c| c.split_whitespace().any(|x| x == class))
    }

    pub fn child_nodes(&self) -> &[Node] {
        &self.children
    }

    pub fn child_nodes_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.children.iter().for_each(|c| c.collect_text(&mut out));
        out
    }

    // --- Mutation ---

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_ascii_lowercase();
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self
            .attrs
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))?;
        Some(self.attrs.remove(index).1)
    }

    pub fn add_class(&mut self, class: &str) {
        let mut classes: Vec<&str> = self
            .get_attr("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default();
        for new in class.split_whitespace() {
            if !classes.contains(&new) {
                classes.push(new);
            }
        }
        let joined = classes.join(" ");
        self.set_attr("class", joined);
    }

    pub fn push(&mut self, node: impl Into<Node>) {
        self.children.push(node.into());
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    // --- Queries ---

    /// Depth-first search for a descendant (or self) with the given id.
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        if self.get_id() == Some(id) {
            return Some(self);
        }
        self.children
            .iter()
            .filter_map(Node::as_element)
            .find_map(|c| c.find_by_id(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.get_id() == Some(id) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .filter_map(Node::as_element_mut)
            .find_map(|c| c.find_by_id_mut(id))
    }

    /// All descendants matching `predicate`, in document order.
    pub fn find_all<F>(&self, predicate: F) -> Vec<&Element>
    where
        F: Fn(&Element) -> bool,
    {
        let mut found = Vec::new();
        self.collect_matching(&predicate, &mut found);
        found
    }

    fn collect_matching<'a, F>(&'a self, predicate: &F, found: &mut Vec<&'a Element>)
    where
        F: Fn(&Element) -> bool,
    {
        for child in self.children.iter().filter_map(Node::as_element) {
            if predicate(child) {
                found.push(child);
            }
            child.collect_matching(predicate, found);
        }
    }

    /// All descendants with the given tag name.
    pub fn find_by_tag(&self, tag: &str) -> Vec<&Element> {
        self.find_all(|e| e.tag == tag)
    }

    /// Visit every descendant element, parents before children.
    pub fn visit_mut(&mut self, f: &mut dyn FnMut(&mut Element)) {
        for child in self.children.iter_mut().filter_map(Node::as_element_mut) {
            f(child);
            child.visit_mut(f);
        }
    }

    /// Offer every descendant element to `f`; where it returns a node, that
    /// node takes the element's place and is not descended into.
    pub fn rewrite(&mut self, f: &mut dyn FnMut(&Element) -> Option<Node>) {
        for child in self.children.iter_mut() {
            let replacement = match child {
                Node::Element(e) => f(e),
                _ => continue,
            };
            match replacement {
                Some(node) => *child = node,
                None => {
                    if let Node::Element(e) = child {
                        e.rewrite(f);
                    }
                }
            }
        }
    }

    /// Replace the descendant with the given id.
    pub fn replace_by_id(&mut self, id: &str, replacement: Element) -> bool {
        match self.slot_by_id(id) {
            Some(slot) => {
                *slot = Node::Element(replacement);
                true
            }
            None => false,
        }
    }

    fn slot_by_id(&mut self, id: &str) -> Option<&mut Node> {
        self.children.iter_mut().find_map(|child| {
            if child.as_element().and_then(Element::get_id) == Some(id) {
                return Some(child);
            }
            match child {
                Node::Element(e) => e.slot_by_id(id),
                _ => None,
            }
        })
    }

    /// Detach the descendant with the given id.
    pub fn remove_by_id(&mut self, id: &str) -> Option<Element> {
        let index = self
            .children
            .iter()
            .position(|c| c.as_element().and_then(Element::get_id) == Some(id));
        if let Some(index) = index {
            if let Node::Element(e) = self.children.remove(index) {
                return Some(e);
            }
        }
        self.children
            .iter_mut()
            .filter_map(Node::as_element_mut)
            .find_map(|c| c.remove_by_id(id))
    }

    // --- Serialization ---

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        self.children.iter().for_each(|c| c.write_html(&mut out));
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attr(value));
            out.push('"');
        }
        out.push('>');

        if VOID_ELEMENTS.contains(&self.tag.as_str()) {
            return;
        }

        self.children.iter().for_each(|c| c.write_html(out));
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_html())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_escaped_raw_is_not() {
        let el = Element::new("p")
            .text("<script>alert(1)</script>")
            .raw("<b>ok</b>");
        assert_eq!(
            el.to_html(),
            "<p>&lt;script&gt;alert(1)&lt;/script&gt;<b>ok</b></p>"
        );
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let el = Element::new("a").attr("title", "\"><img src=x>");
        assert_eq!(el.to_html(), "<a title=\"&quot;&gt;&lt;img src=x&gt;\"></a>");
    }

    #[test]
    fn test_void_elements_have_no_end_tag() {
        let el = Element::new("img").attr("data-src", "/a.png");
        assert_eq!(el.to_html(), "<img data-src=\"/a.png\">");
    }

    #[test]
    fn test_classes_are_deduplicated() {
        let mut el = Element::new("table").class("table");
        el.add_class("table striped");
        assert_eq!(el.get_attr("class"), Some("table striped"));
        assert!(el.has_class("striped"));
    }

    #[test]
    fn test_replace_and_remove_by_id() {
        let mut root = Element::new("div").child(
            Element::new("ul")
                .id("list")
                .child(Element::new("li").id("item-1").text("one")),
        );

        assert!(root.replace_by_id("item-1", Element::new("li").id("item-1").text("uno")));
        assert_eq!(root.find_by_id("item-1").unwrap().text_content(), "uno");
        assert!(!root.replace_by_id("missing", Element::new("li")));

        let removed = root.remove_by_id("list").unwrap();
        assert_eq!(removed.tag(), "ul");
        assert!(root.find_by_id("item-1").is_none());
    }

    #[test]
    fn test_rewrite_replaces_matching_elements() {
        let mut root = Element::new("div")
            .child(Element::new("p").child(Element::new("img").attr("alt", "cat")))
            .child(Element::new("img").attr("alt", "dog"));

        root.rewrite(&mut |e| {
            (e.tag() == "img").then(|| Node::text(e.get_attr("alt").unwrap_or_default()))
        });

        assert!(root.find_by_tag("img").is_empty());
        assert_eq!(root.text_content(), "catdog");
    }

    #[test]
    fn test_find_by_tag() {
        let root = Element::new("div")
            .child(Element::new("p").child(Element::new("a")))
            .child(Element::new("a"));
        assert_eq!(root.find_by_tag("a").len(), 2);
    }
}
