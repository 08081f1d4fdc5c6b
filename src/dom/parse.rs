//! Conversion of rendered HTML into typed nodes.

use scraper::{ElementRef, Html};

use super::{Element, Node};

/// Parse an HTML fragment into nodes.
///
/// Comments, doctypes and processing instructions are dropped.
pub fn parse_fragment(html: &str) -> Vec<Node> {
    let fragment = Html::parse_fragment(html);
    convert_children(fragment.root_element())
}

fn convert_children(parent: ElementRef<'_>) -> Vec<Node> {
    parent
        .children()
        .filter_map(|child| {
            if let Some(element) = ElementRef::wrap(child) {
                return Some(Node::Element(convert_element(element)));
            }
            child.value().as_text().map(|text| Node::Text(text.to_string()))
        })
        .collect()
}

fn convert_element(source: ElementRef<'_>) -> Element {
    let value = source.value();
    let mut element = Element::new(value.name());
    for (name, attr) in value.attrs() {
        element.set_attr(name, attr);
    }
    for child in convert_children(source) {
        element.push(child);
    }
    element
}
