//! Building blocks shared by all pages.

use chrono::{DateTime, Utc};

use crate::content::references::user_reference_link;
use crate::dom::{Element, ids};
use crate::models::{LocaleConfig, User};
use crate::utils::format_time;

/// One breadcrumb; the last one usually has no link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub label: String,
    pub href: Option<String>,
}

impl Crumb {
    pub fn link(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: Some(href.into()),
        }
    }

    pub fn current(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: None,
        }
    }
}

pub fn breadcrumbs(crumbs: &[Crumb]) -> Element {
    Element::new("ul")
        .class("uk-breadcrumb")
        .children(crumbs.iter().map(|crumb| {
            let inner = match &crumb.href {
                Some(href) => Element::new("a").attr("href", href).text(&crumb.label),
                None => Element::new("span").text(&crumb.label),
            };
            Element::new("li").child(inner)
        }))
}

/// Title and breadcrumbs; built once per page view.
pub fn page_header(title: &str, crumbs: &[Crumb]) -> Element {
    Element::new("div")
        .id(ids::PAGE_HEADER)
        .class("page-header")
        .child(breadcrumbs(crumbs))
        .child(Element::new("h1").text(title))
}

pub fn user_link(user: Option<&User>, locale: &LocaleConfig) -> Element {
    match user {
        Some(user) => user_reference_link(user),
        None => Element::new("span")
            .class("unknown-user")
            .text(&locale.messages.unknown_user),
    }
}

pub fn time(at: &DateTime<Utc>) -> Element {
    Element::new("time")
        .attr("datetime", at.to_rfc3339())
        .text(format_time(at))
}

pub fn no_content(locale: &LocaleConfig) -> Element {
    Element::new("p")
        .class("no-content")
        .text(&locale.messages.no_content)
}

/// The sub-tree a list page replaces on every refresh.
pub fn list_container() -> Element {
    Element::new("div").id(ids::LIST_CONTAINER)
}
