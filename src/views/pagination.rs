//! Pagination control.

use crate::dom::Element;
use crate::models::{LocaleConfig, PageLink, PageWindow, PaginationInfo, compute_page_links};

pub const CHANGE_PAGE: &str = "change-page";
pub const PROMPT_PAGE: &str = "prompt-page";

/// Page links for `info`, or `None` for an empty collection.
///
/// `href` maps a zero-based page index to its location. Ellipses carry
/// [`PROMPT_PAGE`] so the page can ask for an arbitrary page number.
pub fn pagination_control(
    info: &PaginationInfo,
    window: &PageWindow,
    href: &dyn Fn(usize) -> String,
    locale: &LocaleConfig,
) -> Option<Element> {
    if info.total_count() < 1 {
        return None;
    }

    let items = compute_page_links(info, window).into_iter().map(|link| match link {
        PageLink::Page(index) => {
            let mut item = Element::new("li");
            if index == info.page() {
                item.add_class("uk-active");
            }
            item.child(
                Element::new("a")
                    .attr("href", href(index))
                    .attr("data-action", CHANGE_PAGE)
                    .attr("data-page", index.to_string())
                    .text((index + 1).to_string()),
            )
        }
        PageLink::Ellipsis => Element::new("li").child(
            Element::new("a")
                .attr("data-action", PROMPT_PAGE)
                .attr("title", &locale.messages.go_to_page)
                .text("\u{2026}"),
        ),
    });

    Some(Element::new("ul").class("uk-pagination").children(items))
}
