//! Sort control.

use crate::dom::Element;
use crate::models::{ListState, LocaleConfig, SortOrder};

pub const CHANGE_SORT: &str = "change-sort";

/// A column a list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOption {
    pub order_by: &'static str,
    pub label: &'static str,
}

impl SortOption {
    pub const fn new(order_by: &'static str, label: &'static str) -> Self {
        Self { order_by, label }
    }
}

/// Links to re-sort the list; the active column toggles its direction.
pub fn sort_control(
    options: &[SortOption],
    state: &ListState,
    href: &dyn Fn(&ListState) -> String,
    locale: &LocaleConfig,
) -> Option<Element> {
    if options.is_empty() {
        return None;
    }

    let links = options.iter().map(|option| {
        let active = state.order_by.as_deref() == Some(option.order_by);
        let sort_order = if active {
            state.sort_order.toggled()
        } else {
            SortOrder::Ascending
        };

        let mut target = state.clone();
        target.set_sort(Some(option.order_by.to_string()), sort_order);

        let mut link = Element::new("a")
            .attr("href", href(&target))
            .attr("data-action", CHANGE_SORT)
            .attr("data-order-by", option.order_by)
            .attr("data-sort-order", sort_order.as_str())
            .text(option.label);
        if active {
            link.add_class("uk-active");
            link.add_class(match state.sort_order {
                SortOrder::Ascending => "sort-ascending",
                SortOrder::Descending => "sort-descending",
            });
        }
        link
    });

    Some(
        Element::new("div")
            .class("sort-control")
            .child(Element::new("span").text(&locale.messages.sort_by))
            .children(links),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::url::append_list_segments;

    const OPTIONS: &[SortOption] = &[
        SortOption::new("name", "Name"),
        SortOption::new("created", "Created"),
    ];

    fn href(state: &ListState) -> String {
        append_list_segments("/tags", state.order_by.as_deref(), state.sort_order, state.page + 1)
    }

    #[test]
    fn test_active_column_toggles() {
        let state = ListState {
            order_by: Some("name".into()),
            sort_order: SortOrder::Ascending,
            page: 3,
        };
        let control = sort_control(OPTIONS, &state, &href, &LocaleConfig::default()).unwrap();
        let links = control.find_by_tag("a");

        assert_eq!(links[0].get_attr("href"), Some("/tags/orderby/name/sortorder/descending"));
        assert!(links[0].has_class("sort-ascending"));
        assert_eq!(links[1].get_attr("href"), Some("/tags/orderby/created/sortorder/ascending"));
    }

    #[test]
    fn test_no_options_no_control() {
        let locale = LocaleConfig::default();
        assert!(sort_control(&[], &ListState::default(), &href, &locale).is_none());
    }
}
