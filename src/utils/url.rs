// src/utils/url.rs

//! URL scheme of the list pages.
//!
//! List state lives in path segments appended to a resource path, always in
//! the order `/orderby/<value>`, `/sortorder/<value>`, `/page/<n>` with a
//! one-based page number.

use url::{Url, form_urlencoded};

use crate::models::SortOrder;

const ORDER_BY: &str = "orderby";
const SORT_ORDER: &str = "sortorder";
const PAGE: &str = "page";

/// Longest entity name embedded in a path, ellipsis included.
pub const MAX_NAME_LENGTH: usize = 128;

/// Path part of a location, without query string or fragment.
fn path_of(location: &str) -> &str {
    let end = location.find(['?', '#']).unwrap_or(location.len());
    &location[..end]
}

/// Number of leading segments naming the resource itself.
///
/// Entity pages embed a slugged name ahead of the id, so their slug can
/// never be taken for a list key.
fn resource_len(segments: &[&str]) -> usize {
    let len = match segments.first() {
        None => 0,
        Some(&("thread" | "category" | "tag" | "user")) => 3,
        Some(&"documentation") => 2,
        Some(_) => 1,
    };
    len.min(segments.len())
}

/// A location split into its resource path and trailing list segments.
struct ListSuffix<'a> {
    resource: Vec<&'a str>,
    order_by: Option<&'a str>,
    sort_order: Option<&'a str>,
    page: Option<&'a str>,
}

impl<'a> ListSuffix<'a> {
    /// Walk the segments from the end, taking `page`, then `sortorder`, then
    /// `orderby` pairs without ever entering the resource path.
    fn split(location: &'a str) -> Self {
        let mut segments: Vec<&str> = path_of(location)
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        let floor = resource_len(&segments);

        let mut take = |key: &str| -> Option<&'a str> {
            let n = segments.len();
            if n < floor + 2 || !segments[n - 2].eq_ignore_ascii_case(key) {
                return None;
            }
            let value = segments.pop();
            segments.pop();
            value
        };
        let page = take(PAGE);
        let sort_order = take(SORT_ORDER);
        let order_by = take(ORDER_BY);

        Self {
            resource: segments,
            order_by,
            sort_order,
            page,
        }
    }
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn decode(value: &str) -> String {
    form_urlencoded::parse(value.as_bytes())
        .next()
        .map(|(key, _)| key.into_owned())
        .unwrap_or_default()
}

/// Parse the `orderby` segment of a location.
pub fn parse_order_by(location: &str) -> Option<String> {
    ListSuffix::split(location)
        .order_by
        .map(decode)
        .filter(|v| !v.is_empty())
}

/// Parse the `sortorder` segment of a location.
pub fn parse_sort_order(location: &str) -> Option<SortOrder> {
    ListSuffix::split(location)
        .sort_order
        .and_then(|v| v.parse().ok())
}

/// Parse the one-based `page` segment of a location.
pub fn parse_page_number(location: &str) -> Option<usize> {
    ListSuffix::split(location)
        .page
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|n| *n >= 1)
}

/// Append list segments to `path` in their fixed order.
///
/// `sortorder` is written when an `orderby` is present or the order is not
/// the default; `page` only from the second page on.
pub fn append_list_segments(
    path: &str,
    order_by: Option<&str>,
    sort_order: SortOrder,
    page_number: usize,
) -> String {
    let mut location = path.trim_end_matches('/').to_string();

    if let Some(order_by) = order_by.filter(|v| !v.is_empty()) {
        location.push_str(&format!("/{ORDER_BY}/{}", encode(order_by)));
    }
    if order_by.is_some() || sort_order != SortOrder::default() {
        location.push_str(&format!("/{SORT_ORDER}/{sort_order}"));
    }
    if page_number > 1 {
        location.push_str(&format!("/{PAGE}/{page_number}"));
    }

    if location.is_empty() {
        location.push('/');
    }
    location
}

/// Remove the trailing list segments (and query/fragment) from a location.
pub fn strip_list_segments(location: &str) -> String {
    format!("/{}", ListSuffix::split(location).resource.join("/"))
}

/// Decoded, non-empty path segments of a location.
pub fn path_segments(location: &str) -> Vec<String> {
    path_of(location)
        .split('/')
        .filter(|s| !s.is_empty())
        .map(decode)
        .collect()
}

/// URL-safe rendition of an entity name for use ahead of its id.
///
/// Non-alphanumeric runs collapse to `-`; names longer than
/// [`MAX_NAME_LENGTH`] characters are truncated and end in `...`.
pub fn url_safe_name(name: &str) -> String {
    let slug = name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    let slug = if slug.chars().count() > MAX_NAME_LENGTH {
        let mut truncated: String = slug.chars().take(MAX_NAME_LENGTH - 3).collect();
        truncated.push_str("...");
        truncated
    } else if slug.is_empty() {
        "-".to_string()
    } else {
        slug
    };

    encode(&slug)
}

pub fn thread_path(name: &str, id: &str) -> String {
    format!("/thread/{}/{}", url_safe_name(name), id)
}

pub fn category_path(name: &str, id: &str) -> String {
    format!("/category/{}/{}", url_safe_name(name), id)
}

pub fn tag_path(name: &str, id: &str) -> String {
    format!("/tag/{}/{}", url_safe_name(name), id)
}

pub fn user_path(name: &str, id: &str) -> String {
    format!("/user/{}/{}", url_safe_name(name), id)
}

/// Extract the lower-cased host of an absolute URL.
pub fn get_domain(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

/// Whether `url` points to the same origin as `origin`.
///
/// Relative URLs are same-origin; protocol-relative ones are resolved first.
pub fn is_same_origin(url: &str, origin: &Url) -> bool {
    match origin.join(url) {
        Ok(resolved) => resolved.origin() == origin.origin(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_fixed_order() {
        assert_eq!(
            append_list_segments("/users", Some("name"), SortOrder::Ascending, 3),
            "/users/orderby/name/sortorder/ascending/page/3"
        );
        assert_eq!(
            append_list_segments("/users/", None, SortOrder::Ascending, 1),
            "/users"
        );
        assert_eq!(
            append_list_segments("/tags", None, SortOrder::Descending, 2),
            "/tags/sortorder/descending/page/2"
        );
        assert_eq!(append_list_segments("/", None, SortOrder::Ascending, 1), "/");
    }

    #[test]
    fn test_round_trip() {
        for order_by in [
            "name",
            "created",
            "message count",
            "ünïcode",
            "a/b",
            "page",
            "orderby",
            "sortorder",
        ] {
            for sort_order in [SortOrder::Ascending, SortOrder::Descending] {
                for page_number in [1, 2, 17, 1000] {
                    for path in ["/threads", "/thread/Page/t1", "/tag/OrderBy/g1"] {
                        let location =
                            append_list_segments(path, Some(order_by), sort_order, page_number);
                        assert_eq!(parse_order_by(&location).as_deref(), Some(order_by));
                        assert_eq!(parse_sort_order(&location), Some(sort_order));
                        assert_eq!(
                            parse_page_number(&location).unwrap_or(1) - 1,
                            page_number - 1
                        );
                        assert_eq!(strip_list_segments(&location), path);
                    }
                }
            }
        }
    }

    #[test]
    fn test_parse_ignores_query_and_invalid_page() {
        assert_eq!(parse_page_number("/threads/page/4?x=1"), Some(4));
        assert_eq!(parse_page_number("/threads/page/0"), None);
        assert_eq!(parse_page_number("/threads/page/abc"), None);
        assert_eq!(parse_order_by("/threads"), None);
    }

    #[test]
    fn test_strip_list_segments() {
        assert_eq!(
            strip_list_segments("/thread/hello/42/orderby/created/sortorder/descending/page/3"),
            "/thread/hello/42"
        );
        assert_eq!(strip_list_segments("/threads?x=1"), "/threads");
    }

    #[test]
    fn test_entity_names_are_not_list_keys() {
        assert_eq!(strip_list_segments("/thread/Page/t1"), "/thread/Page/t1");
        assert_eq!(parse_page_number("/thread/Page/t1"), None);
        assert_eq!(parse_page_number("/thread/Page/t1/page/3"), Some(3));
        assert_eq!(parse_order_by("/thread/OrderBy/t1"), None);
        assert_eq!(parse_order_by("/user/sortorder/u1"), None);
        assert_eq!(parse_sort_order("/user/sortorder/u1"), None);
        assert_eq!(parse_page_number("/documentation/page"), None);
    }

    #[test]
    fn test_list_segments_only_as_suffix() {
        // out of order segments are not part of the suffix
        assert_eq!(parse_order_by("/threads/page/2/orderby/name"), Some("name".into()));
        assert_eq!(parse_page_number("/threads/page/2/orderby/name"), None);
        assert_eq!(parse_page_number("/threads/page/abc"), None);
        assert_eq!(strip_list_segments("/threads/page/abc"), "/threads");
    }

    #[test]
    fn test_url_safe_name() {
        assert_eq!(url_safe_name("Hello, World!"), "Hello-World");
        assert_eq!(url_safe_name("   "), "-");
        assert_eq!(url_safe_name("Grüße"), "Gr%C3%BC%C3%9Fe");

        let long = "x".repeat(300);
        let safe = url_safe_name(&long);
        assert_eq!(safe.chars().count(), MAX_NAME_LENGTH);
        assert!(safe.ends_with("..."));
    }

    #[test]
    fn test_entity_paths() {
        assert_eq!(thread_path("First post", "t-1"), "/thread/First-post/t-1");
        assert_eq!(user_path("alice", "u-1"), "/user/alice/u-1");
    }

    #[test]
    fn test_same_origin() {
        let origin = Url::parse("https://forum.example.com").unwrap();
        assert!(is_same_origin("/uploads/a.png", &origin));
        assert!(is_same_origin("https://forum.example.com/b.png", &origin));
        assert!(!is_same_origin("https://cdn.example.net/c.png", &origin));
        assert!(!is_same_origin("//cdn.example.net/c.png", &origin));
        assert!(!is_same_origin("http://forum.example.com/d.png", &origin));
    }

    #[test]
    fn test_get_domain() {
        assert_eq!(
            get_domain("https://Example.COM/path"),
            Some("example.com".to_string())
        );
        assert_eq!(get_domain("invalid-url"), None);
    }

    #[test]
    fn test_path_segments_are_decoded() {
        assert_eq!(
            path_segments("/thread/Caf%C3%A9/t1?x=1"),
            vec!["thread", "Café", "t1"]
        );
    }
}
