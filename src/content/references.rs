//! Inline `@<uuid>@` user references.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::map_text_segments;
use crate::dom::Element;
use crate::models::User;
use crate::services::cache::UserCache;
use crate::utils::url::user_path;

static USER_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"@([0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12})@",
    )
    .expect("valid user reference pattern")
});

/// Collect the referenced user ids of every raw content string.
pub fn scan_user_ids<'a>(contents: impl IntoIterator<Item = &'a str>) -> HashSet<String> {
    contents
        .into_iter()
        .flat_map(|content| USER_REFERENCE.captures_iter(content))
        .map(|caps| caps[1].to_lowercase())
        .collect()
}

/// Inline link to a user's page.
pub fn user_reference_link(user: &User) -> Element {
    Element::new("a")
        .class("user-link")
        .attr("href", user_path(&user.name, &user.id))
        .text(&user.name)
}

/// Replace resolved references in the text of `html` with user links.
///
/// Unresolved tokens are left as they are.
pub fn substitute_user_refs(html: &str, users: &UserCache) -> String {
    map_text_segments(html, |text| {
        USER_REFERENCE
            .replace_all(text, |caps: &Captures<'_>| match users.resolve_by_id(&caps[1]) {
                Some(user) => user_reference_link(&user).to_html(),
                None => {
                    log::debug!("Unresolved user reference {}", &caps[1]);
                    caps[0].to_string()
                }
            })
            .into_owned()
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::services::api::fake::FakeForumApi;

    const ALICE: &str = "11111111-1111-1111-1111-111111111111";

    fn cache() -> UserCache {
        UserCache::new(Arc::new(FakeForumApi::new()))
    }

    #[test]
    fn test_scan_collects_unique_ids() {
        let ids = scan_user_ids([
            "hi @11111111-1111-1111-1111-111111111111@",
            "and @11111111-1111-1111-1111-111111111111@ again, @not-an-id@",
            "@AAAAAAAA-1111-1111-1111-111111111111@",
        ]);
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(ALICE));
        assert!(ids.contains("aaaaaaaa-1111-1111-1111-111111111111"));
    }

    #[test]
    fn test_unresolved_reference_stays_literal() {
        let html = format!("<p>@{ALICE}@</p>");
        assert_eq!(substitute_user_refs(&html, &cache()), html);
    }

    #[test]
    fn test_resolved_reference_becomes_link() {
        let users = cache();
        users.insert(User::new(ALICE, "alice"));
        let html = substitute_user_refs(&format!("<p>hi @{ALICE}@!</p>"), &users);
        assert_eq!(
            html,
            format!("<p>hi <a class=\"user-link\" href=\"/user/alice/{ALICE}\">alice</a>!</p>")
        );
    }

    #[test]
    fn test_references_inside_attributes_are_untouched() {
        let users = cache();
        users.insert(User::new(ALICE, "alice"));
        let html = format!("<a title=\"@{ALICE}@\">x</a>");
        assert_eq!(substitute_user_refs(&html, &users), html);
    }

    #[test]
    fn test_user_names_are_escaped() {
        let link = user_reference_link(&User::new(ALICE, "<b>bob</b>"));
        assert!(link.to_html().contains("&lt;b&gt;bob&lt;/b&gt;"));
    }
}
