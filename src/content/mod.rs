//! Content expansion engine.
//!
//! Raw message markup goes through a fixed pipeline:
//!
//! 1. markdown rendering ([`markdown`]), with deferred images and optional
//!    code highlighting ([`highlight`])
//! 2. `@<uuid>@` user reference substitution ([`references`])
//! 3. emoji wrapping ([`emoji`])
//!
//! Callers warm the user cache for all contents about to be shown before
//! expanding them (see [`ContentExpander::warm_references`]). Once attached,
//! the resulting tree is finished by [`adjust::adjust_message_content`] (or
//! [`adjust::adjust_attached_content`] for whole containers).

pub mod adjust;
pub mod emoji;
pub mod highlight;
pub mod markdown;
pub mod math;
pub mod references;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::dom::{Element, parse_fragment};
use crate::models::LocaleConfig;
use crate::services::cache::UserCache;

pub use adjust::{AdjustContext, adjust_attached_content, adjust_message_content, quote_markdown};
pub use highlight::{CodeHighlighter, PlainHighlighter, default_highlighter};
pub use markdown::{CommonMarkRenderer, MarkdownRenderer};
pub use math::{DelimitedMath, MathTypesetter};
pub use references::scan_user_ids;

/// Class of the element wrapping expanded content.
pub const MESSAGE_CONTENT_CLASS: &str = "message-content";

/// Class of the inline marker shown when content cannot be rendered.
pub const RENDER_ERROR_CLASS: &str = "render-error";

/// Apply `f` to every text run of `html`, leaving tags untouched.
pub(crate) fn map_text_segments(html: &str, mut f: impl FnMut(&str) -> String) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(open) = rest.find('<') {
        if open > 0 {
            out.push_str(&f(&rest[..open]));
        }
        let close = rest[open..].find('>').map_or(rest.len(), |i| open + i + 1);
        out.push_str(&rest[open..close]);
        rest = &rest[close..];
    }
    if !rest.is_empty() {
        out.push_str(&f(rest));
    }
    out
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Expands raw message content into sanitized HTML.
pub struct ContentExpander {
    renderer: Arc<dyn MarkdownRenderer>,
    users: Arc<UserCache>,
    rendering_failed: String,
}

impl ContentExpander {
    pub fn new(
        renderer: Arc<dyn MarkdownRenderer>,
        users: Arc<UserCache>,
        locale: &LocaleConfig,
    ) -> Self {
        Self {
            renderer,
            users,
            rendering_failed: locale.errors.rendering_failed.clone(),
        }
    }

    pub fn users(&self) -> &Arc<UserCache> {
        &self.users
    }

    /// Expand `content`. Never fails: rendering errors yield an inline marker.
    pub fn expand(&self, content: &str) -> String {
        let rendered =
            panic::catch_unwind(AssertUnwindSafe(|| self.renderer.render(content)));
        let html = match rendered {
            Ok(Ok(html)) => html,
            Ok(Err(e)) => {
                log::warn!("Failed to render message content: {e}");
                return self.error_marker().to_html();
            }
            Err(payload) => {
                log::error!("Markdown renderer panicked: {}", panic_message(payload.as_ref()));
                return self.error_marker().to_html();
            }
        };

        let html = references::substitute_user_refs(&html, &self.users);
        emoji::wrap_emoji(&html)
    }

    /// Expand `content` into a `div` ready to be attached and adjusted.
    pub fn expand_element(&self, content: &str) -> Element {
        Element::new("div")
            .class(MESSAGE_CONTENT_CLASS)
            .children(parse_fragment(&self.expand(content)))
    }

    /// Resolve the users referenced by `contents` in one batch.
    ///
    /// Failures only leave references unresolved.
    pub async fn warm_references<'a>(&self, contents: impl IntoIterator<Item = &'a str>) {
        let ids = scan_user_ids(contents);
        if ids.is_empty() {
            return;
        }
        if let Err(e) = self.users.warm(&ids).await {
            log::warn!("Could not resolve referenced users: {e}");
        }
    }

    fn error_marker(&self) -> Element {
        Element::new("span")
            .class(RENDER_ERROR_CLASS)
            .text(&self.rendering_failed)
    }
}
