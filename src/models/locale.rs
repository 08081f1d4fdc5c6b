//! User-visible labels.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Localized labels used by the view layer.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LocaleConfig {
    #[serde(default)]
    pub messages: MessageLocale,

    #[serde(default)]
    pub titles: TitleLocale,

    #[serde(default)]
    pub errors: ErrorLocale,

    #[serde(default)]
    pub fields: FieldLocale,
}

impl LocaleConfig {
    /// Load locale labels from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load locale labels or fall back to the built-in English ones.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Locale load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }
}

/// General messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageLocale {
    /// Header of a quoted block, supports `{author}` and `{time}`
    #[serde(default = "defaults::quote_header")]
    pub quote_header: String,

    #[serde(default = "defaults::go_to_page")]
    pub go_to_page: String,

    #[serde(default = "defaults::no_content")]
    pub no_content: String,

    #[serde(default = "defaults::loading")]
    pub loading: String,

    #[serde(default = "defaults::watch_video")]
    pub watch_video: String,

    #[serde(default = "defaults::unknown_user")]
    pub unknown_user: String,

    #[serde(default = "defaults::sort_by")]
    pub sort_by: String,

    #[serde(default = "defaults::saved")]
    pub saved: String,

    #[serde(default = "defaults::deleted")]
    pub deleted: String,

    #[serde(default = "defaults::message_sent")]
    pub message_sent: String,

    #[serde(default = "defaults::preview")]
    pub preview: String,

    #[serde(default = "defaults::quote")]
    pub quote: String,

    #[serde(default = "defaults::reply")]
    pub reply: String,

    #[serde(default = "defaults::comment")]
    pub comment: String,
}

impl Default for MessageLocale {
    fn default() -> Self {
        Self {
            quote_header: defaults::quote_header(),
            go_to_page: defaults::go_to_page(),
            no_content: defaults::no_content(),
            loading: defaults::loading(),
            watch_video: defaults::watch_video(),
            unknown_user: defaults::unknown_user(),
            sort_by: defaults::sort_by(),
            saved: defaults::saved(),
            deleted: defaults::deleted(),
            message_sent: defaults::message_sent(),
            preview: defaults::preview(),
            quote: defaults::quote(),
            reply: defaults::reply(),
            comment: defaults::comment(),
        }
    }
}

/// Page titles and breadcrumb labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleLocale {
    #[serde(default = "defaults::home")]
    pub home: String,
    #[serde(default = "defaults::threads")]
    pub threads: String,
    #[serde(default = "defaults::messages")]
    pub messages: String,
    #[serde(default = "defaults::users")]
    pub users: String,
    #[serde(default = "defaults::tags")]
    pub tags: String,
    #[serde(default = "defaults::attachments")]
    pub attachments: String,
    #[serde(default = "defaults::comments")]
    pub comments: String,
    #[serde(default = "defaults::private_messages")]
    pub private_messages: String,
    #[serde(default = "defaults::documentation")]
    pub documentation: String,
    #[serde(default = "defaults::statistics")]
    pub statistics: String,
    #[serde(default = "defaults::recent_threads")]
    pub recent_threads: String,
    #[serde(default = "defaults::recent_messages")]
    pub recent_messages: String,
}

impl Default for TitleLocale {
    fn default() -> Self {
        Self {
            home: defaults::home(),
            threads: defaults::threads(),
            messages: defaults::messages(),
            users: defaults::users(),
            tags: defaults::tags(),
            attachments: defaults::attachments(),
            comments: defaults::comments(),
            private_messages: defaults::private_messages(),
            documentation: defaults::documentation(),
            statistics: defaults::statistics(),
            recent_threads: defaults::recent_threads(),
            recent_messages: defaults::recent_messages(),
        }
    }
}

/// Error labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorLocale {
    #[serde(default = "defaults::rendering_failed")]
    pub rendering_failed: String,

    /// Supports `{field}`, `{min}` and `{max}`
    #[serde(default = "defaults::invalid_length")]
    pub invalid_length: String,

    #[serde(default = "defaults::invalid_page")]
    pub invalid_page: String,

    #[serde(default = "defaults::unknown_recipient")]
    pub unknown_recipient: String,

    #[serde(default = "defaults::page_not_found")]
    pub page_not_found: String,
}

impl Default for ErrorLocale {
    fn default() -> Self {
        Self {
            rendering_failed: defaults::rendering_failed(),
            invalid_length: defaults::invalid_length(),
            invalid_page: defaults::invalid_page(),
            unknown_recipient: defaults::unknown_recipient(),
            page_not_found: defaults::page_not_found(),
        }
    }
}

/// Names of validated input fields, as used in validation messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldLocale {
    #[serde(default = "defaults::thread_name")]
    pub thread_name: String,
    #[serde(default = "defaults::message_content")]
    pub message_content: String,
    #[serde(default = "defaults::user_name")]
    pub user_name: String,
    #[serde(default = "defaults::attachment_name")]
    pub attachment_name: String,
    #[serde(default = "defaults::private_message")]
    pub private_message: String,
    #[serde(default = "defaults::comment")]
    pub comment: String,
}

impl Default for FieldLocale {
    fn default() -> Self {
        Self {
            thread_name: defaults::thread_name(),
            message_content: defaults::message_content(),
            user_name: defaults::user_name(),
            attachment_name: defaults::attachment_name(),
            private_message: defaults::private_message(),
            comment: defaults::comment(),
        }
    }
}

mod defaults {
    pub fn quote_header() -> String {
        "{author} wrote on {time}:".into()
    }
    pub fn go_to_page() -> String {
        "Go to page".into()
    }
    pub fn no_content() -> String {
        "Nothing to show here.".into()
    }
    pub fn loading() -> String {
        "Loading...".into()
    }
    pub fn watch_video() -> String {
        "Watch video: {url}".into()
    }
    pub fn unknown_user() -> String {
        "Unknown user".into()
    }
    pub fn sort_by() -> String {
        "Sort by".into()
    }
    pub fn saved() -> String {
        "Changes saved.".into()
    }
    pub fn deleted() -> String {
        "Deleted.".into()
    }
    pub fn message_sent() -> String {
        "Message sent.".into()
    }
    pub fn preview() -> String {
        "Preview".into()
    }
    pub fn quote() -> String {
        "Quote".into()
    }
    pub fn reply() -> String {
        "Reply".into()
    }
    pub fn comment() -> String {
        "Comment".into()
    }

    pub fn home() -> String {
        "Home".into()
    }
    pub fn threads() -> String {
        "Threads".into()
    }
    pub fn messages() -> String {
        "Messages".into()
    }
    pub fn users() -> String {
        "Users".into()
    }
    pub fn tags() -> String {
        "Tags".into()
    }
    pub fn attachments() -> String {
        "Attachments".into()
    }
    pub fn comments() -> String {
        "Comments".into()
    }
    pub fn private_messages() -> String {
        "Private Messages".into()
    }
    pub fn documentation() -> String {
        "Documentation".into()
    }
    pub fn statistics() -> String {
        "Statistics".into()
    }
    pub fn recent_threads() -> String {
        "Recent Threads".into()
    }
    pub fn recent_messages() -> String {
        "Recent Messages".into()
    }

    pub fn thread_name() -> String {
        "Thread name".into()
    }
    pub fn message_content() -> String {
        "Message".into()
    }
    pub fn user_name() -> String {
        "User name".into()
    }
    pub fn attachment_name() -> String {
        "Attachment name".into()
    }
    pub fn private_message() -> String {
        "Private message".into()
    }

    pub fn rendering_failed() -> String {
        "Error while rendering content".into()
    }
    pub fn invalid_length() -> String {
        "{field} must be between {min} and {max} characters long".into()
    }
    pub fn invalid_page() -> String {
        "Please enter a positive page number".into()
    }
    pub fn unknown_recipient() -> String {
        "No user named {name}".into()
    }
    pub fn page_not_found() -> String {
        "The requested page does not exist".into()
    }
}
