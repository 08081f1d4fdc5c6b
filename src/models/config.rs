//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Pagination and timing of the view layer
    #[serde(default)]
    pub display: DisplayConfig,

    /// Auto-refresh intervals
    #[serde(default)]
    pub polling: PollingConfig,

    /// Length constraints per content type
    #[serde(default)]
    pub limits: LengthLimits,

    /// Content expansion settings
    #[serde(default)]
    pub content: ContentConfig,

    /// Identifiers of the privacy and terms documents
    #[serde(default)]
    pub documents: DocumentsConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if url::Url::parse(&self.api.base_url).is_err() {
            return Err(AppError::validation(format!(
                "api.base_url is not an absolute URL: {}",
                self.api.base_url
            )));
        }
        if self.api.response_prefix.is_empty() {
            return Err(AppError::validation("api.response_prefix is empty"));
        }
        if self.api.timeout_secs == 0 {
            return Err(AppError::validation("api.timeout_secs must be > 0"));
        }
        if self.display.pagination.middle == 0 {
            return Err(AppError::validation(
                "display.pagination.middle must be > 0",
            ));
        }
        if !self.content.external_image_warning.contains("{domain}")
            && !self.content.external_image_warning.contains("{url}")
        {
            return Err(AppError::validation(
                "content.external_image_warning must mention {domain} or {url}",
            ));
        }
        for (name, limit) in self.limits.all() {
            if limit.min > limit.max {
                return Err(AppError::validation(format!(
                    "limits.{name}: min ({}) is greater than max ({})",
                    limit.min, limit.max
                )));
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            display: DisplayConfig::default(),
            polling: PollingConfig::default(),
            limits: LengthLimits::default(),
            content: ContentConfig::default(),
            documents: DocumentsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Remote API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Origin of the forum, also used for same-origin checks
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Sentinel every response body starts with
    #[serde(default = "defaults::response_prefix")]
    pub response_prefix: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            response_prefix: defaults::response_prefix(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Number of page links shown before, around and after the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    pub before: usize,
    pub middle: usize,
    pub after: usize,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            before: 3,
            middle: 5,
            after: 3,
        }
    }
}

/// View layer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub pagination: PageWindow,

    /// Pending requests shorter than this never show the spinner
    #[serde(default = "defaults::spinner_delay")]
    pub spinner_delay_ms: u64,

    /// Delay before scrolling after a page change, lets layout settle
    #[serde(default = "defaults::scroll_delay")]
    pub scroll_delay_ms: u64,

    /// Quiet period before the composer preview is re-rendered
    #[serde(default = "defaults::preview_debounce")]
    pub preview_debounce_ms: u64,
}

impl DisplayConfig {
    pub fn spinner_delay(&self) -> Duration {
        Duration::from_millis(self.spinner_delay_ms)
    }

    pub fn scroll_delay(&self) -> Duration {
        Duration::from_millis(self.scroll_delay_ms)
    }

    pub fn preview_debounce(&self) -> Duration {
        Duration::from_millis(self.preview_debounce_ms)
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            pagination: PageWindow::default(),
            spinner_delay_ms: defaults::spinner_delay(),
            scroll_delay_ms: defaults::scroll_delay(),
            preview_debounce_ms: defaults::preview_debounce(),
        }
    }
}

/// Auto-refresh intervals in seconds. Zero disables the poller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "defaults::statistics_interval")]
    pub statistics_secs: u64,

    #[serde(default = "defaults::recent_content_interval")]
    pub recent_content_secs: u64,

    #[serde(default = "defaults::auth_check_interval")]
    pub auth_check_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            statistics_secs: defaults::statistics_interval(),
            recent_content_secs: defaults::recent_content_interval(),
            auth_check_secs: defaults::auth_check_interval(),
        }
    }
}

/// Inclusive character-count bounds for a text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthLimit {
    pub min: usize,
    pub max: usize,
}

impl LengthLimit {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }
}

/// Length constraints per content type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LengthLimits {
    #[serde(default = "defaults::thread_name_limit")]
    pub thread_name: LengthLimit,

    #[serde(default = "defaults::message_content_limit")]
    pub message_content: LengthLimit,

    #[serde(default = "defaults::user_name_limit")]
    pub user_name: LengthLimit,

    #[serde(default = "defaults::attachment_name_limit")]
    pub attachment_name: LengthLimit,

    #[serde(default = "defaults::private_message_limit")]
    pub private_message: LengthLimit,

    #[serde(default = "defaults::comment_limit")]
    pub comment: LengthLimit,
}

impl LengthLimits {
    fn all(&self) -> [(&'static str, LengthLimit); 6] {
        [
            ("thread_name", self.thread_name),
            ("message_content", self.message_content),
            ("user_name", self.user_name),
            ("attachment_name", self.attachment_name),
            ("private_message", self.private_message),
            ("comment", self.comment),
        ]
    }
}

impl Default for LengthLimits {
    fn default() -> Self {
        Self {
            thread_name: defaults::thread_name_limit(),
            message_content: defaults::message_content_limit(),
            user_name: defaults::user_name_limit(),
            attachment_name: defaults::attachment_name_limit(),
            private_message: defaults::private_message_limit(),
            comment: defaults::comment_limit(),
        }
    }
}

/// Content expansion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Label of the link replacing an unconsented third-party image.
    /// Supports `{domain}` and `{url}`.
    #[serde(default = "defaults::external_image_warning")]
    pub external_image_warning: String,

    /// Classes added to every rendered table
    #[serde(default = "defaults::table_classes")]
    pub table_classes: String,

    /// Hosts whose links are turned into video embeds
    #[serde(default = "defaults::video_hosts")]
    pub video_hosts: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            external_image_warning: defaults::external_image_warning(),
            table_classes: defaults::table_classes(),
            video_hosts: defaults::video_hosts(),
        }
    }
}

/// Identifiers of the legal documents shown under `/privacy` and `/terms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsConfig {
    #[serde(default = "defaults::privacy_document")]
    pub privacy: String,

    #[serde(default = "defaults::terms_document")]
    pub terms: String,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            privacy: defaults::privacy_document(),
            terms: defaults::terms_document(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use super::LengthLimit;

    // API defaults
    pub fn base_url() -> String {
        "http://localhost:8081".into()
    }
    pub fn response_prefix() -> String {
        ")]}',\n".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; forum-client/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Display defaults
    pub fn spinner_delay() -> u64 {
        500
    }
    pub fn scroll_delay() -> u64 {
        100
    }
    pub fn preview_debounce() -> u64 {
        400
    }

    // Polling defaults
    pub fn statistics_interval() -> u64 {
        60
    }
    pub fn recent_content_interval() -> u64 {
        30
    }
    pub fn auth_check_interval() -> u64 {
        300
    }

    // Limit defaults
    pub fn thread_name_limit() -> LengthLimit {
        LengthLimit::new(5, 128)
    }
    pub fn message_content_limit() -> LengthLimit {
        LengthLimit::new(5, 65535)
    }
    pub fn user_name_limit() -> LengthLimit {
        LengthLimit::new(3, 20)
    }
    pub fn attachment_name_limit() -> LengthLimit {
        LengthLimit::new(1, 128)
    }
    pub fn private_message_limit() -> LengthLimit {
        LengthLimit::new(1, 4096)
    }
    pub fn comment_limit() -> LengthLimit {
        LengthLimit::new(3, 1024)
    }

    // Content defaults
    pub fn external_image_warning() -> String {
        "Image from {domain} (may load external content, click to view)".into()
    }
    pub fn table_classes() -> String {
        "uk-table uk-table-divider uk-table-small".into()
    }
    pub fn video_hosts() -> Vec<String> {
        vec![
            "youtube.com".into(),
            "www.youtube.com".into(),
            "m.youtube.com".into(),
            "youtu.be".into(),
            "vimeo.com".into(),
            "www.vimeo.com".into(),
        ]
    }

    // Document defaults
    pub fn privacy_document() -> String {
        "privacy".into()
    }
    pub fn terms_document() -> String {
        "terms".into()
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
