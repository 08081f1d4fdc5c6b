// src/models/mod.rs

//! Domain models for the forum client.
//!
//! This module contains the entities returned by the remote API and the
//! state the view layer derives from them (pagination, sort state), plus
//! configuration and locale labels.

mod config;
mod entities;
mod locale;
mod pagination;
mod sort;

// Re-export all public types
pub use config::{
    ApiConfig, Config, ContentConfig, DisplayConfig, DocumentsConfig, LengthLimit, LengthLimits,
    LoggingConfig, PageWindow, PollingConfig,
};
pub use entities::{
    Attachment, Category, Collection, Comment, Document, LatestMessage, Message, PrivateMessage,
    Statistics, Tag, Thread, User,
};
pub use locale::{ErrorLocale, FieldLocale, LocaleConfig, MessageLocale, TitleLocale};
pub use pagination::{PageLink, PaginationInfo, compute_page_links, parse_page_prompt};
pub use sort::{ListState, SortOrder};
