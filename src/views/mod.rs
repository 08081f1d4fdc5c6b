//! View builders.
//!
//! Pure functions from fetched entities to element trees. Every piece of
//! user data goes in as text or attribute values; only expanded message
//! content is parsed back from HTML.

pub mod attachments;
pub mod common;
pub mod messages;
pub mod pagination;
pub mod panels;
pub mod sort;
pub mod threads;
pub mod users;

use crate::content::ContentExpander;
use crate::models::{Config, LocaleConfig};

pub use common::{Crumb, breadcrumbs, list_container, no_content, page_header, user_link};
pub use pagination::pagination_control;
pub use sort::{SortOption, sort_control};

/// What view builders may read.
#[derive(Clone, Copy)]
pub struct ViewContext<'a> {
    pub config: &'a Config,
    pub locale: &'a LocaleConfig,
    pub expander: &'a ContentExpander,
}
