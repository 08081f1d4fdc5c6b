//! Location to page mapping and navigation history.

use crate::error::{AppError, Result};
use crate::utils::url::{path_segments, strip_list_segments};

/// A page of the forum, as addressed by a location.
///
/// Entity routes carry the URL-safe name embedded ahead of the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Threads,
    CategoryThreads { id: String, name: String },
    TagThreads { id: String, name: String },
    UserThreads { id: String, name: String },
    Thread { id: String, name: String },
    Messages,
    Users,
    Tags,
    Attachments,
    Comments,
    PrivateMessages,
    Privacy,
    Terms,
    Documentation(String),
}

impl Route {
    /// Parse a location; list segments and query strings are ignored.
    pub fn parse(location: &str) -> Result<Self> {
        let segments = path_segments(&strip_list_segments(location));
        let parts: Vec<&str> = segments.iter().map(String::as_str).collect();

        let route = match parts.as_slice() {
            [] => Route::Home,
            ["threads"] => Route::Threads,
            ["category", name, id] => Route::CategoryThreads {
                id: id.to_string(),
                name: name.to_string(),
            },
            ["tag", name, id] => Route::TagThreads {
                id: id.to_string(),
                name: name.to_string(),
            },
            ["user", name, id] => Route::UserThreads {
                id: id.to_string(),
                name: name.to_string(),
            },
            ["thread", name, id] => Route::Thread {
                id: id.to_string(),
                name: name.to_string(),
            },
            ["messages"] => Route::Messages,
            ["users"] => Route::Users,
            ["tags"] => Route::Tags,
            ["attachments"] => Route::Attachments,
            ["comments"] => Route::Comments,
            ["private_messages"] => Route::PrivateMessages,
            ["privacy"] => Route::Privacy,
            ["terms"] => Route::Terms,
            ["documentation", name] => Route::Documentation(name.to_string()),
            _ => return Err(AppError::not_found(location)),
        };
        Ok(route)
    }

    /// Whether the page is a paginated list.
    pub fn is_list(&self) -> bool {
        !matches!(
            self,
            Route::Home | Route::Privacy | Route::Terms | Route::Documentation(_)
        )
    }
}

/// Locations visited in this session, most recent last.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<String>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a visit. Reloading the current location adds no entry.
    pub fn push(&mut self, location: &str) {
        if self.current() != Some(location) {
            self.entries.push(location.to_string());
        }
    }

    /// Replace the current entry, e.g. after a sort or page change.
    pub fn replace(&mut self, location: &str) {
        match self.entries.last_mut() {
            Some(current) => *current = location.to_string(),
            None => self.entries.push(location.to_string()),
        }
    }

    /// Leave the current location; returns the one to show instead.
    pub fn back(&mut self) -> Option<&str> {
        if self.entries.len() < 2 {
            return None;
        }
        self.entries.pop();
        self.current()
    }

    pub fn current(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
