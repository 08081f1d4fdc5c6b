//! Page controllers.
//!
//! A [`Page`] is the live document plus everything shown around it. It is
//! shared between the controller driving it and the background tasks that
//! patch it (spinner, pollers, debounced preview), so it lives behind a
//! [`SharedPage`]. The lock is never held across an `.await`.

pub mod actions;
pub mod busy;
pub mod context;
pub mod docs;
pub mod generation;
pub mod home;
pub mod list;
pub mod lists;
pub mod master;
pub mod notify;
pub mod router;

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::dom::Document;
use crate::error::Result;
use crate::models::User;

pub use actions::{ActionOutcome, PageAction};
pub use busy::{BusyGuard, with_busy};
pub use context::AppContext;
pub use generation::Generation;
pub use list::{ListController, ListSource};
pub use master::Master;
pub use notify::{Notification, Notifications, Severity};
pub use router::{History, Route};

/// Where the view should scroll once layout has settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget {
    /// Top of the list, after paging forward
    ListTop,
    /// Bottom pagination control, after paging back
    BottomPagination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingScroll {
    pub target: ScrollTarget,
    pub delay: Duration,
}

#[derive(Debug, Default)]
pub struct Page {
    pub document: Document,
    pub notifications: Notifications,
    pub title: String,
    /// Location shown in the address bar
    pub location: String,
    pub pending_scroll: Option<PendingScroll>,
    pub current_user: Option<User>,
    busy_count: usize,
    view: u64,
}

pub type SharedPage = Arc<Mutex<Page>>;

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedPage {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Start a new view of the page and return its token.
    ///
    /// Responses loaded for an earlier view must not touch the document.
    pub fn open_view(&mut self) -> u64 {
        self.view += 1;
        self.view
    }

    pub fn is_current_view(&self, view: u64) -> bool {
        self.view == view
    }

    /// Whether an operation holding a [`BusyGuard`] is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy_count > 0
    }
}

/// A page the [`Master`] can show and forward actions to.
#[async_trait]
pub trait PageController: Send + Sync {
    /// Build the page into the document and load its data.
    async fn display(&self) -> Result<()>;

    async fn handle(&self, action: PageAction) -> Result<ActionOutcome>;
}

/// Lock the page. A panic while the page was locked leaves it usable.
pub fn lock_page(page: &SharedPage) -> MutexGuard<'_, Page> {
    page.lock().unwrap_or_else(|e| e.into_inner())
}
