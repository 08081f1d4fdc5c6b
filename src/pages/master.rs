//! Session master: skeleton, side panels, navigation and action dispatch.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::actions::{ActionOutcome, PageAction};
use super::context::AppContext;
use super::docs::DocumentPage;
use super::home::HomePage;
use super::list::ListController;
use super::lists::{
    AttachmentsSource, CommentsSource, LatestMessagesSource, PrivateMessagesSource, TagsSource,
    ThreadMessagesSource, ThreadsSource, UsersSource,
};
use super::router::{History, Route};
use super::{Page, PageController, SharedPage, lock_page};
use crate::content::adjust_attached_content;
use crate::dom::{Element, ids};
use crate::error::Result;
use crate::models::{ListState, SortOrder};
use crate::services::{Debouncer, PollHandle, PollStatus, spawn_poller};
use crate::views::messages::composer_preview;
use crate::views::panels::{recent_messages_panel, recent_threads_panel, statistics_panel};

/// Replace a side panel; a missing panel stops its poller.
fn replace_panel(page: &SharedPage, id: &str, panel: Element) -> PollStatus {
    if lock_page(page).document.replace_by_id(id, panel) {
        PollStatus::Continue
    } else {
        PollStatus::Stop
    }
}

fn panel_attached(page: &SharedPage, id: &str) -> bool {
    lock_page(page).document.contains_id(id)
}

async fn refresh_statistics(ctx: &AppContext, page: &SharedPage) -> PollStatus {
    if !panel_attached(page, ids::STATISTICS) {
        return PollStatus::Stop;
    }
    match ctx.api.get_statistics().await {
        Ok(statistics) => replace_panel(
            page,
            ids::STATISTICS,
            statistics_panel(&statistics, &ctx.locale),
        ),
        Err(e) => {
            log::warn!("Failed to refresh statistics: {e}");
            PollStatus::Continue
        }
    }
}

async fn refresh_recent_threads(ctx: &AppContext, page: &SharedPage) -> PollStatus {
    if !panel_attached(page, ids::RECENT_THREADS) {
        return PollStatus::Stop;
    }
    match ctx.api.get_recent_threads().await {
        Ok(threads) => replace_panel(
            page,
            ids::RECENT_THREADS,
            recent_threads_panel(&threads, &ctx.locale),
        ),
        Err(e) => {
            log::warn!("Failed to refresh recent threads: {e}");
            PollStatus::Continue
        }
    }
}

async fn refresh_recent_messages(ctx: &AppContext, page: &SharedPage) -> PollStatus {
    if !panel_attached(page, ids::RECENT_MESSAGES) {
        return PollStatus::Stop;
    }
    let latest = ListState {
        order_by: Some("created".to_string()),
        sort_order: SortOrder::Descending,
        page: 0,
    };
    match ctx.api.get_latest_messages(&latest).await {
        Ok(messages) => replace_panel(
            page,
            ids::RECENT_MESSAGES,
            recent_messages_panel(&messages.items, &ctx.locale),
        ),
        Err(e) => {
            log::warn!("Failed to refresh recent messages: {e}");
            PollStatus::Continue
        }
    }
}

async fn check_session(ctx: &AppContext, page: &SharedPage) -> PollStatus {
    match ctx.api.get_current_user().await {
        Ok(user) => {
            let mut page = lock_page(page);
            if page.current_user != user {
                log::info!(
                    "Session changed: {}",
                    user.as_ref().map_or("anonymous", |u| u.name.as_str())
                );
                page.current_user = user;
            }
        }
        Err(e) => log::warn!("Session check failed: {e}"),
    }
    PollStatus::Continue
}

pub struct Master {
    ctx: Arc<AppContext>,
    page: SharedPage,
    history: Mutex<History>,
    current: Mutex<Option<Arc<dyn PageController>>>,
    pollers: Mutex<Vec<PollHandle>>,
    preview: Debouncer,
}

impl Master {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        let preview = Debouncer::new(ctx.config.display.preview_debounce());
        Self {
            ctx,
            page: Page::shared(),
            history: Mutex::new(History::new()),
            current: Mutex::new(None),
            pollers: Mutex::new(Vec::new()),
            preview,
        }
    }

    pub fn page(&self) -> &SharedPage {
        &self.page
    }

    pub fn context(&self) -> &Arc<AppContext> {
        &self.ctx
    }

    pub fn history(&self) -> History {
        self.history.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Fill the side panels, check the session and start the pollers.
    pub async fn bootstrap(&self) {
        let (ctx, page) = (&self.ctx, &self.page);
        futures::join!(
            refresh_statistics(ctx, page),
            refresh_recent_threads(ctx, page),
            refresh_recent_messages(ctx, page),
            check_session(ctx, page),
        );

        let polling = &self.ctx.config.polling;
        let pollers = [
            self.poller("statistics", polling.statistics_secs, |ctx, page| async move {
                refresh_statistics(&ctx, &page).await
            }),
            self.poller("recent-threads", polling.recent_content_secs, |ctx, page| async move {
                refresh_recent_threads(&ctx, &page).await
            }),
            self.poller("recent-messages", polling.recent_content_secs, |ctx, page| async move {
                refresh_recent_messages(&ctx, &page).await
            }),
            self.poller("session", polling.auth_check_secs, |ctx, page| async move {
                check_session(&ctx, &page).await
            }),
        ];
        self.pollers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(pollers.into_iter().flatten());
    }

    fn poller<F, Fut>(&self, name: &str, secs: u64, tick: F) -> Option<PollHandle>
    where
        F: Fn(Arc<AppContext>, SharedPage) -> Fut + Send + 'static,
        Fut: Future<Output = PollStatus> + Send + 'static,
    {
        let ctx = self.ctx.clone();
        let page = self.page.clone();
        spawn_poller(name, Duration::from_secs(secs), move || {
            tick(ctx.clone(), page.clone())
        })
    }

    fn controller_for(&self, route: Route, location: &str) -> Arc<dyn PageController> {
        let ctx = self.ctx.clone();
        let page = self.page.clone();
        match route {
            Route::Home => Arc::new(HomePage::new(ctx, page)),
            Route::Threads => list(ctx, page, ThreadsSource::all(), location),
            Route::CategoryThreads { id, name } => {
                list(ctx, page, ThreadsSource::category(&id, &name), location)
            }
            Route::TagThreads { id, name } => {
                list(ctx, page, ThreadsSource::tag(&id, &name), location)
            }
            Route::UserThreads { id, name } => {
                list(ctx, page, ThreadsSource::user(&id, &name), location)
            }
            Route::Thread { id, name } => {
                list(ctx, page, ThreadMessagesSource::new(&id, &name), location)
            }
            Route::Messages => list(ctx, page, LatestMessagesSource, location),
            Route::Users => list(ctx, page, UsersSource, location),
            Route::Tags => list(ctx, page, TagsSource, location),
            Route::Attachments => list(ctx, page, AttachmentsSource, location),
            Route::Comments => list(ctx, page, CommentsSource, location),
            Route::PrivateMessages => list(ctx, page, PrivateMessagesSource, location),
            Route::Privacy => Arc::new(DocumentPage::privacy(ctx, page)),
            Route::Terms => Arc::new(DocumentPage::terms(ctx, page)),
            Route::Documentation(name) => Arc::new(DocumentPage::new(
                ctx,
                page,
                &name,
                &format!("/documentation/{name}"),
            )),
        }
    }

    /// Show the page at `location` and record it in the history.
    pub async fn navigate(&self, location: &str) -> Result<()> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(location);
        self.show(location).await
    }

    /// Go back to the previous location. Returns `false` at the start of
    /// the history.
    pub async fn back(&self) -> Result<bool> {
        let previous = self
            .history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .back()
            .map(str::to_string);
        match previous {
            Some(location) => self.show(&location).await.map(|()| true),
            None => Ok(false),
        }
    }

    async fn show(&self, location: &str) -> Result<()> {
        self.preview.cancel();
        {
            let mut page = lock_page(&self.page);
            page.pending_scroll = None;
            page.location = location.to_string();
        }

        let route = match Route::parse(location) {
            Ok(route) => route,
            Err(e) => {
                log::info!("No page at {location}");
                *self.current.lock().unwrap_or_else(|e| e.into_inner()) = None;
                let mut page = lock_page(&self.page);
                page.open_view();
                let message = self.ctx.locale.errors.page_not_found.clone();
                page.title = message.clone();
                page.document
                    .set_content(Element::new("p").class("page-not-found").text(&message));
                page.notifications.danger(message);
                return Err(e);
            }
        };

        let controller = self.controller_for(route, location);
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = Some(controller.clone());
        let result = controller.display().await;

        let still_shown = self
            .current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, &controller));
        if still_shown {
            let shown = lock_page(&self.page).location.clone();
            self.history
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .replace(&shown);
        }
        result
    }

    /// Forward `action` to the current page.
    pub async fn dispatch(&self, action: PageAction) -> Result<ActionOutcome> {
        if let PageAction::PreviewMessage { content } = action {
            self.preview(content);
            return Ok(ActionOutcome::Done);
        }

        let current = self.current.lock().unwrap_or_else(|e| e.into_inner()).clone();
        let Some(controller) = current else {
            return Ok(ActionOutcome::Unhandled);
        };

        let outcome = controller.handle(action).await?;
        match &outcome {
            ActionOutcome::Navigate(location) => self.navigate(location).await?,
            ActionOutcome::Done | ActionOutcome::Refresh(_) => {
                let shown = lock_page(&self.page).location.clone();
                self.history
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .replace(&shown);
            }
            ActionOutcome::Unhandled => {}
        }
        Ok(outcome)
    }

    /// Re-render the composer preview once typing pauses.
    pub fn preview(&self, content: String) {
        let ctx = self.ctx.clone();
        let page = self.page.clone();
        self.preview.schedule(async move {
            ctx.expander.warm_references([content.as_str()]).await;
            let consent = ctx.consent().await;

            let mut preview = composer_preview(&content, &ctx.view());
            adjust_attached_content(&mut preview, &ctx.adjust_context(consent));
            if !lock_page(&page)
                .document
                .replace_by_id(ids::MESSAGE_PREVIEW, preview)
            {
                log::debug!("No composer on this page, dropping preview");
            }
        });
    }

    /// Stop the pollers and any pending preview.
    pub fn shutdown(&self) {
        for poller in self.pollers.lock().unwrap_or_else(|e| e.into_inner()).drain(..) {
            poller.cancel();
        }
        self.preview.cancel();
    }
}

impl Drop for Master {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn list<S: super::ListSource>(
    ctx: Arc<AppContext>,
    page: SharedPage,
    source: S,
    location: &str,
) -> Arc<dyn PageController> {
    Arc::new(ListController::new(ctx, page, source, location))
}
