//! Generic list page.
//!
//! A [`ListController`] owns the sort/page state of one list view. The
//! header is built once by [`ListController::display`]; every later sort or
//! page change replaces only the list container (sort control, pagination
//! and list body).
//!
//! Entity lists (a thread, a category...) are addressed by a slug of the
//! entity name. The header starts out with that slug and switches to the
//! real name once the source resolves it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::actions::{ActionOutcome, PageAction};
use super::busy::BusyGuard;
use super::context::AppContext;
use super::generation::Generation;
use super::{Page, PageController, PendingScroll, ScrollTarget, SharedPage, lock_page};
use crate::content::adjust_attached_content;
use crate::dom::{Element, ids};
use crate::error::{AppError, Result};
use crate::models::{
    Collection, ListState, LocaleConfig, PaginationInfo, SortOrder, parse_page_prompt,
};
use crate::services::ForumApi;
use crate::views::{
    Crumb, SortOption, ViewContext, list_container, no_content, page_header, pagination_control,
    sort_control,
};

/// Id of the pagination control below the list, the scroll target when
/// paging back.
pub const PAGINATION_BOTTOM: &str = "pagination-bottom";

/// What a list page shows and how it fetches it.
#[async_trait]
pub trait ListSource: Send + Sync + 'static {
    type Item: Send + Sync;

    /// Location of the first page, without list segments.
    fn resource_path(&self) -> String;

    /// Title known before anything is fetched.
    fn title(&self, locale: &LocaleConfig) -> String;

    /// Breadcrumbs ending in the page shown under `title`.
    fn breadcrumbs(&self, locale: &LocaleConfig, title: &str) -> Vec<Crumb> {
        vec![Crumb::link(&locale.titles.home, "/"), Crumb::current(title)]
    }

    /// Name of the entity the list belongs to, when the location only
    /// carries its slug.
    async fn entity_name(&self, _ctx: &AppContext) -> Result<Option<String>> {
        Ok(None)
    }

    fn sort_options(&self) -> &'static [SortOption] {
        &[]
    }

    async fn fetch(&self, api: &dyn ForumApi, state: &ListState) -> Result<Collection<Self::Item>>;

    /// Raw markup of `items` that will be expanded, scanned for user
    /// references before rendering.
    fn contents<'a>(&self, _items: &'a [Self::Item]) -> Vec<&'a str> {
        Vec::new()
    }

    fn render(&self, items: &[Self::Item], view: &ViewContext<'_>) -> Element;

    /// Shown below the list, outside the refreshed container.
    fn footer(&self) -> Option<Element> {
        None
    }

    /// Mutations offered by this list.
    async fn handle_action(
        &self,
        _ctx: &AppContext,
        _action: &PageAction,
    ) -> Result<ActionOutcome> {
        Ok(ActionOutcome::Unhandled)
    }
}

pub struct ListController<S: ListSource> {
    ctx: Arc<AppContext>,
    page: SharedPage,
    source: S,
    state: Mutex<ListState>,
    pagination: Mutex<Option<PaginationInfo>>,
    /// Resolved entity name, replacing the title from the location
    resolved_title: Mutex<Option<String>>,
    generation: Generation,
    /// View of the page this controller displayed
    view: AtomicU64,
}

impl<S: ListSource> ListController<S> {
    /// Controller for `source`, starting from the state encoded in `location`.
    pub fn new(ctx: Arc<AppContext>, page: SharedPage, source: S, location: &str) -> Self {
        Self {
            ctx,
            page,
            source,
            state: Mutex::new(ListState::from_location(location)),
            pagination: Mutex::new(None),
            resolved_title: Mutex::new(None),
            generation: Generation::new(),
            view: AtomicU64::new(0),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn state(&self) -> ListState {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Pagination of the list currently shown.
    pub fn pagination(&self) -> Option<PaginationInfo> {
        *self.pagination.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn update_state<R>(&self, f: impl FnOnce(&mut ListState) -> R) -> R {
        let (result, location) = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            let result = f(&mut state);
            (result, state.to_location(&self.source.resource_path()))
        };
        // The page is always locked before the state, never inside it.
        let mut page = lock_page(&self.page);
        if self.owns_page(&page) {
            page.location = location;
        }
        result
    }

    pub fn title(&self) -> String {
        self.resolved_title
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .unwrap_or_else(|| self.source.title(&self.ctx.locale))
    }

    fn notify(&self, error: &AppError) {
        lock_page(&self.page).notifications.report(error);
    }

    /// Whether the page still shows this controller's view.
    fn owns_page(&self, page: &Page) -> bool {
        page.is_current_view(self.view.load(Ordering::SeqCst))
    }

    fn is_stale(&self, token: u64) -> bool {
        !self.generation.is_current(token) || !self.owns_page(&lock_page(&self.page))
    }

    /// Fetch the current state and replace the list container.
    ///
    /// Returns whether the container was replaced. A response is dropped
    /// when a newer refresh has started, the page has moved on to another
    /// view or the container has been detached meanwhile.
    pub async fn refresh(&self) -> Result<bool> {
        let token = self.generation.next();
        let state = self.state();

        let load = async {
            let collection = self.source.fetch(self.ctx.api.as_ref(), &state).await?;
            self.ctx
                .expander
                .warm_references(self.source.contents(&collection.items))
                .await;
            Ok::<_, AppError>(collection)
        };
        let fetched = {
            let _busy = BusyGuard::start(
                &self.page,
                self.ctx.config.display.spinner_delay(),
                &self.ctx.locale.messages.loading,
            );
            load.await
        };

        let collection = match fetched {
            Ok(collection) => collection,
            Err(e) if !self.is_stale(token) => {
                log::warn!("Failed to load {}: {e}", self.source.resource_path());
                self.notify(&e);
                return Err(e);
            }
            Err(e) => {
                log::debug!("Ignoring failure of a stale request: {e}");
                return Err(e);
            }
        };

        let consent = self.ctx.consent().await;
        if self.is_stale(token) {
            log::debug!(
                "Discarding stale response for {} page {}",
                self.source.resource_path(),
                state.page + 1
            );
            return Ok(false);
        }

        let info = collection.pagination();
        let container = self.build_container(&collection.items, &state, &info, consent);

        let mut page = lock_page(&self.page);
        if !self.owns_page(&page) {
            log::debug!("Page left while rendering {}", self.source.resource_path());
            return Ok(false);
        }
        if !page.document.replace_by_id(ids::LIST_CONTAINER, container) {
            log::debug!("List container is gone, discarding response");
            return Ok(false);
        }
        *self.pagination.lock().unwrap_or_else(|e| e.into_inner()) = Some(info);

        let mut current = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if current.page != info.page() {
            current.page = info.page();
            page.location = current.to_location(&self.source.resource_path());
        }
        Ok(true)
    }

    fn build_container(
        &self,
        items: &[S::Item],
        state: &ListState,
        info: &PaginationInfo,
        consent: bool,
    ) -> Element {
        let locale = &self.ctx.locale;
        let path = self.source.resource_path();
        let page_href = |index: usize| {
            ListState {
                page: index,
                ..state.clone()
            }
            .to_location(&path)
        };
        let sort_href = |next: &ListState| next.to_location(&path);
        let window = &self.ctx.config.display.pagination;

        let mut container = list_container();
        if let Some(control) = sort_control(self.source.sort_options(), state, &sort_href, locale) {
            container.push(control);
        }

        if items.is_empty() {
            container.push(no_content(locale));
        } else {
            if let Some(top) = pagination_control(info, window, &page_href, locale) {
                container.push(top);
            }
            container.push(self.source.render(items, &self.ctx.view()));
            if let Some(bottom) = pagination_control(info, window, &page_href, locale) {
                container.push(bottom.id(PAGINATION_BOTTOM));
            }
        }

        adjust_attached_content(&mut container, &self.ctx.adjust_context(consent));
        container
    }

    pub async fn change_sort(&self, order_by: Option<String>, sort_order: SortOrder) -> Result<()> {
        self.update_state(|state| state.set_sort(order_by, sort_order));
        self.refresh().await.map(|_| ())
    }

    /// Go to `index` and scroll towards where the reader continues.
    pub async fn change_page(&self, index: usize) -> Result<()> {
        let previous = self.update_state(|state| std::mem::replace(&mut state.page, index));
        if !self.refresh().await? {
            return Ok(());
        }

        let target = match index.cmp(&previous) {
            std::cmp::Ordering::Greater => ScrollTarget::ListTop,
            std::cmp::Ordering::Less => ScrollTarget::BottomPagination,
            std::cmp::Ordering::Equal => return Ok(()),
        };
        lock_page(&self.page).pending_scroll = Some(PendingScroll {
            target,
            delay: self.ctx.config.display.scroll_delay(),
        });
        Ok(())
    }

    /// Go to the one-based page typed into the ellipsis prompt.
    pub async fn prompt_page(&self, input: &str) -> Result<()> {
        let Some(info) = self.pagination() else {
            return Ok(());
        };
        match parse_page_prompt(input, &info) {
            Some(index) => self.change_page(index).await,
            None => {
                let error = AppError::validation(&self.ctx.locale.errors.invalid_page);
                self.notify(&error);
                Err(error)
            }
        }
    }

    fn header(&self) -> Element {
        let title = self.title();
        page_header(&title, &self.source.breadcrumbs(&self.ctx.locale, &title))
    }

    /// Show the resolved entity name in the title and header.
    fn rename(&self, name: String) {
        *self.resolved_title.lock().unwrap_or_else(|e| e.into_inner()) = Some(name.clone());
        let header = self.header();

        let mut page = lock_page(&self.page);
        if self.owns_page(&page) {
            page.title = name;
            page.document.replace_by_id(ids::PAGE_HEADER, header);
        }
    }
}

#[async_trait]
impl<S: ListSource> PageController for ListController<S> {
    /// Show the header and an empty list, then load it. A failed first
    /// load leaves the "no content" state behind.
    async fn display(&self) -> Result<()> {
        {
            let mut page = lock_page(&self.page);
            self.view.store(page.open_view(), Ordering::SeqCst);
            page.title = self.title();
            page.location = self.state().to_location(&self.source.resource_path());
            let mut content = Element::new("div")
                .class("list-page")
                .child(self.header())
                .child(list_container());
            if let Some(footer) = self.source.footer() {
                content.push(footer);
            }
            page.document.set_content(content);
        }

        let (result, name) =
            futures::join!(self.refresh(), self.source.entity_name(&self.ctx));
        match name {
            Ok(Some(name)) => self.rename(name),
            Ok(None) => {}
            Err(e) => log::debug!(
                "Keeping the title of {} from its location: {e}",
                self.source.resource_path()
            ),
        }

        if result.is_err() {
            let mut page = lock_page(&self.page);
            if !self.owns_page(&page) {
                return result.map(|_| ());
            }
            if let Some(container) = page.document.get_element_by_id_mut(ids::LIST_CONTAINER) {
                container.clear();
                container.push(no_content(&self.ctx.locale));
            }
        }
        result.map(|_| ())
    }

    async fn handle(&self, action: PageAction) -> Result<ActionOutcome> {
        match action {
            PageAction::ChangeSort {
                order_by,
                sort_order,
            } => {
                self.change_sort(order_by, sort_order).await?;
                Ok(ActionOutcome::Done)
            }
            PageAction::ChangePage(index) => {
                self.change_page(index).await?;
                Ok(ActionOutcome::Done)
            }
            PageAction::PromptPage(input) => {
                self.prompt_page(&input).await?;
                Ok(ActionOutcome::Done)
            }
            action => match self.source.handle_action(&self.ctx, &action).await {
                Ok(ActionOutcome::Refresh(message)) => {
                    lock_page(&self.page).notifications.success(&message);
                    self.refresh().await?;
                    Ok(ActionOutcome::Refresh(message))
                }
                Ok(outcome) => Ok(outcome),
                Err(e) => {
                    log::warn!("Action {} failed: {e}", action.name());
                    self.notify(&e);
                    Err(e)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;

    use super::*;
    use crate::models::User;
    use crate::pages::context::testing::context;
    use crate::pages::lists::UsersSource;
    use crate::pages::{Page, Severity};
    use crate::services::api::fake::FakeForumApi;

    fn users(count: usize) -> Vec<User> {
        (0..count)
            .map(|i| {
                let mut user = User::new(format!("u{i}"), format!("user{i}"));
                user.created = Some(Utc::now());
                user
            })
            .collect()
    }

    fn controller(
        api: Arc<FakeForumApi>,
        location: &str,
    ) -> (SharedPage, ListController<UsersSource>) {
        let page = Page::shared();
        let controller = ListController::new(context(api), page.clone(), UsersSource, location);
        (page, controller)
    }

    fn html(page: &SharedPage) -> String {
        lock_page(page).document.to_html()
    }

    #[tokio::test]
    async fn test_display_shows_header_and_first_page() {
        let api = Arc::new(FakeForumApi::with_users(users(5)));
        let (page, controller) = controller(api, "/users");
        controller.display().await.unwrap();

        let html = html(&page);
        assert!(html.contains("user-u0"));
        assert!(html.contains("user-u1"));
        assert!(!html.contains("user-u2"));
        assert!(html.contains(PAGINATION_BOTTOM));
        assert_eq!(controller.pagination().unwrap().page_count(), 3);
    }

    #[tokio::test]
    async fn test_failed_first_load_leaves_no_content_and_one_notification() {
        let api = Arc::new(FakeForumApi::with_users(users(5)));
        api.fail_with(503, "Service unavailable");
        let (page, controller) = controller(api, "/users");

        assert!(controller.display().await.is_err());
        let locked = lock_page(&page);
        assert_eq!(locked.notifications.len(), 1);
        assert_eq!(locked.notifications.items()[0].severity, Severity::Danger);
        assert_eq!(locked.notifications.items()[0].message, "Service unavailable");

        let container = locked.document.get_element_by_id(ids::LIST_CONTAINER).unwrap();
        assert_eq!(container.child_nodes().len(), 1);
        assert!(container.find_all(|e| e.has_class("no-content")).len() == 1);
    }

    #[tokio::test]
    async fn test_page_change_replaces_only_the_list() {
        let api = Arc::new(FakeForumApi::with_users(users(5)));
        let (page, controller) = controller(api, "/users");
        controller.display().await.unwrap();
        lock_page(&page)
            .document
            .get_element_by_id_mut(ids::PAGE_CONTENT)
            .unwrap()
            .push(Element::new("p").id("marker"));

        controller.change_page(1).await.unwrap();

        let locked = lock_page(&page);
        assert!(locked.document.contains_id("marker"));
        assert!(locked.document.contains_id("user-u2"));
        assert!(!locked.document.contains_id("user-u0"));
        assert_eq!(locked.location, "/users/page/2");
        assert_eq!(
            locked.pending_scroll.map(|s| s.target),
            Some(ScrollTarget::ListTop)
        );
    }

    #[tokio::test]
    async fn test_paging_back_scrolls_to_bottom_pagination() {
        let api = Arc::new(FakeForumApi::with_users(users(5)));
        let (page, controller) = controller(api, "/users/page/3");
        controller.display().await.unwrap();
        assert!(lock_page(&page).pending_scroll.is_none());

        controller.change_page(1).await.unwrap();
        assert_eq!(
            lock_page(&page).pending_scroll.map(|s| s.target),
            Some(ScrollTarget::BottomPagination)
        );
    }

    #[tokio::test]
    async fn test_sort_change_restarts_at_first_page() {
        let api = Arc::new(FakeForumApi::with_users(users(5)));
        let (page, controller) = controller(api.clone(), "/users/page/2");
        controller.display().await.unwrap();

        controller
            .change_sort(Some("name".into()), SortOrder::Descending)
            .await
            .unwrap();

        assert_eq!(controller.state().page, 0);
        assert_eq!(
            lock_page(&page).location,
            "/users/orderby/name/sortorder/descending"
        );
        assert_eq!(api.calls("get_users"), 2);
    }

    #[tokio::test]
    async fn test_out_of_range_page_is_clamped() {
        let api = Arc::new(FakeForumApi::with_users(users(3)));
        let (page, controller) = controller(api, "/users/page/9");
        controller.display().await.unwrap();

        assert_eq!(controller.pagination().unwrap().page(), 1);
        assert_eq!(controller.state().page, 1);
        assert_eq!(lock_page(&page).location, "/users/page/2");
    }

    #[tokio::test]
    async fn test_invalid_prompt_warns_without_request() {
        let api = Arc::new(FakeForumApi::with_users(users(5)));
        let (page, controller) = controller(api.clone(), "/users");
        controller.display().await.unwrap();

        assert!(controller.prompt_page("zero").await.is_err());
        assert_eq!(api.calls("get_users"), 1);
        assert_eq!(lock_page(&page).notifications.count(Severity::Warning), 1);

        controller.prompt_page("3").await.unwrap();
        assert!(lock_page(&page).document.contains_id("user-u4"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_is_discarded() {
        let api = Arc::new(FakeForumApi::with_users(users(6)));
        let (page, controller) = controller(api.clone(), "/users");
        controller.display().await.unwrap();
        api.page_delays
            .lock()
            .unwrap()
            .insert(1, Duration::from_secs(2));

        let controller = Arc::new(controller);
        let slow = tokio::spawn({
            let controller = controller.clone();
            async move { controller.change_page(1).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        controller.change_page(2).await.unwrap();
        slow.await.unwrap().unwrap();

        let locked = lock_page(&page);
        assert!(locked.document.contains_id("user-u4"));
        assert!(!locked.document.contains_id("user-u2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_page_change_keeps_newer_scroll() {
        let api = Arc::new(FakeForumApi::with_users(users(6)));
        let (page, controller) = controller(api.clone(), "/users/page/2");
        controller.display().await.unwrap();
        api.page_delays
            .lock()
            .unwrap()
            .insert(0, Duration::from_secs(2));

        let controller = Arc::new(controller);
        let slow = tokio::spawn({
            let controller = controller.clone();
            async move { controller.change_page(0).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        controller.change_page(2).await.unwrap();
        slow.await.unwrap().unwrap();

        let locked = lock_page(&page);
        assert!(locked.document.contains_id("user-u4"));
        assert_eq!(
            locked.pending_scroll.map(|s| s.target),
            Some(ScrollTarget::ListTop)
        );
    }

    #[tokio::test]
    async fn test_response_for_left_view_is_dropped() {
        let api = Arc::new(FakeForumApi::with_users(users(5)));
        let (page, controller) = controller(api, "/users");
        controller.display().await.unwrap();
        lock_page(&page).open_view();

        controller.change_page(1).await.unwrap();
        let locked = lock_page(&page);
        assert!(!locked.document.contains_id("user-u2"));
        assert!(locked.pending_scroll.is_none());
        assert_eq!(locked.location, "/users");
    }

    #[tokio::test]
    async fn test_detached_container_drops_response() {
        let api = Arc::new(FakeForumApi::with_users(users(5)));
        let (page, controller) = controller(api, "/users");
        controller.display().await.unwrap();
        lock_page(&page).document.remove_by_id(ids::LIST_CONTAINER);

        controller.change_page(1).await.unwrap();
        assert!(!lock_page(&page).document.contains_id("user-u2"));
    }
}
