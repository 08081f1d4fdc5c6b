//! Home page: the category tree and the most recently active threads.

use std::sync::Arc;

use async_trait::async_trait;

use super::actions::{ActionOutcome, PageAction};
use super::busy::with_busy;
use super::context::AppContext;
use super::{PageController, SharedPage, lock_page};
use crate::dom::Element;
use crate::error::Result;
use crate::views::threads::{category_tree, thread_table};
use crate::views::{Crumb, no_content, page_header};

pub struct HomePage {
    ctx: Arc<AppContext>,
    page: SharedPage,
}

impl HomePage {
    pub fn new(ctx: Arc<AppContext>, page: SharedPage) -> Self {
        Self { ctx, page }
    }
}

#[async_trait]
impl PageController for HomePage {
    async fn display(&self) -> Result<()> {
        let locale = &self.ctx.locale;
        let header = page_header(&locale.titles.home, &[Crumb::current(&locale.titles.home)]);
        let view;
        {
            let mut page = lock_page(&self.page);
            view = page.open_view();
            page.title = locale.titles.home.clone();
            page.location = "/".to_string();
            page.document.set_content(header.clone());
        }

        let api = self.ctx.api.as_ref();
        let loaded = with_busy(
            &self.page,
            self.ctx.config.display.spinner_delay(),
            &locale.messages.loading,
            async { futures::try_join!(api.get_categories(), api.get_recent_threads()) },
        )
        .await;

        let mut page = lock_page(&self.page);
        if !page.is_current_view(view) {
            log::debug!("Home page left before it loaded");
            return loaded.map(|_| ());
        }
        match loaded {
            Ok((categories, threads)) => {
                page.document.set_content(
                    Element::new("div")
                        .class("home-page")
                        .child(header)
                        .child(category_tree(&categories))
                        .child(Element::new("h2").text(&locale.titles.recent_threads))
                        .child(thread_table(&threads, locale)),
                );
                Ok(())
            }
            Err(e) => {
                log::warn!("Failed to load the home page: {e}");
                page.notifications.report(&e);
                page.document.set_content(
                    Element::new("div")
                        .class("home-page")
                        .child(header)
                        .child(no_content(locale)),
                );
                Err(e)
            }
        }
    }

    async fn handle(&self, _action: PageAction) -> Result<ActionOutcome> {
        Ok(ActionOutcome::Unhandled)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::{Category, Thread};
    use crate::pages::Page;
    use crate::pages::context::testing::context;
    use crate::services::api::fake::FakeForumApi;

    #[tokio::test]
    async fn test_home_loads_categories_and_recent_threads() {
        let api = Arc::new(FakeForumApi::new());
        *api.categories.lock().unwrap() = vec![Category {
            id: "c1".into(),
            name: "General".into(),
            description: String::new(),
            display_order: 0,
            thread_count: 1,
            message_count: 1,
            children: Vec::new(),
        }];
        *api.threads.lock().unwrap() = vec![Thread {
            id: "t1".into(),
            name: "Welcome".into(),
            created: Utc::now(),
            created_by: None,
            pinned: false,
            tags: Vec::new(),
            category_ids: vec!["c1".into()],
            message_count: 1,
            visited_count: 0,
            latest_message: None,
        }];

        let page = Page::shared();
        HomePage::new(context(api.clone()), page.clone())
            .display()
            .await
            .unwrap();

        let html = lock_page(&page).document.to_html();
        assert!(html.contains("General"));
        assert!(html.contains("thread-t1"));
        assert_eq!(api.total_calls(), 2);
    }

    #[tokio::test]
    async fn test_home_failure_keeps_header() {
        let api = Arc::new(FakeForumApi::new());
        api.fail_with(500, "down");
        let page = Page::shared();

        assert!(HomePage::new(context(api), page.clone()).display().await.is_err());
        let locked = lock_page(&page);
        assert_eq!(locked.notifications.len(), 1);
        assert!(locked.document.to_html().contains("no-content"));
        assert!(locked.document.to_html().contains("page-header"));
    }
}
