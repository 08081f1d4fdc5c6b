//! Markdown documents: privacy policy, terms of service, documentation.

use std::sync::Arc;

use async_trait::async_trait;

use super::actions::{ActionOutcome, PageAction};
use super::busy::with_busy;
use super::context::AppContext;
use super::{PageController, SharedPage, lock_page};
use crate::content::adjust_attached_content;
use crate::dom::Element;
use crate::error::{AppError, Result};
use crate::views::{Crumb, no_content, page_header};

pub struct DocumentPage {
    ctx: Arc<AppContext>,
    page: SharedPage,
    /// Identifier the API knows the document by
    name: String,
    location: String,
}

impl DocumentPage {
    pub fn new(ctx: Arc<AppContext>, page: SharedPage, name: &str, location: &str) -> Self {
        Self {
            ctx,
            page,
            name: name.to_string(),
            location: location.to_string(),
        }
    }

    pub fn privacy(ctx: Arc<AppContext>, page: SharedPage) -> Self {
        let name = ctx.config.documents.privacy.clone();
        Self::new(ctx, page, &name, "/privacy")
    }

    pub fn terms(ctx: Arc<AppContext>, page: SharedPage) -> Self {
        let name = ctx.config.documents.terms.clone();
        Self::new(ctx, page, &name, "/terms")
    }

    fn header(&self) -> Element {
        let locale = &self.ctx.locale;
        page_header(
            &self.name,
            &[
                Crumb::link(&locale.titles.home, "/"),
                Crumb::current(&locale.titles.documentation),
                Crumb::current(&self.name),
            ],
        )
    }
}

#[async_trait]
impl PageController for DocumentPage {
    async fn display(&self) -> Result<()> {
        let view;
        {
            let mut page = lock_page(&self.page);
            view = page.open_view();
            page.title = self.name.clone();
            page.location = self.location.clone();
            page.document.set_content(self.header());
        }

        let ctx = &self.ctx;
        let loaded = with_busy(
            &self.page,
            ctx.config.display.spinner_delay(),
            &ctx.locale.messages.loading,
            async {
                let document = ctx.api.get_document(&self.name).await?;
                ctx.expander.warm_references([document.content.as_str()]).await;
                Ok::<_, AppError>((document, ctx.consent().await))
            },
        )
        .await;

        let body = loaded.map(|(document, consent)| {
            let mut body = ctx.expander.expand_element(&document.content);
            body.add_class("document");
            let mut wrapper = Element::new("div").child(body);
            adjust_attached_content(&mut wrapper, &ctx.adjust_context(consent));
            wrapper
        });

        let mut page = lock_page(&self.page);
        if !page.is_current_view(view) {
            log::debug!("Document {} left before it loaded", self.name);
            return body.map(|_| ());
        }
        match body {
            Ok(body) => {
                page.document
                    .set_content(Element::new("div").child(self.header()).child(body));
                Ok(())
            }
            Err(e) => {
                log::warn!("Failed to load document {}: {e}", self.name);
                page.notifications.report(&e);
                page.document.set_content(
                    Element::new("div")
                        .child(self.header())
                        .child(no_content(&ctx.locale)),
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
    use super::*;
    use crate::models::Document;
    use crate::pages::Page;
    use crate::pages::context::testing::context;
    use crate::services::api::fake::FakeForumApi;

    #[tokio::test]
    async fn test_privacy_document_is_expanded_and_adjusted() {
        let api = Arc::new(FakeForumApi::new());
        api.documents.lock().unwrap().push(Document {
            name: "privacy".into(),
            content: "# Privacy\n\n![tracker](https://ads.example.net/pixel.gif)".into(),
        });
        let page = Page::shared();
        DocumentPage::privacy(context(api), page.clone())
            .display()
            .await
            .unwrap();

        let locked = lock_page(&page);
        let content = locked.document.content().unwrap();
        assert_eq!(content.find_by_tag("h1").len(), 2);
        assert!(content.find_by_tag("img").is_empty());
        assert!(!content.to_html().contains("src=\"https://ads.example.net"));
        assert_eq!(locked.location, "/privacy");
    }

    #[tokio::test]
    async fn test_missing_document_is_reported() {
        let page = Page::shared();
        let result = DocumentPage::new(
            context(Arc::new(FakeForumApi::new())),
            page.clone(),
            "markdown",
            "/documentation/markdown",
        )
        .display()
        .await;

        assert!(result.is_err());
        assert_eq!(lock_page(&page).notifications.len(), 1);
    }
}
