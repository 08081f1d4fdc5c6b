//! Services shared by every page of a session.

use std::sync::Arc;

use url::Url;

use crate::content::{
    AdjustContext, CommonMarkRenderer, ContentExpander, DelimitedMath, MathTypesetter,
    default_highlighter,
};
use crate::error::Result;
use crate::models::{Config, LocaleConfig};
use crate::services::{ForumApi, UserCache, Validator};
use crate::storage::{PreferenceStore, external_content_allowed};
use crate::views::ViewContext;

/// Constructed once at startup and handed to every controller.
pub struct AppContext {
    pub config: Config,
    pub locale: LocaleConfig,
    /// Origin the forum is served from; its resources need no consent
    pub origin: Url,
    pub api: Arc<dyn ForumApi>,
    pub users: Arc<UserCache>,
    pub expander: ContentExpander,
    pub math: Arc<dyn MathTypesetter>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub validator: Validator,
}

impl AppContext {
    pub fn new(
        config: Config,
        locale: LocaleConfig,
        api: Arc<dyn ForumApi>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Result<Self> {
        let mut origin = Url::parse(&config.api.base_url)?;
        origin.set_path("/");
        origin.set_query(None);

        let users = Arc::new(UserCache::new(api.clone()));
        let renderer = Arc::new(CommonMarkRenderer::new(default_highlighter()));
        let expander = ContentExpander::new(renderer, users.clone(), &locale);
        let validator = Validator::new(&config.limits, &locale);

        Ok(Self {
            config,
            locale,
            origin,
            api,
            users,
            expander,
            math: Arc::new(DelimitedMath),
            preferences,
            validator,
        })
    }

    pub fn view(&self) -> ViewContext<'_> {
        ViewContext {
            config: &self.config,
            locale: &self.locale,
            expander: &self.expander,
        }
    }

    pub fn adjust_context(&self, external_content_allowed: bool) -> AdjustContext<'_> {
        AdjustContext {
            origin: &self.origin,
            external_content_allowed,
            content: &self.config.content,
            locale: &self.locale,
            math: self.math.as_ref(),
        }
    }

    /// Read the persisted external content consent.
    pub async fn consent(&self) -> bool {
        external_content_allowed(self.preferences.as_ref()).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::services::api::fake::FakeForumApi;
    use crate::storage::MemoryPreferences;

    /// Context over a fake API with default configuration.
    pub fn context(api: Arc<FakeForumApi>) -> Arc<AppContext> {
        let mut config = Config::default();
        config.api.base_url = "https://forum.example.com/api/".into();
        Arc::new(
            AppContext::new(
                config,
                LocaleConfig::default(),
                api,
                Arc::new(MemoryPreferences::new()),
            )
            .unwrap(),
        )
    }
}
