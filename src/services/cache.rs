// src/services/cache.rs

//! Session-wide cache of resolved users.
//!
//! Writes are additive: an entry, once resolved, is never replaced or
//! evicted for the lifetime of the cache.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::error::Result;
use crate::models::User;
use crate::services::api::ForumApi;

pub struct UserCache {
    api: Arc<dyn ForumApi>,
    by_id: RwLock<HashMap<String, User>>,
    by_name: RwLock<HashMap<String, User>>,
}

impl UserCache {
    pub fn new(api: Arc<dyn ForumApi>) -> Self {
        Self {
            api,
            by_id: RwLock::default(),
            by_name: RwLock::default(),
        }
    }

    pub fn resolve_by_id(&self, id: &str) -> Option<User> {
        let by_id = self.by_id.read().unwrap_or_else(|e| e.into_inner());
        by_id.get(&id.to_lowercase()).cloned()
    }

    /// Names are matched case-sensitively.
    pub fn resolve_by_name(&self, name: &str) -> Option<User> {
        let by_name = self.by_name.read().unwrap_or_else(|e| e.into_inner());
        by_name.get(name).cloned()
    }

    /// Record a user obtained elsewhere. Existing entries win.
    pub fn insert(&self, user: User) {
        let mut by_id = self.by_id.write().unwrap_or_else(|e| e.into_inner());
        let mut by_name = self.by_name.write().unwrap_or_else(|e| e.into_inner());
        by_name
            .entry(user.name.clone())
            .or_insert_with(|| user.clone());
        by_id.entry(user.id.to_lowercase()).or_insert(user);
    }

    pub fn len(&self) -> usize {
        self.by_id.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve every id not yet cached with a single request.
    pub async fn warm(&self, ids: &HashSet<String>) -> Result<()> {
        let mut missing: Vec<String> = ids
            .iter()
            .map(|id| id.to_lowercase())
            .filter(|id| self.resolve_by_id(id).is_none())
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        missing.sort();
        missing.dedup();

        log::debug!("Resolving {} user id(s)", missing.len());
        let users = self.api.search_users_by_ids(&missing).await?;
        for user in users {
            self.insert(user);
        }

        for id in missing.iter().filter(|id| self.resolve_by_id(id).is_none()) {
            log::debug!("User id {id} could not be resolved");
        }
        Ok(())
    }

    /// Resolve every name not yet cached with a single request.
    pub async fn warm_by_name(&self, names: &HashSet<String>) -> Result<()> {
        let mut missing: Vec<String> = names
            .iter()
            .filter(|name| self.resolve_by_name(name).is_none())
            .cloned()
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        missing.sort();

        log::debug!("Resolving {} user name(s)", missing.len());
        let users = self.api.search_users_by_names(&missing).await?;
        for user in users {
            self.insert(user);
        }

        for name in missing.iter().filter(|n| self.resolve_by_name(n).is_none()) {
            log::debug!("User name {name} could not be resolved");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::api::fake::FakeForumApi;

    const ALICE: &str = "11111111-1111-1111-1111-111111111111";
    const BOB: &str = "22222222-2222-2222-2222-222222222222";

    fn setup() -> (Arc<FakeForumApi>, UserCache) {
        let api = Arc::new(FakeForumApi::with_users(vec![
            User::new(ALICE, "alice"),
            User::new(BOB, "bob"),
        ]));
        let cache = UserCache::new(api.clone());
        (api, cache)
    }

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_warm_batches_into_one_request() {
        let (api, cache) = setup();
        cache.warm(&set(&[ALICE, BOB])).await.unwrap();

        assert_eq!(api.calls("search_users_by_ids"), 1);
        assert_eq!(cache.resolve_by_id(ALICE).unwrap().name, "alice");
        assert_eq!(cache.resolve_by_name("bob").unwrap().id, BOB);
    }

    #[tokio::test]
    async fn test_cached_ids_are_not_requested_again() {
        let (api, cache) = setup();
        cache.warm(&set(&[ALICE])).await.unwrap();
        cache.warm(&set(&[ALICE])).await.unwrap();
        assert_eq!(api.calls("search_users_by_ids"), 1);
    }

    #[tokio::test]
    async fn test_unknown_ids_stay_unresolved() {
        let (_, cache) = setup();
        let unknown = "33333333-3333-3333-3333-333333333333";
        cache.warm(&set(&[unknown])).await.unwrap();
        assert!(cache.resolve_by_id(unknown).is_none());
    }

    #[tokio::test]
    async fn test_first_resolution_wins() {
        let (_, cache) = setup();
        cache.insert(User::new(ALICE, "alice"));
        cache.insert(User::new(ALICE, "mallory"));
        assert_eq!(cache.resolve_by_id(ALICE).unwrap().name, "alice");
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_warm_by_name_is_case_sensitive() {
        let (api, cache) = setup();
        cache.warm_by_name(&set(&["alice", "Bob"])).await.unwrap();

        assert_eq!(api.calls("search_users_by_names"), 1);
        assert!(cache.resolve_by_name("alice").is_some());
        assert!(cache.resolve_by_name("Bob").is_none());
    }

    #[tokio::test]
    async fn test_failed_warm_leaves_cache_usable() {
        let (api, cache) = setup();
        api.fail_with(500, "down");
        assert!(cache.warm(&set(&[ALICE])).await.is_err());
        assert!(cache.is_empty());
    }
}
