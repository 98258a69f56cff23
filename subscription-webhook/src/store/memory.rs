//! In-process subscription store.
//!
//! Keeps profiles and subscriptions in hash maps and counts calls, which
//! makes it the store of choice for handler tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::types::{SubscriptionUpsert, UserId};
use super::{StoreError, SubscriptionStore};
use crate::order::Automation;

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserId>>,
    subscriptions: RwLock<HashMap<(UserId, Automation), SubscriptionUpsert>>,
    lookups: AtomicUsize,
    upserts: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a profile.
    pub fn with_user(mut self, email: impl Into<String>, id: UserId) -> Self {
        self.users.get_mut().insert(email.into(), id);
        self
    }

    /// Make every subsequent upsert fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of `find_user_by_email` calls so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Number of `upsert_subscription` calls so far, failed ones included.
    pub fn upsert_count(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    pub async fn subscription(
        &self,
        user_id: &UserId,
        automation: Automation,
    ) -> Option<SubscriptionUpsert> {
        self.subscriptions
            .read()
            .await
            .get(&(user_id.clone(), automation))
            .cloned()
    }

    pub async fn subscription_count(&self) -> usize {
        self.subscriptions.read().await.len()
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserId>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn upsert_subscription(
        &self,
        subscription: &SubscriptionUpsert,
    ) -> Result<(), StoreError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }

        let key = (subscription.user_id.clone(), subscription.automation_slug);
        self.subscriptions
            .write()
            .await
            .insert(key, subscription.clone());

        Ok(())
    }
}
