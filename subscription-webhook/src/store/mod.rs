//! Subscription store: the data-access seam between the webhook and the database.
//!
//! The handler only talks to [`SubscriptionStore`]. Production uses
//! [`SupabaseStore`] (PostgREST over HTTP); tests and local runs can use
//! [`MemoryStore`].

pub mod memory;
pub mod supabase;
pub mod types;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStore;
pub use supabase::SupabaseStore;
pub use types::{
    SubscriptionStatus, SubscriptionUpsert, UserId, PROFILES_TABLE,
    SUBSCRIPTIONS_TABLE, SUBSCRIPTION_CONFLICT_COLUMNS,
};

/// Errors surfaced by a store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode store response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("expected at most one row, found {0}")]
    Ambiguous(usize),

    #[error("invalid store configuration: {0}")]
    Config(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Data access used by the webhook handler.
///
/// Implementations own their concurrency control; the upsert must be atomic
/// on the (`user_id`, `automation_slug`) pair.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Find the user whose profile email equals `email` exactly.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserId>, StoreError>;

    /// Insert the subscription, or overwrite the row with the same user and automation.
    async fn upsert_subscription(
        &self,
        subscription: &SubscriptionUpsert,
    ) -> Result<(), StoreError>;
}
