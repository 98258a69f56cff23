//! Subhook - Shopify order webhook to automation subscriptions.
//!
//! A thin web service that receives signed Shopify order webhooks, works out
//! which automation the purchased product unlocks, and records an active
//! subscription for the buyer in Supabase.
//!
//! ## Flow
//!
//! ```text
//! Shopify → POST /api/shopify/webhook → verify HMAC → OrderPayload
//!         → profiles lookup → Automation::detect → subscriptions upsert
//! ```

pub mod config;
pub mod order;
pub mod store;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use order::{Automation, OrderPayload};
pub use store::{MemoryStore, StoreError, SubscriptionStore, SupabaseStore, UserId};
pub use web::{router, AppState, WebhookError};
