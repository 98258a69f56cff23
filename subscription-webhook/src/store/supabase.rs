//! Supabase store backed by the PostgREST HTTP API.
//!
//! The client is built once at startup and cloned into every request; all
//! clones share one connection pool.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use super::types::{
    SubscriptionUpsert, UserId, PROFILES_TABLE, SUBSCRIPTIONS_TABLE,
    SUBSCRIPTION_CONFLICT_COLUMNS,
};
use super::{StoreError, SubscriptionStore};
use crate::Config;

/// Upsert preference: merge on conflict, skip echoing the row back.
const UPSERT_PREFER: &str = "resolution=merge-duplicates,return=minimal";

/// Supabase REST client.
#[derive(Clone)]
pub struct SupabaseStore {
    inner: Arc<SupabaseInner>,
}

struct SupabaseInner {
    client: Client,
    base_url: Url,
    service_key: String,
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    id: Value,
}

impl SupabaseStore {
    /// Create a store for the project at `base_url`.
    pub fn new(
        base_url: Url,
        service_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        if base_url.cannot_be_a_base() {
            return Err(StoreError::Config(format!(
                "{base_url} cannot be used as a base URL"
            )));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            inner: Arc::new(SupabaseInner {
                client,
                base_url,
                service_key: service_key.into(),
            }),
        })
    }

    /// Create a store from the loaded application config.
    pub fn from_config(config: &Config) -> Result<Self, StoreError> {
        Self::new(
            config.supabase_url.clone(),
            config.supabase_service_role_key.clone(),
            Duration::from_millis(config.request_timeout_ms),
        )
    }

    /// `{base}/rest/v1/{table}`, keeping any path prefix on the base URL.
    fn table_url(&self, table: &str) -> Url {
        let mut url = self.inner.base_url.clone();
        url.set_query(None);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["rest", "v1", table]);
        }
        url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.inner.service_key)
            .bearer_auth(&self.inner.service_key)
    }
}

/// Turn a non-2xx response into [`StoreError::Status`].
async fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl SubscriptionStore for SupabaseStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserId>, StoreError> {
        let mut url = self.table_url(PROFILES_TABLE);
        url.query_pairs_mut()
            .append_pair("select", "id")
            .append_pair("email", &format!("eq.{email}"))
            .append_pair("limit", "2");

        debug!(table = PROFILES_TABLE, "supabase_user_lookup_start");

        let response = self
            .authorized(self.inner.client.get(url))
            .header("Accept", "application/json")
            .send()
            .await?;
        let response = check_status(response).await?;

        let body = response.bytes().await?;
        let rows: Vec<ProfileRow> = serde_json::from_slice(&body)?;

        match rows.len() {
            0 => Ok(None),
            1 => {
                let row = rows.into_iter().next().map(|r| r.id).unwrap_or(Value::Null);
                Ok(UserId::from_value(row))
            }
            n => Err(StoreError::Ambiguous(n)),
        }
    }

    async fn upsert_subscription(
        &self,
        subscription: &SubscriptionUpsert,
    ) -> Result<(), StoreError> {
        let mut url = self.table_url(SUBSCRIPTIONS_TABLE);
        url.query_pairs_mut()
            .append_pair("on_conflict", SUBSCRIPTION_CONFLICT_COLUMNS);

        let response = self
            .authorized(self.inner.client.post(url))
            .header("Prefer", UPSERT_PREFER)
            .json(subscription)
            .send()
            .await?;
        check_status(response).await?;

        info!(
            user_id = %subscription.user_id,
            automation_slug = %subscription.automation_slug,
            "supabase_subscription_upserted"
        );

        Ok(())
    }
}
