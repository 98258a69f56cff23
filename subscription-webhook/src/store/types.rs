//! Rows exchanged with the subscription store.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::order::Automation;

/// Table holding user profiles, looked up by email.
pub const PROFILES_TABLE: &str = "profiles";

/// Table holding subscriptions, unique on (`user_id`, `automation_slug`).
pub const SUBSCRIPTIONS_TABLE: &str = "subscriptions";

/// Conflict target for subscription upserts.
pub const SUBSCRIPTION_CONFLICT_COLUMNS: &str = "user_id,automation_slug";

/// Opaque user identifier from the `profiles` table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build an id from a JSON column value. Non-string ids keep their JSON rendering.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(Self(s)),
            other => Some(Self(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Inactive,
}

/// A subscription row as written to the store.
///
/// Field names match the `subscriptions` columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionUpsert {
    pub user_id: UserId,
    pub automation_slug: Automation,
    /// Product title the subscription was bought under
    pub plan_name: String,
    pub status: SubscriptionStatus,
    pub started_at: DateTime<Utc>,
    /// Originating order; left out of the row when the order had no id
    #[serde(rename = "shopify_order_id", skip_serializing_if = "Option::is_none", default)]
    pub order_id: Option<String>,
}

impl SubscriptionUpsert {
    /// Build an active subscription starting at `started_at`.
    pub fn activate(
        user_id: UserId,
        automation: Automation,
        plan_name: impl Into<String>,
        order_id: Option<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            automation_slug: automation,
            plan_name: plan_name.into(),
            status: SubscriptionStatus::Active,
            started_at,
            order_id,
        }
    }
}
