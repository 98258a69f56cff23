//! Webhook endpoint handlers.
//!
//! The Shopify handler is one linear pass with early exits:
//! 1. Method gate
//! 2. Verify the HMAC over the raw body
//! 3. Decode the order and extract email, title and order id
//! 4. Look the user up
//! 5. Classify the product and upsert the subscription

use std::sync::Arc;

use axum::{
    body::{to_bytes, Bytes},
    extract::{Request, State},
    http::{HeaderMap, Method},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::order::{Automation, OrderPayload};
use crate::store::{SubscriptionStore, SubscriptionUpsert, UserId};
use crate::web::error::WebhookError;
use crate::web::signature::{verify_shopify_hmac, HMAC_HEADER};
use crate::Config;

/// Body returned when the subscription was written.
pub const SUCCESS_BODY: &str = "Subscription recorded";

const TOPIC_HEADER: &str = "x-shopify-topic";
const SHOP_DOMAIN_HEADER: &str = "x-shopify-shop-domain";
const WEBHOOK_ID_HEADER: &str = "x-shopify-webhook-id";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn SubscriptionStore>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn SubscriptionStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Shopify Order Webhook
// =============================================================================

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Shopify order webhook endpoint.
///
/// Mounted for every method so the method gate can answer with its own body.
/// The method is checked before the body is read. The body is then read in
/// full with no size cap, and JSON decoding happens only after the signature
/// over those exact bytes has been checked.
pub async fn shopify_webhook(
    State(state): State<AppState>,
    request: Request,
) -> Result<&'static str, WebhookError> {
    let (parts, body) = request.into_parts();

    if parts.method != Method::POST {
        warn!(method = %parts.method, "shopify_method_not_allowed");
        return Err(WebhookError::MethodNotAllowed);
    }

    let body: Bytes = to_bytes(body, usize::MAX).await.map_err(|e| {
        error!(error = %e, "shopify_body_read_failed");
        WebhookError::BodyRead(e)
    })?;
    let headers = &parts.headers;

    let webhook_id = header_str(headers, WEBHOOK_ID_HEADER);
    info!(
        topic = ?header_str(headers, TOPIC_HEADER),
        shop_domain = ?header_str(headers, SHOP_DOMAIN_HEADER),
        webhook_id = ?webhook_id,
        body_length = body.len(),
        "shopify_webhook_received"
    );

    let signature = header_str(headers, HMAC_HEADER);
    if !verify_shopify_hmac(&state.config.shopify_api_secret, &body, signature) {
        warn!(webhook_id = ?webhook_id, "shopify_signature_invalid");
        return Err(WebhookError::SignatureMismatch);
    }

    let order = OrderPayload::from_slice(&body).map_err(|e| {
        error!(
            error = %e,
            body = %String::from_utf8_lossy(&body),
            "shopify_payload_invalid"
        );
        WebhookError::InvalidPayload(e)
    })?;

    let title = order.product_title();
    let order_id = order.order_id();
    info!(
        order_id = ?order_id,
        product_title = %title,
        line_items = order.line_item_count(),
        "shopify_order_parsed"
    );

    let user_id = lookup_user(state.store.as_ref(), order.email()).await?;

    let automation = Automation::detect(title);
    let subscription =
        SubscriptionUpsert::activate(user_id, automation, title, order_id, Utc::now());

    if let Err(e) = state.store.upsert_subscription(&subscription).await {
        error!(
            error = %e,
            user_id = %subscription.user_id,
            automation_slug = %automation,
            "subscription_upsert_failed"
        );
        return Err(WebhookError::Persistence(e));
    }

    info!(
        user_id = %subscription.user_id,
        automation_slug = %automation,
        plan_name = %subscription.plan_name,
        order_id = ?subscription.order_id,
        "subscription_recorded"
    );

    Ok(SUCCESS_BODY)
}

/// Resolve the order's email to a user. Every failure is reported as not found.
async fn lookup_user(
    store: &dyn SubscriptionStore,
    email: Option<&str>,
) -> Result<UserId, WebhookError> {
    let Some(email) = email else {
        error!("shopify_order_missing_email");
        return Err(WebhookError::UserNotFound);
    };

    match store.find_user_by_email(email).await {
        Ok(Some(user_id)) => Ok(user_id),
        Ok(None) => {
            error!(email = %email, "shopify_user_not_found");
            Err(WebhookError::UserNotFound)
        }
        Err(e) => {
            error!(email = %email, error = %e, "shopify_user_lookup_failed");
            Err(WebhookError::UserNotFound)
        }
    }
}
