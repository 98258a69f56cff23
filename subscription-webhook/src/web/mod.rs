//! Web server module for the Shopify order webhook.
//!
//! - `POST /api/shopify/webhook`: verify, decode, record the subscription
//! - `GET /health`: liveness check

pub mod error;
pub mod handlers;
pub mod signature;

use axum::{
    extract::DefaultBodyLimit,
    routing::{any, get},
    Router,
};
use tower_http::trace::TraceLayer;

pub use error::WebhookError;
pub use handlers::{health, shopify_webhook, AppState, HealthResponse, SUCCESS_BODY};
pub use signature::{compute_signature, verify_shopify_hmac, HMAC_HEADER};

/// Path the Shopify webhook subscription points at.
pub const WEBHOOK_PATH: &str = "/api/shopify/webhook";

/// Build the application router.
///
/// The webhook route carries no body size limit; the handler reads the whole
/// body itself after the method gate.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            WEBHOOK_PATH,
            any(shopify_webhook).layer(DefaultBodyLimit::disable()),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use url::Url;

    use crate::store::{MemoryStore, UserId};
    use crate::Config;

    const SECRET: &str = "router-secret";

    fn app(store: Arc<MemoryStore>) -> Router {
        let config = Config {
            supabase_url: Url::parse("http://localhost:54321").unwrap(),
            supabase_service_role_key: "service-key".to_string(),
            shopify_api_secret: SECRET.to_string(),
            port: 0,
            request_timeout_ms: 1000,
        };
        router(AppState::new(config, store))
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health_route() {
        let response = app(Arc::new(MemoryStore::new()))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, r#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn test_get_webhook_is_method_not_allowed() {
        let response = app(Arc::new(MemoryStore::new()))
            .oneshot(Request::get(WEBHOOK_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_text(response).await, "Only POST requests allowed");
    }

    #[tokio::test]
    async fn test_signed_order_end_to_end() {
        let store = Arc::new(MemoryStore::new().with_user("a@x.com", UserId::new("U123")));
        let body = r#"{"email":"a@x.com","line_items":[{"title":"Calendar Plus"}],"id":555}"#;
        let signature = compute_signature(SECRET, body.as_bytes()).unwrap();

        let request = Request::post(WEBHOOK_PATH)
            .header("content-type", "application/json")
            .header(HMAC_HEADER, signature)
            .body(Body::from(body))
            .unwrap();

        let response = app(store.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, SUCCESS_BODY);
        assert_eq!(store.upsert_count(), 1);

        let row = store
            .subscription(&UserId::new("U123"), crate::order::Automation::CalendarAgent)
            .await
            .unwrap();
        assert_eq!(row.plan_name, "Calendar Plus");
        assert_eq!(row.order_id.as_deref(), Some("555"));
    }

    #[tokio::test]
    async fn test_large_signed_order_end_to_end() {
        let store = Arc::new(MemoryStore::new().with_user("a@x.com", UserId::new("U123")));
        let padding = "x".repeat(3 * 1024 * 1024);
        let body = format!(
            r#"{{"email":"a@x.com","note":"{padding}","line_items":[{{"title":"Vera"}}],"id":9}}"#
        );
        let signature = compute_signature(SECRET, body.as_bytes()).unwrap();

        let request = Request::post(WEBHOOK_PATH)
            .header(HMAC_HEADER, signature)
            .body(Body::from(body))
            .unwrap();

        let response = app(store.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(store.upsert_count(), 1);
    }

    #[tokio::test]
    async fn test_large_get_is_method_not_allowed() {
        let request = Request::get(WEBHOOK_PATH)
            .body(Body::from("x".repeat(3 * 1024 * 1024)))
            .unwrap();

        let response = app(Arc::new(MemoryStore::new()))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_text(response).await, "Only POST requests allowed");
    }

    #[tokio::test]
    async fn test_signed_order_with_bad_signature_end_to_end() {
        let store = Arc::new(MemoryStore::new().with_user("a@x.com", UserId::new("U123")));
        let body = r#"{"email":"a@x.com","line_items":[{"title":"Calendar Plus"}],"id":555}"#;

        let request = Request::post(WEBHOOK_PATH)
            .header(HMAC_HEADER, "AAAA")
            .body(Body::from(body))
            .unwrap();

        let response = app(store.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(store.lookup_count(), 0);
        assert_eq!(store.upsert_count(), 0);
    }
}
