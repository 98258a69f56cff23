//! Shopify webhook signature verification.
//!
//! Shopify signs the raw request body with HMAC-SHA256 using the app's API
//! secret and sends the base64 digest in `X-Shopify-Hmac-SHA256`.
//! Reference: https://shopify.dev/docs/apps/build/webhooks/subscribe/https#step-5-verify-the-webhook

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the base64 HMAC of the body.
pub const HMAC_HEADER: &str = "x-shopify-hmac-sha256";

/// Compute the base64 HMAC-SHA256 of `body` under `secret`.
pub fn compute_signature(secret: &str, body: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(body);
    Some(BASE64.encode(mac.finalize().into_bytes()))
}

/// Verify a Shopify webhook signature.
///
/// # Arguments
///
/// * `secret` - Shopify app API secret
/// * `body` - The raw, unparsed request body
/// * `signature` - Value of the `X-Shopify-Hmac-SHA256` header, if any
///
/// # Returns
///
/// `true` only when the header equals the expected digest byte for byte.
pub fn verify_shopify_hmac(secret: &str, body: &[u8], signature: Option<&str>) -> bool {
    let Some(signature) = signature.filter(|s| !s.is_empty()) else {
        warn!(body_length = body.len(), "shopify_signature_missing");
        return false;
    };

    let Some(expected) = compute_signature(secret, body) else {
        warn!("shopify_signature_invalid_key");
        return false;
    };

    let valid: bool = expected.as_bytes().ct_eq(signature.as_bytes()).into();

    if !valid {
        warn!(
            expected_length = expected.len(),
            actual_length = signature.len(),
            body_length = body.len(),
            "shopify_signature_mismatch"
        );
    }

    valid
}
