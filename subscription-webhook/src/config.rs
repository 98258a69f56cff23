//! Configuration module for environment variable parsing.
//!
//! All configuration is read once at startup. The webhook secret and the
//! Supabase credentials are required; everything else has a default.

use std::env;

use anyhow::{bail, Context, Result};
use tracing::warn;
use url::Url;

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Supabase project URL (PostgREST lives under `/rest/v1`)
    pub supabase_url: Url,

    /// Supabase service role key, sent as both `apikey` and bearer token
    pub supabase_service_role_key: String,

    /// Shopify app secret used to sign webhook bodies
    pub shopify_api_secret: String,

    /// Port for the web server to listen on
    pub port: u16,

    /// Timeout for requests to Supabase in milliseconds
    pub request_timeout_ms: u64,
}

// Secrets stay out of Debug output so config can be logged safely.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("supabase_url", &self.supabase_url.as_str())
            .field("supabase_service_role_key", &"<redacted>")
            .field("shopify_api_secret", &"<redacted>")
            .field("port", &self.port)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = required(&lookup, "SUPABASE_URL")?;
        let supabase_url = Url::parse(&raw_url)
            .with_context(|| format!("SUPABASE_URL is not a valid URL: {raw_url}"))?;

        Ok(Config {
            supabase_url,
            supabase_service_role_key: required(&lookup, "SUPABASE_SERVICE_ROLE_KEY")?,
            shopify_api_secret: required(&lookup, "SHOPIFY_API_SECRET")?,
            port: parse_or(&lookup, "PORT", 8080),
            request_timeout_ms: parse_or(&lookup, "REQUEST_TIMEOUT_MS", 10_000),
        })
    }
}

/// Fetch a variable that must be present and non-blank.
///
/// The value is returned verbatim; surrounding whitespace is part of a secret.
fn required<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        Some(_) => bail!("{name} is set but empty"),
        None => bail!("{name} must be set"),
    }
}

/// Parse an optional variable, falling back to `default` when absent or invalid.
fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let Some(raw) = lookup(name) else {
        return default;
    };

    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            default
        }
    }
}
