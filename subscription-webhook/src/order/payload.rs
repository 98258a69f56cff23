//! Shopify order payload and field extraction.
//!
//! The body is kept as a JSON object and each field is read on demand. A
//! field with an unexpected shape counts as absent instead of failing the
//! whole order, so only bodies that are not a JSON object are rejected.

use serde_json::{Map, Value};
use thiserror::Error;

/// Title used when an order carries no usable line item.
pub const UNKNOWN_TITLE: &str = "unknown";

/// Why a body could not be read as an order.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("body is a JSON {0}, expected an object")]
    NotAnObject(&'static str),
}

/// A decoded Shopify `orders/*` webhook body.
#[derive(Debug, Clone, Default)]
pub struct OrderPayload {
    fields: Map<String, Value>,
}

impl OrderPayload {
    /// Decode a payload from the raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, PayloadError> {
        match serde_json::from_slice(body)? {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(PayloadError::NotAnObject(json_kind(&other))),
        }
    }

    /// Email to look the user up by.
    ///
    /// The top-level `email` wins; `customer.email` is the fallback. Empty
    /// strings and non-string values count as absent at both steps.
    pub fn email(&self) -> Option<&str> {
        if let Some(email) = non_empty_str(self.fields.get("email")) {
            return Some(email);
        }

        let customer = self.fields.get("customer")?;
        non_empty_str(customer.get("email"))
    }

    /// Title of the first line item, or [`UNKNOWN_TITLE`].
    ///
    /// Only the first item is consulted, even when later items have titles.
    pub fn product_title(&self) -> &str {
        let first = self.line_items().and_then(|items| items.first());

        first
            .and_then(|item| non_empty_str(item.get("title")))
            .unwrap_or(UNKNOWN_TITLE)
    }

    pub fn line_item_count(&self) -> usize {
        self.line_items().map(Vec::len).unwrap_or(0)
    }

    /// Order id rendered as a string; numbers are rendered without quotes.
    pub fn order_id(&self) -> Option<String> {
        match self.fields.get("id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn line_items(&self) -> Option<&Vec<Value>> {
        self.fields.get("line_items").and_then(Value::as_array)
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
