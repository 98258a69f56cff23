//! Order handling: payload decoding and automation classification.
//!
//! ```text
//! raw body → OrderPayload → (email, title, order id) → Automation
//! ```

pub mod automation;
pub mod payload;

pub use automation::Automation;
pub use payload::{OrderPayload, PayloadError, UNKNOWN_TITLE};
