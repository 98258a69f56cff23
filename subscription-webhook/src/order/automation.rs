//! Product title classification into automation categories.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Internal automation a purchase unlocks.
///
/// Serialized as the slug stored in `subscriptions.automation_slug`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Automation {
    CalendarAgent,
    Vera,
    Rebeq,
    Unknown,
}

/// Keyword table, checked in order. First match wins.
const KEYWORDS: &[(&str, Automation)] = &[
    ("calendar", Automation::CalendarAgent),
    ("vera", Automation::Vera),
    ("rebeq", Automation::Rebeq),
];

impl Automation {
    /// Classify a product title. Matching is a case-insensitive substring test.
    pub fn detect(title: &str) -> Self {
        let title = title.to_lowercase();

        KEYWORDS
            .iter()
            .find(|(keyword, _)| title.contains(keyword))
            .map(|(_, automation)| *automation)
            .unwrap_or(Automation::Unknown)
    }

    pub fn slug(self) -> &'static str {
        match self {
            Automation::CalendarAgent => "calendar_agent",
            Automation::Vera => "vera",
            Automation::Rebeq => "rebeq",
            Automation::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Automation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
