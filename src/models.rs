use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How long a shortened URL stays redirectable after creation.
pub const LINK_LIFETIME_DAYS: i64 = 7;

/// Length of a generated short code.
pub const SHORT_CODE_LEN: usize = 6;

/// A single original-URL → short-code mapping held in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortenedUrl {
    pub original_url: String,
    pub short_code: String,
    pub visits: u64,
    pub created_at: DateTime<Utc>,
    /// Checked lazily on visit; expired records are never removed.
    pub expiry: DateTime<Utc>,
}

impl ShortenedUrl {
    pub fn new(original_url: String, short_code: String, now: DateTime<Utc>) -> Self {
        Self {
            original_url,
            short_code,
            visits: 0,
            created_at: now,
            expiry: now + chrono::Duration::days(LINK_LIFETIME_DAYS),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expiry
    }
}

/// The two mutually exclusive views of the UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    #[default]
    Shorten,
    Stats,
}

/// Aggregates shown on the statistics view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statistics<'a> {
    pub total_urls: usize,
    pub total_visits: u64,
    /// `None` when the collection is empty.
    pub most_visited: Option<&'a ShortenedUrl>,
}

/// Outcome of a simulated redirect: parked for the next page render, or
/// returned directly as `{"alert": ..}` / `{"open": ..}` to the page script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Notice {
    /// Blocking user-facing alert.
    Alert(String),
    /// Open the URL in a new browsing context.
    Open(String),
}
