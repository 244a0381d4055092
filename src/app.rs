use chrono::{DateTime, Utc};
use url::Url;

use crate::{
    errors::{RedirectError, ShortenError},
    models::{Page, ShortenedUrl, Statistics, SHORT_CODE_LEN},
};

/// View-state container for one UI session: the shortened URLs plus the
/// current page, the form inputs and the inline error message.
///
/// Every operation runs to completion synchronously; callers own the locking.
#[derive(Debug, Clone, Default)]
pub struct ShortenerApp {
    urls: Vec<ShortenedUrl>,
    page: Page,
    original_url: String,
    custom_code: String,
    error: Option<String>,
}

impl ShortenerApp {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records, in insertion order.
    pub fn urls(&self) -> &[ShortenedUrl] {
        &self.urls
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn original_url(&self) -> &str {
        &self.original_url
    }

    pub fn custom_code(&self) -> &str {
        &self.custom_code
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Switch the active view.
    pub fn show(&mut self, page: Page) {
        self.page = page;
    }

    pub fn find(&self, short_code: &str) -> Option<&ShortenedUrl> {
        self.urls.iter().find(|u| u.short_code == short_code)
    }

    // ── Shortening form ────────────────────────────────────────────────────

    /// Submit the shortening form.
    ///
    /// The inputs are kept on failure so the form re-renders with them, and
    /// the error message is set. On success a new record is appended and the
    /// inputs and error are cleared. Returns the short code of the new record.
    pub fn submit(
        &mut self,
        original_url: impl Into<String>,
        custom_code: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<String, ShortenError> {
        self.original_url = original_url.into();
        self.custom_code = custom_code.into();

        match self.add_short_url(now) {
            Ok(short_code) => {
                tracing::info!("URL shortened: {} -> {}", self.original_url, short_code);
                self.original_url.clear();
                self.custom_code.clear();
                self.error = None;
                Ok(short_code)
            }
            Err(e) => {
                tracing::debug!("Rejected submission of '{}': {}", self.original_url, e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn add_short_url(&mut self, now: DateTime<Utc>) -> Result<String, ShortenError> {
        if self.original_url.is_empty() {
            return Err(ShortenError::EmptyUrl);
        }
        if Url::parse(&self.original_url).is_err() {
            return Err(ShortenError::InvalidUrl);
        }

        let short_code = if self.custom_code.is_empty() {
            generate_short_code()
        } else {
            self.custom_code.clone()
        };

        if self.find(&short_code).is_some() {
            return Err(ShortenError::DuplicateCode);
        }

        self.urls.push(ShortenedUrl::new(
            self.original_url.clone(),
            short_code.clone(),
            now,
        ));
        Ok(short_code)
    }

    // ── Redirect simulation ────────────────────────────────────────────────

    /// Simulate following a short URL. On success the visit counter of the
    /// matching record goes up by one and its original URL is returned.
    pub fn visit(&mut self, short_code: &str, now: DateTime<Utc>) -> Result<String, RedirectError> {
        let record = self
            .urls
            .iter_mut()
            .find(|u| u.short_code == short_code)
            .ok_or(RedirectError::NotFound)?;

        if record.is_expired(now) {
            return Err(RedirectError::Expired);
        }

        record.visits += 1;
        Ok(record.original_url.clone())
    }

    // ── Statistics ─────────────────────────────────────────────────────────

    pub fn stats(&self) -> Statistics<'_> {
        // Ties keep the earliest record.
        let most_visited = self
            .urls
            .iter()
            .reduce(|best, u| if u.visits > best.visits { u } else { best });

        Statistics {
            total_urls: self.urls.len(),
            total_visits: self.urls.iter().map(|u| u.visits).sum(),
            most_visited,
        }
    }
}

/// Generate a random lowercase base-36 short code.
pub fn generate_short_code() -> String {
    use rand::Rng;
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    (0..SHORT_CODE_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}
