use crate::{
    app::ShortenerApp,
    models::{Notice, Page},
    session::Visitor,
    AppState,
};
use askama::Template;
use axum::{
    extract::{Form, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

// ── Template structs ───────────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    page: Page,
    // Shorten view
    urls: Vec<UrlRow>,
    original_url: String,
    custom_code: String,
    error: Option<String>,
    // Stats view
    total_urls: usize,
    total_visits: u64,
    most_visited: String,
    // Pending notice, rendered once
    alert: Option<String>,
    open_url: Option<String>,
}

struct UrlRow {
    original_url: String,
    short_code: String,
    short_url: String,
    visits: u64,
    expires: String,
}

impl IndexTemplate {
    fn new(app: &ShortenerApp, notice: Option<Notice>, base_url: &str) -> Self {
        let urls = app
            .urls()
            .iter()
            .map(|u| UrlRow {
                original_url: u.original_url.clone(),
                short_code: u.short_code.clone(),
                short_url: format!("{}/{}", base_url, u.short_code),
                visits: u.visits,
                expires: u.expiry.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            })
            .collect();

        let stats = app.stats();
        let most_visited = stats
            .most_visited
            .map(|u| u.original_url.clone())
            .unwrap_or_else(|| "N/A".to_owned());

        let (alert, open_url) = match notice {
            Some(Notice::Alert(msg)) => (Some(msg), None),
            Some(Notice::Open(url)) => (None, Some(url)),
            None => (None, None),
        };

        Self {
            page: app.page(),
            urls,
            original_url: app.original_url().to_owned(),
            custom_code: app.custom_code().to_owned(),
            error: app.error().map(str::to_owned),
            total_urls: stats.total_urls,
            total_visits: stats.total_visits,
            most_visited,
            alert,
            open_url,
        }
    }
}

// ── Form types ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ShortenForm {
    #[serde(default)]
    url: String,
    #[serde(default)]
    custom_code: String,
}

// ── Handlers ───────────────────────────────────────────────────────────────

/// GET /
/// Render the active view of the caller's session and consume any pending
/// notice. A caller without a session sees the empty shorten view; no session
/// is created until something changes.
pub async fn index(State(state): State<Arc<AppState>>, visitor: Visitor) -> Response {
    let base_url = state.config.base_url.as_str();
    let view = visitor
        .token()
        .and_then(|token| {
            state.sessions.with_session(token, |session| {
                IndexTemplate::new(&session.app, session.notice.take(), base_url)
            })
        })
        .unwrap_or_else(|| IndexTemplate::new(&ShortenerApp::new(), None, base_url));

    (visitor.jar, view).into_response()
}

/// POST /view/:page
pub async fn show(
    State(state): State<Arc<AppState>>,
    mut visitor: Visitor,
    Path(page): Path<Page>,
) -> Response {
    let token = visitor.establish(&state.sessions);
    state
        .sessions
        .with_session(&token, |session| session.app.show(page));

    (visitor.jar, Redirect::to("/")).into_response()
}

/// POST /links
/// Outcome (new record or inline error) is kept in the session and shown on
/// the following GET.
pub async fn create_link(
    State(state): State<Arc<AppState>>,
    mut visitor: Visitor,
    Form(form): Form<ShortenForm>,
) -> Response {
    let token = visitor.establish(&state.sessions);
    let now = Utc::now();
    state.sessions.with_session(&token, |session| {
        // Rejections are carried by the session's error field
        let _ = session.app.submit(form.url, form.custom_code, now);
    });

    (visitor.jar, Redirect::to("/")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_session_shows_placeholders() {
        let app = ShortenerApp::new();
        let tmpl = IndexTemplate::new(&app, None, "http://localhost:3000");

        assert!(tmpl.urls.is_empty());
        assert_eq!(tmpl.total_urls, 0);
        assert_eq!(tmpl.total_visits, 0);
        assert_eq!(tmpl.most_visited, "N/A");
        assert!(tmpl.render().unwrap().contains("No URLs yet."));
    }

    #[test]
    fn rows_carry_short_url_and_notice_is_split() {
        let mut app = ShortenerApp::new();
        app.submit("https://example.com", "abc", Utc::now()).unwrap();
        app.visit("abc", Utc::now()).unwrap();

        let tmpl = IndexTemplate::new(
            &app,
            Some(Notice::Alert("Short URL expired!".into())),
            "http://localhost:3000",
        );

        assert_eq!(tmpl.urls[0].short_url, "http://localhost:3000/abc");
        assert_eq!(tmpl.urls[0].visits, 1);
        assert_eq!(tmpl.most_visited, "https://example.com");
        assert_eq!(tmpl.alert.as_deref(), Some("Short URL expired!"));
        assert!(tmpl.open_url.is_none());
    }
}
