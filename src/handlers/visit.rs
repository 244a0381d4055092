use crate::{models::Notice, session::Visitor, AppState};
use axum::{
    extract::{Form, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct VisitForm {
    code: String,
}

/// POST /visit
///
/// Simulated redirect. The server never answers with a 3xx to the original
/// URL:
/// - known, unexpired code: visit counted, outcome is `Notice::Open`
/// - unknown or expired code: outcome is `Notice::Alert`
///
/// The page script asks for JSON and opens the new browsing context itself,
/// inside the click. Without it the outcome is parked on the session and
/// shown by the next render.
pub async fn visit(
    State(state): State<Arc<AppState>>,
    mut visitor: Visitor,
    headers: HeaderMap,
    Form(form): Form<VisitForm>,
) -> Response {
    let wants_json = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));

    let token = visitor.establish(&state.sessions);
    let now = Utc::now();
    let notice = state.sessions.with_session(&token, |session| {
        let notice = match session.app.visit(&form.code, now) {
            Ok(original_url) => {
                tracing::debug!("Visit '{}' -> {}", form.code, original_url);
                Notice::Open(original_url)
            }
            Err(e) => {
                tracing::debug!("Visit '{}' refused: {}", form.code, e);
                Notice::Alert(e.to_string())
            }
        };
        if !wants_json {
            session.notice = Some(notice.clone());
        }
        notice
    });

    match notice {
        Some(notice) if wants_json => (visitor.jar, Json(notice)).into_response(),
        _ => (visitor.jar, Redirect::to("/")).into_response(),
    }
}
