use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use crm_access::{Destination, GateView};

use crate::AppState;

const LOADING_FRAGMENT: &str =
    "<div class='animate-pulse text-slate-400 text-sm' hx-get='' hx-trigger='load delay:500ms'>Loading…</div>";

/// Gate every protected route behind the session.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match state.gate.mount().await {
        GateView::Render => next.run(request).await,
        GateView::Waiting => (StatusCode::ACCEPTED, Html(LOADING_FRAGMENT)).into_response(),
        GateView::Redirect(_) => match state.gate.complete_redirect() {
            Some(destination) => Redirect::to(destination.path()).into_response(),
            // Cancelled by a login, or already completed by a concurrent request
            None if state.gate.view() == GateView::Render => next.run(request).await,
            None => Redirect::to(Destination::Login.path()).into_response(),
        },
    }
}
