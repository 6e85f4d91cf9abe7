use axum::response::{IntoResponse, Redirect};
use crm_access::Destination;

/// The protected root decides whether the visitor sees the dashboard or the login form.
pub async fn index() -> impl IntoResponse {
    Redirect::to(Destination::ProtectedRoot.path())
}

pub async fn health_check() -> &'static str {
    "OK"
}
