use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use crm_access::{AuthError, Destination, GateView, Session};
use serde::Deserialize;

use crate::error::ConsoleError;
use crate::AppState;

const LOGIN_FORM: &str = r##"<form hx-post="/login" hx-target="#login-error" class="space-y-4">
  <input type="email" name="email" placeholder="Email" class="input" />
  <input type="password" name="password" placeholder="Password" class="input" />
  <div id="login-error"></div>
  <button type="submit" class="btn-primary">Sign in</button>
</form>"##;

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

fn hx_redirect(destination: Destination) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        "HX-Redirect",
        HeaderValue::from_static(destination.path()),
    );
    (StatusCode::OK, headers, "").into_response()
}

pub async fn login_page(State(state): State<AppState>) -> Response {
    match state.gate.login_view() {
        GateView::Redirect(destination) => Redirect::to(destination.path()).into_response(),
        _ => Html(LOGIN_FORM).into_response(),
    }
}

pub async fn login_handler(
    State(state): State<AppState>,
    Form(payload): Form<LoginRequest>,
) -> Result<Response, ConsoleError> {
    match state.session.login(&payload.email, &payload.password).await {
        Ok(_) => {
            let office = state.tenancy.current_office();
            tracing::info!(
                email = %payload.email,
                office_id = %office.id,
                "Console login succeeded"
            );
            Ok(hx_redirect(Destination::ProtectedRoot))
        }
        // Error fragment for HTMX
        Err(AuthError::InvalidCredentials) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Html("<p class='text-red-500 text-sm'>Invalid email or password</p>"),
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

pub async fn logout_handler(State(state): State<AppState>) -> Response {
    let destination = state.session.logout().await;
    hx_redirect(destination)
}

pub async fn session_status(State(state): State<AppState>) -> Json<Session> {
    Json(state.session.session())
}
