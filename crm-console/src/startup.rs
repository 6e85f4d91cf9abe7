use std::sync::Arc;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use crm_access::{SessionStore, TenancyRegistry};
use service_core::middleware::tracing::{request_id_middleware, RequestId};
use tower_http::trace::TraceLayer;

use crate::config::Settings;
use crate::handlers::{
    app::{health_check, index},
    auth::{login_handler, login_page, logout_handler, session_status},
    dashboard::dashboard_handler,
    offices::{list_offices, switch_office},
};
use crate::middleware::auth::auth_middleware;
use crate::AppState;

/// Wire storage, validator, session store and office registry from settings.
pub async fn build_state(settings: &Settings) -> anyhow::Result<AppState> {
    let storage = settings.session.build_storage().await?;
    let validator = settings.credentials.build_validator()?;
    let session = Arc::new(SessionStore::with_key(
        storage,
        validator,
        settings.session.key.clone(),
    ));

    let tenancy = Arc::new(TenancyRegistry::new(settings.offices.clone())?);
    tracing::info!(
        offices = tenancy.list_offices().len(),
        backend = ?settings.session.backend,
        "Access core configured"
    );

    Ok(AppState::new(session, tenancy, settings.access.clone()))
}

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/dashboard", get(dashboard_handler))
        .route("/offices", get(list_offices))
        .route("/offices/switch", post(switch_office))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/login", get(login_page).post(login_handler))
        .route("/logout", get(logout_handler))
        .route("/session", get(session_status))
        .merge(protected)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .extensions()
                    .get::<RequestId>()
                    .map(RequestId::as_str)
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Outermost so the span sees the generated request id
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
