use axum::{extract::State, Json};
use crm_access::{AccessLevel, Office};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub office: Office,
    pub access_level: Option<AccessLevel>,
    pub can_switch_offices: bool,
}

pub async fn dashboard_handler(State(state): State<AppState>) -> Json<DashboardView> {
    let profile = state.tenancy.profile();

    Json(DashboardView {
        office: state.tenancy.current_office(),
        access_level: profile.map(|p| p.access_level),
        can_switch_offices: state.tenancy.can_switch_offices(),
    })
}
