use axum::{extract::State, Form, Json};
use crm_access::{Office, OfficeId};
use serde::{Deserialize, Serialize};

use crate::error::ConsoleError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct OfficeListView {
    pub current_office_id: OfficeId,
    pub can_switch_offices: bool,
    pub offices: Vec<Office>,
}

#[derive(Deserialize)]
pub struct SwitchOfficeRequest {
    pub office_id: String,
}

/// Offices visible to the caller. Single-office profiles only see the
/// office they operate in.
pub async fn list_offices(State(state): State<AppState>) -> Json<OfficeListView> {
    let current = state.tenancy.current_office();
    let can_switch = state.tenancy.can_switch_offices();

    let offices = if can_switch {
        state.tenancy.list_offices().to_vec()
    } else {
        vec![current.clone()]
    };

    Json(OfficeListView {
        current_office_id: current.id,
        can_switch_offices: can_switch,
        offices,
    })
}

pub async fn switch_office(
    State(state): State<AppState>,
    Form(payload): Form<SwitchOfficeRequest>,
) -> Result<Json<Office>, ConsoleError> {
    let office = state.tenancy.switch_office(&payload.office_id)?;
    Ok(Json(office))
}
