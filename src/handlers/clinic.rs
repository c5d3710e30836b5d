use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{AvailabilitySnapshot, ClinicSchedule, ClinicService};
use crate::services::booking::availability_for;
use crate::services::validation::parse_date;
use crate::state::AppState;

// GET /api/services
pub async fn list_services(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ClinicService>>, AppError> {
    let services = {
        let db = state.db()?;
        queries::list_services(&db, true)?
    };
    Ok(Json(services))
}

// GET /api/schedule
pub async fn get_schedule(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClinicSchedule>, AppError> {
    let schedule = {
        let db = state.db()?;
        queries::get_schedule(&db)?
    };
    Ok(Json(schedule))
}

// GET /api/availability?date=YYYY-MM-DD
#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub date: Option<String>,
}

pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilitySnapshot>, AppError> {
    let date = match query.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => state.config.clinic_today(),
    };

    let snapshot = {
        let db = state.db()?;
        availability_for(&db, date)?
    };
    Ok(Json(snapshot))
}
