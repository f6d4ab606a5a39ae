use super::models::{Reading, ReadingCreate, ReadingFilter};
use super::services::{IngestOutcome, ingest_reading, list_readings};
use crate::common::auth::Caller;
use crate::common::errors::BusinessError;
use crate::common::state::AppState;
use crate::{duplicate_resource, validation_error};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use utoipa_axum::{router::OpenApiRouter, routes};

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(insert_conditions))
        .routes(routes!(get_readings))
        .with_state(state.clone())
}

#[utoipa::path(
    post,
    path = "/conditions",
    request_body = ReadingCreate,
    responses(
        (status = CREATED, description = "Reading stored for the authenticated station", body = Reading),
        (status = UNAUTHORIZED, description = "Unauthorized access - request denied"),
        (status = CONFLICT, description = "The station already reported a reading at this time"),
        (status = UNPROCESSABLE_ENTITY, description = "battery_percentage missing")
    ),
    security(("bearerAuth" = [])),
    tag = "readings",
    summary = "Station reading ingestion"
)]
pub async fn insert_conditions(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(input): Json<ReadingCreate>,
) -> Result<(StatusCode, Json<Reading>), BusinessError> {
    match ingest_reading(&state.db, &caller, input).await? {
        IngestOutcome::Ingested(reading) => Ok((StatusCode::CREATED, Json(reading))),
        IngestOutcome::Invalid { field, message } => Err(validation_error!(field, message)),
        IngestOutcome::AlreadyExists => Err(duplicate_resource!("reading", "time")),
        IngestOutcome::Unauthenticated => Err(BusinessError::Unauthenticated),
    }
}

#[utoipa::path(
    get,
    path = "/api/readings",
    params(ReadingFilter),
    responses(
        (status = OK, description = "Readings within the requested time range", body = Vec<Reading>),
        (status = INTERNAL_SERVER_ERROR, description = "Storage failure")
    ),
    tag = "readings"
)]
pub async fn get_readings(
    State(state): State<AppState>,
    Query(filter): Query<ReadingFilter>,
) -> Result<Json<Vec<Reading>>, BusinessError> {
    Ok(Json(list_readings(&state.db, &filter).await?))
}
