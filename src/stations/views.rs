use super::models::{Station, StationCreate, StationUpdate};
use super::services::{
    AddStationOutcome, RemoveStationOutcome, UpdateStationOutcome, add_station, get_station,
    list_stations, remove_station, update_station,
};
use crate::common::auth::Caller;
use crate::common::errors::BusinessError;
use crate::common::state::AppState;
use crate::{duplicate_resource, forbidden, not_found};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use utoipa_axum::{router::OpenApiRouter, routes};

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(get_stations, create_station))
        .routes(routes!(get_one_station, patch_station, delete_station))
        .with_state(state.clone())
}

#[utoipa::path(
    get,
    path = "/api/stations",
    responses(
        (status = OK, description = "All registered stations", body = Vec<Station>),
        (status = INTERNAL_SERVER_ERROR, description = "Storage failure")
    ),
    tag = "stations"
)]
pub async fn get_stations(State(state): State<AppState>) -> Result<Json<Vec<Station>>, BusinessError> {
    Ok(Json(list_stations(&state.db).await?))
}

#[utoipa::path(
    get,
    path = "/api/stations/{id}",
    params(("id" = i32, Path, description = "Station id")),
    responses(
        (status = OK, description = "The station", body = Station),
        (status = NOT_FOUND, description = "No such station")
    ),
    tag = "stations"
)]
pub async fn get_one_station(
    Path(station_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<Station>, BusinessError> {
    get_station(&state.db, station_id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found!("station", station_id))
}

#[utoipa::path(
    post,
    path = "/api/stations",
    request_body = StationCreate,
    responses(
        (status = CREATED, description = "Station registered", body = Station),
        (status = UNAUTHORIZED, description = "Operator credential required"),
        (status = CONFLICT, description = "A station already exists at these coordinates or with this API key")
    ),
    security(("bearerAuth" = [])),
    tag = "stations"
)]
pub async fn create_station(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(data): Json<StationCreate>,
) -> Result<(StatusCode, Json<Station>), BusinessError> {
    match add_station(&state.db, state.verifier.as_ref(), &caller, data).await? {
        AddStationOutcome::Created(station) => Ok((StatusCode::CREATED, Json(station))),
        AddStationOutcome::AlreadyExists => Err(duplicate_resource!("station", "location")),
        AddStationOutcome::Unauthenticated => Err(BusinessError::Unauthenticated),
    }
}

#[utoipa::path(
    patch,
    path = "/api/stations/{id}",
    params(("id" = i32, Path, description = "Station id")),
    request_body = StationUpdate,
    responses(
        (status = OK, description = "Station updated", body = Station),
        (status = NO_CONTENT, description = "No field supplied, nothing changed"),
        (status = UNAUTHORIZED, description = "Operator credential required"),
        (status = FORBIDDEN, description = "Station owned by another operator"),
        (status = NOT_FOUND, description = "No such station"),
        (status = CONFLICT, description = "Coordinates or API key already used by another station")
    ),
    security(("bearerAuth" = [])),
    tag = "stations"
)]
pub async fn patch_station(
    Path(station_id): Path<i32>,
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(changes): Json<StationUpdate>,
) -> Result<Response, BusinessError> {
    match update_station(&state.db, state.verifier.as_ref(), &caller, station_id, changes).await? {
        UpdateStationOutcome::Updated(station) => Ok(Json(station).into_response()),
        UpdateStationOutcome::NoOp => Ok(StatusCode::NO_CONTENT.into_response()),
        UpdateStationOutcome::NotFound => Err(not_found!("station", station_id)),
        UpdateStationOutcome::Forbidden => Err(forbidden!("update", format!("station {station_id}"))),
        UpdateStationOutcome::AlreadyExists => Err(duplicate_resource!("station", "location")),
        UpdateStationOutcome::Unauthenticated => Err(BusinessError::Unauthenticated),
    }
}

#[utoipa::path(
    delete,
    path = "/api/stations/{id}",
    params(("id" = i32, Path, description = "Station id")),
    responses(
        (status = NO_CONTENT, description = "Station and its readings removed"),
        (status = UNAUTHORIZED, description = "Operator credential required"),
        (status = FORBIDDEN, description = "Station owned by another operator"),
        (status = NOT_FOUND, description = "No such station")
    ),
    security(("bearerAuth" = [])),
    tag = "stations"
)]
pub async fn delete_station(
    Path(station_id): Path<i32>,
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<StatusCode, BusinessError> {
    match remove_station(&state.db, &caller, station_id).await? {
        RemoveStationOutcome::Removed => Ok(StatusCode::NO_CONTENT),
        RemoveStationOutcome::NotFound => Err(not_found!("station", station_id)),
        RemoveStationOutcome::Forbidden => Err(forbidden!("delete", format!("station {station_id}"))),
        RemoveStationOutcome::Unauthenticated => Err(BusinessError::Unauthenticated),
    }
}
