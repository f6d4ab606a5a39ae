use super::models::{ActiveModel, Column, Entity, Model, Station, StationCreate, StationUpdate};
use crate::common::auth::{CredentialVerifier, Principal};
use crate::common::errors::StorageFailure;
use crate::common::guard::{Denial, Grant, Operation, authorize};
use crate::common::session::Session;
use crate::readings::models as readings;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder,
};

#[derive(Clone, Debug, PartialEq)]
pub enum AddStationOutcome {
    Created(Station),
    /// Coordinates or API key already taken by another station
    AlreadyExists,
    Unauthenticated,
}

#[derive(Clone, Debug, PartialEq)]
pub enum UpdateStationOutcome {
    Updated(Station),
    /// No field supplied; storage was not touched
    NoOp,
    NotFound,
    Forbidden,
    /// New coordinates or API key collide with another station
    AlreadyExists,
    Unauthenticated,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemoveStationOutcome {
    Removed,
    NotFound,
    Forbidden,
    Unauthenticated,
}

pub async fn list_stations(db: &DatabaseConnection) -> Result<Vec<Station>, StorageFailure> {
    let session = Session::open(db, "list_stations").await?;
    let models = Entity::find()
        .order_by_asc(Column::StationId)
        .all(session.conn())
        .await;
    let models = session.close(models).await?;

    Ok(models.into_iter().map(Station::from).collect())
}

pub async fn get_station(db: &DatabaseConnection, station_id: i32) -> Result<Option<Station>, StorageFailure> {
    let session = Session::open(db, "get_station").await?;
    let model = Entity::find_by_id(station_id).one(session.conn()).await;
    let model = session.close(model).await?;

    Ok(model.map(Station::from))
}

/// Register a new station owned by the calling operator.
///
/// The coordinate check before the insert only saves a round trip; the unique
/// index on (longitude, latitude) is what decides between two racing callers.
/// API keys are only guarded by their unique index. Any unique violation is
/// reported as `AlreadyExists`.
pub async fn add_station(
    db: &DatabaseConnection,
    verifier: &dyn CredentialVerifier,
    caller: &Principal,
    data: StationCreate,
) -> Result<AddStationOutcome, StorageFailure> {
    let owner = match authorize(caller, Operation::CreateStation) {
        Ok(Grant::Operator(owner)) => owner,
        Ok(Grant::Station(_)) | Err(_) => return Ok(AddStationOutcome::Unauthenticated),
    };

    let session = Session::open(db, "add_station").await?;
    let outcome = insert_station(session.conn(), owner.id, data, verifier).await;

    match session.close(outcome).await {
        Ok(outcome) => Ok(outcome),
        Err(failure) if failure.is_unique_violation() => {
            tracing::warn!(owner_id = owner.id, "station insert hit a uniqueness constraint");
            Ok(AddStationOutcome::AlreadyExists)
        }
        Err(failure) => Err(failure),
    }
}

pub async fn update_station(
    db: &DatabaseConnection,
    verifier: &dyn CredentialVerifier,
    caller: &Principal,
    station_id: i32,
    changes: StationUpdate,
) -> Result<UpdateStationOutcome, StorageFailure> {
    if caller.as_operator().is_none() {
        return Ok(UpdateStationOutcome::Unauthenticated);
    }
    if changes.is_empty() {
        return Ok(UpdateStationOutcome::NoOp);
    }

    let session = Session::open(db, "update_station").await?;
    let outcome = apply_station_update(session.conn(), caller, station_id, changes, verifier).await;

    match session.close(outcome).await {
        Ok(outcome) => Ok(outcome),
        Err(failure) if failure.is_unique_violation() => {
            tracing::warn!(station_id, "station update hit a uniqueness constraint");
            Ok(UpdateStationOutcome::AlreadyExists)
        }
        Err(failure) => Err(failure),
    }
}

/// Delete a station owned by the caller, together with all of its readings.
pub async fn remove_station(
    db: &DatabaseConnection,
    caller: &Principal,
    station_id: i32,
) -> Result<RemoveStationOutcome, StorageFailure> {
    if caller.as_operator().is_none() {
        return Ok(RemoveStationOutcome::Unauthenticated);
    }

    let session = Session::open(db, "remove_station").await?;
    let outcome = delete_station_cascade(session.conn(), caller, station_id).await;
    session.close(outcome).await
}

async fn find_at_coordinates<C: ConnectionTrait>(
    conn: &C,
    longitude: f64,
    latitude: f64,
) -> Result<Option<Model>, DbErr> {
    Entity::find()
        .filter(Column::Longitude.eq(longitude))
        .filter(Column::Latitude.eq(latitude))
        .one(conn)
        .await
}

async fn insert_station<C: ConnectionTrait>(
    conn: &C,
    owner_id: i32,
    data: StationCreate,
    verifier: &dyn CredentialVerifier,
) -> Result<AddStationOutcome, DbErr> {
    let sealed_key = verifier.seal(&data.api_key);

    if find_at_coordinates(conn, data.longitude, data.latitude)
        .await?
        .is_some()
    {
        tracing::warn!(
            owner_id,
            longitude = data.longitude,
            latitude = data.latitude,
            "station already exists"
        );
        return Ok(AddStationOutcome::AlreadyExists);
    }

    let station = ActiveModel {
        longitude: Set(data.longitude),
        latitude: Set(data.latitude),
        api_key: Set(sealed_key),
        owner_id: Set(owner_id),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    tracing::info!(station_id = station.station_id, owner_id, "station created");
    Ok(AddStationOutcome::Created(station.into()))
}

async fn apply_station_update<C: ConnectionTrait>(
    conn: &C,
    caller: &Principal,
    station_id: i32,
    changes: StationUpdate,
    verifier: &dyn CredentialVerifier,
) -> Result<UpdateStationOutcome, DbErr> {
    let Some(station) = Entity::find_by_id(station_id).one(conn).await? else {
        return Ok(UpdateStationOutcome::NotFound);
    };

    match authorize(caller, Operation::UpdateStation(&station)) {
        Ok(_) => {}
        Err(Denial::Forbidden) => {
            tracing::warn!(station_id, "update of a foreign station refused");
            return Ok(UpdateStationOutcome::Forbidden);
        }
        Err(Denial::Unauthenticated) => return Ok(UpdateStationOutcome::Unauthenticated),
    }

    let longitude = changes.longitude.unwrap_or(station.longitude);
    let latitude = changes.latitude.unwrap_or(station.latitude);
    if let Some(other) = find_at_coordinates(conn, longitude, latitude).await? {
        if other.station_id != station_id {
            return Ok(UpdateStationOutcome::AlreadyExists);
        }
    }

    let sealed_key = changes.api_key.as_deref().map(|key| verifier.seal(key));

    let mut active: ActiveModel = station.into();
    if let Some(longitude) = changes.longitude {
        active.longitude = Set(longitude);
    }
    if let Some(latitude) = changes.latitude {
        active.latitude = Set(latitude);
    }
    if let Some(sealed_key) = sealed_key {
        active.api_key = Set(sealed_key);
    }
    let updated = active.update(conn).await?;

    tracing::info!(station_id, "station updated");
    Ok(UpdateStationOutcome::Updated(updated.into()))
}

async fn delete_station_cascade<C: ConnectionTrait>(
    conn: &C,
    caller: &Principal,
    station_id: i32,
) -> Result<RemoveStationOutcome, DbErr> {
    let Some(station) = Entity::find_by_id(station_id).one(conn).await? else {
        return Ok(RemoveStationOutcome::NotFound);
    };

    match authorize(caller, Operation::DeleteStation(&station)) {
        Ok(_) => {}
        Err(Denial::Forbidden) => {
            tracing::warn!(station_id, "removal of a foreign station refused");
            return Ok(RemoveStationOutcome::Forbidden);
        }
        Err(Denial::Unauthenticated) => return Ok(RemoveStationOutcome::Unauthenticated),
    }

    let removed_readings = readings::Entity::delete_many()
        .filter(readings::Column::StationId.eq(station_id))
        .exec(conn)
        .await?
        .rows_affected;
    Entity::delete_by_id(station_id).exec(conn).await?;

    tracing::info!(station_id, removed_readings, "station removed");
    Ok(RemoveStationOutcome::Removed)
}
