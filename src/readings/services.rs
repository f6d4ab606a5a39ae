use super::models::{ActiveModel, Column, Entity, Model, Reading, ReadingCreate, ReadingFilter};
use crate::common::auth::Principal;
use crate::common::errors::StorageFailure;
use crate::common::guard::{Grant, Operation, authorize};
use crate::common::session::Session;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};

#[derive(Clone, Debug, PartialEq)]
pub enum IngestOutcome {
    Ingested(Reading),
    Invalid { field: &'static str, message: String },
    /// The station already reported a reading at this time
    AlreadyExists,
    Unauthenticated,
}

/// Readings whose `time` lies within the inclusive bounds of `filter`.
pub async fn list_readings(db: &DatabaseConnection, filter: &ReadingFilter) -> Result<Vec<Reading>, StorageFailure> {
    let condition = Condition::all()
        .add_option(filter.time_from.map(|from| Column::Time.gte(from)))
        .add_option(filter.time_to.map(|to| Column::Time.lte(to)))
        .add_option(filter.station_id.map(|station_id| Column::StationId.eq(station_id)));

    let session = Session::open(db, "list_readings").await?;
    let models = Entity::find()
        .filter(condition)
        .order_by_asc(Column::Time)
        .order_by_asc(Column::StationId)
        .all(session.conn())
        .await;
    let models = session.close(models).await?;

    Ok(models.into_iter().map(Reading::from).collect())
}

/// Store a reading pushed by an authenticated station.
///
/// The reading is always filed under the station that authenticated; a
/// `station_id` in the payload is ignored.
pub async fn ingest_reading(
    db: &DatabaseConnection,
    caller: &Principal,
    input: ReadingCreate,
) -> Result<IngestOutcome, StorageFailure> {
    let station = match authorize(caller, Operation::IngestReading) {
        Ok(Grant::Station(station)) => station,
        Ok(Grant::Operator(_)) | Err(_) => return Ok(IngestOutcome::Unauthenticated),
    };

    if input.station_id.is_some_and(|claimed| claimed != station.station_id) {
        tracing::warn!(
            station_id = station.station_id,
            claimed = ?input.station_id,
            "payload names another station, using the authenticated one"
        );
    }

    let Some(battery_percentage) = input.battery_percentage else {
        return Ok(IngestOutcome::Invalid {
            field: "battery_percentage",
            message: "is required".to_string(),
        });
    };

    let model = Model {
        station_id: station.station_id,
        time: input.time,
        battery_percentage: Some(battery_percentage),
        temperature: input.temperature,
        humidity: input.humidity,
        pressure: input.pressure,
    };

    let session = Session::open(db, "ingest_reading").await?;
    let outcome = insert_reading(session.conn(), model).await;

    match session.close(outcome).await {
        Ok(outcome) => Ok(outcome),
        Err(failure) if failure.is_unique_violation() => {
            tracing::warn!(station_id = station.station_id, time = %input.time, "duplicate reading");
            Ok(IngestOutcome::AlreadyExists)
        }
        Err(failure) => Err(failure),
    }
}

/// A second reading at the same time is rejected by the (station_id, time)
/// primary key, not by a lookup.
async fn insert_reading<C: ConnectionTrait>(conn: &C, model: Model) -> Result<IngestOutcome, DbErr> {
    let active = ActiveModel {
        station_id: Set(model.station_id),
        time: Set(model.time),
        battery_percentage: Set(model.battery_percentage),
        temperature: Set(model.temperature),
        humidity: Set(model.humidity),
        pressure: Set(model.pressure),
    };
    Entity::insert(active).exec_without_returning(conn).await?;

    tracing::debug!(station_id = model.station_id, time = %model.time, "reading stored");
    Ok(IngestOutcome::Ingested(model.into()))
}
