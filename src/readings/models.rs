use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "readings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub station_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub time: DateTimeUtc,
    pub battery_percentage: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::stations::models::Entity",
        from = "Column::StationId",
        to = "crate::stations::models::Column::StationId",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Stations,
}

impl Related<crate::stations::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Reading {
    pub station_id: i32,
    pub time: DateTime<Utc>,
    pub battery_percentage: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
}

impl From<Model> for Reading {
    fn from(model: Model) -> Self {
        Self {
            station_id: model.station_id,
            time: model.time,
            battery_percentage: model.battery_percentage,
            temperature: model.temperature,
            humidity: model.humidity,
            pressure: model.pressure,
        }
    }
}

/// Body a station pushes to report a measurement.
///
/// `station_id` is accepted for compatibility with older firmware but never
/// used: a reading always belongs to the station that authenticated.
#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct ReadingCreate {
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub battery_percentage: Option<f64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub pressure: Option<f64>,
    #[serde(default)]
    pub station_id: Option<i32>,
}

/// Inclusive time bounds, each side optional.
#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReadingFilter {
    /// Lower bound on `time`, inclusive
    pub time_from: Option<DateTime<Utc>>,
    /// Upper bound on `time`, inclusive
    pub time_to: Option<DateTime<Utc>>,
    /// Restrict to one station
    pub station_id: Option<i32>,
}
