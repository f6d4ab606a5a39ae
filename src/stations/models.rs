use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "stations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub station_id: i32,
    pub longitude: f64,
    pub latitude: f64,
    #[sea_orm(unique)]
    pub api_key: String,
    pub owner_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::operators::models::Entity",
        from = "Column::OwnerId",
        to = "crate::operators::models::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Operators,
    #[sea_orm(has_many = "crate::readings::models::Entity")]
    Readings,
}

impl Related<crate::operators::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Operators.def()
    }
}

impl Related<crate::readings::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Readings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Public view of a station. The API key stays server side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Station {
    pub station_id: i32,
    pub longitude: f64,
    pub latitude: f64,
    pub owner_id: i32,
}

impl From<Model> for Station {
    fn from(model: Model) -> Self {
        Self {
            station_id: model.station_id,
            longitude: model.longitude,
            latitude: model.latitude,
            owner_id: model.owner_id,
        }
    }
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct StationCreate {
    pub longitude: f64,
    pub latitude: f64,
    pub api_key: String,
}

/// Sparse update; absent (or null) fields are left untouched.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct StationUpdate {
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl StationUpdate {
    pub fn is_empty(&self) -> bool {
        self.longitude.is_none() && self.latitude.is_none() && self.api_key.is_none()
    }
}
