use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Operators::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Operators::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Operators::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Operators::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        // AUTOINCREMENT on SQLite, serial on Postgres: deleted station ids are never handed out again
        manager
            .create_table(
                Table::create()
                    .table(Stations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Stations::StationId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Stations::Longitude).double().not_null())
                    .col(ColumnDef::new(Stations::Latitude).double().not_null())
                    .col(
                        ColumnDef::new(Stations::ApiKey)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Stations::OwnerId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stations_owner_id")
                            .from(Stations::Table, Stations::OwnerId)
                            .to(Operators::Table, Operators::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        // Two stations can never share the same coordinates
        manager
            .create_index(
                Index::create()
                    .name("location")
                    .table(Stations::Table)
                    .col(Stations::Longitude)
                    .col(Stations::Latitude)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Readings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Readings::StationId).integer().not_null())
                    .col(
                        ColumnDef::new(Readings::Time)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Readings::BatteryPercentage).double())
                    .col(ColumnDef::new(Readings::Temperature).double())
                    .col(ColumnDef::new(Readings::Humidity).double())
                    .col(ColumnDef::new(Readings::Pressure).double())
                    .primary_key(
                        Index::create()
                            .name("pk_readings")
                            .col(Readings::StationId)
                            .col(Readings::Time),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_readings_station_id")
                            .from(Readings::Table, Readings::StationId)
                            .to(Stations::Table, Stations::StationId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_readings_time")
                    .table(Readings::Table)
                    .col(Readings::Time)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Readings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Stations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Operators::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Operators {
    Table,
    Id,
    Username,
    Password,
}

#[derive(DeriveIden)]
enum Stations {
    Table,
    StationId,
    Longitude,
    Latitude,
    ApiKey,
    OwnerId,
}

#[derive(DeriveIden)]
enum Readings {
    Table,
    StationId,
    Time,
    BatteryPercentage,
    Temperature,
    Humidity,
    Pressure,
}
