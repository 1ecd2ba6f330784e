use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ========== MEASURING POINTS ==========
        manager
            .create_table(
                Table::create()
                    .table(MeasuringPoints::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MeasuringPoints::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()"),
                    )
                    .col(
                        ColumnDef::new(MeasuringPoints::CreatedAt)
                            .timestamp_with_time_zone()
                            .extra("DEFAULT NOW()"),
                    )
                    .col(ColumnDef::new(MeasuringPoints::Name).string_len(128).not_null())
                    .col(ColumnDef::new(MeasuringPoints::PointId).string_len(128).not_null())
                    .col(ColumnDef::new(MeasuringPoints::PointUuid).string_len(128).not_null())
                    .col(
                        ColumnDef::new(MeasuringPoints::MeasuringId)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(MeasuringPoints::ApiKey).text().not_null())
                    .to_owned(),
            )
            .await?;

        // ========== ENERGY ==========
        manager
            .create_table(
                Table::create()
                    .table(Energy::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Energy::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Energy::CreatedAt)
                            .timestamp_with_time_zone()
                            .extra("DEFAULT NOW()"),
                    )
                    .col(ColumnDef::new(Energy::Date).date().not_null())
                    .col(ColumnDef::new(Energy::EnergyMade).double().not_null().default(0.0))
                    .col(ColumnDef::new(Energy::EnergyWasted).double().not_null().default(0.0))
                    .col(ColumnDef::new(Energy::MeasuringPointId).integer().not_null())
                    .col(ColumnDef::new(Energy::DaylightDurationInSeconds).double())
                    .col(ColumnDef::new(Energy::MaximumTemperature).double())
                    .to_owned(),
            )
            .await?;

        // One reading per point and calendar day; upserts target this index
        manager
            .create_index(
                Index::create()
                    .name("idx_energy_point_date")
                    .table(Energy::Table)
                    .col(Energy::MeasuringPointId)
                    .col(Energy::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_energy_date")
                    .table(Energy::Table)
                    .col(Energy::Date)
                    .to_owned(),
            )
            .await?;

        // ========== SYNC HISTORY ==========
        manager
            .create_table(
                Table::create()
                    .table(SyncHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SyncHistory::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()"),
                    )
                    .col(
                        ColumnDef::new(SyncHistory::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT NOW()"),
                    )
                    .col(
                        ColumnDef::new(SyncHistory::NumberOfInserts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX idx_sync_history_created_at ON sync_history (created_at DESC)",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SyncHistory::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Energy::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(MeasuringPoints::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum MeasuringPoints {
    Table,
    Id,
    CreatedAt,
    Name,
    PointId,
    PointUuid,
    MeasuringId,
    ApiKey,
}

#[derive(DeriveIden)]
pub enum Energy {
    Table,
    Id,
    CreatedAt,
    Date,
    EnergyMade,
    EnergyWasted,
    MeasuringPointId,
    DaylightDurationInSeconds,
    MaximumTemperature,
}

#[derive(DeriveIden)]
pub enum SyncHistory {
    Table,
    Id,
    CreatedAt,
    NumberOfInserts,
}
