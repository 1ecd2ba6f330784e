use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entity::{energy, measuring_points, sync_history};
use crate::error::AppResult;
use crate::storage::{EnergyStore, ReadingUpsert};

/// Postgres-backed store built on sea-orm.
#[derive(Clone)]
pub struct PgStore {
    db: DatabaseConnection,
}

impl PgStore {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Readings within an optional inclusive date range, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn readings_between(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<Vec<energy::Model>> {
        let mut query = energy::Entity::find();

        if let Some(from) = from {
            query = query.filter(energy::Column::Date.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(energy::Column::Date.lte(to));
        }

        Ok(query
            .order_by_desc(energy::Column::Date)
            .order_by_asc(energy::Column::MeasuringPointId)
            .all(&self.db)
            .await?)
    }

    /// One page of the audit log (newest first) and the total row count.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn sync_history_page(
        &self,
        offset: u64,
        limit: u64,
    ) -> AppResult<(Vec<sync_history::Model>, u64)> {
        let total = sync_history::Entity::find().count(&self.db).await?;

        let rows = sync_history::Entity::find()
            .order_by_desc(sync_history::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok((rows, total))
    }
}

#[async_trait]
impl EnergyStore for PgStore {
    async fn all_readings(&self) -> AppResult<Vec<energy::Model>> {
        Ok(energy::Entity::find().all(&self.db).await?)
    }

    async fn measuring_points(&self) -> AppResult<Vec<measuring_points::Model>> {
        Ok(measuring_points::Entity::find()
            .order_by_asc(measuring_points::Column::MeasuringId)
            .all(&self.db)
            .await?)
    }

    async fn commit_sync(
        &self,
        upserts: &[ReadingUpsert],
        number_of_inserts: i32,
    ) -> AppResult<sync_history::Model> {
        let txn = self.db.begin().await?;

        for upsert in upserts {
            let (daylight, temperature) = match upsert.weather {
                Some(w) => (
                    Set(w.daylight_duration_in_seconds),
                    Set(w.maximum_temperature),
                ),
                None => (NotSet, NotSet),
            };

            let model = energy::ActiveModel {
                id: upsert.id.map_or(NotSet, Set),
                created_at: NotSet,
                date: Set(upsert.date),
                energy_made: Set(upsert.energy_made),
                energy_wasted: Set(upsert.energy_wasted),
                measuring_point_id: Set(upsert.measuring_point_id),
                daylight_duration_in_seconds: daylight,
                maximum_temperature: temperature,
            };

            if upsert.id.is_some() {
                model.update(&txn).await?;
                continue;
            }

            // A concurrent run may have inserted the same day since we read;
            // the unique (measuring_point_id, date) index turns that into an update.
            let mut update_columns = vec![energy::Column::EnergyMade, energy::Column::EnergyWasted];
            if upsert.weather.is_some() {
                update_columns.push(energy::Column::DaylightDurationInSeconds);
                update_columns.push(energy::Column::MaximumTemperature);
            }

            energy::Entity::insert(model)
                .on_conflict(
                    OnConflict::columns([energy::Column::MeasuringPointId, energy::Column::Date])
                        .update_columns(update_columns)
                        .to_owned(),
                )
                .exec(&txn)
                .await?;
        }

        let history = sync_history::ActiveModel {
            id: Set(Uuid::new_v4()),
            created_at: Set(Utc::now().into()),
            number_of_inserts: Set(number_of_inserts),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        Ok(history)
    }
}
