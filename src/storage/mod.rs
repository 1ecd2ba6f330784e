//! Row-level access to the energy, measuring point and sync history tables.
//!
//! The reconciliation routine only sees [`EnergyStore`]; it never builds SQL.

mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::entity::{energy, measuring_points, sync_history};
use crate::error::AppResult;
use crate::weather::DailyWeather;

pub use postgres::PgStore;

/// A reading to write. `id = Some(_)` overwrites that row, `None` inserts.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingUpsert {
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub measuring_point_id: i32,
    pub energy_made: f64,
    pub energy_wasted: f64,
    /// Left untouched on existing rows when `None`
    pub weather: Option<DailyWeather>,
}

#[async_trait]
pub trait EnergyStore: Send + Sync {
    async fn all_readings(&self) -> AppResult<Vec<energy::Model>>;

    async fn measuring_points(&self) -> AppResult<Vec<measuring_points::Model>>;

    /// Write every upsert and append one audit row. Either all of it lands or none.
    async fn commit_sync(
        &self,
        upserts: &[ReadingUpsert],
        number_of_inserts: i32,
    ) -> AppResult<sync_history::Model>;
}
