use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::common::AppState;
use crate::entity::energy;
use crate::error::{AppError, AppResult};
use crate::identity::AuthUser;
use crate::storage::PgStore;

#[derive(Debug, Deserialize, IntoParams)]
pub struct EnergyQuery {
    /// First day to include (YYYY-MM-DD)
    #[serde(alias = "dateFrom")]
    pub date_from: Option<NaiveDate>,
    /// Last day to include (YYYY-MM-DD)
    #[serde(alias = "dateTo")]
    pub date_to: Option<NaiveDate>,
}

/// Production summed over all measuring points for one day.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailyEnergy {
    pub date: NaiveDate,
    /// kWh produced
    pub energy_made: f64,
    /// kWh sent back to the grid
    pub energy_wasted: f64,
    pub daylight_duration_in_seconds: Option<f64>,
    pub maximum_temperature: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EnergyStatistics {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// Days with non-zero production and waste
    pub days: usize,
    pub total_energy_made: f64,
    pub total_energy_wasted: f64,
    pub average_energy_made: f64,
    pub average_energy_wasted: f64,
    /// Day with the highest production
    pub best_day: Option<DailyEnergy>,
    /// Share of production not sent back to the grid; absent when nothing was produced
    pub self_consumption_ratio: Option<f64>,
}

/// Sum per-point rows into one entry per date, keeping the input order of
/// first appearance. Dates where either sum is exactly zero are dropped.
///
/// Weather fields come from the first row seen for each date.
#[must_use]
pub fn group_by_date(rows: &[energy::Model]) -> Vec<DailyEnergy> {
    let mut days: Vec<DailyEnergy> = Vec::new();

    for row in rows {
        if let Some(day) = days.iter_mut().find(|d| d.date == row.date) {
            day.energy_made += row.energy_made;
            day.energy_wasted += row.energy_wasted;
        } else {
            days.push(DailyEnergy {
                date: row.date,
                energy_made: row.energy_made,
                energy_wasted: row.energy_wasted,
                daylight_duration_in_seconds: row.daylight_duration_in_seconds,
                maximum_temperature: row.maximum_temperature,
            });
        }
    }

    days.retain(|d| d.energy_made != 0.0 && d.energy_wasted != 0.0);
    days
}

/// Totals and per-day averages over already grouped days.
#[must_use]
pub fn summarize(
    days: &[DailyEnergy],
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
) -> EnergyStatistics {
    let total_energy_made: f64 = days.iter().map(|d| d.energy_made).sum();
    let total_energy_wasted: f64 = days.iter().map(|d| d.energy_wasted).sum();

    #[allow(clippy::cast_precision_loss)]
    let count = days.len() as f64;
    let average = |total: f64| if days.is_empty() { 0.0 } else { total / count };

    let best_day = days
        .iter()
        .max_by(|a, b| a.energy_made.total_cmp(&b.energy_made))
        .cloned();

    let self_consumption_ratio =
        (total_energy_made > 0.0).then(|| 1.0 - total_energy_wasted / total_energy_made);

    EnergyStatistics {
        date_from,
        date_to,
        days: days.len(),
        total_energy_made,
        total_energy_wasted,
        average_energy_made: average(total_energy_made),
        average_energy_wasted: average(total_energy_wasted),
        best_day,
        self_consumption_ratio,
    }
}

async fn load_days(state: &AppState, query: &EnergyQuery) -> AppResult<Vec<DailyEnergy>> {
    if let (Some(from), Some(to)) = (query.date_from, query.date_to) {
        if to < from {
            return Err(AppError::BadRequest(
                "date_to must not be before date_from".to_string(),
            ));
        }
    }

    let rows = PgStore::new(state.db.clone())
        .readings_between(query.date_from, query.date_to)
        .await?;

    Ok(group_by_date(&rows))
}

/// Daily energy production
///
/// Readings of all measuring points summed per day, newest first.
#[utoipa::path(
    get,
    path = "/api/energy",
    params(EnergyQuery),
    responses(
        (status = 200, description = "Daily production", body = Vec<DailyEnergy>),
        (status = 400, description = "Invalid date range"),
        (status = 403, description = "Missing or invalid session"),
    ),
    tag = "energy"
)]
pub async fn get_energy(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<EnergyQuery>,
) -> AppResult<Json<Vec<DailyEnergy>>> {
    Ok(Json(load_days(&state, &query).await?))
}

/// Production statistics
#[utoipa::path(
    get,
    path = "/api/energy-statistics",
    params(EnergyQuery),
    responses(
        (status = 200, description = "Statistics over the range", body = EnergyStatistics),
        (status = 400, description = "Invalid date range"),
        (status = 403, description = "Missing or invalid session"),
    ),
    tag = "energy"
)]
pub async fn get_energy_statistics(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<EnergyQuery>,
) -> AppResult<Json<EnergyStatistics>> {
    let days = load_days(&state, &query).await?;
    Ok(Json(summarize(&days, query.date_from, query.date_to)))
}
