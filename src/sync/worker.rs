use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use futures::future::try_join_all;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::Config;
use crate::entity::measuring_points;
use crate::error::{AppError, AppResult};
use crate::metering::MeteringClient;
use crate::storage::EnergyStore;
use crate::sync::plan::{last_inserted_date, plan_upserts, start_of_day};
use crate::weather::WeatherClient;

/// Parameters of a reconciliation run.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Measuring ids that must be registered; each one is synced
    pub measuring_ids: Vec<String>,
    /// Window start when no readings exist yet
    pub epoch: NaiveDate,
    /// Timezone that defines a calendar day
    pub timezone: Tz,
}

impl From<&Config> for SyncSettings {
    fn from(config: &Config) -> Self {
        Self {
            measuring_ids: config.sync_measuring_ids.clone(),
            epoch: config.sync_epoch_date,
            timezone: config.sync_timezone,
        }
    }
}

/// Outcome of a reconciliation run.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SyncReport {
    /// Sync history row recorded for this run
    pub history_id: Uuid,
    /// Last stored date the window started from
    pub since: NaiveDate,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    /// Readings written (inserted + updated)
    pub processed: usize,
    pub inserted: usize,
    pub updated: usize,
    /// Metering items dropped because their date could not be read
    pub skipped: usize,
    pub weather_enriched: bool,
}

/// Pull new readings from the metering API for every configured point and
/// upsert them by (point, calendar day).
///
/// Any failing read or API call aborts the run before anything is written.
/// All writes, including the sync history row, are committed together.
///
/// # Errors
///
/// Returns an error if storage, the point registry or the metering API fail,
/// or if a configured measuring point is not registered.
pub async fn reconcile<S>(
    store: &S,
    metering: &MeteringClient,
    weather: Option<&WeatherClient>,
    settings: &SyncSettings,
) -> AppResult<SyncReport>
where
    S: EnergyStore + ?Sized,
{
    let existing = store.all_readings().await?;
    let since = last_inserted_date(&existing, settings.epoch);

    let registered = store.measuring_points().await?;
    let points = select_points(&registered, &settings.measuring_ids)?;

    let window_start = start_of_day(since, settings.timezone);
    let window_end = Utc::now();

    tracing::info!(
        existing = existing.len(),
        since = %since,
        from = %window_start,
        points = points.len(),
        "Starting energy reconciliation"
    );

    let batches = try_join_all(
        points
            .iter()
            .map(|point| metering.get_readings(point, window_start, window_end)),
    )
    .await?;

    for (point, batch) in points.iter().zip(&batches) {
        tracing::debug!(
            measuring_id = %point.measuring_id,
            count = batch.len(),
            "Fetched metering readings"
        );
    }
    let items: Vec<_> = batches.into_iter().flatten().collect();

    let archive = match weather {
        Some(client) => {
            let today = window_end.with_timezone(&settings.timezone).date_naive();
            match client.get_daily(since, today).await {
                Ok(archive) => Some(archive),
                Err(e) => {
                    tracing::warn!(error = %e, "Weather lookup failed, continuing without it");
                    None
                }
            }
        }
        None => None,
    };

    let plan = plan_upserts(&existing, &items, settings.timezone, archive.as_ref());
    let processed = plan.upserts.len();
    let number_of_inserts = i32::try_from(processed).unwrap_or(i32::MAX);

    let history = store.commit_sync(&plan.upserts, number_of_inserts).await?;

    let report = SyncReport {
        history_id: history.id,
        since,
        window_start,
        window_end,
        processed,
        inserted: plan.inserted(),
        updated: plan.updated(),
        skipped: plan.skipped,
        weather_enriched: archive.is_some(),
    };

    tracing::info!(
        processed = report.processed,
        inserted = report.inserted,
        updated = report.updated,
        skipped = report.skipped,
        "Energy reconciliation complete"
    );

    Ok(report)
}

/// Resolve each configured measuring id to its registry entry, in config order.
fn select_points<'a>(
    registered: &'a [measuring_points::Model],
    measuring_ids: &[String],
) -> AppResult<Vec<&'a measuring_points::Model>> {
    measuring_ids
        .iter()
        .map(|id| {
            registered
                .iter()
                .find(|p| p.measuring_id == *id)
                .ok_or_else(|| AppError::Internal(format!("Measuring point {id} is not registered")))
        })
        .collect()
}
