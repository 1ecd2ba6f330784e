//! Pure planning steps of a reconciliation run.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;

use crate::entity::energy;
use crate::metering::MeterReading;
use crate::storage::ReadingUpsert;
use crate::weather::WeatherArchive;

/// Most recent reading date, or `epoch` when nothing has been stored yet.
#[must_use]
pub fn last_inserted_date(readings: &[energy::Model], epoch: NaiveDate) -> NaiveDate {
    readings.iter().map(|r| r.date).max().unwrap_or(epoch)
}

/// Start of `day` in `tz`, as a UTC instant.
#[must_use]
pub fn start_of_day(day: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = day.and_hms_opt(0, 0, 0).unwrap_or_default();
    tz.from_local_datetime(&midnight)
        .earliest()
        .map_or_else(|| midnight.and_utc(), |dt| dt.with_timezone(&Utc))
}

#[derive(Debug, Default, PartialEq)]
pub struct UpsertPlan {
    pub upserts: Vec<ReadingUpsert>,
    /// Items whose date could not be parsed
    pub skipped: usize,
}

impl UpsertPlan {
    #[must_use]
    pub fn inserted(&self) -> usize {
        self.upserts.iter().filter(|u| u.id.is_none()).count()
    }

    #[must_use]
    pub fn updated(&self) -> usize {
        self.upserts.iter().filter(|u| u.id.is_some()).count()
    }
}

/// Match incoming items against stored readings by (point, calendar day).
///
/// A match keeps the stored id so the row is overwritten; anything else is a
/// fresh insert. Several items for the same point and day collapse into one
/// write, the last one winning.
#[must_use]
pub fn plan_upserts(
    existing: &[energy::Model],
    items: &[MeterReading],
    tz: Tz,
    weather: Option<&WeatherArchive>,
) -> UpsertPlan {
    let mut known: HashMap<(i32, NaiveDate), i64> = HashMap::with_capacity(existing.len());
    for row in existing {
        known.entry((row.measuring_point_id, row.date)).or_insert(row.id);
    }

    let mut plan = UpsertPlan::default();
    let mut positions: HashMap<(i32, NaiveDate), usize> = HashMap::new();

    for item in items {
        let Some(date) = item.calendar_day(tz) else {
            tracing::warn!(
                date = %item.date,
                measuring_point_id = item.measuring_point_id,
                "Skipping metering item with unparseable date"
            );
            plan.skipped += 1;
            continue;
        };

        let key = (item.measuring_point_id, date);
        let upsert = ReadingUpsert {
            id: known.get(&key).copied(),
            date,
            measuring_point_id: item.measuring_point_id,
            energy_made: item.en_n,
            energy_wasted: item.en_p,
            weather: weather.and_then(|w| w.for_date(date)),
        };

        match positions.get(&key) {
            Some(&idx) => plan.upserts[idx] = upsert,
            None => {
                positions.insert(key, plan.upserts.len());
                plan.upserts.push(upsert);
            }
        }
    }

    plan
}
