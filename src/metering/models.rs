use chrono::{DateTime, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// One item of the `measuring_points.measurments_model` response array.
///
/// Only `date`, `en_n`, `en_p` and `measuring_point_id` feed the energy table;
/// the remaining fields are kept for logging and debugging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeterReading {
    #[serde(default)]
    pub id: i64,
    #[serde(default, rename = "amountDiff")]
    pub amount_diff: f64,
    #[serde(default, rename = "amountEnN")]
    pub amount_en_n: f64,
    #[serde(default, rename = "amountEnP")]
    pub amount_en_p: f64,
    pub date: String,
    #[serde(default, rename = "enDiff")]
    pub en_diff: f64,
    /// Energy produced (kWh)
    #[serde(default, rename = "enN")]
    pub en_n: f64,
    /// Energy sent back to the grid (kWh)
    #[serde(default, rename = "enP")]
    pub en_p: f64,
    #[serde(default)]
    pub energy_difference: f64,
    pub measuring_point_id: i32,
    #[serde(default)]
    pub partner_id: i64,
    #[serde(default)]
    pub received_energy: f64,
    #[serde(default)]
    pub sent_energy: f64,
}

impl MeterReading {
    /// Calendar day of this reading as seen in `tz`.
    ///
    /// Accepts RFC 3339 timestamps (converted into `tz`), naive timestamps and
    /// plain `YYYY-MM-DD` dates (taken as-is).
    #[must_use]
    pub fn calendar_day(&self, tz: Tz) -> Option<NaiveDate> {
        parse_calendar_day(&self.date, tz)
    }
}

pub(crate) fn parse_calendar_day(raw: &str, tz: Tz) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&tz).date_naive());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}
