use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Response from `/v1/archive` with `daily=temperature_2m_max,daylight_duration`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherArchive {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    pub daily: DailySeries,
}

/// Column-oriented daily series; all arrays share the index of `time`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailySeries {
    #[serde(default)]
    pub time: Vec<NaiveDate>,
    #[serde(default)]
    pub daylight_duration: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DailyWeather {
    pub maximum_temperature: Option<f64>,
    pub daylight_duration_in_seconds: Option<f64>,
}

impl WeatherArchive {
    /// Weather for `date`, or `None` when the archive does not cover it.
    #[must_use]
    pub fn for_date(&self, date: NaiveDate) -> Option<DailyWeather> {
        let idx = self.daily.time.iter().position(|d| *d == date)?;

        Some(DailyWeather {
            maximum_temperature: self.daily.temperature_2m_max.get(idx).copied().flatten(),
            daylight_duration_in_seconds: self.daily.daylight_duration.get(idx).copied().flatten(),
        })
    }
}
