//! Reconciliation against an in-memory store and mocked upstream APIs.
//!
//! Run with: cargo test --test reconcile_test

mod common;

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use uuid::Uuid;

use energy_sync::entity::{energy, measuring_points, sync_history};
use energy_sync::error::{AppError, AppResult};
use energy_sync::metering::MeteringClient;
use energy_sync::storage::{EnergyStore, ReadingUpsert};
use energy_sync::sync::{reconcile, SyncSettings};
use energy_sync::weather::WeatherClient;

const READINGS_PATH: &str = "/measuring_points.measurments_model";

#[derive(Default)]
struct MemoryStore {
    readings: Vec<energy::Model>,
    points: Vec<measuring_points::Model>,
    commits: Mutex<Vec<(Vec<ReadingUpsert>, i32)>>,
}

#[async_trait]
impl EnergyStore for MemoryStore {
    async fn all_readings(&self) -> AppResult<Vec<energy::Model>> {
        Ok(self.readings.clone())
    }

    async fn measuring_points(&self) -> AppResult<Vec<measuring_points::Model>> {
        Ok(self.points.clone())
    }

    async fn commit_sync(
        &self,
        upserts: &[ReadingUpsert],
        number_of_inserts: i32,
    ) -> AppResult<sync_history::Model> {
        self.commits
            .lock()
            .unwrap()
            .push((upserts.to_vec(), number_of_inserts));

        Ok(sync_history::Model {
            id: Uuid::new_v4(),
            created_at: Utc::now().into(),
            number_of_inserts,
        })
    }
}

impl MemoryStore {
    fn commits(&self) -> Vec<(Vec<ReadingUpsert>, i32)> {
        self.commits.lock().unwrap().clone()
    }
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn point(measuring_id: &str) -> measuring_points::Model {
    measuring_points::Model {
        id: Uuid::new_v4(),
        created_at: None,
        name: format!("Point {measuring_id}"),
        point_id: format!("session-{measuring_id}"),
        point_uuid: format!("visitor-{measuring_id}"),
        measuring_id: measuring_id.to_string(),
        api_key: format!("key-{measuring_id}"),
    }
}

fn stored(id: i64, measuring_point_id: i32, date: NaiveDate) -> energy::Model {
    energy::Model {
        id,
        created_at: None,
        date,
        energy_made: 1.0,
        energy_wasted: 1.0,
        measuring_point_id,
        daylight_duration_in_seconds: None,
        maximum_temperature: None,
    }
}

fn settings(measuring_ids: &[&str]) -> SyncSettings {
    SyncSettings {
        measuring_ids: measuring_ids.iter().map(|s| (*s).to_string()).collect(),
        epoch: day(2024, 1, 1),
        timezone: chrono_tz::UTC,
    }
}

fn metering(server: &ServerGuard) -> MeteringClient {
    MeteringClient::new(&common::config(&server.url(), &[])).unwrap()
}

fn weather(server: &ServerGuard) -> WeatherClient {
    WeatherClient::new(&common::config(&server.url(), &[])).unwrap()
}

#[tokio::test]
async fn empty_store_syncs_from_epoch() {
    let mut server = Server::new_async().await;
    let readings = server
        .mock("GET", READINGS_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("measuring_point_id".into(), "857".into()),
            Matcher::UrlEncoded(
                "date[gte]".into(),
                "\"2024-01-01T00:00:00.000Z\"".into(),
            ),
        ]))
        .match_header("visitor_uuid", "visitor-857")
        .match_header("session_id", "session-857")
        .match_header("api383994619958244", "key-857")
        .match_header("authorization", "API383994619958244")
        .with_status(200)
        .with_body(
            json!([
                { "date": "2024-01-01T00:00:00.000Z", "enN": 12.5, "enP": 3.0, "measuring_point_id": 857 },
                { "date": "2024-01-02T00:00:00.000Z", "enN": 9.0, "enP": 1.5, "measuring_point_id": 857 }
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let store = MemoryStore {
        points: vec![point("857")],
        ..MemoryStore::default()
    };

    let report = reconcile(&store, &metering(&server), None, &settings(&["857"]))
        .await
        .unwrap();

    readings.assert_async().await;
    assert_eq!(report.since, day(2024, 1, 1));
    assert_eq!(report.processed, 2);
    assert_eq!(report.inserted, 2);
    assert_eq!(report.updated, 0);
    assert!(!report.weather_enriched);

    let commits = store.commits();
    assert_eq!(commits.len(), 1);
    let (upserts, number_of_inserts) = &commits[0];
    assert_eq!(*number_of_inserts, 2);
    assert_eq!(upserts[0].date, day(2024, 1, 1));
    assert!((upserts[0].energy_made - 12.5).abs() < f64::EPSILON);
    assert!((upserts[0].energy_wasted - 3.0).abs() < f64::EPSILON);
    assert!(upserts.iter().all(|u| u.id.is_none() && u.weather.is_none()));
}

#[tokio::test]
async fn overwrites_last_day_and_inserts_new_ones() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", READINGS_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("measuring_point_id".into(), "857".into()),
            Matcher::UrlEncoded(
                "date[gte]".into(),
                "\"2024-05-02T00:00:00.000Z\"".into(),
            ),
        ]))
        .with_status(200)
        .with_body(
            json!([
                { "date": "2024-05-02T00:00:00.000Z", "enN": 20.0, "enP": 4.0, "measuring_point_id": 857 },
                { "date": "2024-05-03T00:00:00.000Z", "enN": 21.0, "enP": 5.0, "measuring_point_id": 857 }
            ])
            .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("GET", READINGS_PATH)
        .match_query(Matcher::UrlEncoded("measuring_point_id".into(), "856".into()))
        .with_status(200)
        .with_body(
            json!([
                { "date": "2024-05-02T00:00:00.000Z", "enN": 7.0, "enP": 2.0, "measuring_point_id": 856 },
                { "date": "garbage", "enN": 1.0, "enP": 1.0, "measuring_point_id": 856 }
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let store = MemoryStore {
        readings: vec![
            stored(6, 857, day(2024, 5, 1)),
            stored(7, 857, day(2024, 5, 2)),
            stored(8, 856, day(2024, 5, 2)),
        ],
        points: vec![point("856"), point("857")],
        ..MemoryStore::default()
    };

    let report = reconcile(&store, &metering(&server), None, &settings(&["857", "856"]))
        .await
        .unwrap();

    assert_eq!(report.since, day(2024, 5, 2));
    assert_eq!(report.processed, 3);
    assert_eq!(report.updated, 2);
    assert_eq!(report.inserted, 1);
    assert_eq!(report.skipped, 1);

    let (upserts, number_of_inserts) = &store.commits()[0];
    assert_eq!(*number_of_inserts, 3);
    let ids: Vec<Option<i64>> = upserts.iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![Some(7), None, Some(8)]);
    assert!((upserts[0].energy_made - 20.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn unregistered_point_aborts_before_fetching() {
    let mut server = Server::new_async().await;
    let readings = server
        .mock("GET", READINGS_PATH)
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let store = MemoryStore {
        points: vec![point("857")],
        ..MemoryStore::default()
    };

    let result = reconcile(&store, &metering(&server), None, &settings(&["857", "999"])).await;

    assert!(matches!(result, Err(AppError::Internal(msg)) if msg.contains("999")));
    assert!(store.commits().is_empty());
    readings.assert_async().await;
}

#[tokio::test]
async fn metering_failure_writes_nothing() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", READINGS_PATH)
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("upstream down")
        .create_async()
        .await;

    let store = MemoryStore {
        points: vec![point("857")],
        ..MemoryStore::default()
    };

    let result = reconcile(&store, &metering(&server), None, &settings(&["857"])).await;

    assert!(matches!(result, Err(AppError::MeteringApi(_))));
    assert!(store.commits().is_empty());
}

#[tokio::test]
async fn weather_enriches_matching_days() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", READINGS_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!([
                { "date": "2024-05-02T00:00:00.000Z", "enN": 20.0, "enP": 4.0, "measuring_point_id": 857 },
                { "date": "2024-05-03T00:00:00.000Z", "enN": 21.0, "enP": 5.0, "measuring_point_id": 857 }
            ])
            .to_string(),
        )
        .create_async()
        .await;
    let archive = server
        .mock("GET", "/archive")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("start_date".into(), "2024-05-02".into()),
            Matcher::UrlEncoded("daily".into(), "temperature_2m_max,daylight_duration".into()),
            Matcher::UrlEncoded("timezone".into(), "Europe/Berlin".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "latitude": 45.96,
                "longitude": 14.65,
                "daily": {
                    "time": ["2024-05-02"],
                    "daylight_duration": [52000.0],
                    "temperature_2m_max": [19.5]
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let store = MemoryStore {
        readings: vec![stored(7, 857, day(2024, 5, 2))],
        points: vec![point("857")],
        ..MemoryStore::default()
    };

    let weather = weather(&server);
    let report = reconcile(&store, &metering(&server), Some(&weather), &settings(&["857"]))
        .await
        .unwrap();

    archive.assert_async().await;
    assert!(report.weather_enriched);

    let (upserts, _) = &store.commits()[0];
    let first = upserts[0].weather.unwrap();
    assert_eq!(first.maximum_temperature, Some(19.5));
    assert_eq!(first.daylight_duration_in_seconds, Some(52000.0));
    // Outside the archive: weather columns are left alone
    assert!(upserts[1].weather.is_none());
}

#[tokio::test]
async fn weather_failure_does_not_block_sync() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", READINGS_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!([
                { "date": "2024-01-01T00:00:00.000Z", "enN": 1.0, "enP": 1.0, "measuring_point_id": 857 }
            ])
            .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("GET", "/archive")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let store = MemoryStore {
        points: vec![point("857")],
        ..MemoryStore::default()
    };

    let weather = weather(&server);
    let report = reconcile(&store, &metering(&server), Some(&weather), &settings(&["857"]))
        .await
        .unwrap();

    assert!(!report.weather_enriched);
    assert_eq!(report.processed, 1);
    assert_eq!(store.commits().len(), 1);
}

#[tokio::test]
async fn default_timezone_starts_epoch_window_at_local_midnight() {
    let mut server = Server::new_async().await;
    // An empty value falls back to the default zone
    let config = common::config(&server.url(), &[("SYNC_TIMEZONE", "")]);
    let settings = SyncSettings::from(&config);
    assert_eq!(settings.timezone, chrono_tz::Europe::Ljubljana);

    let readings = server
        .mock("GET", READINGS_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("measuring_point_id".into(), "857".into()),
            Matcher::UrlEncoded(
                "date[gte]".into(),
                "\"2023-12-31T23:00:00.000Z\"".into(),
            ),
        ]))
        .with_status(200)
        .with_body(
            json!([
                { "date": "2023-12-31T23:00:00.000Z", "enN": 4.0, "enP": 1.0, "measuring_point_id": 857 }
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let store = MemoryStore {
        points: vec![point("857"), point("856")],
        ..MemoryStore::default()
    };
    let client = MeteringClient::new(&config).unwrap();
    let settings = SyncSettings {
        measuring_ids: vec!["857".to_string()],
        ..settings
    };

    let report = reconcile(&store, &client, None, &settings).await.unwrap();

    readings.assert_async().await;
    assert_eq!(report.since, day(2024, 1, 1));
    assert_eq!(report.window_start.to_rfc3339(), "2023-12-31T23:00:00+00:00");
    // Local midnight belongs to January 1st
    let (upserts, _) = &store.commits()[0];
    assert_eq!(upserts[0].date, day(2024, 1, 1));
}
