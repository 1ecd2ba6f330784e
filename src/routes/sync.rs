use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::AppState;
use crate::entity::sync_history;
use crate::error::AppResult;
use crate::identity::AuthUser;
use crate::routes::pagination::{PageQuery, Pagination};
use crate::storage::PgStore;
use crate::sync::{reconcile, SyncReport, SyncSettings};

#[derive(Debug, Serialize, ToSchema)]
pub struct SyncHistoryResponse {
    pub id: Uuid,
    pub created_at: DateTime<FixedOffset>,
    /// Readings written by the run
    pub number_of_inserts: i32,
}

impl From<sync_history::Model> for SyncHistoryResponse {
    fn from(row: sync_history::Model) -> Self {
        Self {
            id: row.id,
            created_at: row.created_at,
            number_of_inserts: row.number_of_inserts,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SyncHistoryPage {
    pub items: Vec<SyncHistoryResponse>,
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_pages: u64,
}

/// Run a reconciliation
///
/// Pulls readings from the metering API since the last stored day and
/// upserts them. Runs synchronously; the response reports what was written.
#[utoipa::path(
    post,
    path = "/api/sync",
    responses(
        (status = 200, description = "Reconciliation finished", body = SyncReport),
        (status = 403, description = "Missing or invalid session"),
        (status = 429, description = "Too many sync requests"),
        (status = 502, description = "Metering API failed"),
    ),
    tag = "sync"
)]
pub async fn trigger_sync(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<SyncReport>> {
    tracing::info!(user_id = %user.user_id, "Sync requested");

    let store = PgStore::new(state.db.clone());
    let settings = SyncSettings::from(state.config.as_ref());

    let report = reconcile(
        &store,
        &state.metering_client,
        state.weather_client.as_deref(),
        &settings,
    )
    .await?;

    Ok(Json(report))
}

/// Sync history
///
/// Audit log of reconciliation runs, newest first.
#[utoipa::path(
    get,
    path = "/api/sync-history",
    params(PageQuery),
    responses(
        (status = 200, description = "Past runs", body = SyncHistoryPage),
        (status = 403, description = "Missing or invalid session"),
    ),
    tag = "sync"
)]
pub async fn sync_history(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<SyncHistoryPage>> {
    let page = Pagination::from(&query);

    let (rows, total) = PgStore::new(state.db.clone())
        .sync_history_page(page.offset(), page.page_size)
        .await?;

    Ok(Json(SyncHistoryPage {
        items: rows.into_iter().map(SyncHistoryResponse::from).collect(),
        page: page.page,
        page_size: page.page_size,
        total,
        total_pages: page.total_pages(total),
    }))
}
