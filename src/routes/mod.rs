pub mod energy;
pub mod health;
pub mod pagination;
mod rate_limit;
pub mod sync;
pub mod users;

use axum::{
    http::{header, HeaderValue},
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use rate_limit::ClientKeyExtractor;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::common::AppState;
use crate::error::{AppError, AppResult};
use crate::identity::AuthUser;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        health::readyz,
        users::current_user,
        users::list_users,
        users::create_user,
        users::delete_user,
        sync::trigger_sync,
        sync::sync_history,
        energy::get_energy,
        energy::get_energy_statistics,
    ),
    components(
        schemas(
            users::UserResponse,
            users::UserPage,
            users::CreateUserRequest,
            users::DeleteUserResponse,
            sync::SyncHistoryResponse,
            sync::SyncHistoryPage,
            crate::sync::SyncReport,
            energy::DailyEnergy,
            energy::EnergyStatistics,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "Identity provider user management"),
        (name = "sync", description = "Metering reconciliation and its audit log"),
        (name = "energy", description = "Daily production data"),
    ),
    info(
        title = "Energy Sync API",
        description = "Reconciles metering readings into Postgres and serves daily production",
        version = "0.1.0"
    )
)]
struct ApiDoc;

/// Wrap `routes` in a per-client limiter: `burst` requests, then one more
/// every `replenish_seconds`.
fn rate_limited(
    routes: Router<AppState>,
    replenish_seconds: u64,
    burst: u32,
) -> AppResult<Router<AppState>> {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientKeyExtractor)
        .per_second(replenish_seconds)
        .burst_size(burst)
        .finish()
        .ok_or_else(|| {
            AppError::Internal(format!(
                "Invalid rate limit: replenish {replenish_seconds}s, burst {burst}"
            ))
        })?;

    Ok(routes.layer(GovernorLayer {
        config: Arc::new(config),
    }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    // A wildcard never covers Authorization in a preflight
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Assemble the HTTP application.
///
/// # Errors
///
/// Returns `AppError::Internal` if a rate limiter cannot be built from the
/// configured values.
pub fn build_router(state: AppState) -> AppResult<Router> {
    let config = &state.config;

    if config.disable_rate_limiting {
        tracing::warn!("Rate limiting DISABLED");
    } else {
        tracing::info!(
            general = %format!("1 per {}s burst {}", config.rate_limit_replenish_seconds, config.rate_limit_burst),
            sync = %format!("1 per {}s burst {}", config.rate_limit_sync_replenish_seconds, config.rate_limit_sync_burst),
            "Rate limiting configured"
        );
    }

    let read_routes = Router::new()
        .route("/auth", get(users::current_user))
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/{user_id}", delete(users::delete_user))
        .route("/energy", get(energy::get_energy))
        .route("/energy-statistics", get(energy::get_energy_statistics))
        .route("/sync-history", get(sync::sync_history));

    let sync_routes = Router::new().route("/sync", post(sync::trigger_sync));

    let api_routes = if config.disable_rate_limiting {
        Router::new().merge(read_routes).merge(sync_routes)
    } else {
        Router::new()
            .merge(rate_limited(
                read_routes,
                config.rate_limit_replenish_seconds,
                config.rate_limit_burst,
            )?)
            .merge(rate_limited(
                sync_routes,
                config.rate_limit_sync_replenish_seconds,
                config.rate_limit_sync_burst,
            )?)
    }
    // Wraps the limiters: anonymous requests never reach a bucket
    .route_layer(middleware::from_extractor_with_state::<AuthUser, _>(
        state.clone(),
    ))
    .layer(RequestBodyLimitLayer::new(1024 * 1024));

    let health_routes = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz));

    let docs_routes = Router::new().merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    let cors = cors_layer(&config.cors_allowed_origins);

    Ok(Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(docs_routes)
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
