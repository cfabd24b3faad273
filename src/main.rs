mod config;
mod core;
mod models;
mod routes;
mod services;
mod store;
mod workers;

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use chrono::NaiveTime;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use config::Settings;
use core::limiter::DailySuggestionLimiter;
use core::strategy::resolver::ResolverConfig;
use core::strategy::{StrategyConfig, StrategyDeps, StrategyResolver};
use models::StrategyOverride;
use routes::AppState;
use services::{CacheManager, SafetyServiceClient, SwipeServiceClient};
use store::Store;
use workers::{DailyPickGeneratorConfig, ScoreRefresherConfig};

/// JSON error response for request-body/query parsing failures.
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap())
    }
}

pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

fn strategy_override_from_str(raw: &str) -> StrategyOverride {
    StrategyOverride::parse(raw).unwrap_or_else(|| {
        warn!(strategy = raw, "unrecognized configured strategy, defaulting to Auto");
        StrategyOverride::Auto
    })
}

fn generation_time_from_str(raw: &str) -> NaiveTime {
    NaiveTime::parse_from_str(raw, "%H:%M").unwrap_or_else(|_| {
        warn!(raw, "unparseable daily_picks.generation_time_utc, defaulting to 03:00");
        NaiveTime::from_hms_opt(3, 0, 0).unwrap()
    })
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    let settings = Settings::load().unwrap_or_else(|e| {
        error!("failed to load configuration: {}", e);
        panic!("configuration error: {}", e);
    });

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(format!("matchcore={},actix_web=info", settings.logging.level));

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }

    info!("starting matchcore matching engine");

    let db_max_conn = settings.database.max_connections.unwrap_or(10);
    let db_min_conn = settings.database.min_connections.unwrap_or(1);
    let store = Store::connect(&settings.database.url, db_max_conn, db_min_conn)
        .await
        .unwrap_or_else(|e| {
            error!("failed to connect to store: {}", e);
            panic!("database connection error: {}", e);
        });
    info!(max_connections = db_max_conn, "store connected");

    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);
    let cache = Arc::new(
        CacheManager::new(&settings.cache.redis_url, l1_cache_size, cache_ttl)
            .await
            .unwrap_or_else(|e| {
                error!("failed to connect to cache: {}", e);
                panic!("cache connection error: {}", e);
            }),
    );
    info!(l1_size = l1_cache_size, ttl_secs = cache_ttl, "cache manager initialized");

    let swipe = Arc::new(SwipeServiceClient::new(
        settings.swipe_service.base_url.clone(),
        Duration::from_secs(settings.swipe_service.timeout_secs),
    ));
    let safety = Arc::new(SafetyServiceClient::new(
        settings.safety_service.base_url.clone(),
        Duration::from_secs(settings.safety_service.timeout_secs),
    ));

    let strategy_config = StrategyConfig {
        default_min_score: settings.matching.default_min_score,
        score_ttl_hours: settings.scoring.score_cache_hours,
        activity_half_life_days: settings.scoring.activity_score_half_life_days,
        lifestyle_penalties: core::compat::LifestylePenalties {
            wants_children_mismatch: settings.scoring.wants_children_mismatch_penalty,
            has_children_mismatch: settings.scoring.has_children_mismatch_penalty,
            smoking_max: settings.scoring.smoking_mismatch_penalty,
            drinking_max: settings.scoring.drinking_mismatch_penalty,
            religion_mismatch: settings.scoring.religion_mismatch_penalty,
        },
        picks_per_user: settings.daily_picks.picks_per_user,
        daily_pick_expiry_hours: settings.daily_picks.expiry_hours,
    };

    let deps = StrategyDeps {
        profiles: store.profiles(),
        scores: store.scores(),
        daily_picks: store.daily_picks(),
        metrics: store.metrics(),
        swipe,
        safety,
        config: strategy_config,
    };

    let resolver = Arc::new(StrategyResolver::new(ResolverConfig {
        configured_strategy: strategy_override_from_str(&settings.strategy.strategy),
        live_max_users: settings.strategy.auto_strategy_thresholds.live_max_users,
        active_count_cache: Duration::from_secs(60),
    }));

    let limiter = Arc::new(DailySuggestionLimiter::new(
        settings.daily_suggestion_limits.max_daily_suggestions,
        settings.daily_suggestion_limits.premium_max_daily_suggestions,
        settings.daily_suggestion_limits.refresh_interval_hours,
    ));

    let cancel = CancellationToken::new();

    let refresher_config = ScoreRefresherConfig {
        enabled: settings.background_scoring.enabled,
        refresh_interval: Duration::from_secs(settings.background_scoring.refresh_interval_minutes * 60),
        max_users_per_cycle: settings.background_scoring.max_users_per_cycle,
        only_refresh_active_users: settings.background_scoring.only_refresh_active_users,
        skip_refresh_when_cpu_above: settings.background_scoring.skip_refresh_when_cpu_above,
        max_concurrent_scoring: settings.background_scoring.max_concurrent_scoring,
        score_ttl_hours: settings.scoring.score_cache_hours,
        activity_half_life_days: settings.scoring.activity_score_half_life_days,
        lifestyle_penalties: strategy_config.lifestyle_penalties,
        candidates_per_user: 100,
    };
    tokio::spawn(workers::run_score_refresher(deps.clone(), refresher_config, cancel.clone()));

    let daily_pick_config = DailyPickGeneratorConfig {
        enabled: settings.daily_picks.enabled,
        picks_per_user: settings.daily_picks.picks_per_user,
        generation_time_utc: generation_time_from_str(&settings.daily_picks.generation_time_utc),
        expiry_hours: settings.daily_picks.expiry_hours,
    };
    tokio::spawn(workers::run_daily_pick_generator(deps.clone(), daily_pick_config, cancel.clone()));

    let app_state = AppState {
        store,
        deps,
        resolver,
        limiter,
        cache,
        internal_api_key: Arc::new(settings.internal_api_key.clone()),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers_count = settings.server.workers.unwrap_or(4);

    info!(host = %host, port, "starting HTTP server");

    let result = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers_count)
    .bind((host, port))?
    .run()
    .await;

    cancel.cancel();
    result
}
