// Route exports
pub mod account;
pub mod activity;
pub mod candidates;
pub mod health;
pub mod matches;
pub mod suggestions;

use std::sync::Arc;

use actix_web::web;

use crate::core::limiter::DailySuggestionLimiter;
use crate::core::strategy::{StrategyDeps, StrategyResolver};
use crate::services::CacheManager;
use crate::store::Store;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub deps: StrategyDeps,
    pub resolver: Arc<StrategyResolver>,
    pub limiter: Arc<DailySuggestionLimiter>,
    pub cache: Arc<CacheManager>,
    pub internal_api_key: Arc<String>,
}

impl AppState {
    /// Header check gating internal endpoints (spec §6 "Activity-ping
    /// endpoints (internal, API-key-gated)").
    pub fn authorize_internal(&self, req: &actix_web::HttpRequest) -> bool {
        req.headers()
            .get("X-Internal-Api-Key")
            .and_then(|v| v.to_str().ok())
            .map(|provided| provided == self.internal_api_key.as_str())
            .unwrap_or(false)
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::configure)
            .configure(candidates::configure)
            .configure(matches::configure)
            .configure(suggestions::configure)
            .configure(activity::configure)
            .configure(account::configure),
    );
}
