use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use serde::Deserialize;

use crate::models::DailySuggestionStatusResponse;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
struct SuggestionStatusParams {
    #[serde(default)]
    is_premium: bool,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/suggestions/{user_id}/status", web::get().to(suggestion_status));
}

/// GET /api/v1/suggestions/{userId}/status?isPremium — daily-suggestion
/// status endpoint (spec §6). Reads the limiter's counter without
/// incrementing it; the candidate endpoint is what actually spends budget.
async fn suggestion_status(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<SuggestionStatusParams>,
) -> impl Responder {
    let user_id = path.into_inner();
    let status = state.limiter.status(user_id, query.is_premium, Utc::now());

    HttpResponse::Ok().json(DailySuggestionStatusResponse {
        shown_today: status.shown_today,
        max: status.max,
        remaining: status.remaining,
        last_reset_date: status.last_reset_date,
        next_reset_date: status.next_reset_date,
        queue_exhausted: status.queue_exhausted,
    })
}
