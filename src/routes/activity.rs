use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::Utc;

use crate::models::{
    ActivityPingBatchRequest, ActivityPingBatchResponse, ActivityPingRequest, ActivityPingResponse,
    ErrorResponse,
};
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/internal/activity", web::post().to(ping_activity))
        .route("/internal/activity/batch", web::post().to(ping_activity_batch));
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(ErrorResponse {
        error: "unauthorized".to_string(),
        message: "missing or invalid X-Internal-Api-Key".to_string(),
        status_code: 401,
    })
}

/// POST /api/v1/internal/activity — internal, API-key-gated (spec §6).
/// An unknown userId is ignored, not an error.
async fn ping_activity(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<ActivityPingRequest>,
) -> impl Responder {
    if !state.authorize_internal(&req) {
        return unauthorized();
    }

    match state.store.profiles().update_last_active(body.user_id, Utc::now()).await {
        Ok(updated) => HttpResponse::Ok().json(ActivityPingResponse { updated }),
        Err(err) => {
            tracing::error!(user_id = body.user_id, error = %err, "failed to record activity ping");
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "activity_ping_failed".to_string(),
                message: err.to_string(),
                status_code: 500,
            })
        }
    }
}

/// POST /api/v1/internal/activity/batch — internal, API-key-gated (spec §6).
async fn ping_activity_batch(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<ActivityPingBatchRequest>,
) -> impl Responder {
    if !state.authorize_internal(&req) {
        return unauthorized();
    }

    let total = body.user_ids.len() as u32;
    match state
        .store
        .profiles()
        .update_last_active_batch(&body.user_ids, Utc::now())
        .await
    {
        Ok(updated) => HttpResponse::Ok().json(ActivityPingBatchResponse {
            updated: updated as u32,
            total,
        }),
        Err(err) => {
            tracing::error!(error = %err, "failed to record batch activity ping");
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "activity_ping_batch_failed".to_string(),
                message: err.to_string(),
                status_code: 500,
            })
        }
    }
}
