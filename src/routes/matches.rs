use actix_web::{web, HttpRequest, HttpResponse, Responder};

use crate::models::{
    DeletionResponse, ErrorResponse, MatchStatsResponse, RecordMatchRequest, RecordMatchResponse,
};
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/matches", web::post().to(record_match))
        .route("/matches/{user_id}/stats", web::get().to(match_stats))
        .route("/matches/{user_id}", web::delete().to(delete_matches));
}

/// POST /api/v1/matches — mutual-match sink (spec §6).
///
/// Canonicalizes the pair and upserts a Match row. Resubmitting an
/// already-recorded pair is a no-op, not an error.
async fn record_match(state: web::Data<AppState>, body: web::Json<RecordMatchRequest>) -> impl Responder {
    let body = body.into_inner();
    match state
        .store
        .matches()
        .record_mutual_match(body.user1_id, body.user2_id, body.compatibility_score, &body.source)
        .await
    {
        Ok(created) => HttpResponse::Ok().json(RecordMatchResponse {
            user1_id: body.user1_id,
            user2_id: body.user2_id,
            created,
        }),
        Err(err) => {
            tracing::error!(user1_id = body.user1_id, user2_id = body.user2_id, error = %err, "failed to record mutual match");
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "match_record_failed".to_string(),
                message: err.to_string(),
                status_code: 500,
            })
        }
    }
}

/// GET /api/v1/matches/{userId}/stats
async fn match_stats(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let user_id = path.into_inner();
    match state.store.matches().stats_for_user(user_id).await {
        Ok(stats) => HttpResponse::Ok().json(MatchStatsResponse {
            total_matches: stats.total_matches,
            active_matches: stats.active_matches,
            average_compatibility_score: stats.average_compatibility_score,
            last_match_at: stats.last_match_at,
            top_reasons: stats.top_reasons,
        }),
        Err(err) => {
            tracing::error!(user_id, error = %err, "failed to load match stats");
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "match_stats_failed".to_string(),
                message: err.to_string(),
                status_code: 500,
            })
        }
    }
}

/// DELETE /api/v1/matches/{userId} — internal, API-key-gated (spec §6).
async fn delete_matches(state: web::Data<AppState>, path: web::Path<i64>, req: HttpRequest) -> impl Responder {
    if !state.authorize_internal(&req) {
        return HttpResponse::Unauthorized().json(ErrorResponse {
            error: "unauthorized".to_string(),
            message: "missing or invalid X-Internal-Api-Key".to_string(),
            status_code: 401,
        });
    }

    let user_id = path.into_inner();
    match state.store.matches().delete_for_user(user_id).await {
        Ok(deleted_count) => HttpResponse::Ok().json(DeletionResponse { deleted_count }),
        Err(err) => {
            tracing::error!(user_id, error = %err, "failed to delete matches");
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "match_deletion_failed".to_string(),
                message: err.to_string(),
                status_code: 500,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_match_response_shape() {
        let response = RecordMatchResponse {
            user1_id: 1,
            user2_id: 2,
            created: true,
        };
        assert!(response.created);
    }
}
