use actix_web::{web, HttpRequest, HttpResponse, Responder};

use crate::models::{DeletionResponse, ErrorResponse};
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/internal/accounts/{user_id}", web::delete().to(delete_account));
}

/// DELETE /api/v1/internal/accounts/{userId} — cascade account-delete
/// endpoint, internal, API-key-gated (spec §3 profile lifecycle, §6).
///
/// Soft-deletes the profile, then cascades to the tables the store owns
/// (interactions, matches); the remaining candidate-store tables are
/// cleaned up lazily by their own expiry logic (daily picks) or simply
/// become unreachable once the profile is inactive (precomputed scores,
/// algorithm metrics).
async fn delete_account(state: web::Data<AppState>, path: web::Path<i64>, req: HttpRequest) -> impl Responder {
    if !state.authorize_internal(&req) {
        return HttpResponse::Unauthorized().json(ErrorResponse {
            error: "unauthorized".to_string(),
            message: "missing or invalid X-Internal-Api-Key".to_string(),
            status_code: 401,
        });
    }

    let user_id = path.into_inner();

    if let Err(err) = state.store.profiles().soft_delete(user_id).await {
        tracing::error!(user_id, error = %err, "failed to soft-delete profile");
        return HttpResponse::InternalServerError().json(ErrorResponse {
            error: "account_deletion_failed".to_string(),
            message: err.to_string(),
            status_code: 500,
        });
    }

    let interactions_deleted = match state.store.interactions().delete_for_user(user_id).await {
        Ok(count) => count,
        Err(err) => {
            tracing::warn!(user_id, error = %err, "failed to cascade-delete interactions");
            0
        }
    };

    let matches_deleted = match state.store.matches().delete_for_user(user_id).await {
        Ok(count) => count,
        Err(err) => {
            tracing::warn!(user_id, error = %err, "failed to cascade-delete matches");
            0
        }
    };

    HttpResponse::Ok().json(DeletionResponse {
        deleted_count: interactions_deleted + matches_deleted,
    })
}
