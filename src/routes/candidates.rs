use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;

use crate::models::{CandidateQueryParams, CandidateRecord, CandidateRequest, CandidateResponse, ErrorResponse};
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/candidates/{user_id}", web::get().to(get_candidates));
}

/// GET /api/v1/candidates/{userId}?limit&minScore&activeWithin&onlyVerified&strategy
///
/// A non-integer userId is an `InputClamp`, not an error (spec §6): it
/// resolves to an empty, exhausted result rather than a 4xx.
async fn get_candidates(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<CandidateQueryParams>,
) -> impl Responder {
    let Ok(user_id) = path.into_inner().parse::<i64>() else {
        return HttpResponse::Ok().json(CandidateResponse {
            candidates: Vec::new(),
            total_filtered: 0,
            total_scored: 0,
            strategy_used: "Live".to_string(),
            queue_exhausted: true,
            suggestions_remaining: None,
        });
    };

    let request = CandidateRequest::from_params(&query);
    let now_millis = Utc::now().timestamp_millis().max(0) as u64;

    match state.resolver.get_candidates(&state.deps, user_id, &request, now_millis).await {
        Ok(outcome) => {
            let candidates = outcome
                .candidates
                .into_iter()
                .map(|c| CandidateRecord {
                    user_id: c.profile.user_id,
                    age: c.profile.age.clamp(0, u8::MAX as i16) as u8,
                    gender: c.profile.gender,
                    city: c.profile.city,
                    compatibility: c.compatibility,
                    compatibility_score: c.compatibility_score,
                    activity_score: c.activity_score,
                    desirability_score: c.desirability_score,
                    strategy_used: outcome.strategy_used.as_str().to_string(),
                    is_verified: c.profile.is_verified,
                    interests: c.profile.interests,
                })
                .collect();

            HttpResponse::Ok().json(CandidateResponse {
                candidates,
                total_filtered: outcome.total_filtered,
                total_scored: outcome.total_scored,
                strategy_used: outcome.strategy_used.as_str().to_string(),
                queue_exhausted: outcome.queue_exhausted,
                suggestions_remaining: outcome.suggestions_remaining,
            })
        }
        Err(err) => {
            tracing::error!(user_id, error = %err, "candidate resolution failed");
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "candidate_resolution_failed".to_string(),
                message: err.to_string(),
                status_code: 500,
            })
        }
    }
}
