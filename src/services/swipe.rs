//! Swipe service client (spec §6 "External clients consumed").
//!
//! Talks to the external swipe/behavior service for swiped-target ids and
//! per-user trust scores. Every call degrades gracefully on failure: the
//! spec requires swipedIds to default empty and trust to default 100
//! rather than ever propagating an upstream failure to a candidate
//! response (§7 `UpstreamUnavailable`).

use std::collections::HashSet;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwipeServiceError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected response shape: {0}")]
    InvalidResponse(String),
}

const SWIPE_PAGE_SIZE: u32 = 200;
/// Default trust applied wherever the swipe service can't be reached.
pub const DEFAULT_TRUST_SCORE: f64 = 100.0;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwipePage {
    #[serde(default)]
    target_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrustScoreResponse {
    #[allow(dead_code)]
    user_id: i64,
    trust_score: f64,
}

pub struct SwipeServiceClient {
    base_url: String,
    client: Client,
}

impl SwipeServiceClient {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build swipe service HTTP client");
        Self { base_url, client }
    }

    /// Page through `GET /swipes/user/{id}` until a short page, collecting
    /// every swiped target id (spec §6).
    pub async fn swiped_ids(&self, user_id: i64) -> HashSet<i64> {
        match self.swiped_ids_inner(user_id).await {
            Ok(ids) => ids,
            Err(err) => {
                tracing::warn!(user_id, error = %err, "swipe service unavailable, treating swiped ids as empty");
                HashSet::new()
            }
        }
    }

    async fn swiped_ids_inner(&self, user_id: i64) -> Result<HashSet<i64>, SwipeServiceError> {
        let mut ids = HashSet::new();
        let mut page = 1u32;
        loop {
            let url = format!(
                "{}/swipes/user/{}?page={}&pageSize={}",
                self.base_url.trim_end_matches('/'),
                user_id,
                page,
                SWIPE_PAGE_SIZE
            );
            let response = self.client.get(&url).send().await?;
            if !response.status().is_success() {
                return Err(SwipeServiceError::InvalidResponse(format!(
                    "status {}",
                    response.status()
                )));
            }
            let body: SwipePage = response.json().await?;
            let len = body.target_ids.len();
            ids.extend(body.target_ids);

            if (len as u32) < SWIPE_PAGE_SIZE {
                break;
            }
            page += 1;
        }
        Ok(ids)
    }

    /// `GET /internal/swipe-behavior/{id}/trust-score`, defaulting to 100
    /// on any failure.
    pub async fn trust_score(&self, user_id: i64) -> f64 {
        let url = format!(
            "{}/internal/swipe-behavior/{}/trust-score",
            self.base_url.trim_end_matches('/'),
            user_id
        );
        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                match response.json::<TrustScoreResponse>().await {
                    Ok(body) => body.trust_score.clamp(0.0, 100.0),
                    Err(err) => {
                        tracing::warn!(user_id, error = %err, "trust score parse failure, defaulting to 100");
                        DEFAULT_TRUST_SCORE
                    }
                }
            }
            Ok(response) => {
                tracing::warn!(user_id, status = %response.status(), "trust score request failed, defaulting to 100");
                DEFAULT_TRUST_SCORE
            }
            Err(err) => {
                tracing::warn!(user_id, error = %err, "trust score service unreachable, defaulting to 100");
                DEFAULT_TRUST_SCORE
            }
        }
    }

    /// `POST /internal/swipe-behavior/batch-trust-scores`: batch variant
    /// used by the Live strategy (spec §4.4 step 7). On any failure,
    /// every requested id defaults to 100.
    pub async fn batch_trust_scores(&self, user_ids: &[i64]) -> Vec<(i64, f64)> {
        if user_ids.is_empty() {
            return Vec::new();
        }
        match self.batch_trust_scores_inner(user_ids).await {
            Ok(scores) => scores,
            Err(err) => {
                tracing::warn!(error = %err, "batch trust score request failed, defaulting all to 100");
                user_ids.iter().map(|id| (*id, DEFAULT_TRUST_SCORE)).collect()
            }
        }
    }

    async fn batch_trust_scores_inner(
        &self,
        user_ids: &[i64],
    ) -> Result<Vec<(i64, f64)>, SwipeServiceError> {
        let url = format!(
            "{}/internal/swipe-behavior/batch-trust-scores",
            self.base_url.trim_end_matches('/')
        );
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "userIds": user_ids }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SwipeServiceError::InvalidResponse(format!(
                "status {}",
                response.status()
            )));
        }

        let body: Vec<TrustScoreResponse> = response.json().await?;
        Ok(body.into_iter().map(|r| (r.user_id, r.trust_score.clamp(0.0, 100.0))).collect())
    }
}
