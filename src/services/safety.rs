//! Safety service client (spec §6): blocked-user lookups. Fails open — any
//! unreachable/erroring call is treated as "no blocks" per §7.

use std::collections::HashSet;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SafetyServiceError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockedIdsResponse {
    #[serde(default)]
    blocked_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct IsBlockedResponse {
    blocked: bool,
}

pub struct SafetyServiceClient {
    base_url: String,
    client: Client,
}

impl SafetyServiceClient {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build safety service HTTP client");
        Self { base_url, client }
    }

    /// `GET /safety/blocked`. IDs may be string-encoded; non-parseable
    /// entries are dropped (spec §6).
    pub async fn blocked_ids(&self, caller_user_id: i64) -> HashSet<i64> {
        let url = format!("{}/safety/blocked", self.base_url.trim_end_matches('/'));
        let result: Result<HashSet<i64>, SafetyServiceError> = async {
            let response = self
                .client
                .get(&url)
                .header("X-User-Id", caller_user_id.to_string())
                .send()
                .await?;
            if !response.status().is_success() {
                return Ok(HashSet::new());
            }
            let body: BlockedIdsResponse = response.json().await.unwrap_or(BlockedIdsResponse {
                blocked_ids: Vec::new(),
            });
            Ok(body
                .blocked_ids
                .into_iter()
                .filter_map(|id| id.parse::<i64>().ok())
                .collect())
        }
        .await;

        result.unwrap_or_else(|err| {
            tracing::warn!(caller_user_id, error = %err, "safety service unavailable, treating blocked set as empty");
            HashSet::new()
        })
    }

    /// `GET /safety/is-blocked/{target}`, failing open to `false`.
    pub async fn is_blocked(&self, caller_user_id: i64, target_user_id: i64) -> bool {
        let url = format!(
            "{}/safety/is-blocked/{}",
            self.base_url.trim_end_matches('/'),
            target_user_id
        );
        let response = self
            .client
            .get(&url)
            .header("X-User-Id", caller_user_id.to_string())
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => response
                .json::<IsBlockedResponse>()
                .await
                .map(|body| body.blocked)
                .unwrap_or(false),
            Ok(response) => {
                tracing::warn!(target_user_id, status = %response.status(), "is-blocked check failed, defaulting to false");
                false
            }
            Err(err) => {
                tracing::warn!(target_user_id, error = %err, "safety service unreachable, defaulting to false");
                false
            }
        }
    }
}
