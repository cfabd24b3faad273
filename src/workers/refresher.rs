//! Background score refresher (spec §4.6): periodically recomputes
//! `PrecomputedScore` rows for stale users so the pre-computed strategy has
//! fresh data to serve from, without blocking any request path.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::core::compat::{self, LifestylePenalties};
use crate::core::desirability;
use crate::core::filters::{FilterContext, FilterPipeline};
use crate::core::strategy::StrategyDeps;

const STARTUP_DELAY: StdDuration = StdDuration::from_secs(10);

#[derive(Debug, Clone, Copy)]
pub struct ScoreRefresherConfig {
    pub enabled: bool,
    pub refresh_interval: StdDuration,
    pub max_users_per_cycle: u32,
    pub only_refresh_active_users: bool,
    /// CPU load percentage (0-100, normalized by core count) above which a
    /// cycle is skipped outright (spec §4.6 step 2).
    pub skip_refresh_when_cpu_above: f64,
    pub max_concurrent_scoring: usize,
    pub score_ttl_hours: i64,
    pub activity_half_life_days: f64,
    pub lifestyle_penalties: LifestylePenalties,
    /// Candidates scored per stale user per cycle.
    pub candidates_per_user: i64,
}

impl Default for ScoreRefresherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            refresh_interval: StdDuration::from_secs(15 * 60),
            max_users_per_cycle: 1_000,
            only_refresh_active_users: true,
            skip_refresh_when_cpu_above: 90.0,
            max_concurrent_scoring: 5,
            score_ttl_hours: compat::DEFAULT_SCORE_TTL_HOURS,
            activity_half_life_days: 7.0,
            lifestyle_penalties: LifestylePenalties::default(),
            candidates_per_user: 100,
        }
    }
}

/// Current 1-minute load average normalized to a 0-100 percentage by core
/// count. Returns `None` (fail-open: never block the refresher) if
/// `/proc/loadavg` is unavailable, e.g. on a non-Linux host.
fn cpu_load_percent() -> Option<f64> {
    let contents = std::fs::read_to_string("/proc/loadavg").ok()?;
    let load_one: f64 = contents.split_whitespace().next()?.parse().ok()?;
    let cores = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1) as f64;
    Some((load_one / cores) * 100.0)
}

/// Recompute every fresh candidate pair for one stale user, writing through
/// via `upsert_refresher_row` (spec §4.6 step 4c, which stores the combined
/// score in `lifestyle_score` — see DESIGN.md).
async fn refresh_one_user(deps: &StrategyDeps, pipeline: &Arc<FilterPipeline>, requester_id: i64, config: &ScoreRefresherConfig) {
    let requester = match deps.profiles.get(requester_id).await {
        Ok(Some(p)) => p,
        Ok(None) => return,
        Err(err) => {
            tracing::warn!(user_id = requester_id, error = %err, "refresher: failed to load requester");
            return;
        }
    };

    let swiped_ids = deps.swipe.swiped_ids(requester_id).await;
    let blocked_ids = deps.safety.blocked_ids(requester_id).await;
    let request = crate::models::CandidateRequest::default();
    let ctx = FilterContext {
        requester: &requester,
        swiped_ids: &swiped_ids,
        blocked_ids: &blocked_ids,
        options: &request,
    };

    let candidates = match deps.profiles.candidates(pipeline, &ctx, config.candidates_per_user).await {
        Ok(c) => c,
        Err(err) => {
            tracing::warn!(user_id = requester_id, error = %err, "refresher: candidate lookup failed");
            return;
        }
    };

    let now = Utc::now();
    for candidate in candidates {
        let result = compat::compute(&requester, &candidate, now, config.lifestyle_penalties, config.activity_half_life_days);
        let base = crate::core::strategy::base_score(result.overall, result.activity, candidate.desirability_score);
        if let Err(err) = deps
            .scores
            .upsert_refresher_row(requester_id, candidate.user_id, result.overall, result.activity, base, now)
            .await
        {
            tracing::warn!(
                user_id = requester_id,
                target_user_id = candidate.user_id,
                error = %err,
                "refresher: score upsert failed"
            );
        }
    }

    // Desirability batch recalculation (spec §4.8): non-fatal on failure.
    if let Err(err) = recalculate_desirability(deps, requester_id, requester.desirability_score, now).await {
        tracing::warn!(user_id = requester_id, error = %err, "refresher: desirability recalculation failed");
    }
}

async fn recalculate_desirability(
    deps: &StrategyDeps,
    user_id: i64,
    current_score: f64,
    now: chrono::DateTime<Utc>,
) -> Result<(), crate::store::StoreError> {
    let Some(metric) = deps.metrics.latest_for_user(user_id).await? else {
        return Ok(());
    };
    let new_score = desirability::bayesian_desirability(&metric, now);
    if desirability::is_significant_change(new_score, current_score) {
        deps.profiles.update_desirability(user_id, new_score).await?;
    }
    Ok(())
}

/// Run one refresh cycle: select a batch of stale users and score them with
/// bounded concurrency (spec §4.6 steps 3-4).
async fn run_cycle(deps: &StrategyDeps, pipeline: &Arc<FilterPipeline>, config: &ScoreRefresherConfig, checkpoint: &AtomicI64) {
    if let Some(load) = cpu_load_percent() {
        if load > config.skip_refresh_when_cpu_above {
            tracing::info!(load, "refresher: skipping cycle, CPU load above threshold");
            return;
        }
    }

    let after = match checkpoint.load(Ordering::Relaxed) {
        0 => None,
        id => Some(id),
    };

    let users = match deps
        .profiles
        .select_for_refresh(config.only_refresh_active_users, after, config.max_users_per_cycle as i64)
        .await
    {
        Ok(users) => users,
        Err(err) => {
            tracing::warn!(error = %err, "refresher: stale-user selection failed");
            return;
        }
    };

    if users.is_empty() {
        // Exhausted this pass; start over from the beginning next cycle.
        checkpoint.store(0, Ordering::Relaxed);
        return;
    }

    tracing::info!(count = users.len(), "refresher: starting cycle");

    let semaphore = Arc::new(Semaphore::new(config.max_concurrent_scoring));
    let mut handles = Vec::with_capacity(users.len());
    let mut last_user_id = 0;

    for user in users {
        last_user_id = user.user_id;
        let permit = semaphore.clone().acquire_owned().await.expect("semaphore closed");
        let deps = deps.clone();
        let pipeline = pipeline.clone();
        let config = *config;
        handles.push(tokio::spawn(async move {
            let _permit = permit;
            refresh_one_user(&deps, &pipeline, user.user_id, &config).await;
        }));
    }

    for handle in handles {
        let _ = handle.await;
    }

    checkpoint.store(last_user_id, Ordering::Relaxed);
    tracing::info!("refresher: cycle complete");
}

/// Spawn the refresher loop. Runs until `cancel` is triggered; the
/// in-flight user finishes but no new cycle starts afterward.
pub async fn run_score_refresher(deps: StrategyDeps, config: ScoreRefresherConfig, cancel: CancellationToken) {
    if !config.enabled {
        tracing::info!("refresher: disabled by configuration");
        return;
    }

    tokio::select! {
        _ = sleep(STARTUP_DELAY) => {}
        _ = cancel.cancelled() => return,
    }

    let pipeline = Arc::new(FilterPipeline::default_pipeline());
    let checkpoint = AtomicI64::new(0);

    loop {
        run_cycle(&deps, &pipeline, &config, &checkpoint).await;

        tokio::select! {
            _ = sleep(config.refresh_interval) => {}
            _ = cancel.cancelled() => {
                tracing::info!("refresher: shutdown requested, exiting after current cycle");
                return;
            }
        }
    }
}
