//! Daily-pick generator (spec §4.7): materializes each active user's top
//! picks once a day, so the daily-pick strategy has a pre-built queue to
//! serve from all day without scoring on demand.

use std::time::Duration as StdDuration;

use chrono::{NaiveTime, Utc};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::core::strategy::{LiveStrategy, StrategyDeps};
use crate::models::CandidateRequest;

const STARTUP_DELAY: StdDuration = StdDuration::from_secs(15);
/// Anti-double-run guard: never start a second pass within an hour of the
/// previous one finishing, even if the clock check below fires again.
const MIN_GAP_AFTER_RUN: StdDuration = StdDuration::from_secs(60 * 60);

#[derive(Debug, Clone, Copy)]
pub struct DailyPickGeneratorConfig {
    pub enabled: bool,
    pub picks_per_user: u32,
    pub generation_time_utc: NaiveTime,
    pub expiry_hours: i64,
}

impl Default for DailyPickGeneratorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            picks_per_user: 10,
            generation_time_utc: NaiveTime::from_hms_opt(3, 0, 0).unwrap(),
            expiry_hours: 24,
        }
    }
}

/// Adaptive batch size and inter-batch delay by active population (spec
/// §4.7: keeps a single generation pass from saturating the store or the
/// swipe/safety services under load).
fn batch_plan(active_user_count: usize) -> (usize, StdDuration) {
    if active_user_count < 1_000 {
        (active_user_count.max(1), StdDuration::from_millis(0))
    } else if active_user_count < 10_000 {
        (100, StdDuration::from_millis(100))
    } else if active_user_count < 100_000 {
        (200, StdDuration::from_millis(500))
    } else {
        (500, StdDuration::from_secs(1))
    }
}

/// How long to sleep until the next occurrence of `target` UTC time.
fn duration_until(target: NaiveTime) -> StdDuration {
    let now = Utc::now();
    let today_target = now.date_naive().and_time(target).and_utc();
    let next = if today_target > now {
        today_target
    } else {
        today_target + chrono::Duration::days(1)
    };
    (next - now).to_std().unwrap_or(StdDuration::from_secs(1))
}

async fn generate_for_user(deps: &StrategyDeps, live: &LiveStrategy, user_id: i64, config: &DailyPickGeneratorConfig) {
    let request = CandidateRequest {
        limit: config.picks_per_user * 2,
        min_score: 10.0,
        ..CandidateRequest::default()
    };

    let outcome = match live.get_candidates(deps, user_id, &request).await {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::warn!(user_id, error = %err, "daily picks: live scoring failed for user");
            return;
        }
    };

    let now = Utc::now();
    let expires_at = now + chrono::Duration::hours(config.expiry_hours);

    let picks: Vec<(i64, f64, i32)> = outcome
        .candidates
        .into_iter()
        .take(config.picks_per_user as usize)
        .enumerate()
        .map(|(rank, candidate)| (candidate.profile.user_id, candidate.compatibility, rank as i32 + 1))
        .collect();

    if picks.is_empty() {
        return;
    }

    if let Err(err) = deps.daily_picks.replace_for_user(user_id, &picks, now, expires_at).await {
        tracing::warn!(user_id, error = %err, "daily picks: failed to persist picks");
    }
}

async fn run_generation(deps: &StrategyDeps, config: &DailyPickGeneratorConfig) {
    let now = Utc::now();
    match deps.daily_picks.delete_expired(now).await {
        Ok(deleted) => tracing::info!(deleted, "daily picks: cleared expired rows"),
        Err(err) => tracing::warn!(error = %err, "daily picks: failed to clear expired rows"),
    }

    let user_ids = match deps.profiles.active_user_ids().await {
        Ok(ids) => ids,
        Err(err) => {
            tracing::warn!(error = %err, "daily picks: failed to enumerate active users");
            return;
        }
    };

    let (batch_size, inter_batch_delay) = batch_plan(user_ids.len());
    tracing::info!(
        total_users = user_ids.len(),
        batch_size,
        "daily picks: starting generation run"
    );

    let live = LiveStrategy::default();
    for batch in user_ids.chunks(batch_size) {
        for &user_id in batch {
            generate_for_user(deps, &live, user_id, config).await;
        }
        if !inter_batch_delay.is_zero() {
            sleep(inter_batch_delay).await;
        }
    }

    tracing::info!("daily picks: generation run complete");
}

/// Spawn the daily-pick generator loop. Wakes once at `generation_time_utc`
/// each day, runs one generation pass, then sleeps until the next
/// occurrence (never less than an hour after the previous run finished).
pub async fn run_daily_pick_generator(deps: StrategyDeps, config: DailyPickGeneratorConfig, cancel: CancellationToken) {
    if !config.enabled {
        tracing::info!("daily picks: disabled by configuration");
        return;
    }

    tokio::select! {
        _ = sleep(STARTUP_DELAY) => {}
        _ = cancel.cancelled() => return,
    }

    loop {
        let wait = duration_until(config.generation_time_utc);
        tokio::select! {
            _ = sleep(wait) => {}
            _ = cancel.cancelled() => {
                tracing::info!("daily picks: shutdown requested before next run");
                return;
            }
        }

        let started = tokio::time::Instant::now();
        run_generation(&deps, &config).await;
        let elapsed = started.elapsed();
        if elapsed < MIN_GAP_AFTER_RUN {
            tokio::select! {
                _ = sleep(MIN_GAP_AFTER_RUN - elapsed) => {}
                _ = cancel.cancelled() => return,
            }
        }
    }
}
