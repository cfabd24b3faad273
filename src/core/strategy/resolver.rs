//! Strategy resolver (spec §4.5): picks one of {Live, Precomputed, Auto}
//! per request, falling back to Live on any resolution error.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use crate::core::strategy::{
    daily_pick::DailyPickStrategy, live::LiveStrategy, precomputed::PrecomputedStrategy,
    CandidateOutcome, StrategyDeps, StrategyError,
};
use crate::models::{CandidateRequest, StrategyOverride};

/// Resolver-level configuration (spec §6: `strategy`,
/// `autoStrategyThresholds.liveMaxUsers`).
#[derive(Debug, Clone, Copy)]
pub struct ResolverConfig {
    pub configured_strategy: StrategyOverride,
    pub live_max_users: i64,
    /// How long the active-profile count is cached before recounting.
    pub active_count_cache: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            configured_strategy: StrategyOverride::Auto,
            live_max_users: 10_000,
            active_count_cache: Duration::from_secs(60),
        }
    }
}

/// Briefly-cached active-profile count backing `Auto` mode. A single
/// `AtomicI64` plus a monotonic "last refreshed" tick is enough: this
/// value only gates a coarse strategy choice, not anything precision
/// sensitive (spec §4.5: "the count of active profiles (cached briefly)").
struct ActiveCountCache {
    count: AtomicI64,
    last_refreshed_millis: AtomicU64,
}

impl ActiveCountCache {
    fn new() -> Self {
        Self {
            count: AtomicI64::new(0),
            last_refreshed_millis: AtomicU64::new(0),
        }
    }
}

pub struct StrategyResolver {
    live: LiveStrategy,
    precomputed: PrecomputedStrategy,
    daily_pick: DailyPickStrategy,
    config: ResolverConfig,
    active_count_cache: ActiveCountCache,
}

impl StrategyResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            live: LiveStrategy::default(),
            precomputed: PrecomputedStrategy::default(),
            daily_pick: DailyPickStrategy::default(),
            config,
            active_count_cache: ActiveCountCache::new(),
        }
    }

    /// Resolve which of {Live, Precomputed} `Auto` should use, caching the
    /// active-profile count for `active_count_cache`.
    async fn resolve_auto(&self, deps: &StrategyDeps, now_millis: u64) -> StrategyOverride {
        let last = self.active_count_cache.last_refreshed_millis.load(Ordering::Relaxed);
        let stale = now_millis.saturating_sub(last) > self.config.active_count_cache.as_millis() as u64;

        let active_users = if stale {
            match deps.profiles.count_active().await {
                Ok(count) => {
                    self.active_count_cache.count.store(count, Ordering::Relaxed);
                    self.active_count_cache
                        .last_refreshed_millis
                        .store(now_millis, Ordering::Relaxed);
                    count
                }
                Err(err) => {
                    tracing::warn!(error = %err, "active profile count lookup failed, defaulting to Live");
                    return StrategyOverride::Live;
                }
            }
        } else {
            self.active_count_cache.count.load(Ordering::Relaxed)
        };

        if active_users <= self.config.live_max_users {
            StrategyOverride::Live
        } else {
            StrategyOverride::Precomputed
        }
    }

    /// Resolve and execute, with per-request override taking precedence
    /// over configuration, and any resolution error falling back to Live
    /// (spec §4.5, §7 `StrategyResolution`).
    pub async fn get_candidates(
        &self,
        deps: &StrategyDeps,
        user_id: i64,
        request: &CandidateRequest,
        now_millis: u64,
    ) -> Result<CandidateOutcome, StrategyError> {
        let requested = request.strategy_override.unwrap_or(self.config.configured_strategy);

        let resolved = match requested {
            StrategyOverride::Auto => self.resolve_auto(deps, now_millis).await,
            other => other,
        };

        match resolved {
            StrategyOverride::Live => self.live.get_candidates(deps, user_id, request).await,
            StrategyOverride::Precomputed => {
                self.precomputed.get_candidates(deps, user_id, request).await
            }
            StrategyOverride::DailyPick => self.daily_pick.get_candidates(deps, user_id, request).await,
            StrategyOverride::Auto => unreachable!("resolve_auto never returns Auto"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_live_max_users_matches_spec() {
        assert_eq!(ResolverConfig::default().live_max_users, 10_000);
    }
}
