//! Desirability calculator (spec §4.8): a batch Bayesian-smoothed baseline
//! recomputed from [`AlgorithmMetric`] rollups, plus a real-time Elo-style
//! nudge applied immediately after each swipe.

use chrono::{DateTime, Utc};

use crate::models::AlgorithmMetric;

/// Pseudocount prior for Bayesian smoothing of the like-rate.
pub const PRIOR_PSEUDOCOUNTS: f64 = 10.0;
/// Prior mean like-rate assumed before any swipes are observed.
pub const PRIOR_MEAN: f64 = 0.3;
/// Half-life (in days) for decaying the baseline score toward 50.
pub const DECAY_HALF_LIFE_DAYS: f64 = 30.0;
/// Below this many received swipes, a metric is too thin to trust; the
/// default neutral score is returned instead.
pub const MIN_SWIPES_FOR_SIGNAL: i64 = 20;
/// Neutral desirability used both below the swipe threshold and as the
/// anchor the decayed score is pulled toward.
pub const NEUTRAL_SCORE: f64 = 50.0;
/// Elo K-factor applied on each real-time adjustment.
pub const ELO_K_FACTOR: f64 = 32.0;

/// Bayesian-smoothed desirability baseline from a metric rollup.
///
/// Below [`MIN_SWIPES_FOR_SIGNAL`] received swipes the signal is too thin
/// to trust and the neutral score is returned outright. Otherwise the
/// like-rate is smoothed with a pseudocount prior, turned into a 0-100
/// base score, then decayed toward neutral the older the rollup gets:
/// `score = 50 + (baseScore - 50) * 0.5^(Δdays / 30)`.
pub fn bayesian_desirability(metric: &AlgorithmMetric, now: DateTime<Utc>) -> f64 {
    if metric.swipes_received < MIN_SWIPES_FOR_SIGNAL {
        return NEUTRAL_SCORE;
    }

    let bayesian_rate = (metric.likes_received as f64 + PRIOR_PSEUDOCOUNTS * PRIOR_MEAN)
        / (metric.swipes_received as f64 + PRIOR_PSEUDOCOUNTS);
    let base_score = bayesian_rate * 100.0;

    let age_days = (now - metric.calculated_at).num_seconds() as f64 / 86_400.0;
    let decay = 0.5f64.powf(age_days.max(0.0) / DECAY_HALF_LIFE_DAYS);

    (NEUTRAL_SCORE + (base_score - NEUTRAL_SCORE) * decay).clamp(0.0, 100.0)
}

/// Whether a freshly computed score differs enough from the stored one to
/// be worth persisting (spec: "persist only if `|new - old| > 0.1`").
pub fn is_significant_change(new_score: f64, old_score: f64) -> bool {
    (new_score - old_score).abs() > 0.1
}

/// Elo expected outcome for `swiper` being liked given `target`'s
/// desirability, on a 0-100 scale reinterpreted as an Elo-style rating.
pub fn expected_outcome(swiper_desirability: f64, target_desirability: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((swiper_desirability - target_desirability) / 400.0))
}

/// Real-time Elo-style desirability delta for the swiped-on user.
///
/// `actual` is `1.0` on a like, `0.0` on a pass. Positive delta raises the
/// target's desirability; negative lowers it. The swiper's own
/// desirability is never adjusted by this function — spec §4.8 only
/// updates the target.
pub fn elo_delta(swiper_desirability: f64, target_desirability: f64, actual: f64) -> f64 {
    let expected = expected_outcome(swiper_desirability, target_desirability);
    ELO_K_FACTOR * (actual - expected)
}

/// Apply an Elo delta to a desirability score, clamped to `[0, 100]`.
pub fn apply_elo_delta(current: f64, delta: f64) -> f64 {
    (current + delta).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(swipes: i64, likes: i64, calculated_at: DateTime<Utc>) -> AlgorithmMetric {
        AlgorithmMetric {
            id: 1,
            user_id: 1,
            swipes_received: swipes,
            likes_received: likes,
            matches_created: 0,
            suggestions_generated: 0,
            success_rate: 0.0,
            calculated_at,
        }
    }

    #[test]
    fn below_swipe_threshold_returns_neutral_regardless_of_likes() {
        let now = Utc::now();
        assert_eq!(bayesian_desirability(&metric(19, 19, now), now), NEUTRAL_SCORE);
        assert_eq!(bayesian_desirability(&metric(0, 0, now), now), NEUTRAL_SCORE);
    }

    #[test]
    fn low_like_rate_scores_between_5_and_50() {
        let now = Utc::now();
        let score = bayesian_desirability(&metric(20, 1, now), now);
        assert!(score > 5.0 && score < 50.0, "got {score}");
    }

    #[test]
    fn high_like_rate_scores_between_60_and_85() {
        let now = Utc::now();
        let score = bayesian_desirability(&metric(20, 20, now), now);
        assert!(score > 60.0 && score < 85.0, "got {score}");
    }

    #[test]
    fn old_metric_decays_toward_neutral() {
        let now = Utc::now();
        let old = now - chrono::Duration::days(30);
        let score = bayesian_desirability(&metric(100, 90, old), now);
        let fresh_score = bayesian_desirability(&metric(100, 90, now), now);
        assert!(score < fresh_score);
        assert!((score - NEUTRAL_SCORE).abs() < (fresh_score - NEUTRAL_SCORE).abs());
    }

    #[test]
    fn is_significant_change_respects_threshold() {
        assert!(!is_significant_change(50.05, 50.0));
        assert!(is_significant_change(50.2, 50.0));
    }

    #[test]
    fn expected_outcome_is_half_for_equal_desirability() {
        assert!((expected_outcome(50.0, 50.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn expected_outcome_favors_higher_rated_target() {
        assert!(expected_outcome(30.0, 70.0) < 0.5);
        assert!(expected_outcome(70.0, 30.0) > 0.5);
    }

    #[test]
    fn elo_delta_positive_on_upset_like() {
        let delta = elo_delta(30.0, 70.0, 1.0);
        assert!(delta > 0.0);
    }

    #[test]
    fn elo_delta_negative_on_expected_pass() {
        let delta = elo_delta(70.0, 30.0, 0.0);
        assert!(delta < 0.0);
    }

    #[test]
    fn apply_elo_delta_clamps_to_bounds() {
        assert_eq!(apply_elo_delta(99.0, 10.0), 100.0);
        assert_eq!(apply_elo_delta(1.0, -10.0), 0.0);
    }
}
