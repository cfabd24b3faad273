use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration (spec §6 "Configuration").
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Shared secret gating the internal endpoints (activity pings,
    /// match-deletion, cascade account-delete).
    pub internal_api_key: String,
    pub server: ServerSettings,
    pub swipe_service: SwipeServiceSettings,
    pub safety_service: SafetyServiceSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    pub strategy: StrategySettings,
    pub matching: MatchingSettings,
    pub scoring: ScoringSettings,
    pub background_scoring: BackgroundScoringSettings,
    pub daily_picks: DailyPicksSettings,
    pub daily_suggestion_limits: DailySuggestionLimitSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SwipeServiceSettings {
    pub base_url: String,
    #[serde(default = "default_service_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SafetyServiceSettings {
    pub base_url: String,
    #[serde(default = "default_service_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_service_timeout_secs() -> u64 {
    3
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub redis_url: String,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

/// Strategy resolver configuration (spec §4.5).
#[derive(Debug, Clone, Deserialize)]
pub struct StrategySettings {
    #[serde(default = "default_strategy")]
    pub strategy: String,
    #[serde(default)]
    pub auto_strategy_thresholds: AutoStrategyThresholds,
    #[serde(default = "default_true")]
    pub fallback_to_live_on_error: bool,
}

fn default_strategy() -> String {
    "auto".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct AutoStrategyThresholds {
    #[serde(default = "default_live_max_users")]
    pub live_max_users: i64,
}

fn default_live_max_users() -> i64 {
    10_000
}

impl Default for AutoStrategyThresholds {
    fn default() -> Self {
        Self {
            live_max_users: default_live_max_users(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_limit")]
    pub default_limit: u32,
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
    #[serde(default)]
    pub default_min_score: f64,
    pub active_within_days: Option<u32>,
}

fn default_limit() -> u32 {
    20
}

fn default_max_limit() -> u32 {
    50
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub default_weights: WeightsConfig,
    #[serde(default = "default_minimum_compatibility")]
    pub minimum_compatibility_threshold: f64,
    #[serde(default = "default_score_cache_hours")]
    pub score_cache_hours: i64,
    #[serde(default = "default_activity_half_life_days")]
    pub activity_score_half_life_days: f64,
    #[serde(default = "default_wants_children_penalty")]
    pub wants_children_mismatch_penalty: f64,
    #[serde(default = "default_has_children_penalty")]
    pub has_children_mismatch_penalty: f64,
    #[serde(default = "default_smoking_penalty")]
    pub smoking_mismatch_penalty: f64,
    #[serde(default = "default_drinking_penalty")]
    pub drinking_mismatch_penalty: f64,
    #[serde(default = "default_religion_penalty")]
    pub religion_mismatch_penalty: f64,
}

fn default_minimum_compatibility() -> f64 {
    0.0
}
fn default_score_cache_hours() -> i64 {
    24
}
fn default_activity_half_life_days() -> f64 {
    7.0
}
fn default_wants_children_penalty() -> f64 {
    30.0
}
fn default_has_children_penalty() -> f64 {
    15.0
}
fn default_smoking_penalty() -> f64 {
    20.0
}
fn default_drinking_penalty() -> f64 {
    15.0
}
fn default_religion_penalty() -> f64 {
    10.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_location_weight")]
    pub location: f64,
    #[serde(default = "default_age_weight")]
    pub age: f64,
    #[serde(default = "default_interests_weight")]
    pub interests: f64,
    #[serde(default = "default_education_weight")]
    pub education: f64,
    #[serde(default = "default_lifestyle_weight")]
    pub lifestyle: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            location: default_location_weight(),
            age: default_age_weight(),
            interests: default_interests_weight(),
            education: default_education_weight(),
            lifestyle: default_lifestyle_weight(),
        }
    }
}

fn default_location_weight() -> f64 {
    0.30
}
fn default_age_weight() -> f64 {
    0.20
}
fn default_interests_weight() -> f64 {
    0.20
}
fn default_education_weight() -> f64 {
    0.15
}
fn default_lifestyle_weight() -> f64 {
    0.15
}

/// Background score refresher configuration (spec §4.6).
#[derive(Debug, Clone, Deserialize)]
pub struct BackgroundScoringSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_refresh_interval_minutes")]
    pub refresh_interval_minutes: u64,
    #[serde(default = "default_max_users_per_cycle")]
    pub max_users_per_cycle: u32,
    #[serde(default = "default_true")]
    pub only_refresh_active_users: bool,
    #[serde(default = "default_skip_cpu_above")]
    pub skip_refresh_when_cpu_above: f64,
    #[serde(default = "default_max_concurrent_scoring")]
    pub max_concurrent_scoring: usize,
}

fn default_refresh_interval_minutes() -> u64 {
    15
}
fn default_max_users_per_cycle() -> u32 {
    1_000
}
fn default_skip_cpu_above() -> f64 {
    90.0
}
fn default_max_concurrent_scoring() -> usize {
    5
}

/// Daily-pick generator configuration (spec §4.7).
#[derive(Debug, Clone, Deserialize)]
pub struct DailyPicksSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_picks_per_user")]
    pub picks_per_user: u32,
    #[serde(default = "default_generation_time_utc")]
    pub generation_time_utc: String,
    #[serde(default = "default_expiry_hours")]
    pub expiry_hours: i64,
}

fn default_picks_per_user() -> u32 {
    10
}
fn default_generation_time_utc() -> String {
    "03:00".to_string()
}
fn default_expiry_hours() -> i64 {
    24
}

/// Daily-suggestion limiter configuration (spec §4.9).
#[derive(Debug, Clone, Deserialize)]
pub struct DailySuggestionLimitSettings {
    #[serde(default = "default_max_daily_suggestions")]
    pub max_daily_suggestions: u32,
    #[serde(default = "default_premium_max_daily_suggestions")]
    pub premium_max_daily_suggestions: u32,
    #[serde(default = "default_refresh_interval_hours")]
    pub refresh_interval_hours: i64,
}

fn default_max_daily_suggestions() -> u32 {
    50
}
fn default_premium_max_daily_suggestions() -> u32 {
    150
}
fn default_refresh_interval_hours() -> i64 {
    24
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}

impl Settings {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Configuration file (config/local.toml), for development overrides
    /// 4. Environment variables (prefixed with LUME__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("LUME")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path, still honoring `LUME__` env
    /// overrides (used by the hot-reload watcher to re-read after a SIGHUP
    /// or file-change notification).
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("LUME")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
