//! Background workers (spec §4.6, §4.7): processes that run alongside the
//! HTTP server, each spawned as its own `tokio` task from `main`.

pub mod daily_picks;
pub mod refresher;

pub use daily_picks::{run_daily_pick_generator, DailyPickGeneratorConfig};
pub use refresher::{run_score_refresher, ScoreRefresherConfig};
