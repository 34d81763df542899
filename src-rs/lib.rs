//! In-memory rate limiting and usage analytics for the SceneForge demo
//! backend.
//!
//! Everything in this crate lives for the lifetime of one server process:
//! nothing is persisted, and a restart silently resets all counters, user
//! records, and events. The request-handling, generation-orchestration, and
//! dashboard-rendering layers are external callers of this surface.

pub mod analytics;
pub mod config;
pub mod display;
pub mod rate_limit;
pub mod state;

pub use analytics::{
    AnalyticsStore, DailyGenerations, FavoriteStyle, LanguageShare, Overview, RecentUser,
    UserKind, UserStats,
};
pub use config::Config;
pub use rate_limit::SlidingWindowLimiter;
pub use state::AppState;
