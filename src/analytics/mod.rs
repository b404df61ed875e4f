//! Analytics Engine
//!
//! Read-only, derived views over the entry collections:
//!
//! - **summary**: Trailing-window analytics and mood trends
//! - **calendar**: Per-day mood calendar and good-day stats
//! - **journal**: Journal search and totals
//!
//! Nothing here touches storage or the clock. Callers pass the collection and
//! the current instant, so every function is deterministic for its inputs.

pub mod calendar;
pub mod journal;
pub mod summary;

pub use calendar::{
    calendar_stats, month_view, mood_calendar, CalendarStats, DEFAULT_GOOD_MOOD_THRESHOLD,
};
pub use journal::{journal_stats, search_journal, JournalStats};
pub use summary::{
    compute_analytics, compute_analytics_for, compute_analytics_in, entries_in_window, mood_trend,
    MoodAnalytics, MoodDistribution, MoodTrend, TrendPoint, DEFAULT_TREND_DAYS,
    DEFAULT_WINDOW_DAYS,
};
