//! # Mindtrack
//!
//! Local-first mental wellness tracking: mood logging, journaling, CBT
//! exercise logs and mood analytics, persisted to a single-device key-value
//! store.
//!
//! ## Features
//!
//! - **Entry store**: Validated mood and journal entries, each collection
//!   rewritten whole on every change
//! - **Versioned format**: Checksummed envelopes, browser-era data still loads
//! - **Graceful recovery**: Unreadable collections start empty instead of failing
//! - **Analytics**: Trailing-window averages, distributions, trends and calendars
//! - **Exercises**: Thought records, distortion analysis, activity plans,
//!   scripted check-ins and therapist reviews
//!
//! ## Modules
//!
//! - [`storage`]: Entry store, substrates and the collection format
//! - [`analytics`]: Pure, read-only views over mood and journal entries
//! - [`exercises`]: CBT exercise log
//! - [`export`]: CSV and JSON backup export
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mindtrack::storage::{EntryStore, FileStore, MoodLevel, NewMood};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut store = EntryStore::open(FileStore::open("./mindtrack_data")?)?;
//!
//!     store.save_mood_entry(NewMood::from_level(MoodLevel::Okay).note("Long day"))?;
//!
//!     let analytics = store.analytics();
//!     match analytics.average() {
//!         Some(avg) => println!("30-day average: {:.1}", avg),
//!         None => println!("No entries in the last 30 days"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod config;
pub mod exercises;
pub mod export;
pub mod storage;

// Re-export top-level types for convenience
pub use storage::{
    EntryStore, FileStore, JournalEntry, KeyValueStore, LoadOutcome, LoadReport, MemoryStore,
    MoodEntry, MoodLevel, NewJournalEntry, NewMood, StoreError, StoreResult, TimeRange,
    ValidationError,
};

pub use analytics::{
    compute_analytics, mood_trend, search_journal, CalendarStats, MoodAnalytics,
    MoodDistribution, MoodTrend,
};

pub use exercises::{CheckIn, ExerciseCounts, ExerciseLog};

pub use export::{ExportError, ExportKind};

pub use config::{AnalyticsConfig, Config, ConfigError, LoggingConfig, StorageConfig};
