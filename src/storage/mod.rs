//! Mindtrack Storage Layer
//!
//! This module provides the entry store and the persistence it sits on:
//!
//! - **types**: Core data structures (MoodEntry, JournalEntry, MoodLevel, TimeRange)
//! - **substrate**: Key-value persistence (file-backed and in-memory)
//! - **codec**: Versioned, checksummed collection encoding
//! - **collection**: Whole-collection load/store shared by every record kind
//! - **clock**: Injectable time source and id generation
//! - **engine**: The entry store orchestrating all components
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//!   NewMood / NewJournalEntry → validate → shape → encode collection → substrate.set → mirror
//!
//! Read Path:
//!   substrate.get → decode (or recover empty) → mirror → &[Entry]
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use mindtrack::storage::{EntryStore, FileStore, MoodLevel, NewJournalEntry, NewMood};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut store = EntryStore::open(FileStore::open("./data")?)?;
//!
//!     store.save_mood_entry(NewMood::from_level(MoodLevel::Good).tag("work"))?;
//!     store.save_journal_entry(NewJournalEntry::new("Shipped the release.").mood(4))?;
//!
//!     let analytics = store.analytics();
//!     println!("{} entries, avg {:.2}", analytics.total_entries, analytics.average_mood);
//!     Ok(())
//! }
//! ```

pub mod clock;
pub mod codec;
pub mod collection;
pub(crate) mod compat;
pub mod engine;
pub mod error;
pub mod substrate;
pub mod types;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, IdGenerator, SystemClock};
pub use codec::{decode, encode, Decoded, FORMAT_NAME, FORMAT_VERSION};
pub use collection::{load_records, read_records, store_records, LoadOutcome, Record};
pub use engine::{EntryStore, LoadReport, Snapshot, StoreStats};
pub use error::{StoreError, StoreResult, ValidationError};
pub use substrate::{FileStore, KeyValueStore, MemoryStore};
pub use types::{
    local_date, normalize_tags, JournalEntry, MoodEntry, MoodLevel, NewJournalEntry, NewMood,
    TimeRange, JOURNAL_STORAGE_KEY, MOOD_STORAGE_KEY,
};
