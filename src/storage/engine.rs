//! Mindtrack Entry Store
//!
//! The entry store owns the mood and journal collections:
//! - Write path: input → validate → shape (id, date, tags) → full rewrite → mirror
//! - Read path: borrowed slices of the in-memory mirror
//!
//! The mirror is only updated after the substrate accepted the write, so a
//! failed write (quota, I/O) leaves memory and storage in agreement.

use crate::analytics::{self, MoodAnalytics, DEFAULT_WINDOW_DAYS};
use crate::storage::clock::{Clock, IdGenerator, SystemClock};
use crate::storage::collection::{load_records, store_records, LoadOutcome, Record};
use crate::storage::error::StoreResult;
use crate::storage::substrate::KeyValueStore;
use crate::storage::types::{
    local_date, normalize_tags, JournalEntry, MoodEntry, NewJournalEntry, NewMood,
};

/// Per-collection outcome of the last load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub mood: LoadOutcome,
    pub journal: LoadOutcome,
}

impl LoadReport {
    /// True if either collection had to be replaced by an empty one
    pub fn has_recovered(&self) -> bool {
        self.mood.is_recovered() || self.journal.is_recovered()
    }
}

/// Owned copy of both collections
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub mood_entries: Vec<MoodEntry>,
    pub journal_entries: Vec<JournalEntry>,
}

/// The mood and journal entry store
pub struct EntryStore<S: KeyValueStore> {
    substrate: S,
    clock: Box<dyn Clock>,
    ids: IdGenerator,
    mood_entries: Vec<MoodEntry>,
    journal_entries: Vec<JournalEntry>,
    report: LoadReport,
}

impl<S: KeyValueStore> EntryStore<S> {
    /// Open the store over `substrate` using wall-clock time
    pub fn open(substrate: S) -> StoreResult<Self> {
        Self::with_clock(substrate, Box::new(SystemClock))
    }

    /// Open the store with an explicit time source
    pub fn with_clock(substrate: S, clock: Box<dyn Clock>) -> StoreResult<Self> {
        let mut store = Self {
            substrate,
            clock,
            ids: IdGenerator::new(),
            mood_entries: Vec::new(),
            journal_entries: Vec::new(),
            report: LoadReport {
                mood: LoadOutcome::Missing,
                journal: LoadOutcome::Missing,
            },
        };
        store.load_all()?;
        Ok(store)
    }

    /// Re-read both collections from the substrate
    ///
    /// Unreadable collections come back empty and are flagged in
    /// [`EntryStore::load_report`]. A collection written by a newer format
    /// version also comes back empty, and writes to it are refused with
    /// [`StoreError::UnsupportedVersion`](crate::storage::StoreError) until a
    /// reload finds something this build can read.
    pub fn load_all(&mut self) -> StoreResult<(&[MoodEntry], &[JournalEntry])> {
        let (mood_entries, mood) = load_records::<MoodEntry, _>(&self.substrate)?;
        let (journal_entries, journal) = load_records::<JournalEntry, _>(&self.substrate)?;

        self.ids.observe(mood_entries.iter().map(|e| e.id.as_str()));
        self.ids.observe(journal_entries.iter().map(|e| e.id.as_str()));

        tracing::info!(
            mood_entries = mood_entries.len(),
            journal_entries = journal_entries.len(),
            "Loaded entry store"
        );

        self.mood_entries = mood_entries;
        self.journal_entries = journal_entries;
        self.report = LoadReport { mood, journal };
        Ok((&self.mood_entries, &self.journal_entries))
    }

    /// Validate, persist and return a new mood entry
    pub fn save_mood_entry(&mut self, input: NewMood) -> StoreResult<MoodEntry> {
        let mood = input.validate()?;
        self.report.mood.check_writable(MoodEntry::KEY)?;
        let now = self.clock.now_millis();

        let entry = MoodEntry {
            id: self.ids.next_id(now),
            date: local_date(now),
            mood,
            label: input.label,
            emoji: input.emoji,
            note: input.note.filter(|n| !n.is_empty()),
            tags: normalize_tags(&input.tags),
            timestamp: now,
        };

        let mut updated = self.mood_entries.clone();
        updated.push(entry.clone());
        store_records(&mut self.substrate, &updated)?;
        self.mood_entries = updated;

        tracing::debug!(id = %entry.id, mood = entry.mood, "Saved mood entry");
        Ok(entry)
    }

    /// Validate, persist and return a new journal entry
    ///
    /// Whitespace-only content is rejected without touching storage.
    pub fn save_journal_entry(&mut self, input: NewJournalEntry) -> StoreResult<JournalEntry> {
        let mood = input.validate()?;
        self.report.journal.check_writable(JournalEntry::KEY)?;
        let now = self.clock.now_millis();

        let entry = JournalEntry {
            id: self.ids.next_id(now),
            date: local_date(now),
            content: input.content,
            mood,
            tags: normalize_tags(&input.tags),
            timestamp: now,
        };

        let mut updated = self.journal_entries.clone();
        updated.push(entry.clone());
        store_records(&mut self.substrate, &updated)?;
        self.journal_entries = updated;

        tracing::debug!(
            id = %entry.id,
            chars = entry.content.chars().count(),
            "Saved journal entry"
        );
        Ok(entry)
    }

    /// Delete a mood entry; returns whether one was removed
    pub fn delete_mood_entry(&mut self, id: &str) -> StoreResult<bool> {
        self.report.mood.check_writable(MoodEntry::KEY)?;
        delete_by_id(&mut self.substrate, &mut self.mood_entries, id)
    }

    /// Delete a journal entry; returns whether one was removed
    pub fn delete_journal_entry(&mut self, id: &str) -> StoreResult<bool> {
        self.report.journal.check_writable(JournalEntry::KEY)?;
        delete_by_id(&mut self.substrate, &mut self.journal_entries, id)
    }

    /// All mood entries in creation order
    pub fn mood_entries(&self) -> &[MoodEntry] {
        &self.mood_entries
    }

    /// All journal entries in creation order
    pub fn journal_entries(&self) -> &[JournalEntry] {
        &self.journal_entries
    }

    pub fn get_mood_entry(&self, id: &str) -> Option<&MoodEntry> {
        self.mood_entries.iter().find(|e| e.id == id)
    }

    pub fn get_journal_entry(&self, id: &str) -> Option<&JournalEntry> {
        self.journal_entries.iter().find(|e| e.id == id)
    }

    /// Owned copy of both collections
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            mood_entries: self.mood_entries.clone(),
            journal_entries: self.journal_entries.clone(),
        }
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.report
    }

    /// Current instant according to the store's clock
    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Trailing 30-day analytics as of now
    pub fn analytics(&self) -> MoodAnalytics {
        analytics::compute_analytics_for(
            &self.mood_entries,
            self.clock.now_millis(),
            DEFAULT_WINDOW_DAYS,
        )
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            mood_entries: self.mood_entries.len(),
            journal_entries: self.journal_entries.len(),
            first_timestamp: self.timestamps().min(),
            last_timestamp: self.timestamps().max(),
        }
    }

    fn timestamps(&self) -> impl Iterator<Item = i64> + '_ {
        self.mood_entries
            .iter()
            .map(Record::timestamp)
            .chain(self.journal_entries.iter().map(Record::timestamp))
    }

    /// Borrow the underlying substrate
    pub fn substrate(&self) -> &S {
        &self.substrate
    }

    /// Give back the underlying substrate
    pub fn into_substrate(self) -> S {
        self.substrate
    }
}

fn delete_by_id<T, S>(substrate: &mut S, entries: &mut Vec<T>, id: &str) -> StoreResult<bool>
where
    T: Record,
    S: KeyValueStore,
{
    if !entries.iter().any(|e| e.id() == id) {
        tracing::debug!(key = T::KEY, id = %id, "Delete of unknown id ignored");
        return Ok(false);
    }

    let updated: Vec<T> = entries.iter().filter(|e| e.id() != id).cloned().collect();
    store_records(substrate, &updated)?;
    *entries = updated;

    tracing::debug!(key = T::KEY, id = %id, "Deleted entry");
    Ok(true)
}

/// Entry store statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    pub mood_entries: usize,
    pub journal_entries: usize,
    pub first_timestamp: Option<i64>,
    pub last_timestamp: Option<i64>,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let day = |ts: Option<i64>| {
            ts.map(|t| local_date(t).to_string())
                .unwrap_or_else(|| "-".to_string())
        };
        write!(
            f,
            "Mood entries: {}, Journal entries: {}, Range: {} .. {}",
            self.mood_entries,
            self.journal_entries,
            day(self.first_timestamp),
            day(self.last_timestamp)
        )
    }
}
