//! Core data types for the mindtrack entry store
//!
//! This module defines the fundamental types used throughout the storage layer:
//! - `MoodLevel`: The five fixed mood levels with label and emoji
//! - `MoodEntry` / `JournalEntry`: Persisted user records
//! - `NewMood` / `NewJournalEntry`: Caller input, validated by the store
//! - `TimeRange`: A time interval for windowed queries

use crate::storage::collection::Record;
use crate::storage::compat;
use crate::storage::error::ValidationError;
use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Substrate key of the mood collection
pub const MOOD_STORAGE_KEY: &str = "mood-tracker-data";
/// Substrate key of the journal collection
pub const JOURNAL_STORAGE_KEY: &str = "journal-entries-data";

/// One of the five fixed mood levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MoodLevel {
    Terrible = 1,
    Poor = 2,
    Okay = 3,
    Good = 4,
    Great = 5,
}

impl MoodLevel {
    /// All levels, lowest first
    pub fn all() -> &'static [MoodLevel] {
        &[
            MoodLevel::Terrible,
            MoodLevel::Poor,
            MoodLevel::Okay,
            MoodLevel::Good,
            MoodLevel::Great,
        ]
    }

    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            1 => Some(MoodLevel::Terrible),
            2 => Some(MoodLevel::Poor),
            3 => Some(MoodLevel::Okay),
            4 => Some(MoodLevel::Good),
            5 => Some(MoodLevel::Great),
            _ => None,
        }
    }

    /// Case-insensitive lookup by label
    pub fn from_label(label: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|level| level.label().eq_ignore_ascii_case(label.trim()))
    }

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            MoodLevel::Terrible => "Terrible",
            MoodLevel::Poor => "Poor",
            MoodLevel::Okay => "Okay",
            MoodLevel::Good => "Good",
            MoodLevel::Great => "Great",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            MoodLevel::Terrible => "😫",
            MoodLevel::Poor => "😔",
            MoodLevel::Okay => "😐",
            MoodLevel::Good => "🙂",
            MoodLevel::Great => "😊",
        }
    }
}

impl std::fmt::Display for MoodLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for MoodLevel {
    type Err = String;

    /// Accepts a value ("4") or a label ("good")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(value) = s.trim().parse::<i64>() {
            return Self::from_value(value)
                .ok_or_else(|| format!("mood must be between 1 and 5, got {}", value));
        }
        Self::from_label(s).ok_or_else(|| {
            format!(
                "unknown mood {:?}; expected 1-5 or one of Terrible, Poor, Okay, Good, Great",
                s
            )
        })
    }
}

/// A persisted mood log entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoodEntry {
    #[serde(deserialize_with = "compat::id")]
    pub id: String,
    /// Local calendar day of creation
    pub date: NaiveDate,
    /// Mood value, always within 1..=5
    pub mood: u8,
    pub label: String,
    pub emoji: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "compat::optional_text"
    )]
    pub note: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
}

impl MoodEntry {
    pub fn level(&self) -> Option<MoodLevel> {
        MoodLevel::from_value(self.mood as i64)
    }

    /// Local calendar day of `timestamp`
    pub fn local_date(&self) -> NaiveDate {
        local_date(self.timestamp)
    }
}

impl Record for MoodEntry {
    const KEY: &'static str = MOOD_STORAGE_KEY;
    const KIND: &'static str = "mood";

    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn is_valid(&self) -> bool {
        self.level().is_some()
    }
}

/// A persisted journal entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalEntry {
    #[serde(deserialize_with = "compat::id")]
    pub id: String,
    pub date: NaiveDate,
    pub content: String,
    /// Optional link to a mood level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<u8>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub timestamp: i64,
}

impl JournalEntry {
    pub fn mood_level(&self) -> Option<MoodLevel> {
        self.mood.and_then(|m| MoodLevel::from_value(m as i64))
    }

    pub fn local_date(&self) -> NaiveDate {
        local_date(self.timestamp)
    }
}

impl Record for JournalEntry {
    const KEY: &'static str = JOURNAL_STORAGE_KEY;
    const KIND: &'static str = "journal";

    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn is_valid(&self) -> bool {
        self.mood.map_or(true, |m| MoodLevel::from_value(m as i64).is_some())
    }
}

/// Input for a new mood entry
///
/// `label` and `emoji` are taken as given; callers are expected to have
/// picked them from [`MoodLevel`]. Only `value` is validated.
#[derive(Debug, Clone)]
pub struct NewMood {
    pub value: i64,
    pub label: String,
    pub emoji: String,
    pub note: Option<String>,
    pub tags: Vec<String>,
}

impl NewMood {
    pub fn new(value: i64, label: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
            emoji: emoji.into(),
            note: None,
            tags: Vec::new(),
        }
    }

    /// Input with the label and emoji of a fixed level
    pub fn from_level(level: MoodLevel) -> Self {
        Self::new(level.value() as i64, level.label(), level.emoji())
    }

    /// Builder method: set the note
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Builder method: add a tag
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Builder method: add multiple tags
    pub fn tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub(crate) fn validate(&self) -> Result<u8, ValidationError> {
        validate_mood(self.value)
    }
}

/// Input for a new journal entry
#[derive(Debug, Clone, Default)]
pub struct NewJournalEntry {
    pub content: String,
    pub tags: Vec<String>,
    pub mood: Option<i64>,
}

impl NewJournalEntry {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Builder method: add a tag
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Builder method: add multiple tags
    pub fn tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Builder method: link a mood value
    pub fn mood(mut self, mood: i64) -> Self {
        self.mood = Some(mood);
        self
    }

    pub(crate) fn validate(&self) -> Result<Option<u8>, ValidationError> {
        if self.content.trim().is_empty() {
            return Err(ValidationError::EmptyContent);
        }
        self.mood.map(validate_mood).transpose()
    }
}

fn validate_mood(value: i64) -> Result<u8, ValidationError> {
    MoodLevel::from_value(value)
        .map(MoodLevel::value)
        .ok_or(ValidationError::MoodOutOfRange(value))
}

/// Trim tags, drop empty ones and suppress duplicates, keeping first-seen order
pub fn normalize_tags<I, T>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// Local calendar day containing a Unix millisecond timestamp
pub fn local_date(timestamp: i64) -> NaiveDate {
    DateTime::<Utc>::from_timestamp_millis(timestamp)
        .unwrap_or_default()
        .with_timezone(&Local)
        .date_naive()
}

/// Time range for windowed queries (closed interval: [start, end])
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Start timestamp (inclusive), in milliseconds
    pub start: i64,
    /// End timestamp (inclusive), in milliseconds
    pub end: i64,
}

impl TimeRange {
    /// The trailing window of `length` ending at `now`
    pub fn trailing(now: i64, length: Duration) -> Self {
        Self {
            start: now.saturating_sub(length.num_milliseconds().max(0)),
            end: now,
        }
    }

    /// The trailing window of `days` 24-hour days ending at `now`
    ///
    /// Windows longer than `Duration` can express reach back to `i64::MIN`.
    pub fn trailing_days(now: i64, days: i64) -> Self {
        match Duration::try_days(days.max(0)) {
            Some(length) => Self::trailing(now, length),
            None => Self {
                start: i64::MIN,
                end: now,
            },
        }
    }

    /// Check if a timestamp falls within this range
    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }
}
