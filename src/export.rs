//! Data export
//!
//! CSV for spreadsheets and a pretty-printed JSON backup of both collections.
//! Tags are joined with `;` in CSV so a row never needs a nested list.

use crate::storage::{JournalEntry, MoodEntry, Snapshot};
use serde::Serialize;
use std::io::Write;
use thiserror::Error;

pub const MOOD_CSV_HEADER: [&str; 8] = [
    "id",
    "date",
    "timestamp",
    "mood",
    "label",
    "emoji",
    "note",
    "tags",
];

pub const JOURNAL_CSV_HEADER: [&str; 6] = ["id", "date", "timestamp", "mood", "tags", "content"];

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// What can be exported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Mood,
    Journal,
    Backup,
}

impl std::str::FromStr for ExportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mood" | "moods" => Ok(ExportKind::Mood),
            "journal" => Ok(ExportKind::Journal),
            "backup" | "all" => Ok(ExportKind::Backup),
            other => Err(format!(
                "unknown export {:?}; expected mood, journal or backup",
                other
            )),
        }
    }
}

fn join_tags(tags: &[String]) -> String {
    tags.join(";")
}

pub fn write_mood_csv<W: Write>(writer: W, entries: &[MoodEntry]) -> ExportResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(MOOD_CSV_HEADER)?;

    for e in entries {
        let (date, timestamp, mood) = (e.date.to_string(), e.timestamp.to_string(), e.mood.to_string());
        let tags = join_tags(&e.tags);
        csv.write_record([
            e.id.as_str(),
            date.as_str(),
            timestamp.as_str(),
            mood.as_str(),
            e.label.as_str(),
            e.emoji.as_str(),
            e.note.as_deref().unwrap_or(""),
            tags.as_str(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

pub fn write_journal_csv<W: Write>(writer: W, entries: &[JournalEntry]) -> ExportResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(JOURNAL_CSV_HEADER)?;

    for e in entries {
        let (date, timestamp) = (e.date.to_string(), e.timestamp.to_string());
        let mood = e.mood.map(|m| m.to_string()).unwrap_or_default();
        let tags = join_tags(&e.tags);
        csv.write_record([
            e.id.as_str(),
            date.as_str(),
            timestamp.as_str(),
            mood.as_str(),
            tags.as_str(),
            e.content.as_str(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Backup<'a> {
    format: &'static str,
    exported_at: i64,
    mood_entries: &'a [MoodEntry],
    journal_entries: &'a [JournalEntry],
}

/// Pretty-printed JSON of both collections
pub fn write_backup<W: Write>(writer: W, snapshot: &Snapshot, exported_at: i64) -> ExportResult<()> {
    let backup = Backup {
        format: "mindtrack-backup",
        exported_at,
        mood_entries: &snapshot.mood_entries,
        journal_entries: &snapshot.journal_entries,
    };
    serde_json::to_writer_pretty(writer, &backup)?;
    Ok(())
}

/// Export `kind` into `writer`
pub fn export<W: Write>(
    writer: W,
    kind: ExportKind,
    snapshot: &Snapshot,
    exported_at: i64,
) -> ExportResult<()> {
    match kind {
        ExportKind::Mood => write_mood_csv(writer, &snapshot.mood_entries),
        ExportKind::Journal => write_journal_csv(writer, &snapshot.journal_entries),
        ExportKind::Backup => write_backup(writer, snapshot, exported_at),
    }
}
