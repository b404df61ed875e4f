//! Per-day mood calendar

use crate::storage::MoodEntry;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// Mood threshold at or above which a day counts as good
pub const DEFAULT_GOOD_MOOD_THRESHOLD: u8 = 4;

/// Map each local day to the entry shown for it
///
/// A day with several entries shows the one appearing last in the collection.
pub fn mood_calendar(entries: &[MoodEntry]) -> BTreeMap<NaiveDate, &MoodEntry> {
    let mut calendar = BTreeMap::new();
    for entry in entries {
        calendar.insert(entry.local_date(), entry);
    }
    calendar
}

/// Days of `year`/`month` that have an entry, in date order
pub fn month_view<'a>(
    calendar: &BTreeMap<NaiveDate, &'a MoodEntry>,
    year: i32,
    month: u32,
) -> Vec<(NaiveDate, &'a MoodEntry)> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };

    calendar
        .range(first..)
        .take_while(|(date, _)| date.year() == year && date.month() == month)
        .map(|(date, entry)| (*date, *entry))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarStats {
    pub total_entries: usize,
    pub good_days: usize,
    /// Share of good entries as a rounded percentage
    pub positive_rate: u32,
}

pub fn calendar_stats(entries: &[MoodEntry], good_threshold: u8) -> CalendarStats {
    let total_entries = entries.len();
    let good_days = entries.iter().filter(|e| e.mood >= good_threshold).count();
    let positive_rate = if total_entries == 0 {
        0
    } else {
        (good_days as f64 * 100.0 / total_entries as f64).round() as u32
    };

    CalendarStats {
        total_entries,
        good_days,
        positive_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{local_date, MoodLevel};
    use chrono::{Local, TimeZone};

    fn entry_on(id: &str, level: MoodLevel, y: i32, m: u32, d: u32, hour: u32) -> MoodEntry {
        let timestamp = Local
            .with_ymd_and_hms(y, m, d, hour, 0, 0)
            .earliest()
            .unwrap()
            .timestamp_millis();
        MoodEntry {
            id: id.to_string(),
            date: local_date(timestamp),
            mood: level.value(),
            label: level.label().to_string(),
            emoji: level.emoji().to_string(),
            note: None,
            tags: Vec::new(),
            timestamp,
        }
    }

    #[test]
    fn test_last_entry_of_day_wins() {
        let entries = vec![
            entry_on("morning", MoodLevel::Poor, 2024, 3, 10, 8),
            entry_on("evening", MoodLevel::Great, 2024, 3, 10, 20),
            entry_on("next", MoodLevel::Okay, 2024, 3, 11, 12),
        ];
        let calendar = mood_calendar(&entries);

        assert_eq!(calendar.len(), 2);
        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert_eq!(calendar[&day].id, "evening");
    }

    #[test]
    fn test_month_view_filters_month() {
        let entries = vec![
            entry_on("feb", MoodLevel::Good, 2024, 2, 29, 12),
            entry_on("mar1", MoodLevel::Okay, 2024, 3, 1, 12),
            entry_on("mar31", MoodLevel::Poor, 2024, 3, 31, 12),
            entry_on("apr", MoodLevel::Great, 2024, 4, 1, 12),
        ];
        let calendar = mood_calendar(&entries);

        let march: Vec<&str> = month_view(&calendar, 2024, 3)
            .into_iter()
            .map(|(_, e)| e.id.as_str())
            .collect();
        assert_eq!(march, vec!["mar1", "mar31"]);

        assert!(month_view(&calendar, 2024, 13).is_empty());
        assert!(month_view(&calendar, 2023, 3).is_empty());
    }

    #[test]
    fn test_stats() {
        let entries = vec![
            entry_on("1", MoodLevel::Great, 2024, 3, 1, 12),
            entry_on("2", MoodLevel::Good, 2024, 3, 2, 12),
            entry_on("3", MoodLevel::Okay, 2024, 3, 3, 12),
        ];
        let stats = calendar_stats(&entries, DEFAULT_GOOD_MOOD_THRESHOLD);

        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.good_days, 2);
        assert_eq!(stats.positive_rate, 67);

        assert_eq!(calendar_stats(&entries, 5).positive_rate, 33);
    }

    #[test]
    fn test_stats_empty() {
        let stats = calendar_stats(&[], DEFAULT_GOOD_MOOD_THRESHOLD);
        assert_eq!(
            stats,
            CalendarStats {
                total_entries: 0,
                good_days: 0,
                positive_rate: 0
            }
        );
    }
}
