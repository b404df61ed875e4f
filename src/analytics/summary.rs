//! Windowed mood summaries
//!
//! Every view here is a pure function of a mood collection and a window.
//! Windows are trailing and time-of-call relative: `[now - days, now]` in
//! fixed 24-hour days, not aligned to midnight.

use crate::storage::{MoodEntry, TimeRange};
use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Length of the standard analytics window
pub const DEFAULT_WINDOW_DAYS: i64 = 30;
/// Length of the weekly trend window
pub const DEFAULT_TREND_DAYS: i64 = 7;

/// Entries whose timestamp falls inside `range`, in collection order
pub fn entries_in_window(
    entries: &[MoodEntry],
    range: TimeRange,
) -> impl Iterator<Item = &MoodEntry> + '_ {
    entries.iter().filter(move |e| range.contains(e.timestamp))
}

/// Label → count, ordered by each label's first occurrence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoodDistribution {
    counts: Vec<(String, usize)>,
}

impl MoodDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more occurrence of `label`
    pub fn record(&mut self, label: &str) {
        match self.counts.iter_mut().find(|(l, _)| l == label) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((label.to_string(), 1)),
        }
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.counts
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(l, c)| (l.as_str(), *c))
    }

    /// Number of distinct labels
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for MoodDistribution {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut distribution = Self::new();
        for label in iter {
            distribution.record(label);
        }
        distribution
    }
}

impl Serialize for MoodDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (label, count) in &self.counts {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

/// Summary of the mood entries inside one window
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodAnalytics {
    pub total_entries: usize,
    /// Mean mood, or 0.0 when the window is empty. Valid moods start at 1,
    /// so 0.0 never collides with real data; prefer [`MoodAnalytics::average`].
    pub average_mood: f64,
    pub mood_distribution: MoodDistribution,
    /// The entries inside the window, in collection order
    pub daily_data: Vec<MoodEntry>,
}

impl MoodAnalytics {
    /// Mean mood, `None` when the window held no entries
    pub fn average(&self) -> Option<f64> {
        (self.total_entries > 0).then_some(self.average_mood)
    }
}

fn mean(values: impl Iterator<Item = u8>) -> Option<f64> {
    let (sum, count) = values.fold((0u64, 0u64), |(s, c), v| (s + v as u64, c + 1));
    (count > 0).then(|| sum as f64 / count as f64)
}

/// Trailing 30-day analytics as of `now` (Unix milliseconds)
pub fn compute_analytics(entries: &[MoodEntry], now: i64) -> MoodAnalytics {
    compute_analytics_for(entries, now, DEFAULT_WINDOW_DAYS)
}

/// Trailing `window_days` analytics as of `now`
pub fn compute_analytics_for(entries: &[MoodEntry], now: i64, window_days: i64) -> MoodAnalytics {
    compute_analytics_in(entries, TimeRange::trailing_days(now, window_days))
}

/// Analytics over an explicit range
pub fn compute_analytics_in(entries: &[MoodEntry], range: TimeRange) -> MoodAnalytics {
    let daily_data: Vec<MoodEntry> = entries_in_window(entries, range).cloned().collect();
    let mood_distribution = daily_data.iter().map(|e| e.label.as_str()).collect();
    let average_mood = mean(daily_data.iter().map(|e| e.mood)).unwrap_or(0.0);

    MoodAnalytics {
        total_entries: daily_data.len(),
        average_mood,
        mood_distribution,
        daily_data,
    }
}

/// One point on a trend chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub timestamp: i64,
    pub mood: u8,
    pub label: String,
}

/// Chronological mood points for a short window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodTrend {
    pub days: i64,
    pub points: Vec<TrendPoint>,
    /// Mean mood of `points`, 0.0 when empty
    pub average: f64,
}

/// Mood points of the trailing `days` ending at `now`, oldest first
pub fn mood_trend(entries: &[MoodEntry], now: i64, days: i64) -> MoodTrend {
    let mut points: Vec<TrendPoint> = entries_in_window(entries, TimeRange::trailing_days(now, days))
        .map(|e| TrendPoint {
            date: e.local_date(),
            timestamp: e.timestamp,
            mood: e.mood,
            label: e.label.clone(),
        })
        .collect();
    points.sort_by_key(|p| p.timestamp);

    let average = mean(points.iter().map(|p| p.mood)).unwrap_or(0.0);
    MoodTrend {
        days,
        points,
        average,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{local_date, MoodLevel};

    const NOW: i64 = 1_712_345_678_901;
    const DAY_MS: i64 = 24 * 3600 * 1000;

    fn entry(id: &str, level: MoodLevel, timestamp: i64) -> MoodEntry {
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
    fn test_empty_collection() {
        let analytics = compute_analytics(&[], NOW);

        assert_eq!(analytics.total_entries, 0);
        assert_eq!(analytics.average_mood, 0.0);
        assert!(analytics.mood_distribution.is_empty());
        assert!(analytics.daily_data.is_empty());
        assert_eq!(analytics.average(), None);

        let json = serde_json::to_value(&analytics).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "totalEntries": 0,
                "averageMood": 0.0,
                "moodDistribution": {},
                "dailyData": []
            })
        );
    }

    #[test]
    fn test_average_and_distribution() {
        let entries = vec![
            entry("1", MoodLevel::Poor, NOW - 3 * DAY_MS),
            entry("2", MoodLevel::Good, NOW - 2 * DAY_MS),
            entry("3", MoodLevel::Good, NOW - DAY_MS),
        ];
        let analytics = compute_analytics(&entries, NOW);

        assert_eq!(analytics.total_entries, 3);
        assert!((analytics.average_mood - 10.0 / 3.0).abs() < 1e-9);
        assert_eq!(analytics.average().map(|a| (a * 100.0).round() / 100.0), Some(3.33));
        assert_eq!(analytics.mood_distribution.get("Poor"), Some(1));
        assert_eq!(analytics.mood_distribution.get("Good"), Some(2));
        assert_eq!(analytics.mood_distribution.len(), 2);
        assert_eq!(analytics.daily_data, entries);
    }

    #[test]
    fn test_distribution_keeps_first_occurrence_order() {
        let entries = vec![
            entry("1", MoodLevel::Great, NOW - 5 * DAY_MS),
            entry("2", MoodLevel::Terrible, NOW - 4 * DAY_MS),
            entry("3", MoodLevel::Great, NOW - 3 * DAY_MS),
            entry("4", MoodLevel::Okay, NOW - 2 * DAY_MS),
        ];
        let analytics = compute_analytics(&entries, NOW);

        let order: Vec<(&str, usize)> = analytics.mood_distribution.iter().collect();
        assert_eq!(order, vec![("Great", 2), ("Terrible", 1), ("Okay", 1)]);

        let json = serde_json::to_string(&analytics.mood_distribution).unwrap();
        assert_eq!(json, r#"{"Great":2,"Terrible":1,"Okay":1}"#);
    }

    #[test]
    fn test_window_boundaries() {
        let entries = vec![
            entry("old", MoodLevel::Terrible, NOW - 31 * DAY_MS),
            entry("edge", MoodLevel::Poor, NOW - 30 * DAY_MS),
            entry("inside", MoodLevel::Great, NOW - 29 * DAY_MS),
        ];
        let analytics = compute_analytics(&entries, NOW);

        let ids: Vec<&str> = analytics.daily_data.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["edge", "inside"]);
        assert_eq!(analytics.mood_distribution.get("Terrible"), None);
    }

    #[test]
    fn test_pure_and_idempotent() {
        let entries = vec![
            entry("1", MoodLevel::Okay, NOW - DAY_MS),
            entry("2", MoodLevel::Great, NOW - 40 * DAY_MS),
        ];
        let first = compute_analytics(&entries, NOW);
        let second = compute_analytics(&entries, NOW);
        assert_eq!(first, second);
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_custom_window_length() {
        let entries = vec![
            entry("1", MoodLevel::Great, NOW - 8 * DAY_MS),
            entry("2", MoodLevel::Poor, NOW - 6 * DAY_MS),
        ];
        assert_eq!(compute_analytics_for(&entries, NOW, 7).total_entries, 1);
        assert_eq!(compute_analytics_for(&entries, NOW, 30).total_entries, 2);
    }

    #[test]
    fn test_huge_window_covers_everything() {
        let entries = vec![
            entry("ancient", MoodLevel::Poor, 0),
            entry("recent", MoodLevel::Great, NOW - DAY_MS),
        ];

        let analytics = compute_analytics_for(&entries, NOW, 200_000_000_000);
        assert_eq!(analytics.total_entries, 2);
        assert_eq!(analytics.average_mood, 3.5);

        let trend = mood_trend(&entries, NOW, i64::MAX);
        assert_eq!(trend.points.len(), 2);
        assert_eq!(trend.days, i64::MAX);
    }

    #[test]
    fn test_trend_sorted_oldest_first() {
        let entries = vec![
            entry("b", MoodLevel::Good, NOW - DAY_MS),
            entry("old", MoodLevel::Terrible, NOW - 10 * DAY_MS),
            entry("a", MoodLevel::Poor, NOW - 3 * DAY_MS),
        ];
        let trend = mood_trend(&entries, NOW, DEFAULT_TREND_DAYS);

        assert_eq!(trend.days, 7);
        let moods: Vec<u8> = trend.points.iter().map(|p| p.mood).collect();
        assert_eq!(moods, vec![2, 4]);
        assert_eq!(trend.average, 3.0);
        assert_eq!(trend.points[0].date, local_date(NOW - 3 * DAY_MS));
    }

    #[test]
    fn test_empty_trend() {
        let trend = mood_trend(&[], NOW, 7);
        assert!(trend.points.is_empty());
        assert_eq!(trend.average, 0.0);
    }
}
