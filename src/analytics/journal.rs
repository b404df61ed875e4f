//! Journal history views

use crate::storage::JournalEntry;
use serde::Serialize;

/// Entries whose content or any tag contains `term`, newest first
///
/// Matching is case-insensitive. An empty or blank term matches everything.
pub fn search_journal<'a>(entries: &'a [JournalEntry], term: &str) -> Vec<&'a JournalEntry> {
    let needle = term.trim().to_lowercase();

    let mut matches: Vec<&JournalEntry> = entries
        .iter()
        .filter(|e| {
            needle.is_empty()
                || e.content.to_lowercase().contains(&needle)
                || e.tags.iter().any(|t| t.to_lowercase().contains(&needle))
        })
        .collect();
    matches.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    matches
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalStats {
    pub entry_count: usize,
    /// Characters across all entry bodies
    pub total_characters: usize,
}

pub fn journal_stats(entries: &[JournalEntry]) -> JournalStats {
    JournalStats {
        entry_count: entries.len(),
        total_characters: entries.iter().map(|e| e.content.chars().count()).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::local_date;

    fn journal(id: &str, content: &str, tags: &[&str], timestamp: i64) -> JournalEntry {
        JournalEntry {
            id: id.to_string(),
            date: local_date(timestamp),
            content: content.to_string(),
            mood: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            timestamp,
        }
    }

    fn sample() -> Vec<JournalEntry> {
        vec![
            journal("1", "Long walk by the river", &["outside"], 1_000),
            journal("2", "Work was stressful", &["Work"], 3_000),
            journal("3", "Quiet evening", &["rest"], 2_000),
        ]
    }

    #[test]
    fn test_search_content_case_insensitive() {
        let entries = sample();
        let ids: Vec<&str> = search_journal(&entries, "RIVER")
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[test]
    fn test_search_tags() {
        let entries = sample();
        let found = search_journal(&entries, "work");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "2");
    }

    #[test]
    fn test_empty_term_returns_all_newest_first() {
        let entries = sample();
        let ids: Vec<&str> = search_journal(&entries, "  ")
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["2", "3", "1"]);
    }

    #[test]
    fn test_no_match() {
        assert!(search_journal(&sample(), "holiday").is_empty());
    }

    #[test]
    fn test_stats() {
        let entries = vec![journal("1", "héllo", &[], 1), journal("2", "abc", &[], 2)];
        assert_eq!(
            journal_stats(&entries),
            JournalStats {
                entry_count: 2,
                total_characters: 8
            }
        );
        assert_eq!(journal_stats(&[]).total_characters, 0);
    }
}
