//! Batch Selection and Retention Scoring
//!
//! Pure selection of which wordbook entries to present next.
//!
//! - Study batches introduce never-studied words oldest-first (FIFO).
//! - Review batches rank everything not yet mastered by a retention
//!   score and surface the most urgent entries.

use chrono::NaiveDate;

use crate::types::{WordEntry, WordStatus, REVIEW_BATCH_SIZE, STUDY_BATCH_SIZE};

/// 保留度评分：`sum(history) / (history.len() + days_since_added)`。
///
/// Lower means more urgently due: the score decays as days pass without
/// reinforcement and grows as correct outcomes accumulate. An empty
/// history contributes 0 to the denominator, so a never-reinforced old
/// word scores exactly 0 and sorts first. A zero denominator (empty
/// history on the day of capture) also yields 0 rather than dividing.
pub fn retention_score(entry: &WordEntry, today: NaiveDate) -> f64 {
    let days_since_added = (today - entry.added).num_days().max(0) as f64;
    let denominator = entry.history.len() as f64 + days_since_added;
    if denominator <= 0.0 {
        return 0.0;
    }
    let reinforcement: i32 = entry.history.iter().sum();
    f64::from(reinforcement) / denominator
}

/// Selects the next study batch: `not_studied` entries, oldest `added`
/// first, capped at [`STUDY_BATCH_SIZE`].
pub fn study_batch(entries: &[WordEntry]) -> Vec<WordEntry> {
    let mut batch: Vec<WordEntry> = entries
        .iter()
        .filter(|e| e.status == WordStatus::NotStudied)
        .cloned()
        .collect();
    batch.sort_by(|a, b| a.added.cmp(&b.added));
    batch.truncate(STUDY_BATCH_SIZE);
    batch
}

/// Selects the next review batch: everything not mastered, most urgent
/// (lowest retention score) first, capped at [`REVIEW_BATCH_SIZE`].
pub fn review_batch(entries: &[WordEntry], today: NaiveDate) -> Vec<WordEntry> {
    let mut scored: Vec<(f64, WordEntry)> = entries
        .iter()
        .filter(|e| e.status != WordStatus::Mastered)
        .map(|e| (retention_score(e, today), e.clone()))
        .collect();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));
    scored
        .into_iter()
        .take(REVIEW_BATCH_SIZE)
        .map(|(_, e)| e)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SentenceRef;

    fn entry(word: &str, added: NaiveDate, history: Vec<i32>, status: WordStatus) -> WordEntry {
        let mut e = WordEntry::new(
            word.to_string(),
            String::new(),
            SentenceRef {
                doc_id: "doc-1".to_string(),
                text: String::new(),
            },
            added,
        );
        e.history = history;
        e.status = status;
        e
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_history_scores_zero() {
        let today = day(2025, 6, 11);
        let e = entry("cat", day(2025, 6, 1), vec![], WordStatus::Reviewing);
        assert_eq!(retention_score(&e, today), 0.0);
    }

    #[test]
    fn test_same_day_reinforced_entry() {
        let today = day(2025, 6, 1);
        let e = entry("dog", today, vec![1, 1, 1], WordStatus::Reviewing);
        assert_eq!(retention_score(&e, today), 1.0);
    }

    #[test]
    fn test_zero_denominator_guard() {
        // Captured today with an empty history: 0 / 0 must not divide.
        let today = day(2025, 6, 1);
        let e = entry("owl", today, vec![], WordStatus::Reviewing);
        assert_eq!(retention_score(&e, today), 0.0);
    }

    #[test]
    fn test_urgent_entry_sorts_first() {
        let today = day(2025, 6, 11);
        let stale = entry("stale", day(2025, 6, 1), vec![], WordStatus::Reviewing);
        let fresh = entry("fresh", today, vec![1, 1, 1], WordStatus::Reviewing);
        let batch = review_batch(&[fresh, stale], today);
        assert_eq!(batch[0].word, "stale");
        assert_eq!(batch[1].word, "fresh");
    }

    #[test]
    fn test_review_batch_excludes_mastered_and_caps_size() {
        let today = day(2025, 6, 11);
        let mut entries: Vec<WordEntry> = (0..15)
            .map(|i| {
                entry(
                    &format!("word{i:02}"),
                    day(2025, 6, 1),
                    vec![1],
                    WordStatus::Reviewing,
                )
            })
            .collect();
        entries.push(entry("done", day(2025, 6, 1), vec![1], WordStatus::Mastered));

        let batch = review_batch(&entries, today);
        assert_eq!(batch.len(), REVIEW_BATCH_SIZE);
        assert!(batch.iter().all(|e| e.word != "done"));
    }

    #[test]
    fn test_study_batch_fifo_order_and_filter() {
        let entries = vec![
            entry("newer", day(2025, 3, 1), vec![1], WordStatus::NotStudied),
            entry("oldest", day(2025, 1, 1), vec![1], WordStatus::NotStudied),
            entry("studied", day(2024, 1, 1), vec![1], WordStatus::Reviewing),
            entry("middle", day(2025, 2, 1), vec![1], WordStatus::NotStudied),
        ];
        let batch = study_batch(&entries);
        let words: Vec<&str> = batch.iter().map(|e| e.word.as_str()).collect();
        assert_eq!(words, vec!["oldest", "middle", "newer"]);
    }

    #[test]
    fn test_study_batch_caps_at_ten() {
        let entries: Vec<WordEntry> = (0..25)
            .map(|i| {
                entry(
                    &format!("word{i:02}"),
                    day(2025, 1, 1 + (i % 28) as u32),
                    vec![1],
                    WordStatus::NotStudied,
                )
            })
            .collect();
        assert_eq!(study_batch(&entries).len(), STUDY_BATCH_SIZE);
    }

    #[test]
    fn test_added_in_future_clamps_to_zero_days() {
        let today = day(2025, 6, 1);
        let e = entry("clock", day(2025, 6, 5), vec![1, 1], WordStatus::Reviewing);
        // Clock skew must not produce a negative denominator.
        assert_eq!(retention_score(&e, today), 1.0);
    }
}
