//! 单词本层面的跨模块测试：并发收词、批次顺序、CSV 导出。

use std::sync::Arc;

use chrono::NaiveDate;

use yuedu_algo::{SentenceRef, WordEntry};
use yuedu_app::export::wordbook_to_csv;
use yuedu_app::{DefinitionSources, WordbookStore};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

fn sentence(doc_id: &str, text: &str) -> SentenceRef {
    SentenceRef {
        doc_id: doc_id.to_string(),
        text: text.to_string(),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_adds_converge_to_one_entry() {
    let store = Arc::new(WordbookStore::new());
    let sources = Arc::new(DefinitionSources::disabled());

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = Arc::clone(&store);
        let sources = Arc::clone(&sources);
        handles.push(tokio::spawn(async move {
            store
                .add_word(
                    "falcon",
                    sentence(&format!("doc-{i}"), &format!("falcon sentence {i}")),
                    &sources,
                    today(),
                )
                .await
        }));
    }

    let mut added = 0;
    for handle in handles {
        if matches!(handle.await.unwrap(), yuedu_app::AddOutcome::Added(_)) {
            added += 1;
        }
    }

    assert_eq!(added, 1);
    assert_eq!(store.len(), 1);
    let entry = store.get("falcon").unwrap();
    assert_eq!(entry.sentences.len(), 8);
    assert_eq!(entry.history, vec![1]);
}

#[tokio::test]
async fn study_batch_is_fifo_and_capped() {
    let store = WordbookStore::new();
    let sources = DefinitionSources::disabled();

    // 12 words added on successive days; batch takes the 10 oldest.
    for (i, letter) in ('a'..='l').enumerate() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap() + chrono::Days::new(i as u64);
        store
            .add_word(&format!("{letter}word"), sentence("doc-1", "x"), &sources, day)
            .await;
    }

    let batch = store.study_batch();
    assert_eq!(batch.len(), 10);
    assert_eq!(batch[0].word, "aword");
    assert_eq!(batch[9].word, "jword");
}

#[tokio::test]
async fn review_orders_by_retention_ascending() {
    let store = WordbookStore::new();
    let sources = DefinitionSources::disabled();
    let added = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    for word in ["shaky", "solid"] {
        store.add_word(word, sentence("doc-1", "x"), &sources, added).await;
    }
    // solid: lots of correct answers. shaky: mostly misses.
    for _ in 0..5 {
        store.record_review("solid", true);
    }
    store.record_review("shaky", false);
    store.record_review("shaky", false);

    let batch = store.review_batch(NaiveDate::from_ymd_opt(2025, 3, 11).unwrap());
    assert_eq!(batch[0].word, "shaky");
    assert_eq!(batch[1].word, "solid");
}

#[test]
fn csv_export_covers_every_entry() {
    let entries: Vec<WordEntry> = ["alpha", "beta"]
        .iter()
        .map(|w| {
            WordEntry::new(
                w.to_string(),
                format!("definition of {w}"),
                sentence("doc-1", "x"),
                today(),
            )
        })
        .collect();

    let csv = wordbook_to_csv(&entries);
    let lines: Vec<&str> = csv.trim_end().split("\r\n").collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("alpha,"));
    assert!(lines[2].starts_with("beta,"));
}
