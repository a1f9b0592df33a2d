//! 单词本 CSV 导出
//!
//! 列：word, definition, status, difficulty, added, sentences, notes,
//! tags。含逗号、引号或换行的字段按 RFC 4180 加引号转义。

use std::fs;
use std::path::Path;

use yuedu_algo::WordEntry;

use crate::storage::StorageResult;

const CSV_HEADER: &str = "word,definition,status,difficulty,added,sentences,notes,tags";

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// 把词条列表渲染成 CSV 文本（CRLF 行尾，便于表格软件直接打开）。
pub fn wordbook_to_csv(entries: &[WordEntry]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push_str("\r\n");
    for entry in entries {
        let sentences = entry
            .sentences
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        let row = [
            csv_field(&entry.word),
            csv_field(&entry.definition),
            csv_field(entry.status.as_str()),
            entry.difficulty.to_string(),
            entry.added.format("%Y-%m-%d").to_string(),
            csv_field(&sentences),
            csv_field(&entry.notes),
            csv_field(&entry.tags.join("; ")),
        ];
        out.push_str(&row.join(","));
        out.push_str("\r\n");
    }
    out
}

pub fn export_wordbook_csv<P: AsRef<Path>>(entries: &[WordEntry], path: P) -> StorageResult<()> {
    fs::write(path, wordbook_to_csv(entries))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use yuedu_algo::{SentenceRef, WordStatus};

    fn entry() -> WordEntry {
        let mut entry = WordEntry::new(
            "cat".to_string(),
            "A small, domesticated \"mouser\"".to_string(),
            SentenceRef {
                doc_id: "doc-1".to_string(),
                text: "The cat sat.".to_string(),
            },
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        );
        entry.sentences.push(SentenceRef {
            doc_id: "doc-2".to_string(),
            text: "A cat ran.".to_string(),
        });
        entry.status = WordStatus::Reviewing;
        entry.notes = "see also: kitten".to_string();
        entry
    }

    #[test]
    fn test_csv_layout_and_escaping() {
        let csv = wordbook_to_csv(&[entry()]);
        let mut lines = csv.split("\r\n");
        assert_eq!(lines.next(), Some(CSV_HEADER));

        let row = lines.next().unwrap();
        assert!(row.starts_with("cat,"));
        // Quotes doubled, comma-bearing fields quoted.
        assert!(row.contains("\"A small, domesticated \"\"mouser\"\"\""));
        assert!(row.contains(",reviewing,3,2025-03-10,"));
        assert!(row.contains("The cat sat.; A cat ran."));
    }

    #[test]
    fn test_empty_wordbook_is_header_only() {
        let csv = wordbook_to_csv(&[]);
        assert_eq!(csv, format!("{CSV_HEADER}\r\n"));
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("my_wordbook.csv");
        export_wordbook_csv(&[entry()], &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with(CSV_HEADER));
    }
}
