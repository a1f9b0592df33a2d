use std::fs;

use yuedu_algo::Answer;
use yuedu_app::config::Config;
use yuedu_app::logging;
use yuedu_app::state::AppSession;

const USAGE: &str = "\
yuedu <command>

  docs                          列出文档
  import <title> <file>         导入一篇文本
  delete <doc-id>               删除文档（级联清理词条与高亮）
  tap <doc-id> <word> [句子]    点词：高亮翻转并收录
  wordbook                      列出单词本
  forget <word>                 遗忘一个词
  study                         跑一轮学习会话（全部按「记得」作答）
  review                        跑一轮复习会话（全部按「记得」作答）
  export-csv <path>             导出单词本 CSV";

#[tokio::main]
async fn main() {
    let config = Config::from_env();
    let _log_guard = logging::init_tracing(&config);

    let session = match AppSession::open(&config) {
        Ok(session) => session,
        Err(err) => {
            tracing::error!(error = %err, "failed to open profile");
            std::process::exit(1);
        }
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(err) = run(&session, &args).await {
        tracing::error!(error = %err, "command failed");
        std::process::exit(1);
    }
}

async fn run(session: &AppSession, args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let command = args.first().map(String::as_str).unwrap_or("");
    match command {
        "docs" => {
            for doc in session.documents() {
                println!("{}  {}  ({} words)", doc.id, doc.title, doc.words.len());
            }
        }
        "import" => {
            let (title, path) = (arg(args, 1)?, arg(args, 2)?);
            let content = fs::read_to_string(path)?;
            let doc = session.import_document(title, &content)?;
            println!("{}", doc.id);
        }
        "delete" => {
            let removed = session.delete_document(arg(args, 1)?)?;
            for word in removed {
                println!("removed: {word}");
            }
        }
        "tap" => {
            let (doc_id, word) = (arg(args, 1)?, arg(args, 2)?);
            let sentence = args.get(3).map(String::as_str).unwrap_or("");
            let outcome = session.tap_word(doc_id, word, sentence).await?;
            println!("{outcome:?}");
        }
        "wordbook" => {
            for entry in session.wordbook_entries() {
                println!(
                    "{}  [{}]  {}",
                    entry.word,
                    entry.status.as_str(),
                    entry.definition
                );
            }
        }
        "forget" => {
            let removed = session.forget_word(arg(args, 1)?)?;
            println!("{}", if removed { "forgotten" } else { "not in wordbook" });
        }
        "study" | "review" => {
            let size = if command == "study" {
                session.start_study()
            } else {
                session.start_review()
            };
            println!("batch of {size}");
            while let Some(entry) = session.current_review_word() {
                println!("  {}  {}", entry.word, entry.definition);
                session.answer_review(Answer::Remember)?;
            }
        }
        "export-csv" => {
            let path = arg(args, 1)?;
            session.export_wordbook_csv(path)?;
            println!("written: {path}");
        }
        _ => {
            eprintln!("{USAGE}");
        }
    }
    Ok(())
}

fn arg<'a>(args: &'a [String], index: usize) -> Result<&'a str, Box<dyn std::error::Error>> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| format!("missing argument {index}\n\n{USAGE}").into())
}
