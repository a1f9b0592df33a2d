use std::path::PathBuf;

use crate::services::dictionary::DEFAULT_DICTIONARY_BASE_URL;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_level: String,
    /// 滚动文件日志开关（`ENABLE_FILE_LOGS`）。
    pub file_logs: bool,
    pub log_dir: PathBuf,
    pub dictionary_base_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let data_dir = std::env::var("YUEDU_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::data_dir()
                    .map(|dir| dir.join("yuedu"))
                    .unwrap_or_else(|| PathBuf::from("./data"))
            });

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let file_logs = std::env::var("ENABLE_FILE_LOGS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let log_dir = std::env::var("LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./logs"));

        let dictionary_base_url = std::env::var("YUEDU_DICTIONARY_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DICTIONARY_BASE_URL.to_string());

        Self {
            data_dir,
            log_level,
            file_logs,
            log_dir,
            dictionary_base_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var driven; the only test in this binary touching these keys.
    #[test]
    fn test_file_log_flags_from_env() {
        std::env::remove_var("ENABLE_FILE_LOGS");
        std::env::remove_var("LOG_DIR");
        let config = Config::from_env();
        assert!(!config.file_logs);
        assert_eq!(config.log_dir, PathBuf::from("./logs"));

        std::env::set_var("ENABLE_FILE_LOGS", "1");
        std::env::set_var("LOG_DIR", "/tmp/yuedu-logs");
        let config = Config::from_env();
        assert!(config.file_logs);
        assert_eq!(config.log_dir, PathBuf::from("/tmp/yuedu-logs"));

        std::env::remove_var("ENABLE_FILE_LOGS");
        std::env::remove_var("LOG_DIR");
    }
}
