use crate::error::{DetectError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const BASE_URL_ENV: &str = "DETECT_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    /// リクエストのタイムアウト（未設定なら無制限）
    pub timeout_seconds: Option<u64>,
    /// 結果の出力先（未設定ならカレント）
    pub output_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout_seconds: None,
            output_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// 上書き保存用に読み込む。読めなければ既定値から始める
    pub fn load_or_default(config_path: &Path) -> Self {
        Self::load_from(config_path).unwrap_or_else(|e| {
            tracing::warn!(path = %config_path.display(), error = %e, "config file unreadable; starting from defaults");
            Self::default()
        })
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| DetectError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("detect-batch").join("config.json"))
    }

    /// 接続先URLを決定する
    ///
    /// 優先順位: 引数 > 環境変数 > 設定ファイル
    pub fn resolve_base_url(&self, cli_override: Option<&str>) -> Result<String> {
        let env_value = std::env::var(BASE_URL_ENV).ok();
        let raw = cli_override
            .or(env_value.as_deref())
            .unwrap_or(self.base_url.as_str());
        normalize_base_url(raw)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.filter(|s| *s > 0).map(Duration::from_secs)
    }

    pub fn set_base_url(&mut self, url: &str) -> Result<()> {
        self.base_url = normalize_base_url(url)?;
        self.save()
    }
}

/// 末尾のスラッシュを除き、スキームを検証する
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(DetectError::Config("接続先URLが空です".into()));
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(DetectError::Config(format!(
            "接続先URLは http:// または https:// で始めてください: {}",
            trimmed
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_url() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_cli_override_wins() {
        let config = Config::default();
        let url = config.resolve_base_url(Some("https://detect.example.com/")).unwrap();
        assert_eq!(url, "https://detect.example.com");
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("http://localhost:8000//").unwrap(), "http://localhost:8000");
        assert!(normalize_base_url("   ").is_err());
        assert!(normalize_base_url("localhost:8000").is_err());
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"timeoutSeconds": 5}"#).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);

        let config: Config = serde_json::from_str(r#"{"timeout_seconds": 5}"#).unwrap();
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_broken_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(Config::load_from(&path).is_err());
        assert_eq!(Config::load_or_default(&path).base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_missing_config_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let config = Config {
            timeout_seconds: Some(0),
            ..Config::default()
        };
        assert!(config.timeout().is_none());
    }
}
