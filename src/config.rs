use crate::error::{Result, TrmError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 埋め込みAPIキーの環境変数
pub const API_KEY_ENV: &str = "TRM_EMBEDDING_API_KEY";
/// WordNet辞書ディレクトリの環境変数
pub const WORDNET_ENV: &str = "WNHOME";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenAI互換の埋め込みエンドポイント（/embeddings の手前まで）
    pub embedding_endpoint: String,
    pub embedding_model: String,
    pub api_key: Option<String>,
    /// 単語ベクトルファイル（GloVe / word2vec テキスト形式）
    pub word_vectors_path: Option<PathBuf>,
    /// WordNet辞書ディレクトリ（data.noun 等を含む）
    pub wordnet_dir: Option<PathBuf>,
    pub embedding_batch_size: usize,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
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
            .ok_or_else(|| TrmError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("trm-rank").join("config.json"))
    }

    /// 埋め込みキャッシュの保存先
    pub fn cache_dir() -> Result<PathBuf> {
        let base = dirs::cache_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
            .ok_or_else(|| TrmError::Config("キャッシュディレクトリが見つかりません".into()))?;
        Ok(base.join("trm-rank"))
    }

    fn default_config() -> Self {
        Self {
            embedding_endpoint: "http://localhost:8080/v1".into(),
            embedding_model: "sentence-transformers/all-MiniLM-L6-v2".into(),
            api_key: None,
            word_vectors_path: None,
            wordnet_dir: None,
            embedding_batch_size: 32,
            timeout_seconds: 60,
        }
    }

    pub fn get_api_key(&self) -> Option<String> {
        // 環境変数を優先
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Some(key);
            }
        }
        self.api_key.clone()
    }

    pub fn get_word_vectors_path(&self) -> Result<PathBuf> {
        self.word_vectors_path
            .clone()
            .ok_or(TrmError::MissingSetting("単語ベクトルファイル", "--set-word-vectors"))
    }

    pub fn get_wordnet_dir(&self) -> Result<PathBuf> {
        if let Ok(dir) = std::env::var(WORDNET_ENV) {
            if !dir.trim().is_empty() {
                // WNHOME はルート（dict/ を含む）を指すこともある
                let root = PathBuf::from(dir);
                let dict = root.join("dict");
                return Ok(if dict.is_dir() { dict } else { root });
            }
        }
        self.wordnet_dir
            .clone()
            .ok_or(TrmError::MissingSetting("WordNet辞書ディレクトリ", "--set-wordnet-dir"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.embedding_model, "sentence-transformers/all-MiniLM-L6-v2");
        assert_eq!(config.embedding_batch_size, 32);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"timeout_seconds": 5}"#).unwrap();
        assert_eq!(config.timeout_seconds, 5);
        assert_eq!(config.embedding_endpoint, "http://localhost:8080/v1");
    }

    #[test]
    fn test_missing_word_vectors() {
        let config = Config::default();
        let err = config.get_word_vectors_path().unwrap_err();
        assert!(format!("{}", err).contains("--set-word-vectors"));
    }
}
