//! 埋め込みキャッシュモジュール
//!
//! モデル名＋テキストのSHA-256をキーにして埋め込みベクトルを保存し、
//! 同じラベルの再エンコードをスキップする。

use crate::error::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use trm_rank_common::SentenceEncoder;

const CACHE_FILE_NAME: &str = ".embedding-cache.json";

/// キャッシュファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingCache {
    /// バージョン（互換性チェック用）
    version: u32,
    /// キー → 埋め込みのマップ
    entries: HashMap<String, CacheEntry>,
}

/// キャッシュエントリ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub model: String,
    pub text: String,
    pub vector: Vec<f32>,
}

impl EmbeddingCache {
    const CURRENT_VERSION: u32 = 1;

    pub fn cache_path(folder: &Path) -> PathBuf {
        folder.join(CACHE_FILE_NAME)
    }

    /// キャッシュファイルを読み込み（破損・バージョン違いは空として扱う）
    pub fn load(folder: &Path) -> Self {
        let cache_path = Self::cache_path(folder);
        if !cache_path.exists() {
            return Self::default();
        }

        let file = match File::open(&cache_path) {
            Ok(f) => f,
            Err(_) => return Self::default(),
        };

        let reader = BufReader::new(file);
        match serde_json::from_reader::<_, EmbeddingCache>(reader) {
            Ok(cache) => {
                if cache.version != Self::CURRENT_VERSION {
                    tracing::warn!("キャッシュバージョン不一致、再生成します");
                    return Self::default();
                }
                cache
            }
            Err(e) => {
                tracing::warn!(error = %e, "キャッシュ破損、再生成します");
                Self::default()
            }
        }
    }

    /// キャッシュファイルを保存
    pub fn save(&self, folder: &Path) -> Result<()> {
        std::fs::create_dir_all(folder)?;
        let file = File::create(Self::cache_path(folder))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// キャッシュファイルを削除（存在しなければ false）
    pub fn clear(folder: &Path) -> Result<bool> {
        let cache_path = Self::cache_path(folder);
        if cache_path.exists() {
            std::fs::remove_file(cache_path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn get(&self, model: &str, text: &str) -> Option<&Vec<f32>> {
        self.entries.get(&cache_key(model, text)).map(|e| &e.vector)
    }

    pub fn insert(&mut self, model: &str, text: &str, vector: Vec<f32>) {
        self.entries.insert(
            cache_key(model, text),
            CacheEntry {
                model: model.to_string(),
                text: text.to_string(),
                vector,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            entries: HashMap::new(),
        }
    }
}

/// キャッシュキー（モデル名とテキストのSHA-256）
pub fn cache_key(model: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(model.as_bytes());
    hasher.update([0u8]);
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// キャッシュ付きエンコーダ
///
/// キャッシュにないテキストだけを内側のエンコーダに渡す。
pub struct CachedEncoder<E> {
    inner: E,
    cache: Arc<Mutex<EmbeddingCache>>,
}

impl<E: SentenceEncoder> CachedEncoder<E> {
    pub fn new(inner: E, cache: Arc<Mutex<EmbeddingCache>>) -> Self {
        Self { inner, cache }
    }
}

impl<E: SentenceEncoder> SentenceEncoder for CachedEncoder<E> {
    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn encode_batch(&self, texts: &[&str]) -> trm_rank_common::Result<Vec<Vec<f32>>> {
        let model = self.inner.model_name();
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());

        let misses: Vec<&str> = texts
            .iter()
            .copied()
            .filter(|t| cache.get(model, t).is_none())
            .collect();

        if !misses.is_empty() {
            tracing::debug!(hits = texts.len() - misses.len(), misses = misses.len(), "埋め込みキャッシュ");
            let vectors = self.inner.encode_batch(&misses)?;
            for (text, vector) in misses.iter().zip(vectors) {
                cache.insert(model, text, vector);
            }
        }

        texts
            .iter()
            .map(|t| {
                cache.get(model, t).cloned().ok_or_else(|| {
                    trm_rank_common::Error::strategy_unavailable(
                        trm_rank_common::StrategyKind::Embedding,
                        format!("埋め込みが取得できません: '{}'", t),
                    )
                })
            })
            .collect()
    }
}
