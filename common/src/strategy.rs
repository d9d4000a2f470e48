//! 類似度戦略
//!
//! 3種類の戦略（文埋め込み・言語モデル・語彙体系）を `SimilarityStrategy`
//! で共通化する。モデル本体は構築時に注入し、以降は読み取り専用。
//!
//! スコアが `None` の場合は「比較不能」（語義なし・語彙外など）を表し、
//! ランキングでは常に末尾に並ぶ。モデル呼び出し自体の失敗は
//! `Error::StrategyUnavailable` として返す。

use crate::error::{Error, Result};
use crate::similarity::cosine_similarity;
use crate::taxonomy::SenseId;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;

/// 類似度スコア（None = 比較不能）
pub type Score = Option<f64>;

/// 埋め込みの既定バッチサイズ
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// 戦略の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// 文埋め込みのコサイン類似度
    Embedding,
    /// 言語モデルの文書ベクトル類似度
    LanguageModel,
    /// 語彙体系（WordNet）のWu-Palmer類似度
    LexicalTaxonomy,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::Embedding,
        StrategyKind::LanguageModel,
        StrategyKind::LexicalTaxonomy,
    ];

    /// レポートのシート名などに使う表示名
    pub fn title(&self) -> &'static str {
        match self {
            StrategyKind::Embedding => "Embedding",
            StrategyKind::LanguageModel => "Language Model",
            StrategyKind::LexicalTaxonomy => "Lexical Taxonomy",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::Embedding => write!(f, "embedding"),
            StrategyKind::LanguageModel => write!(f, "language"),
            StrategyKind::LexicalTaxonomy => write!(f, "taxonomy"),
        }
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "embedding" | "transformer" | "e" => Ok(StrategyKind::Embedding),
            "language" | "language-model" | "spacy" | "lm" | "l" => Ok(StrategyKind::LanguageModel),
            "taxonomy" | "wordnet" | "nltk" | "t" => Ok(StrategyKind::LexicalTaxonomy),
            _ => Err(format!(
                "Unknown strategy: {}. Use embedding, language, or taxonomy",
                s
            )),
        }
    }
}

/// 類似度戦略の共通インターフェース
pub trait SimilarityStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// 実行前に全テキストを受け取る（バッチ化・キャッシュ用）
    ///
    /// スコアの値を変えてはならない。
    fn prepare(&mut self, _texts: &[&str]) -> Result<()> {
        Ok(())
    }

    fn score(&self, a: &str, b: &str) -> Result<Score>;
}

/// 文埋め込みモデル
pub trait SentenceEncoder: Send + Sync {
    fn model_name(&self) -> &str;

    /// 入力と同じ順序・同じ件数のベクトルを返す
    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;
}

/// 汎用言語パイプライン（文書ベクトルを返す）
pub trait LanguagePipeline: Send + Sync {
    /// ベクトルを持つトークンが1つもなければ `None`
    fn doc_vector(&self, text: &str) -> Result<Option<Vec<f32>>>;
}

/// 語彙体系（語義の検索と語義間類似度）
pub trait Taxonomy: Send + Sync {
    fn synsets(&self, text: &str) -> Result<Vec<SenseId>>;

    fn wup_similarity(&self, a: SenseId, b: SenseId) -> Option<f64>;
}

/// バックエンドのエラーを戦略エラーに揃える
fn unavailable(kind: StrategyKind, err: Error) -> Error {
    match err {
        Error::StrategyUnavailable { .. } => err,
        other => Error::strategy_unavailable(kind, other),
    }
}

/// 同一文字列なら定義済みスコアを最大値に揃える
fn finish(a: &str, b: &str, score: Score) -> Score {
    match score {
        Some(s) if s.is_nan() => None,
        Some(_) if a == b => Some(1.0),
        other => other,
    }
}

/// 重複を除いたテキスト一覧（出現順）
fn unique<'a>(texts: &[&'a str], skip: impl Fn(&str) -> bool) -> Vec<&'a str> {
    let mut seen = std::collections::HashSet::new();
    texts
        .iter()
        .copied()
        .filter(|t| !skip(t) && seen.insert(*t))
        .collect()
}

// ---------------------------------------------------------------------------
// EmbeddingStrategy
// ---------------------------------------------------------------------------

/// 文埋め込みのコサイン類似度
pub struct EmbeddingStrategy<E> {
    encoder: E,
    batch_size: usize,
    cache: HashMap<String, Vec<f32>>,
}

impl<E: SentenceEncoder> EmbeddingStrategy<E> {
    pub fn new(encoder: E) -> Self {
        Self {
            encoder,
            batch_size: DEFAULT_BATCH_SIZE,
            cache: HashMap::new(),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// キャッシュ済みの件数
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    fn encode(&self, text: &str) -> Result<Cow<'_, [f32]>> {
        if let Some(v) = self.cache.get(text) {
            return Ok(Cow::Borrowed(v.as_slice()));
        }
        let mut vectors = self
            .encoder
            .encode_batch(&[text])
            .map_err(|e| unavailable(StrategyKind::Embedding, e))?;
        if vectors.len() != 1 {
            return Err(Error::strategy_unavailable(
                StrategyKind::Embedding,
                format!("expected 1 embedding, got {}", vectors.len()),
            ));
        }
        Ok(Cow::Owned(vectors.remove(0)))
    }
}

impl<E: SentenceEncoder> SimilarityStrategy for EmbeddingStrategy<E> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Embedding
    }

    fn prepare(&mut self, texts: &[&str]) -> Result<()> {
        let pending = unique(texts, |t| self.cache.contains_key(t));

        for chunk in pending.chunks(self.batch_size) {
            let vectors = self
                .encoder
                .encode_batch(chunk)
                .map_err(|e| unavailable(StrategyKind::Embedding, e))?;
            if vectors.len() != chunk.len() {
                return Err(Error::strategy_unavailable(
                    StrategyKind::Embedding,
                    format!("expected {} embeddings, got {}", chunk.len(), vectors.len()),
                ));
            }
            for (text, vector) in chunk.iter().zip(vectors) {
                self.cache.insert((*text).to_string(), vector);
            }
        }
        Ok(())
    }

    fn score(&self, a: &str, b: &str) -> Result<Score> {
        let va = self.encode(a)?;
        let vb = self.encode(b)?;
        Ok(finish(a, b, cosine_similarity(&va, &vb)))
    }
}

// ---------------------------------------------------------------------------
// LanguageModelStrategy
// ---------------------------------------------------------------------------

/// 言語パイプラインの文書ベクトル類似度
///
/// どちらかの文書にベクトルがない場合は比較不能（`None`）。
pub struct LanguageModelStrategy<P> {
    pipeline: P,
    cache: HashMap<String, Option<Vec<f32>>>,
}

impl<P: LanguagePipeline> LanguageModelStrategy<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            cache: HashMap::new(),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    fn doc_vector(&self, text: &str) -> Result<Option<Cow<'_, [f32]>>> {
        if let Some(v) = self.cache.get(text) {
            return Ok(v.as_deref().map(Cow::Borrowed));
        }
        let v = self
            .pipeline
            .doc_vector(text)
            .map_err(|e| unavailable(StrategyKind::LanguageModel, e))?;
        Ok(v.map(Cow::Owned))
    }
}

impl<P: LanguagePipeline> SimilarityStrategy for LanguageModelStrategy<P> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::LanguageModel
    }

    fn prepare(&mut self, texts: &[&str]) -> Result<()> {
        for text in unique(texts, |t| self.cache.contains_key(t)) {
            let v = self
                .pipeline
                .doc_vector(text)
                .map_err(|e| unavailable(StrategyKind::LanguageModel, e))?;
            self.cache.insert(text.to_string(), v);
        }
        Ok(())
    }

    fn score(&self, a: &str, b: &str) -> Result<Score> {
        let (Some(da), Some(db)) = (self.doc_vector(a)?, self.doc_vector(b)?) else {
            return Ok(None);
        };
        Ok(finish(a, b, cosine_similarity(&da, &db)))
    }
}

// ---------------------------------------------------------------------------
// LexicalTaxonomyStrategy
// ---------------------------------------------------------------------------

/// 語義の組み合わせ全体での最大Wu-Palmer類似度
///
/// どちらかの語義が0件なら比較不能（`None`）。
pub struct LexicalTaxonomyStrategy<T> {
    taxonomy: T,
    cache: HashMap<String, Vec<SenseId>>,
}

impl<T: Taxonomy> LexicalTaxonomyStrategy<T> {
    pub fn new(taxonomy: T) -> Self {
        Self {
            taxonomy,
            cache: HashMap::new(),
        }
    }

    pub fn taxonomy(&self) -> &T {
        &self.taxonomy
    }

    fn senses(&self, text: &str) -> Result<Cow<'_, [SenseId]>> {
        if let Some(s) = self.cache.get(text) {
            return Ok(Cow::Borrowed(s.as_slice()));
        }
        let senses = self
            .taxonomy
            .synsets(text)
            .map_err(|e| unavailable(StrategyKind::LexicalTaxonomy, e))?;
        Ok(Cow::Owned(senses))
    }
}

impl<T: Taxonomy> SimilarityStrategy for LexicalTaxonomyStrategy<T> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::LexicalTaxonomy
    }

    fn prepare(&mut self, texts: &[&str]) -> Result<()> {
        for text in unique(texts, |t| self.cache.contains_key(t)) {
            let senses = self
                .taxonomy
                .synsets(text)
                .map_err(|e| unavailable(StrategyKind::LexicalTaxonomy, e))?;
            self.cache.insert(text.to_string(), senses);
        }
        Ok(())
    }

    fn score(&self, a: &str, b: &str) -> Result<Score> {
        let sa = self.senses(a)?;
        let sb = self.senses(b)?;

        let best = sa
            .iter()
            .flat_map(|&x| sb.iter().map(move |&y| (x, y)))
            .filter_map(|(x, y)| self.taxonomy.wup_similarity(x, y))
            .filter(|s| !s.is_nan())
            .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |m| m.max(s))));

        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 文字ごとの出現数をベクトルにする簡易エンコーダ
    struct CharCountEncoder {
        calls: AtomicUsize,
    }

    impl CharCountEncoder {
        fn new() -> Self {
            Self { calls: AtomicUsize::new(0) }
        }
    }

    impl SentenceEncoder for CharCountEncoder {
        fn model_name(&self) -> &str {
            "char-count"
        }

        fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|t| {
                    let mut v = vec![0.0_f32; 27];
                    for c in t.to_lowercase().chars() {
                        if c.is_ascii_lowercase() {
                            v[(c as u8 - b'a') as usize] += 1.0;
                        } else {
                            v[26] += 1.0;
                        }
                    }
                    v
                })
                .collect())
        }
    }

    struct FailingEncoder;

    impl SentenceEncoder for FailingEncoder {
        fn model_name(&self) -> &str {
            "down"
        }

        fn encode_batch(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            Err(Error::Config("model unavailable".into()))
        }
    }

    struct ToyPipeline;

    impl LanguagePipeline for ToyPipeline {
        fn doc_vector(&self, text: &str) -> Result<Option<Vec<f32>>> {
            let known: Vec<[f32; 2]> = text
                .split_whitespace()
                .filter_map(|w| match w {
                    "adobe" => Some([1.0, 0.0]),
                    "acrobat" => Some([0.8, 0.2]),
                    "reader" => Some([0.1, 0.9]),
                    _ => None,
                })
                .collect();
            if known.is_empty() {
                return Ok(None);
            }
            let n = known.len() as f32;
            Ok(Some(vec![
                known.iter().map(|v| v[0]).sum::<f32>() / n,
                known.iter().map(|v| v[1]).sum::<f32>() / n,
            ]))
        }
    }

    struct ToyTaxonomy;

    impl Taxonomy for ToyTaxonomy {
        fn synsets(&self, text: &str) -> Result<Vec<SenseId>> {
            Ok(match text {
                "dog" => vec![SenseId(0), SenseId(1)],
                "cat" => vec![SenseId(2)],
                _ => Vec::new(),
            })
        }

        fn wup_similarity(&self, a: SenseId, b: SenseId) -> Option<f64> {
            if a == b {
                return Some(1.0);
            }
            match (a.0.min(b.0), a.0.max(b.0)) {
                (0, 2) => Some(0.85),
                (1, 2) => Some(0.3),
                _ => None,
            }
        }
    }

    #[test]
    fn test_strategy_kind_from_str() {
        assert_eq!("embedding".parse::<StrategyKind>().unwrap(), StrategyKind::Embedding);
        assert_eq!("SpaCy".parse::<StrategyKind>().unwrap(), StrategyKind::LanguageModel);
        assert_eq!("wordnet".parse::<StrategyKind>().unwrap(), StrategyKind::LexicalTaxonomy);
        assert!("bogus".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn test_embedding_self_similarity() {
        let s = EmbeddingStrategy::new(CharCountEncoder::new());
        assert_eq!(s.score("Acrobat", "Acrobat").unwrap(), Some(1.0));
    }

    #[test]
    fn test_embedding_prepare_batches_distinct_texts() {
        let mut s = EmbeddingStrategy::new(CharCountEncoder::new()).with_batch_size(2);
        s.prepare(&["a", "b", "a", "c", "b"]).unwrap();
        assert_eq!(s.cached(), 3);
        assert_eq!(s.encoder().calls.load(Ordering::SeqCst), 2);

        // 準備済みなら追加のエンコードは発生しない
        s.score("a", "c").unwrap();
        assert_eq!(s.encoder().calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_embedding_prepare_does_not_change_scores() {
        let cold = EmbeddingStrategy::new(CharCountEncoder::new());
        let mut warm = EmbeddingStrategy::new(CharCountEncoder::new());
        warm.prepare(&["Adobe Acrobat", "Acrobat Reader"]).unwrap();

        assert_eq!(
            cold.score("Adobe Acrobat", "Acrobat Reader").unwrap(),
            warm.score("Adobe Acrobat", "Acrobat Reader").unwrap()
        );
    }

    #[test]
    fn test_embedding_failure_is_strategy_unavailable() {
        let s = EmbeddingStrategy::new(FailingEncoder);
        let err = s.score("a", "b").unwrap_err();
        assert!(matches!(
            err,
            Error::StrategyUnavailable { strategy: StrategyKind::Embedding, .. }
        ));
    }

    #[test]
    fn test_language_model_undefined_without_vector() {
        let s = LanguageModelStrategy::new(ToyPipeline);
        assert_eq!(s.score("xyzzy", "adobe").unwrap(), None);
        assert_eq!(s.score("", "").unwrap(), None);
        assert_eq!(s.score("adobe acrobat", "adobe acrobat").unwrap(), Some(1.0));

        let score = s.score("adobe", "reader").unwrap().unwrap();
        assert!(score > 0.0 && score < 0.5);
    }

    #[test]
    fn test_taxonomy_max_over_senses() {
        let s = LexicalTaxonomyStrategy::new(ToyTaxonomy);
        assert_eq!(s.score("dog", "cat").unwrap(), Some(0.85));
        assert_eq!(s.score("dog", "dog").unwrap(), Some(1.0));
    }

    #[test]
    fn test_taxonomy_no_senses_is_undefined() {
        let mut s = LexicalTaxonomyStrategy::new(ToyTaxonomy);
        s.prepare(&["xyzzy123", "Acrobat"]).unwrap();
        assert_eq!(s.score("xyzzy123", "Acrobat").unwrap(), None);
        assert_eq!(s.score("", "dog").unwrap(), None);
    }
}
