//! 設定から戦略を組み立てる

use crate::backends::{load_wordnet, CachedEncoder, EmbeddingCache, HttpEncoder, WordVectors};
use crate::config::Config;
use std::sync::{Arc, Mutex};
use trm_rank_common::{
    EmbeddingStrategy, Error, LanguageModelStrategy, LexicalTaxonomyStrategy, SimilarityStrategy,
    StrategyKind,
};

/// 戦略ビルダー
pub struct StrategyBuilder<'a> {
    config: &'a Config,
    cache: Option<Arc<Mutex<EmbeddingCache>>>,
}

impl<'a> StrategyBuilder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config, cache: None }
    }

    /// 埋め込みキャッシュを使う
    pub fn with_cache(mut self, cache: Arc<Mutex<EmbeddingCache>>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn build(&self, kind: StrategyKind) -> trm_rank_common::Result<Box<dyn SimilarityStrategy>> {
        match kind {
            StrategyKind::Embedding => {
                let encoder = HttpEncoder::from_config(self.config)?;
                let batch_size = self.config.embedding_batch_size;
                let strategy: Box<dyn SimilarityStrategy> = match &self.cache {
                    Some(cache) => Box::new(
                        EmbeddingStrategy::new(CachedEncoder::new(encoder, cache.clone()))
                            .with_batch_size(batch_size),
                    ),
                    None => Box::new(EmbeddingStrategy::new(encoder).with_batch_size(batch_size)),
                };
                Ok(strategy)
            }
            StrategyKind::LanguageModel => {
                let path = self
                    .config
                    .get_word_vectors_path()
                    .map_err(|e| Error::strategy_unavailable(kind, e))?;
                let vectors = WordVectors::load(&path)?;
                Ok(Box::new(LanguageModelStrategy::new(vectors)))
            }
            StrategyKind::LexicalTaxonomy => {
                let dir = self
                    .config
                    .get_wordnet_dir()
                    .map_err(|e| Error::strategy_unavailable(kind, e))?;
                let graph = load_wordnet(&dir)?;
                Ok(Box::new(LexicalTaxonomyStrategy::new(graph)))
            }
        }
    }
}
