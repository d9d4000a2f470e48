//! TRM Rank Common Library
//!
//! ラベル類似度ランキングの中核（データモデル・戦略・エンジン・レポート表）。
//! ファイルやネットワークへの入出力はCLI側で行う。

pub mod error;
pub mod label;
pub mod similarity;
pub mod strategy;
pub mod taxonomy;
pub mod ranking;
pub mod report;
pub mod analysis;
#[cfg(feature = "excel")]
pub mod export;

pub use error::{Error, Result};
pub use label::{Label, LabelSet, TabularSource};
pub use similarity::{cosine_similarity, mean_vector};
pub use strategy::{
    EmbeddingStrategy, LanguageModelStrategy, LanguagePipeline, LexicalTaxonomyStrategy,
    Score, SentenceEncoder, SimilarityStrategy, StrategyKind, Taxonomy,
};
pub use taxonomy::{PartOfSpeech, SenseGraph, SenseId};
pub use ranking::{rank, rank_with, score_group, ComparisonReport, RankedGroup, ScoredPair};
pub use report::{CellValue, SheetTable};
pub use analysis::AnalysisResults;
