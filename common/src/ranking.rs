//! ランキングエンジン
//!
//! 入力ラベル × 正規化ラベルの全組み合わせをスコアリングし、
//! 入力ラベルごとにスコア降順で並べる。
//!
//! - 並べ替えは安定ソート（同点は正規化ラベルの出現順）
//! - 比較不能（None）は常に末尾
//! - グループは入力ラベルの出現順

use crate::error::{Error, Result};
use crate::label::{Label, LabelSet};
use crate::strategy::{Score, SimilarityStrategy, StrategyKind};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

/// スコア付きの組
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPair {
    pub input: Label,
    pub candidate: Label,
    pub score: Score,
}

/// 1つの入力ラベルに対するランキング
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedGroup {
    pub input: Label,
    pub pairs: Vec<ScoredPair>,
}

impl RankedGroup {
    /// 最上位の候補（スコアが定義されている場合のみ）
    pub fn best(&self) -> Option<&ScoredPair> {
        self.pairs.first().filter(|p| p.score.is_some())
    }
}

/// 1戦略分の比較結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub strategy: StrategyKind,
    pub groups: Vec<RankedGroup>,
}

impl ComparisonReport {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// スコアの並び順（降順、Noneは末尾）
pub fn compare_scores(a: &Score, b: &Score) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// 両集合の重複なしテキスト（出現順）
pub fn distinct_texts<'a>(inputs: &'a LabelSet, reference: &'a LabelSet) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    inputs
        .iter()
        .chain(reference.iter())
        .map(|l| l.text.as_str())
        .filter(|t| seen.insert(*t))
        .collect()
}

/// 1つの入力ラベルを全正規化ラベルと比較して並べる
pub fn score_group(
    input: &Label,
    reference: &LabelSet,
    strategy: &dyn SimilarityStrategy,
) -> Result<RankedGroup> {
    let mut pairs = Vec::with_capacity(reference.len());

    for candidate in reference {
        let score = strategy
            .score(&input.text, &candidate.text)
            .map_err(|e| with_label(strategy.kind(), e, &input.text, &candidate.text))?;
        pairs.push(ScoredPair {
            input: input.clone(),
            candidate: candidate.clone(),
            score: score.filter(|s| !s.is_nan()),
        });
    }

    // sort_by は安定ソート
    pairs.sort_by(|a, b| compare_scores(&a.score, &b.score));

    Ok(RankedGroup {
        input: input.clone(),
        pairs,
    })
}

/// 全入力ラベルをランキングする（逐次実行）
pub fn rank(
    inputs: &LabelSet,
    reference: &LabelSet,
    strategy: &mut dyn SimilarityStrategy,
) -> Result<ComparisonReport> {
    rank_with(inputs, reference, strategy, |strategy| {
        inputs
            .iter()
            .map(|input| score_group(input, reference, strategy))
            .collect()
    })
}

/// 準備してからグループの計算を `score_all` に任せる
///
/// `score_all` は入力順のグループを返すこと（並列実行の差し込み口）。
pub fn rank_with<F>(
    inputs: &LabelSet,
    reference: &LabelSet,
    strategy: &mut dyn SimilarityStrategy,
    score_all: F,
) -> Result<ComparisonReport>
where
    F: FnOnce(&dyn SimilarityStrategy) -> Result<Vec<RankedGroup>>,
{
    strategy.prepare(&distinct_texts(inputs, reference))?;

    let strategy: &dyn SimilarityStrategy = strategy;
    let groups = score_all(strategy)?;

    Ok(ComparisonReport {
        strategy: strategy.kind(),
        groups,
    })
}

/// エラーにどのラベルで失敗したかを付ける
fn with_label(kind: StrategyKind, err: Error, a: &str, b: &str) -> Error {
    let reason = match err {
        Error::StrategyUnavailable { reason, .. } => reason,
        other => other.to_string(),
    };
    Error::strategy_unavailable(kind, format!("'{}' vs '{}': {}", a, b, reason))
}
