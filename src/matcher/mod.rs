//! 戦略の実行
//!
//! 戦略ごとに独立して実行し、1つが失敗しても残りは続行する。

pub mod builder;
pub mod types;

pub use builder::StrategyBuilder;
pub use types::{successful_reports, RunOptions, StrategyOutcome};

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use trm_rank_common::{
    rank_with, score_group, ComparisonReport, Label, LabelSet, RankedGroup, SimilarityStrategy,
    StrategyKind,
};

fn progress_bar(len: usize, kind: StrategyKind, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) =
        ProgressStyle::with_template("{prefix:>12} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.set_prefix(kind.title());
    bar
}

/// 1戦略でランキングを実行
///
/// 事前計算と集計は `trm_rank_common::rank_with` に任せ、ここでは
/// グループの計算方法（並列/逐次と進捗表示）だけを決める。
/// 並列時も結果は入力ラベルの順に並ぶ。
pub fn rank_strategy(
    strategy: &mut dyn SimilarityStrategy,
    inputs: &LabelSet,
    reference: &LabelSet,
    options: RunOptions,
) -> trm_rank_common::Result<ComparisonReport> {
    let kind = strategy.kind();
    tracing::debug!(strategy = %kind, inputs = inputs.len(), parallel = options.parallel, "ランキング開始");

    let bar = progress_bar(inputs.len(), kind, options.show_progress);
    let score = |input: &Label, strategy: &dyn SimilarityStrategy| {
        let group = score_group(input, reference, strategy);
        bar.inc(1);
        group
    };

    let report = rank_with(inputs, reference, strategy, |strategy| {
        if options.parallel {
            inputs
                .labels()
                .par_iter()
                .map(|input| score(input, strategy))
                .collect::<trm_rank_common::Result<Vec<RankedGroup>>>()
        } else {
            inputs.iter().map(|input| score(input, strategy)).collect()
        }
    });
    bar.finish_and_clear();
    report
}

/// 指定された戦略を順に構築・実行する
pub fn run_strategies<F>(
    kinds: &[StrategyKind],
    inputs: &LabelSet,
    reference: &LabelSet,
    options: RunOptions,
    mut build: F,
) -> Vec<StrategyOutcome>
where
    F: FnMut(StrategyKind) -> trm_rank_common::Result<Box<dyn SimilarityStrategy>>,
{
    kinds
        .iter()
        .map(|&kind| {
            let result = build(kind)
                .and_then(|mut strategy| rank_strategy(strategy.as_mut(), inputs, reference, options));

            match &result {
                Ok(report) => tracing::info!(strategy = %kind, groups = report.len(), "戦略完了"),
                Err(e) => tracing::warn!(strategy = %kind, error = %e, "戦略失敗"),
            }
            StrategyOutcome { kind, result }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use trm_rank_common::{Error, Score};

    /// 文字列長の差でスコアを返す戦略
    struct LengthStrategy;

    impl SimilarityStrategy for LengthStrategy {
        fn kind(&self) -> StrategyKind {
            StrategyKind::Embedding
        }

        fn score(&self, a: &str, b: &str) -> trm_rank_common::Result<Score> {
            if a.is_empty() || b.is_empty() {
                return Ok(None);
            }
            let diff = (a.len() as f64 - b.len() as f64).abs();
            Ok(Some(1.0 / (1.0 + diff)))
        }
    }

    fn sets() -> (LabelSet, LabelSet) {
        let inputs = LabelSet::from_texts(["Acrobat", "", "Photoshop CC", "Reader"]);
        let reference = LabelSet::from_texts(["Adobe Reader", "Acrobat", "Photoshop", "X"]);
        (inputs, reference)
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (inputs, reference) = sets();
        let sequential = rank_strategy(
            &mut LengthStrategy,
            &inputs,
            &reference,
            RunOptions { parallel: false, show_progress: false },
        )
        .unwrap();
        let parallel = rank_strategy(
            &mut LengthStrategy,
            &inputs,
            &reference,
            RunOptions { parallel: true, show_progress: false },
        )
        .unwrap();

        assert_eq!(sequential, parallel);
        assert_eq!(sequential, trm_rank_common::rank(&inputs, &reference, &mut LengthStrategy).unwrap());
        assert_eq!(parallel.len(), 4);
        let order: Vec<&str> = parallel.groups.iter().map(|g| g.input.text.as_str()).collect();
        assert_eq!(order, vec!["Acrobat", "", "Photoshop CC", "Reader"]);
    }

    /// prepare の呼び出し回数を数える戦略
    struct CountingStrategy {
        prepared: Vec<usize>,
    }

    impl SimilarityStrategy for CountingStrategy {
        fn kind(&self) -> StrategyKind {
            StrategyKind::LanguageModel
        }

        fn prepare(&mut self, texts: &[&str]) -> trm_rank_common::Result<()> {
            self.prepared.push(texts.len());
            Ok(())
        }

        fn score(&self, a: &str, b: &str) -> trm_rank_common::Result<Score> {
            LengthStrategy.score(a, b)
        }
    }

    #[test]
    fn test_prepare_once_with_distinct_texts() {
        let (inputs, reference) = sets();
        for parallel in [false, true] {
            let mut strategy = CountingStrategy { prepared: Vec::new() };
            let report = rank_strategy(
                &mut strategy,
                &inputs,
                &reference,
                RunOptions { parallel, show_progress: false },
            )
            .unwrap();
            // "Acrobat" は両集合に出るので7件
            assert_eq!(strategy.prepared, vec![7]);
            assert_eq!(report.strategy, StrategyKind::LanguageModel);
        }
    }

    #[test]
    fn test_empty_label_group_is_all_undefined() {
        let (inputs, reference) = sets();
        let report = rank_strategy(&mut LengthStrategy, &inputs, &reference, RunOptions::default()).unwrap();
        let empty = &report.groups[1];
        assert_eq!(empty.pairs.len(), 4);
        assert!(empty.pairs.iter().all(|p| p.score.is_none()));
        // 同点は正規化ラベル順
        let order: Vec<&str> = empty.pairs.iter().map(|p| p.candidate.text.as_str()).collect();
        assert_eq!(order, vec!["Adobe Reader", "Acrobat", "Photoshop", "X"]);
    }

    #[test]
    fn test_failing_strategy_does_not_stop_others() {
        let (inputs, reference) = sets();
        let outcomes = run_strategies(
            &StrategyKind::ALL,
            &inputs,
            &reference,
            RunOptions::default(),
            |kind| match kind {
                StrategyKind::LanguageModel => {
                    Err(Error::strategy_unavailable(kind, "モデルが読み込めません"))
                }
                _ => Ok(Box::new(LengthStrategy) as Box<dyn SimilarityStrategy>),
            },
        );

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_ok());
        assert!(!outcomes[1].is_ok());
        assert!(outcomes[2].is_ok());
        assert_eq!(successful_reports(outcomes).len(), 2);
    }

    #[test]
    fn test_empty_inputs() {
        let reference = LabelSet::from_texts(["Acrobat"]);
        let report = rank_strategy(
            &mut LengthStrategy,
            &LabelSet::default(),
            &reference,
            RunOptions::default(),
        )
        .unwrap();
        assert!(report.is_empty());
    }
}
