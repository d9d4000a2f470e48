use trm_rank_common::{ComparisonReport, StrategyKind};

/// 実行オプション
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// 入力ラベル単位で並列実行（rayon）
    pub parallel: bool,
    /// 進捗バーを表示
    pub show_progress: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            show_progress: false,
        }
    }
}

/// 1戦略分の実行結果（失敗しても他の戦略は続行）
#[derive(Debug)]
pub struct StrategyOutcome {
    pub kind: StrategyKind,
    pub result: trm_rank_common::Result<ComparisonReport>,
}

impl StrategyOutcome {
    pub fn report(&self) -> Option<&ComparisonReport> {
        self.result.as_ref().ok()
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// 成功した結果のみ取り出す（戦略の実行順）
pub fn successful_reports(outcomes: Vec<StrategyOutcome>) -> Vec<ComparisonReport> {
    outcomes.into_iter().filter_map(|o| o.result.ok()).collect()
}
