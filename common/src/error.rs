//! エラー型定義

use crate::strategy::StrategyKind;
use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    /// 表データ（Excel等）が読めない
    #[error("Source unreadable ({origin}): {reason}")]
    SourceUnreadable { origin: String, reason: String },

    /// モデル・リソースの初期化または呼び出しに失敗
    #[error("Strategy unavailable ({strategy}): {reason}")]
    StrategyUnavailable { strategy: StrategyKind, reason: String },

    #[error("Excel error: {0}")]
    Excel(String),
}

impl Error {
    pub fn source_unreadable(origin: impl Into<String>, reason: impl ToString) -> Self {
        Error::SourceUnreadable {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }

    pub fn strategy_unavailable(strategy: StrategyKind, reason: impl ToString) -> Self {
        Error::StrategyUnavailable {
            strategy,
            reason: reason.to_string(),
        }
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
