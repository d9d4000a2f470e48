use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrmError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("{0} が設定されていません。`trm-rank config {1}` で設定してください")]
    MissingSetting(&'static str, &'static str),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("全ての戦略が失敗しました")]
    AllStrategiesFailed,

    #[error(transparent)]
    Common(#[from] trm_rank_common::Error),
}

pub type Result<T> = std::result::Result<T, TrmError>;
