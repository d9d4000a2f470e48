use clap::{Parser, Subcommand};
use std::path::PathBuf;
use trm_rank_common::StrategyKind;

#[derive(Parser)]
#[command(name = "trm-rank")]
#[command(about = "ラベル類似度ランキング・分析レポート生成ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 入力ラベルを正規化ラベルと比較してランキング
    Rank {
        /// 入力ラベルのExcelファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 正規化ラベルのExcelファイル
        #[arg(required = true)]
        normalized: PathBuf,

        /// 戦略 (embedding/language/taxonomy/all、複数指定可)
        #[arg(short, long, default_value = "all", value_delimiter = ',')]
        strategy: Vec<StrategySelection>,

        /// 出力形式 (console/excel/json/all)
        #[arg(short, long, default_value = "console")]
        format: OutputFormat,

        /// 出力ファイル/ディレクトリ（デフォルト: カレント）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// コンソールに表示する上位件数
        #[arg(long)]
        top: Option<usize>,

        /// 入力ラベルのシート名（デフォルト: --sheet、なければ先頭シート）
        #[arg(long)]
        input_sheet: Option<String>,

        /// 正規化ラベルのシート名（デフォルト: --sheet、なければ先頭シート）
        #[arg(long)]
        normalized_sheet: Option<String>,

        /// 両ファイル共通のシート名
        #[arg(long)]
        sheet: Option<String>,

        /// 埋め込みキャッシュを使用
        #[arg(long)]
        use_cache: bool,

        /// 並列実行しない
        #[arg(long)]
        sequential: bool,
    },

    /// 分析結果JSONからExcelレポートを生成
    Report {
        /// 分析結果JSONファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// レポート名（trm_results_<名前>.xlsx）
        #[arg(short, long)]
        name: Option<String>,
    },

    /// 設定を表示/編集
    Config {
        /// 埋め込みエンドポイントを設定
        #[arg(long)]
        set_embedding_endpoint: Option<String>,

        /// 埋め込みモデル名を設定
        #[arg(long)]
        set_embedding_model: Option<String>,

        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 単語ベクトルファイルを設定
        #[arg(long)]
        set_word_vectors: Option<PathBuf>,

        /// WordNet辞書ディレクトリを設定
        #[arg(long)]
        set_wordnet_dir: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// 埋め込みキャッシュ管理
    Cache {
        /// キャッシュを削除
        #[arg(long)]
        clear: bool,

        /// キャッシュ情報を表示
        #[arg(long)]
        info: bool,
    },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum OutputFormat {
    #[default]
    Console,
    Excel,
    Json,
    All,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "console" | "stdout" => Ok(OutputFormat::Console),
            "excel" | "xlsx" => Ok(OutputFormat::Excel),
            "json" => Ok(OutputFormat::Json),
            "all" => Ok(OutputFormat::All),
            _ => Err(format!("Unknown format: {}. Use console, excel, json, or all", s)),
        }
    }
}

/// 戦略の指定（all は全戦略）
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StrategySelection {
    All,
    One(StrategyKind),
}

impl std::str::FromStr for StrategySelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(StrategySelection::All);
        }
        s.parse::<StrategyKind>().map(StrategySelection::One)
    }
}

/// 指定を戦略の一覧に展開（重複は除き、固定順）
pub fn resolve_strategies(selection: &[StrategySelection]) -> Vec<StrategyKind> {
    if selection.is_empty() || selection.contains(&StrategySelection::All) {
        return StrategyKind::ALL.to_vec();
    }
    StrategyKind::ALL
        .into_iter()
        .filter(|k| selection.contains(&StrategySelection::One(*k)))
        .collect()
}

/// ファイル個別のシート指定を優先し、なければ共通指定を使う
pub fn resolve_sheet(specific: Option<String>, shared: Option<&str>) -> Option<String> {
    specific.or_else(|| shared.map(str::to_string))
}
