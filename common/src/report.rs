//! レポート表モデル
//!
//! 出力先（Excel・コンソール等）に依存しない表形式。
//! ランキング結果と分析レポートの両方をこの形に変換してから書き出す。

use crate::ranking::ComparisonReport;
use serde::{Deserialize, Serialize};

/// Excelのシート名の最大長
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// セル値
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// 比較不能スコアは "N/A"
    pub fn score(score: Option<f64>) -> Self {
        match score {
            Some(s) => CellValue::Number(s),
            None => CellValue::text("N/A"),
        }
    }

    pub fn display(&self) -> String {
        match self {
            CellValue::Integer(i) => i.to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Empty => String::new(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// 1シート分の表
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SheetTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetTable {
    pub fn new<I, S>(name: &str, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: sanitize_sheet_name(name),
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Excelのシート名規則に合わせる（禁止文字除去・31文字以内）
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_matches('\'');

    let truncated: String = cleaned.chars().take(MAX_SHEET_NAME_LEN).collect();
    if truncated.trim().is_empty() {
        "Sheet".to_string()
    } else {
        truncated
    }
}

/// ランキング結果の列見出し
pub const COMPARISON_HEADERS: [&str; 6] = [
    "Input",
    "Input Version",
    "Rank",
    "Candidate",
    "Candidate Version",
    "Score",
];

/// ランキング結果を戦略ごとの表に変換
pub fn comparison_sheets(reports: &[ComparisonReport]) -> Vec<SheetTable> {
    reports.iter().map(comparison_sheet).collect()
}

pub fn comparison_sheet(report: &ComparisonReport) -> SheetTable {
    let mut table = SheetTable::new(report.strategy.title(), COMPARISON_HEADERS);

    for group in &report.groups {
        for (rank, pair) in group.pairs.iter().enumerate() {
            table.push_row(vec![
                CellValue::text(&group.input.text),
                CellValue::text(group.input.version.clone().unwrap_or_default()),
                CellValue::Integer(rank as i64 + 1),
                CellValue::text(&pair.candidate.text),
                CellValue::text(pair.candidate.version.clone().unwrap_or_default()),
                CellValue::score(pair.score),
            ]);
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::Label;
    use crate::ranking::{RankedGroup, ScoredPair};
    use crate::strategy::StrategyKind;

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("Analyses_LDA-3Class"), "Analyses_LDA-3Class");
        assert_eq!(sanitize_sheet_name("a/b:c"), "a_b_c");
        assert_eq!(
            sanitize_sheet_name("BERTopic Non-Overlapping Topics").chars().count(),
            31
        );
        assert_eq!(sanitize_sheet_name(""), "Sheet");
    }

    #[test]
    fn test_comparison_sheet_rows() {
        let input = Label::with_version("Acrobat", "1.0");
        let report = ComparisonReport {
            strategy: StrategyKind::LexicalTaxonomy,
            groups: vec![RankedGroup {
                input: input.clone(),
                pairs: vec![
                    ScoredPair {
                        input: input.clone(),
                        candidate: Label::new("Reader"),
                        score: Some(0.5),
                    },
                    ScoredPair {
                        input,
                        candidate: Label::new("xyzzy"),
                        score: None,
                    },
                ],
            }],
        };

        let sheet = comparison_sheet(&report);
        assert_eq!(sheet.name, "Lexical Taxonomy");
        assert_eq!(sheet.headers.len(), 6);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0][1], CellValue::text("1.0"));
        assert_eq!(sheet.rows[0][2], CellValue::Integer(1));
        assert_eq!(sheet.rows[0][5], CellValue::Number(0.5));
        assert_eq!(sheet.rows[1][5], CellValue::text("N/A"));
    }
}
