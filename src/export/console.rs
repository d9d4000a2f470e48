//! コンソール出力
//!
//! 入力ラベルごとに `--- Results for '<label>':` の見出しと
//! `['input', 'candidate', 0.91]` 形式（Pythonのリスト表記）の行を出す。
//! スコアは最短表記、未定義は `None`。

use super::ReportSink;
use crate::error::Result;
use std::io::Write;
use trm_rank_common::{ComparisonReport, RankedGroup, Score};

pub struct ConsoleSink<W: Write> {
    out: W,
    top: Option<usize>,
}

impl ConsoleSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, top: None }
    }

    /// 各入力ラベルの上位N件だけ出す
    pub fn with_top(mut self, top: Option<usize>) -> Self {
        self.top = top;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_group(&mut self, group: &RankedGroup) -> Result<()> {
        writeln!(self.out, "--- Results for '{}':", group.input.text)?;
        let limit = self.top.unwrap_or(usize::MAX);
        for pair in group.pairs.iter().take(limit) {
            writeln!(
                self.out,
                "[{}, {}, {}]",
                quote_text(&pair.input.text),
                quote_text(&pair.candidate.text),
                format_score(pair.score)
            )?;
        }
        Ok(())
    }
}

/// 文字列を引用符で囲む（' を含み " を含まなければ " で囲む）
pub fn quote_text(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// スコアの最短表記（整数値は 1.0 のように小数点を残す）
pub fn format_score(score: Score) -> String {
    match score {
        Some(s) if s.is_finite() && s.fract() == 0.0 => format!("{:.1}", s),
        Some(s) => format!("{}", s),
        None => "None".to_string(),
    }
}

impl<W: Write> ReportSink for ConsoleSink<W> {
    fn write_reports(&mut self, reports: &[ComparisonReport]) -> Result<()> {
        for report in reports {
            writeln!(self.out, "=== {} ===", report.strategy.title())?;
            for group in &report.groups {
                self.write_group(group)?;
            }
            writeln!(self.out)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trm_rank_common::{Label, ScoredPair, StrategyKind};

    fn report() -> ComparisonReport {
        let input = Label::new("Acrobat");
        let pairs = [("Adobe Acrobat", Some(0.91)), ("Photoshop", Some(0.2)), ("", None)]
            .into_iter()
            .map(|(c, s)| ScoredPair {
                input: input.clone(),
                candidate: Label::new(c),
                score: s,
            })
            .collect();
        ComparisonReport {
            strategy: StrategyKind::Embedding,
            groups: vec![RankedGroup { input, pairs }],
        }
    }

    #[test]
    fn test_console_output() {
        let mut sink = ConsoleSink::new(Vec::new());
        sink.write_reports(&[report()]).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();

        assert!(text.contains("=== Embedding ==="));
        assert!(text.contains("--- Results for 'Acrobat':"));
        assert!(text.contains("['Acrobat', 'Adobe Acrobat', 0.91]"));
        assert!(text.contains("['Acrobat', 'Photoshop', 0.2]"));
        assert!(text.contains("['Acrobat', '', None]"));
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(Some(0.91)), "0.91");
        assert_eq!(format_score(Some(1.0)), "1.0");
        assert_eq!(format_score(Some(0.0)), "0.0");
        assert_eq!(format_score(Some(2.0 / 3.0)), "0.6666666666666666");
        assert_eq!(format_score(None), "None");
    }

    #[test]
    fn test_quote_text() {
        assert_eq!(quote_text("Reader"), "'Reader'");
        assert_eq!(quote_text("Children's App"), "\"Children's App\"");
        assert_eq!(quote_text(r#"It's "x""#), r#"'It\'s "x"'"#);
        assert_eq!(quote_text(r"C:\Tools"), r"'C:\\Tools'");
    }

    #[test]
    fn test_console_top_n() {
        let mut sink = ConsoleSink::new(Vec::new()).with_top(Some(1));
        sink.write_reports(&[report()]).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert!(text.contains("Adobe Acrobat"));
        assert!(!text.contains("Photoshop"));
    }
}
