pub mod console;
pub mod excel;
pub mod json;

pub use console::ConsoleSink;
pub use excel::{write_analysis_report, ExcelSink};
pub use json::JsonSink;

use crate::cli::OutputFormat;
use crate::error::Result;
use std::path::{Path, PathBuf};
use trm_rank_common::ComparisonReport;

/// ランキング結果の出力先
pub trait ReportSink {
    fn write_reports(&mut self, reports: &[ComparisonReport]) -> Result<()>;
}

/// 出力ファイル名（名前がなければ時刻）
pub fn report_title(name: Option<&str>) -> String {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => format!("trm_results_{}", name),
        None => format!("trm_results_{}", chrono::Local::now().format("%Y%m%d_%H%M%S")),
    }
}

pub fn output_path_for_format(output: &Path, title: &str, extension: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", title, extension))
    } else {
        output.to_path_buf()
    }
}

fn output_paths_for_all(output: &Path, title: &str) -> (PathBuf, PathBuf) {
    if output.is_dir() || output.extension().is_none() {
        (
            output.join(format!("{}.xlsx", title)),
            output.join(format!("{}.json", title)),
        )
    } else {
        let parent = output.parent().unwrap_or_else(|| Path::new("."));
        let stem = output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(title);
        (
            parent.join(format!("{}.xlsx", stem)),
            parent.join(format!("{}.json", stem)),
        )
    }
}

/// 形式に応じてランキング結果を書き出す
pub fn export_reports(
    reports: &[ComparisonReport],
    format: &OutputFormat,
    output: &Path,
    title: &str,
    top: Option<usize>,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    match format {
        OutputFormat::Console => {
            ConsoleSink::stdout().with_top(top).write_reports(reports)?;
        }
        OutputFormat::Excel => {
            let path = output_path_for_format(output, title, "xlsx");
            println!("- Excelを生成中...");
            ExcelSink::new(&path).write_reports(reports)?;
            println!("✔ Excel出力: {}", path.display());
            written.push(path);
        }
        OutputFormat::Json => {
            let path = output_path_for_format(output, title, "json");
            JsonSink::new(&path).write_reports(reports)?;
            println!("✔ JSON出力: {}", path.display());
            written.push(path);
        }
        OutputFormat::All => {
            let (excel_path, json_path) = output_paths_for_all(output, title);

            ConsoleSink::stdout().with_top(top).write_reports(reports)?;

            println!("- Excelを生成中...");
            ExcelSink::new(&excel_path).write_reports(reports)?;
            println!("✔ Excel出力: {}", excel_path.display());

            JsonSink::new(&json_path).write_reports(reports)?;
            println!("✔ JSON出力: {}", json_path.display());

            written.push(excel_path);
            written.push(json_path);
        }
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_title() {
        assert_eq!(report_title(Some("survey")), "trm_results_survey");
        assert!(report_title(None).starts_with("trm_results_20"));
        assert!(report_title(Some("  ")).starts_with("trm_results_"));
    }

    #[test]
    fn test_output_path_for_format() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            output_path_for_format(dir.path(), "trm_results_a", "xlsx"),
            dir.path().join("trm_results_a.xlsx")
        );
        let file = dir.path().join("out.xlsx");
        assert_eq!(output_path_for_format(&file, "ignored", "xlsx"), file);
    }

    #[test]
    fn test_output_paths_for_all_uses_stem() {
        let (xlsx, json) = output_paths_for_all(Path::new("/tmp/out/ranking.xlsx"), "t");
        assert_eq!(xlsx, Path::new("/tmp/out/ranking.xlsx"));
        assert_eq!(json, Path::new("/tmp/out/ranking.json"));
    }
}
