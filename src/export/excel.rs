//! Excel出力（CLI版）
//!
//! 表の組み立ては共通ライブラリ、ここではファイルへの書き出しのみ。

use super::ReportSink;
use crate::error::{Result, TrmError};
use std::path::{Path, PathBuf};
use trm_rank_common::export::generate_workbook_buffer;
use trm_rank_common::report::comparison_sheets;
use trm_rank_common::{AnalysisResults, ComparisonReport, SheetTable};

fn write_workbook(tables: &[SheetTable], path: &Path) -> Result<()> {
    let buffer = generate_workbook_buffer(tables)
        .map_err(|e| TrmError::ExcelGeneration(e.to_string()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, buffer)?;
    tracing::debug!(path = %path.display(), sheets = tables.len(), "Excel保存");
    Ok(())
}

/// 戦略ごとに1シートのExcelを書き出す
pub struct ExcelSink {
    path: PathBuf,
}

impl ExcelSink {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl ReportSink for ExcelSink {
    fn write_reports(&mut self, reports: &[ComparisonReport]) -> Result<()> {
        write_workbook(&comparison_sheets(reports), &self.path)
    }
}

/// 分析結果のExcelレポートを書き出す
pub fn write_analysis_report(results: &AnalysisResults, path: &Path) -> Result<usize> {
    let sheets = results.build_sheets();
    write_workbook(&sheets, path)?;
    Ok(sheets.len())
}
