//! Excel読み込みモジュール
//!
//! ブックの先頭シート（または指定シート）の全行を文字列の表として返す。
//! ヘッダー行の読み捨ては `LabelSet::load` 側で行う。

use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::{Path, PathBuf};
use trm_rank_common::{Error, LabelSet, TabularSource};

/// Excel（xlsx/xlsm/xls/ods）の表データ
#[derive(Debug, Clone)]
pub struct XlsxSource {
    path: PathBuf,
    sheet: Option<String>,
}

impl XlsxSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sheet: None,
        }
    }

    /// シート名を指定
    pub fn with_sheet(mut self, sheet: Option<String>) -> Self {
        self.sheet = sheet;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_range(&self) -> trm_rank_common::Result<Range<Data>> {
        if !self.path.exists() {
            return Err(Error::source_unreadable(self.name(), "ファイルが存在しません"));
        }

        let mut workbook =
            open_workbook_auto(&self.path).map_err(|e| Error::source_unreadable(self.name(), e))?;

        match &self.sheet {
            Some(sheet) => workbook
                .worksheet_range(sheet)
                .map_err(|e| Error::source_unreadable(self.name(), format!("シート '{}': {}", sheet, e))),
            None => workbook
                .worksheet_range_at(0)
                .ok_or_else(|| Error::source_unreadable(self.name(), "データシートがありません"))?
                .map_err(|e| Error::source_unreadable(self.name(), e)),
        }
    }
}

impl TabularSource for XlsxSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn read_rows(&self) -> trm_rank_common::Result<Vec<Vec<String>>> {
        let range = self.read_range()?;
        tracing::debug!(
            path = %self.path.display(),
            rows = range.height(),
            cols = range.width(),
            "シート読み込み"
        );
        Ok(range
            .rows()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect())
    }
}

/// セル値を文字列に変換
///
/// 空・0・false などの偽値は空文字列として扱う。
/// 整数値の浮動小数点は `1.0` の形で出す。
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(0) | Data::Bool(false) => String::new(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if *f == 0.0 => String::new(),
        Data::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 => format!("{:.1}", f),
        Data::Float(f) => f.to_string(),
        Data::Bool(true) => "True".to_string(),
        other => other.to_string(),
    }
}

/// Excelファイルからラベル集合を読み込む
pub fn load_labels(path: &Path, sheet: Option<&str>) -> trm_rank_common::Result<LabelSet> {
    let source = XlsxSource::new(path).with_sheet(sheet.map(str::to_string));
    let labels = LabelSet::load(&source)?;
    tracing::info!(path = %path.display(), count = labels.len(), "ラベル読み込み完了");
    Ok(labels)
}
