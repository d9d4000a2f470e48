//! Excel生成（共通ライブラリ）
//!
//! `SheetTable` の一覧を1ブックにまとめてバッファへ書き出す。
//! 見出し行は太字・固定、書式はそれ以外に付けない。

use crate::error::{Error, Result};
use crate::report::{CellValue, SheetTable};
use rust_xlsxwriter::*;

/// 列幅の上限（文字数）
const MAX_COLUMN_WIDTH: usize = 60;
/// 列幅の下限（文字数）
const MIN_COLUMN_WIDTH: usize = 8;

fn excel_err(context: &str, e: XlsxError) -> Error {
    Error::Excel(format!("{}: {}", context, e))
}

/// セルの表示幅（全角は2文字分）
fn display_width(s: &str) -> usize {
    s.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum()
}

/// 表の一覧からExcelをバッファに生成
///
/// 表が空の場合は空のシートを1枚だけ持つブックを返す。
pub fn generate_workbook_buffer(tables: &[SheetTable]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    if tables.is_empty() {
        workbook.add_worksheet();
    }

    for table in tables {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&table.name)
            .map_err(|e| excel_err("シート名設定エラー", e))?;

        let mut widths: Vec<usize> = table.headers.iter().map(|h| display_width(h)).collect();

        for (col, header) in table.headers.iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, header, &header_format)
                .map_err(|e| excel_err("見出し書き込みエラー", e))?;
        }

        for (r, row) in table.rows.iter().enumerate() {
            let row_idx = r as u32 + 1;
            for (col, cell) in row.iter().enumerate() {
                let col_idx = col as u16;
                match cell {
                    CellValue::Text(s) => {
                        worksheet
                            .write_string(row_idx, col_idx, s)
                            .map_err(|e| excel_err("セル書き込みエラー", e))?;
                    }
                    CellValue::Number(n) => {
                        worksheet
                            .write_number(row_idx, col_idx, *n)
                            .map_err(|e| excel_err("セル書き込みエラー", e))?;
                    }
                    CellValue::Integer(i) => {
                        worksheet
                            .write_number(row_idx, col_idx, *i as f64)
                            .map_err(|e| excel_err("セル書き込みエラー", e))?;
                    }
                    CellValue::Empty => {}
                }

                let width = display_width(&cell.display());
                if col >= widths.len() {
                    widths.resize(col + 1, 0);
                }
                widths[col] = widths[col].max(width);
            }
        }

        for (col, width) in widths.iter().enumerate() {
            let width = (*width).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH) + 2;
            worksheet
                .set_column_width(col as u16, width as f64)
                .map_err(|e| excel_err("列幅設定エラー", e))?;
        }

        if !table.headers.is_empty() {
            worksheet
                .set_freeze_panes(1, 0)
                .map_err(|e| excel_err("ウィンドウ枠固定エラー", e))?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| excel_err("Excel保存エラー", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_width() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("工種"), 4);
    }

    #[test]
    fn test_generate_workbook_buffer() {
        let mut table = SheetTable::new("Embedding", ["Input", "Score"]);
        table.push_row(vec![CellValue::text("Acrobat"), CellValue::Number(0.75)]);
        table.push_row(vec![CellValue::text("Reader"), CellValue::text("N/A")]);

        let buffer = generate_workbook_buffer(&[table]).unwrap();
        // xlsxはZIP形式
        assert!(buffer.starts_with(b"PK"));
    }

    #[test]
    fn test_generate_empty_workbook() {
        let buffer = generate_workbook_buffer(&[]).unwrap();
        assert!(!buffer.is_empty());
    }

    #[test]
    fn test_duplicate_sheet_names_fail() {
        let a = SheetTable::new("Same", ["A"]);
        let b = SheetTable::new("Same", ["A"]);
        assert!(matches!(generate_workbook_buffer(&[a, b]), Err(Error::Excel(_))));
    }
}
