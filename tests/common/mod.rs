//! テスト用のファイル生成ヘルパー

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use trm_rank_common::export::generate_workbook_buffer;
use trm_rank_common::{CellValue, SheetTable};

/// ラベル表（見出し＋ラベル・バージョン）のExcelを書き出す
pub fn write_label_workbook(dir: &Path, file_name: &str, rows: &[(&str, &str)]) -> PathBuf {
    write_label_workbook_on_sheet(dir, file_name, "Sheet1", rows)
}

/// シート名を指定してラベル表を書き出す
pub fn write_label_workbook_on_sheet(
    dir: &Path,
    file_name: &str,
    sheet: &str,
    rows: &[(&str, &str)],
) -> PathBuf {
    let mut table = SheetTable::new(sheet, ["Name", "Version"]);
    for (name, version) in rows {
        table.push_row(vec![CellValue::text(*name), CellValue::text(*version)]);
    }
    let buffer = generate_workbook_buffer(&[table]).expect("Excel生成失敗");
    let path = dir.join(file_name);
    std::fs::write(&path, buffer).expect("Excel書き込み失敗");
    path
}

/// 小さなWordNet辞書（名詞のみ）
///
/// entity ─ abstraction ─ software ─┬─ program
///                                  └─ application
/// entity ─ object ─ fruit ─ apple
pub fn write_wordnet_dict(dir: &Path) {
    let license = "  1 This software and database is being provided to you, the LICENSEE, by\n";
    let data = [
        "00001740 03 n 01 entity 0 000 | that which is perceived",
        "00002137 03 n 01 abstraction 0 001 @ 00001740 n 0000 | a general concept",
        "00003000 10 n 02 software 0 package 0 001 @ 00002137 n 0000 | written programs",
        "00004000 10 n 01 program 0 001 @ 00003000 n 0000 | a sequence of instructions",
        "00005000 10 n 01 application 0 001 @ 00003000 n 0000 | a program that gives access",
        "00006000 03 n 01 object 0 001 @ 00001740 n 0000 | a tangible thing",
        "00007000 13 n 01 fruit 0 001 @ 00006000 n 0000 | ripened reproductive body",
        "00008000 13 n 01 apple 0 001 @ 00007000 n 0000 | fruit with red or yellow skin",
    ];
    let index = [
        "abstraction n 1 1 @ 1 0 00002137",
        "apple n 1 1 @ 1 0 00008000",
        "application n 1 1 @ 1 0 00005000",
        "entity n 1 0 1 0 00001740",
        "fruit n 1 1 @ 1 0 00007000",
        "object n 1 1 @ 1 0 00006000",
        "package n 1 1 @ 1 0 00003000",
        "program n 1 1 @ 1 0 00004000",
        "software n 1 1 @ 1 0 00003000",
    ];
    std::fs::write(dir.join("data.noun"), format!("{}{}\n", license, data.join("\n"))).unwrap();
    std::fs::write(dir.join("index.noun"), format!("{}{}\n", license, index.join("\n"))).unwrap();
}

/// 単語ベクトル（word2vec テキスト形式）
pub fn write_word_vectors(dir: &Path) -> PathBuf {
    let path = dir.join("vectors.txt");
    std::fs::write(
        &path,
        "5 3\n\
         adobe 1 0 0\n\
         acrobat 0.9 0.1 0\n\
         reader 0.8 0.2 0\n\
         photoshop 0.7 0 0.3\n\
         apple 0 0 1\n",
    )
    .unwrap();
    path
}
