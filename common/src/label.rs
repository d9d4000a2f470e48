//! ラベル（比較対象の名称）とラベル集合
//!
//! 表データの先頭行はヘッダーとして必ず読み捨てる。
//! 1列目が比較テキスト、2列目がバージョン。

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// 比較対象のラベル（製品名＋バージョン）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// 比較テキスト（空セルは空文字列）
    pub text: String,
    /// バージョン（2列目がない行はNone）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            version: None,
        }
    }

    pub fn with_version(text: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            version: Some(version.into()),
        }
    }

    /// 表の1行からラベルを作成
    pub fn from_row(row: &[String]) -> Self {
        Self {
            text: row.first().cloned().unwrap_or_default(),
            version: row.get(1).cloned(),
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// 表形式データの読み込み元
///
/// `read_rows` はヘッダー行を含む全行を返す。空セルは `""`。
pub trait TabularSource {
    /// エラー表示用の名前（ファイルパス等）
    fn name(&self) -> String;

    fn read_rows(&self) -> Result<Vec<Vec<String>>>;
}

/// メモリ上の表（テスト・プログラムからの利用向け）
impl TabularSource for Vec<Vec<String>> {
    fn name(&self) -> String {
        "<memory>".to_string()
    }

    fn read_rows(&self) -> Result<Vec<Vec<String>>> {
        Ok(self.clone())
    }
}

/// 読み込み済みのラベル集合（行順を保持、読み込み後は不変）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSet {
    labels: Vec<Label>,
}

impl LabelSet {
    /// 表データから読み込む（先頭行はヘッダーとして除外）
    pub fn load(source: &dyn TabularSource) -> Result<Self> {
        let rows = source.read_rows()?;
        Ok(Self::from_rows(rows.iter().skip(1)))
    }

    /// ヘッダーを除いたデータ行から作成
    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a Vec<String>>,
    {
        Self {
            labels: rows.into_iter().map(|row| Label::from_row(row)).collect(),
        }
    }

    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: texts.into_iter().map(Label::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Label> {
        self.labels.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Label> {
        self.labels.iter()
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// 比較テキストの一覧
    pub fn texts(&self) -> Vec<&str> {
        self.labels.iter().map(|l| l.text.as_str()).collect()
    }
}

impl From<Vec<Label>> for LabelSet {
    fn from(labels: Vec<Label>) -> Self {
        Self { labels }
    }
}

impl<'a> IntoIterator for &'a LabelSet {
    type Item = &'a Label;
    type IntoIter = std::slice::Iter<'a, Label>;

    fn into_iter(self) -> Self::IntoIter {
        self.labels.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_load_skips_header_and_keeps_empty_label() {
        let source = table(&[&["Name", "Version"], &["Acrobat", "1.0"], &["", ""]]);
        let set = LabelSet::load(&source).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0).unwrap().text, "Acrobat");
        assert_eq!(set.get(0).unwrap().version.as_deref(), Some("1.0"));
        assert_eq!(set.get(1).unwrap().text, "");
        assert_eq!(set.get(1).unwrap().version.as_deref(), Some(""));
    }

    #[test]
    fn test_load_header_only() {
        let source = table(&[&["Name", "Version"]]);
        let set = LabelSet::load(&source).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_load_empty_table() {
        let source: Vec<Vec<String>> = Vec::new();
        assert!(LabelSet::load(&source).unwrap().is_empty());
    }

    #[test]
    fn test_no_dedupe_no_trim() {
        let source = table(&[&["Name"], &[" Acrobat "], &[" Acrobat "]]);
        let set = LabelSet::load(&source).unwrap();
        assert_eq!(set.texts(), vec![" Acrobat ", " Acrobat "]);
        assert_eq!(set.get(0).unwrap().version, None);
    }

    #[test]
    fn test_row_without_cells() {
        let source = vec![vec!["Name".to_string()], Vec::new()];
        let set = LabelSet::load(&source).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(0).unwrap(), &Label::default());
    }

    #[test]
    fn test_from_texts_order() {
        let set = LabelSet::from_texts(["b", "a", "c"]);
        assert_eq!(set.texts(), vec!["b", "a", "c"]);
    }
}
