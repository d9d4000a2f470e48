//! 単語ベクトルによる文書ベクトル
//!
//! GloVe / word2vec のテキスト形式を読み込み、
//! トークンのベクトルの平均を文書ベクトルとする。

use regex::Regex;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use trm_rank_common::{mean_vector, Error, LanguagePipeline, StrategyKind};

lazy_static::lazy_static! {
    // 単語（内部の . ' ’ - は連結）または記号1文字
    static ref TOKEN_RE: Regex = Regex::new(r"\w+(?:[.'’\-]\w+)*|[^\w\s]").unwrap();
}

fn unavailable(reason: impl ToString) -> Error {
    Error::strategy_unavailable(StrategyKind::LanguageModel, reason)
}

/// 単語ベクトル表
#[derive(Debug, Clone, Default)]
pub struct WordVectors {
    vectors: HashMap<String, Vec<f32>>,
    dim: usize,
}

impl WordVectors {
    /// ファイルから読み込み
    pub fn load(path: &Path) -> trm_rank_common::Result<Self> {
        let file = File::open(path)
            .map_err(|e| unavailable(format!("{}: {}", path.display(), e)))?;
        let vectors = Self::from_reader(BufReader::new(file))
            .map_err(|e| match e {
                Error::StrategyUnavailable { reason, .. } => {
                    unavailable(format!("{}: {}", path.display(), reason))
                }
                other => other,
            })?;
        tracing::info!(path = %path.display(), words = vectors.len(), dim = vectors.dim, "単語ベクトル読み込み完了");
        Ok(vectors)
    }

    /// テキスト形式を読み込み（先頭の "語数 次元" 行は省略可）
    pub fn from_reader<R: BufRead>(reader: R) -> trm_rank_common::Result<Self> {
        let mut table = Self::default();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line.map_err(unavailable)?;
            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else {
                continue;
            };
            let values: Vec<&str> = parts.collect();

            if line_no == 0 && values.len() == 1 && is_header(word, values[0]) {
                continue;
            }

            let vector = values
                .iter()
                .map(|v| v.parse::<f32>())
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| unavailable(format!("{}行目: {}", line_no + 1, e)))?;

            if vector.is_empty() {
                continue;
            }
            if table.dim == 0 {
                table.dim = vector.len();
            } else if vector.len() != table.dim {
                return Err(unavailable(format!(
                    "{}行目: 次元が一致しません（期待: {}, 実際: {}）",
                    line_no + 1,
                    table.dim,
                    vector.len()
                )));
            }

            table.vectors.entry(word.to_string()).or_insert(vector);
        }

        Ok(table)
    }

    pub fn insert(&mut self, word: impl Into<String>, vector: Vec<f32>) {
        if self.dim == 0 {
            self.dim = vector.len();
        }
        if vector.len() == self.dim {
            self.vectors.insert(word.into(), vector);
        }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    fn lookup(&self, token: &str) -> Option<&[f32]> {
        self.vectors
            .get(token)
            .or_else(|| self.vectors.get(&token.to_lowercase()))
            .map(Vec::as_slice)
    }
}

fn is_header(first: &str, second: &str) -> bool {
    first.parse::<usize>().is_ok() && second.parse::<usize>().is_ok()
}

/// テキストをトークンに分割
pub fn tokenize(text: &str) -> Vec<&str> {
    TOKEN_RE.find_iter(text).map(|m| m.as_str()).collect()
}

impl LanguagePipeline for WordVectors {
    fn doc_vector(&self, text: &str) -> trm_rank_common::Result<Option<Vec<f32>>> {
        let tokens = tokenize(text);
        let known: Vec<&[f32]> = tokens.iter().filter_map(|t| self.lookup(t)).collect();

        if known.is_empty() {
            tracing::debug!(text, "語彙外のみのテキスト");
            return Ok(None);
        }
        Ok(mean_vector(known))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn table(text: &str) -> WordVectors {
        WordVectors::from_reader(Cursor::new(text)).unwrap()
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("Adobe Acrobat"), vec!["Adobe", "Acrobat"]);
        assert_eq!(tokenize("e-mail client"), vec!["e-mail", "client"]);
        assert_eq!(tokenize("Reader (v11)"), vec!["Reader", "(", "v11", ")"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_load_with_header() {
        let vectors = table("2 3\nadobe 1 0 0\nacrobat 0 1 0\n");
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors.dim(), 3);
    }

    #[test]
    fn test_load_dimension_mismatch() {
        let err = WordVectors::from_reader(Cursor::new("a 1 0\nb 1 0 0\n")).unwrap_err();
        assert!(format!("{}", err).contains("2行目"));
    }

    #[test]
    fn test_doc_vector_is_mean_of_known_tokens() {
        let vectors = table("adobe 1 0\nacrobat 0 1\n");
        let v = vectors.doc_vector("Adobe Acrobat unknownword").unwrap().unwrap();
        assert_eq!(v, vec![0.5, 0.5]);
    }

    #[test]
    fn test_doc_vector_none_when_all_unknown() {
        let vectors = table("adobe 1 0\n");
        assert!(vectors.doc_vector("zzz").unwrap().is_none());
        assert!(vectors.doc_vector("").unwrap().is_none());
    }

    #[test]
    fn test_exact_case_wins() {
        let vectors = table("Apple 1 0\napple 0 1\n");
        assert_eq!(vectors.doc_vector("Apple").unwrap().unwrap(), vec![1.0, 0.0]);
        assert_eq!(vectors.doc_vector("APPLE").unwrap().unwrap(), vec![0.0, 1.0]);
    }
}
