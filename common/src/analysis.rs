//! 分析結果レポートの組み立て
//!
//! 事前計算済みのトピック・感情分析結果（JSON）から、
//! 複数シートのレポート表を組み立てる。
//!
//! ## シート構成
//! - Results: 文書ごとの行（トピック・感情ラベル）
//! - Annotation: 注記
//! - BERTopic / LDA: トピックの上位語と重み（重複語を除いた版も）
//! - Analyses_*: 感情件数・トピック件数・トピック×感情のクロス集計

use crate::report::{CellValue, SheetTable};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const NOT_AVAILABLE: &str = "N/A";

/// 分析結果一式
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResults {
    /// 出力ファイル名に使う名前
    pub name: String,
    pub annotation: String,
    /// 元データの行ID（なければ行番号）
    pub row_ids: Option<Vec<String>>,
    pub documents: Vec<String>,
    /// 前処理の結果（文書ごと）
    pub preprocessing: Vec<String>,
    pub bertopic: Option<TopicModelResult>,
    pub lda: Option<TopicModelResult>,
    pub sentiments: SentimentSeries,
    pub schemes: PerScheme<String>,
    pub analyses: Analyses,
}

/// トピックモデルの結果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicModelResult {
    /// 文書ごとのトピック番号
    pub topic_per_row: Vec<i64>,
    pub topics: Vec<Topic>,
    /// 複数トピックにまたがる語
    pub duplicate_words: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Topic {
    pub topic_num: i64,
    pub words: Vec<String>,
    pub weights: Vec<f64>,
}

impl Topic {
    fn words_label(&self) -> String {
        self.words.join(", ")
    }
}

/// 文書ごとの感情ラベル
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentSeries {
    pub class3: Option<Vec<String>>,
    pub class5: Option<Vec<String>>,
    pub emotion1: Option<Vec<String>>,
    pub emotion2: Option<Vec<String>>,
    pub offensive1: Option<Vec<String>>,
}

/// 感情分類の種類ごとの値
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerScheme<T> {
    pub class3: Vec<T>,
    pub class5: Vec<T>,
    pub emotion2: Vec<T>,
    pub offensive1: Vec<T>,
}

// derive(Default) だと T: Default を要求してしまう
impl<T> Default for PerScheme<T> {
    fn default() -> Self {
        Self {
            class3: Vec::new(),
            class5: Vec::new(),
            emotion2: Vec::new(),
            offensive1: Vec::new(),
        }
    }
}

impl<T> PerScheme<T> {
    fn get(&self, scheme: Scheme) -> &[T] {
        match scheme {
            Scheme::Class3 => &self.class3,
            Scheme::Class5 => &self.class5,
            Scheme::Emotion2 => &self.emotion2,
            Scheme::Offensive1 => &self.offensive1,
        }
    }
}

/// トピック×感情の行（トピック番号と感情ラベルごとの件数）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicSentimentRow {
    pub topic_num: i64,
    pub counts: Vec<i64>,
}

/// 感情×トピックの行（感情ラベルとトピックごとの件数）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentTopicRow {
    pub sentiment: String,
    pub counts: Vec<i64>,
}

/// 集計結果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Analyses {
    /// 感情ラベルごとの件数
    pub sentiment_counts: PerScheme<i64>,
    pub lda_occurrences: Vec<i64>,
    pub lda_topic_numbers: Vec<i64>,
    pub bertopic_occurrences: Vec<i64>,
    pub bertopic_topic_numbers: Vec<i64>,
    pub lda_sentiments: PerScheme<TopicSentimentRow>,
    pub bertopic_sentiments: PerScheme<TopicSentimentRow>,
    pub sentiment_lda: PerScheme<SentimentTopicRow>,
    pub sentiment_bertopic: PerScheme<SentimentTopicRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scheme {
    Class3,
    Class5,
    Emotion2,
    Offensive1,
}

impl Scheme {
    const ALL: [Scheme; 4] = [Scheme::Class3, Scheme::Class5, Scheme::Emotion2, Scheme::Offensive1];

    /// 感情件数シートの接尾辞
    fn counts_suffix(&self) -> &'static str {
        match self {
            Scheme::Class3 => "Class-3",
            Scheme::Class5 => "Class-5",
            Scheme::Emotion2 => "Emotion-2",
            Scheme::Offensive1 => "Offensive-1",
        }
    }

    /// トピック×感情シートの接尾辞
    fn topic_suffix(&self) -> &'static str {
        match self {
            Scheme::Class3 => "3Class",
            Scheme::Class5 => "5Class",
            Scheme::Emotion2 => "Emotion2",
            Scheme::Offensive1 => "Offensive1",
        }
    }

    /// 感情×トピックシートの接頭辞
    fn sentiment_prefix(&self) -> &'static str {
        match self {
            Scheme::Class3 => "Class3",
            Scheme::Class5 => "Class5",
            Scheme::Emotion2 => "Emotion2",
            Scheme::Offensive1 => "Offensive1",
        }
    }
}

/// Results シートの列見出し
pub const RESULT_HEADERS: [&str; 10] = [
    "ID",
    "Document",
    "Preproc Status",
    "BERTopic Topic",
    "LDA Topic",
    "Class-3",
    "Class-5",
    "Emotion-1",
    "Emotion-2",
    "Offensive-1",
];

impl AnalysisResults {
    /// 全シートを組み立てる（データのないシートは省略）
    pub fn build_sheets(&self) -> Vec<SheetTable> {
        let mut sheets = vec![self.results_sheet(), self.annotation_sheet()];

        for (name, model) in [("BERTopic", &self.bertopic), ("LDA", &self.lda)] {
            if let Some(model) = model.as_ref().filter(|m| !m.topics.is_empty()) {
                sheets.push(topic_words_sheet(name, model, false));
                sheets.push(topic_words_sheet(
                    &format!("{} Non-Overlapping Topics", name),
                    model,
                    true,
                ));
            }
        }

        for scheme in Scheme::ALL {
            let counts = self.analyses.sentiment_counts.get(scheme);
            if !counts.is_empty() {
                sheets.push(self.sentiment_counts_sheet(scheme, counts));
            }
        }

        let lda_topics = topics_of(&self.lda);
        let bert_topics = topics_of(&self.bertopic);

        if !self.analyses.lda_occurrences.is_empty() {
            sheets.push(topic_counts_sheet(
                "Analyses_LDA",
                &self.analyses.lda_occurrences,
                &self.analyses.lda_topic_numbers,
                lda_topics,
            ));
        }
        if !self.analyses.bertopic_occurrences.is_empty() {
            sheets.push(topic_counts_sheet(
                "Analyses_BERTopic",
                &self.analyses.bertopic_occurrences,
                &self.analyses.bertopic_topic_numbers,
                bert_topics,
            ));
        }

        for (model, topics, by_topic, by_sentiment, numbers) in [
            (
                "LDA",
                lda_topics,
                &self.analyses.lda_sentiments,
                &self.analyses.sentiment_lda,
                &self.analyses.lda_topic_numbers,
            ),
            (
                "BERTopic",
                bert_topics,
                &self.analyses.bertopic_sentiments,
                &self.analyses.sentiment_bertopic,
                &self.analyses.bertopic_topic_numbers,
            ),
        ] {
            for scheme in Scheme::ALL {
                let rows = by_topic.get(scheme);
                if !rows.is_empty() {
                    sheets.push(self.topic_sentiment_sheet(
                        &format!("Analyses_{}-{}", model, scheme.topic_suffix()),
                        rows,
                        topics,
                        scheme,
                    ));
                }
            }
            for scheme in Scheme::ALL {
                let rows = by_sentiment.get(scheme);
                if !rows.is_empty() {
                    sheets.push(sentiment_topic_sheet(
                        &format!("Analyses_{}-{}", scheme.sentiment_prefix(), model),
                        rows,
                        numbers,
                    ));
                }
            }
        }

        sheets
    }

    fn results_sheet(&self) -> SheetTable {
        let mut table = SheetTable::new("Results", RESULT_HEADERS);
        let s = &self.sentiments;

        for (i, doc) in self.documents.iter().enumerate() {
            if doc.is_empty() {
                continue;
            }
            let id = match &self.row_ids {
                Some(ids) => ids.get(i).cloned().map(CellValue::Text).unwrap_or(CellValue::Empty),
                None => CellValue::Integer(i as i64),
            };
            table.push_row(vec![
                id,
                CellValue::text(doc),
                self.preprocessing
                    .get(i)
                    .map(|p| CellValue::text(p))
                    .unwrap_or(CellValue::Empty),
                topic_cell(&self.bertopic, i),
                topic_cell(&self.lda, i),
                series_cell(&s.class3, i),
                series_cell(&s.class5, i),
                series_cell(&s.emotion1, i),
                series_cell(&s.emotion2, i),
                series_cell(&s.offensive1, i),
            ]);
        }
        table
    }

    fn annotation_sheet(&self) -> SheetTable {
        // ヘッダー行がそのまま注記になる
        SheetTable::new("Annotation", [self.annotation.clone()])
    }

    fn sentiment_label(&self, scheme: Scheme, index: usize) -> String {
        self.schemes
            .get(scheme)
            .get(index)
            .cloned()
            .unwrap_or_else(|| index.to_string())
    }

    fn sentiment_counts_sheet(&self, scheme: Scheme, counts: &[i64]) -> SheetTable {
        let mut table = SheetTable::new(
            &format!("Analyses_{}", scheme.counts_suffix()),
            ["Sentiment", "Count"],
        );
        for (i, count) in counts.iter().enumerate() {
            table.push_row(vec![
                CellValue::Text(self.sentiment_label(scheme, i)),
                CellValue::Integer(*count),
            ]);
        }
        table
    }

    fn topic_sentiment_sheet(
        &self,
        name: &str,
        rows: &[TopicSentimentRow],
        topics: &[Topic],
        scheme: Scheme,
    ) -> SheetTable {
        let headers = ["Topic Num".to_string(), "Topic".to_string()]
            .into_iter()
            .chain(self.schemes.get(scheme).iter().cloned());
        let mut table = SheetTable::new(name, headers);

        for (i, row) in rows.iter().enumerate() {
            let words = topics.get(i).map(Topic::words_label).unwrap_or_default();
            let mut cells = vec![
                CellValue::Integer(row.topic_num),
                CellValue::Text(format!("{}: {}", row.topic_num, words)),
            ];
            cells.extend(row.counts.iter().map(|c| CellValue::Integer(*c)));
            table.push_row(cells);
        }
        table
    }
}

fn topics_of(model: &Option<TopicModelResult>) -> &[Topic] {
    model.as_ref().map(|m| m.topics.as_slice()).unwrap_or(&[])
}

fn topic_cell(model: &Option<TopicModelResult>, index: usize) -> CellValue {
    model
        .as_ref()
        .filter(|m| !m.topic_per_row.is_empty())
        .and_then(|m| m.topic_per_row.get(index))
        .map(|t| CellValue::Integer(*t))
        .unwrap_or_else(|| CellValue::text(NOT_AVAILABLE))
}

fn series_cell(series: &Option<Vec<String>>, index: usize) -> CellValue {
    series
        .as_ref()
        .filter(|s| !s.is_empty())
        .and_then(|s| s.get(index))
        .map(|v| CellValue::text(v))
        .unwrap_or_else(|| CellValue::text(NOT_AVAILABLE))
}

/// トピックの上位語シート（`non_overlapping` なら重複語を除外）
fn topic_words_sheet(name: &str, model: &TopicModelResult, non_overlapping: bool) -> SheetTable {
    let duplicates: HashSet<&str> = model.duplicate_words.iter().map(String::as_str).collect();
    let mut table = SheetTable::new(name, ["Topic", "Top Words", "Weight"]);

    for topic in &model.topics {
        for (j, word) in topic.words.iter().enumerate() {
            if non_overlapping && duplicates.contains(word.as_str()) {
                continue;
            }
            table.push_row(vec![
                CellValue::Integer(topic.topic_num),
                CellValue::text(word),
                topic
                    .weights
                    .get(j)
                    .map(|w| CellValue::Number(*w))
                    .unwrap_or(CellValue::Empty),
            ]);
        }
    }
    table
}

/// トピック件数シート
///
/// Excelのグラフで並び順が崩れないよう、10未満の番号は先頭に空白を付ける。
fn topic_counts_sheet(
    name: &str,
    occurrences: &[i64],
    topic_numbers: &[i64],
    topics: &[Topic],
) -> SheetTable {
    let mut table = SheetTable::new(name, ["Topic Num", "Topic", "Count"]);

    for (i, count) in occurrences.iter().enumerate() {
        let number = topic_numbers.get(i).copied().unwrap_or(i as i64);
        let words = topics.get(i).map(Topic::words_label).unwrap_or_default();
        let label = if number < 10 {
            format!(" {}: {}", number, words)
        } else {
            format!("{}: {}", number, words)
        };
        table.push_row(vec![
            CellValue::Integer(number),
            CellValue::Text(label),
            CellValue::Integer(*count),
        ]);
    }
    table
}

/// 感情×トピックシート（列はトピック番号）
fn sentiment_topic_sheet(name: &str, rows: &[SentimentTopicRow], topic_numbers: &[i64]) -> SheetTable {
    let headers = std::iter::once("Sentiment".to_string())
        .chain(topic_numbers.iter().map(|n| n.to_string()));
    let mut table = SheetTable::new(name, headers);

    for row in rows {
        let mut cells = vec![CellValue::text(&row.sentiment)];
        cells.extend(row.counts.iter().map(|c| CellValue::Integer(*c)));
        table.push_row(cells);
    }
    table
}
