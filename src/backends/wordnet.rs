//! WordNet辞書ファイルの読み込み
//!
//! Princeton WordNet 3.0 の `dict/` ディレクトリ
//! （data.* / index.* / *.exc）から語義グラフを構築する。
//! data.noun と index.noun は必須、それ以外の品詞は任意。

use std::collections::HashMap;
use std::path::Path;
use trm_rank_common::{Error, PartOfSpeech, SenseGraph, SenseId, StrategyKind};

fn unavailable(reason: impl ToString) -> Error {
    Error::strategy_unavailable(StrategyKind::LexicalTaxonomy, reason)
}

/// data.* の1レコード
#[derive(Debug, Clone, PartialEq)]
struct SynsetRecord {
    offset: u64,
    /// 名前用の品詞（衛星形容詞は s）
    ss_type: char,
    words: Vec<String>,
    hypernyms: Vec<(PartOfSpeech, u64)>,
}

/// data.* の1行を解析（ライセンス行・空行は None）
fn parse_data_line(line: &str) -> Result<Option<SynsetRecord>, String> {
    if line.starts_with("  ") || line.trim().is_empty() {
        return Ok(None);
    }

    let body = line.split(" | ").next().unwrap_or(line);
    let fields: Vec<&str> = body.split_whitespace().collect();
    let field = |i: usize| fields.get(i).copied().ok_or_else(|| "項目が不足しています".to_string());

    let offset = field(0)?.parse::<u64>().map_err(|e| e.to_string())?;
    let ss_type = field(2)?.chars().next().ok_or("品詞がありません")?;
    let w_cnt = usize::from_str_radix(field(3)?, 16).map_err(|e| e.to_string())?;

    let mut words = Vec::with_capacity(w_cnt);
    for i in 0..w_cnt {
        let word = field(4 + i * 2)?;
        // 形容詞の位置マーカー（例: "(a)"）は除去
        let word = word.split('(').next().unwrap_or(word);
        words.push(word.to_string());
    }

    let mut pos = 4 + w_cnt * 2;
    let p_cnt = field(pos)?.parse::<usize>().map_err(|e| e.to_string())?;
    pos += 1;

    let mut hypernyms = Vec::new();
    for _ in 0..p_cnt {
        let symbol = field(pos)?;
        let target = field(pos + 1)?.parse::<u64>().map_err(|e| e.to_string())?;
        let target_pos = field(pos + 2)?;
        pos += 4;

        if symbol == "@" || symbol == "@i" {
            let target_pos = PartOfSpeech::from_code(target_pos)
                .ok_or_else(|| format!("不明な品詞: {}", target_pos))?;
            hypernyms.push((target_pos, target));
        }
    }

    Ok(Some(SynsetRecord {
        offset,
        ss_type,
        words,
        hypernyms,
    }))
}

/// index.* の1行を解析して (見出し語, オフセット列) を返す
fn parse_index_line(line: &str) -> Result<Option<(String, Vec<u64>)>, String> {
    if line.starts_with("  ") || line.trim().is_empty() {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 4 {
        return Err("項目が不足しています".into());
    }
    let lemma = fields[0].to_lowercase();
    let synset_cnt = fields[2].parse::<usize>().map_err(|e| e.to_string())?;
    if fields.len() < synset_cnt + 4 {
        return Err("オフセットが不足しています".into());
    }

    let offsets = fields[fields.len() - synset_cnt..]
        .iter()
        .map(|f| f.parse::<u64>().map_err(|e| e.to_string()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some((lemma, offsets)))
}

/// *.exc の1行を解析して (変化形, 基本形列) を返す
fn parse_exception_line(line: &str) -> Option<(String, Vec<String>)> {
    let mut parts = line.split_whitespace();
    let inflected = parts.next()?.to_string();
    let bases: Vec<String> = parts.map(str::to_string).collect();
    if bases.is_empty() {
        None
    } else {
        Some((inflected, bases))
    }
}

fn read_lines<T>(
    path: &Path,
    mut parse: impl FnMut(&str) -> Result<Option<T>, String>,
) -> trm_rank_common::Result<Vec<T>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| unavailable(format!("{}: {}", path.display(), e)))?;

    let mut out = Vec::new();
    for (i, line) in content.lines().enumerate() {
        match parse(line) {
            Ok(Some(v)) => out.push(v),
            Ok(None) => {}
            Err(e) => {
                return Err(unavailable(format!("{}:{}: {}", path.display(), i + 1, e)));
            }
        }
    }
    Ok(out)
}

/// 辞書ディレクトリから語義グラフを構築
pub fn load_wordnet(dir: &Path) -> trm_rank_common::Result<SenseGraph> {
    if !dir.join("data.noun").exists() || !dir.join("index.noun").exists() {
        return Err(unavailable(format!(
            "WordNet辞書が見つかりません（data.noun / index.noun）: {}",
            dir.display()
        )));
    }

    let mut records: Vec<(PartOfSpeech, SynsetRecord)> = Vec::new();
    let mut index: Vec<(PartOfSpeech, String, Vec<u64>)> = Vec::new();

    for pos in PartOfSpeech::ALL {
        let data_path = dir.join(format!("data.{}", pos.file_suffix()));
        let index_path = dir.join(format!("index.{}", pos.file_suffix()));
        if !data_path.exists() || !index_path.exists() {
            tracing::debug!(pos = %pos.code(), "品詞ファイルなし、スキップ");
            continue;
        }

        records.extend(read_lines(&data_path, parse_data_line)?.into_iter().map(|r| (pos, r)));
        index.extend(
            read_lines(&index_path, parse_index_line)?
                .into_iter()
                .map(|(lemma, offsets)| (pos, lemma, offsets)),
        );
    }

    // 語義番号は index 内の並び順
    let mut sense_numbers: HashMap<(PartOfSpeech, &str, u64), usize> = HashMap::new();
    for (pos, lemma, offsets) in &index {
        for (i, offset) in offsets.iter().enumerate() {
            sense_numbers.entry((*pos, lemma.as_str(), *offset)).or_insert(i + 1);
        }
    }

    let mut graph = SenseGraph::new();
    let mut ids: HashMap<(PartOfSpeech, u64), SenseId> = HashMap::with_capacity(records.len());

    for (pos, record) in &records {
        let lemma = record.words.first().map(|w| w.to_lowercase()).unwrap_or_default();
        let number = sense_numbers
            .get(&(*pos, lemma.as_str(), record.offset))
            .copied()
            .unwrap_or(1);
        let name = format!("{}.{}.{:02}", lemma, record.ss_type, number);
        let sense_pos = PartOfSpeech::from_code(&record.ss_type.to_string()).unwrap_or(*pos);
        ids.insert((*pos, record.offset), graph.add_sense(name, sense_pos));
    }

    // 上位語は前方参照があるので2パス目で張る
    let mut dangling = 0usize;
    for (pos, record) in &records {
        let Some(&id) = ids.get(&(*pos, record.offset)) else {
            continue;
        };
        for target in &record.hypernyms {
            match ids.get(target) {
                Some(&hyper) => graph.add_hypernym(id, hyper),
                None => dangling += 1,
            }
        }
    }
    if dangling > 0 {
        tracing::warn!(dangling, "解決できない上位語ポインタがあります");
    }

    for (pos, lemma, offsets) in &index {
        let senses: Vec<SenseId> = offsets
            .iter()
            .filter_map(|offset| ids.get(&(*pos, *offset)).copied())
            .collect();
        graph.add_lemma(*pos, lemma, &senses);
    }

    let mut exception_count = 0usize;
    for pos in PartOfSpeech::ALL {
        let exc_path = dir.join(format!("{}.exc", pos.file_suffix()));
        if !exc_path.exists() {
            continue;
        }
        for (inflected, bases) in read_lines(&exc_path, |line| Ok(parse_exception_line(line)))? {
            for base in bases {
                graph.add_exception(pos, &inflected, &base);
                exception_count += 1;
            }
        }
    }

    tracing::info!(
        dir = %dir.display(),
        senses = graph.len(),
        lemmas = index.len(),
        exceptions = exception_count,
        "WordNet読み込み完了"
    );
    Ok(graph)
}
