//! 語彙体系（語義グラフ）モジュール
//!
//! WordNet形式の語義と上位語リンクを保持し、語義検索と
//! Wu-Palmer類似度を提供する。ファイルの読み込みはCLI側（wordnet.rs）。
//!
//! ## Wu-Palmer類似度
//! 1. 共通上位語のうち最小深さが最大のものを包摂語とする
//! 2. depth = 包摂語の最大深さ + 1
//! 3. score = 2·depth / ((dist(a) + depth) + (dist(b) + depth))
//!
//! 名詞以外は単一の根を持たないため、共通上位語がなければ仮想の根を置く。

use crate::error::Result;
use crate::strategy::Taxonomy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// 語義ID（グラフ内のインデックス）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SenseId(pub u32);

/// 品詞
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
}

impl PartOfSpeech {
    /// 検索順（名詞→動詞→形容詞→副詞）
    pub const ALL: [PartOfSpeech; 4] = [
        PartOfSpeech::Noun,
        PartOfSpeech::Verb,
        PartOfSpeech::Adjective,
        PartOfSpeech::Adverb,
    ];

    /// WordNetの品詞記号（`s` は形容詞サテライト）
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "n" => Some(PartOfSpeech::Noun),
            "v" => Some(PartOfSpeech::Verb),
            "a" | "s" => Some(PartOfSpeech::Adjective),
            "r" => Some(PartOfSpeech::Adverb),
            _ => None,
        }
    }

    pub fn code(&self) -> char {
        match self {
            PartOfSpeech::Noun => 'n',
            PartOfSpeech::Verb => 'v',
            PartOfSpeech::Adjective => 'a',
            PartOfSpeech::Adverb => 'r',
        }
    }

    /// データファイルの拡張子（data.noun 等）
    pub fn file_suffix(&self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "noun",
            PartOfSpeech::Verb => "verb",
            PartOfSpeech::Adjective => "adj",
            PartOfSpeech::Adverb => "adv",
        }
    }

    /// 単一の根を持たない品詞（名詞以外）
    pub fn needs_root(&self) -> bool {
        !matches!(self, PartOfSpeech::Noun)
    }

    fn substitutions(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            PartOfSpeech::Noun => &[
                ("s", ""),
                ("ses", "s"),
                ("ves", "f"),
                ("xes", "x"),
                ("zes", "z"),
                ("ches", "ch"),
                ("shes", "sh"),
                ("men", "man"),
                ("ies", "y"),
            ],
            PartOfSpeech::Verb => &[
                ("s", ""),
                ("ies", "y"),
                ("es", "e"),
                ("es", ""),
                ("ed", "e"),
                ("ed", ""),
                ("ing", "e"),
                ("ing", ""),
            ],
            PartOfSpeech::Adjective => &[("er", ""), ("est", ""), ("er", "e"), ("est", "e")],
            PartOfSpeech::Adverb => &[],
        }
    }
}

/// 語義
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sense {
    /// 表示名（例: dog.n.01）
    pub name: String,
    pub pos: PartOfSpeech,
    /// 上位語（インスタンス上位語を含む）
    pub hypernyms: Vec<SenseId>,
}

/// 語義グラフ
#[derive(Debug, Clone, Default)]
pub struct SenseGraph {
    senses: Vec<Sense>,
    lemmas: HashMap<(PartOfSpeech, String), Vec<SenseId>>,
    exceptions: HashMap<(PartOfSpeech, String), Vec<String>>,
}

impl SenseGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sense(&mut self, name: impl Into<String>, pos: PartOfSpeech) -> SenseId {
        let id = SenseId(self.senses.len() as u32);
        self.senses.push(Sense {
            name: name.into(),
            pos,
            hypernyms: Vec::new(),
        });
        id
    }

    pub fn add_hypernym(&mut self, sense: SenseId, hypernym: SenseId) {
        if let Some(s) = self.senses.get_mut(sense.0 as usize) {
            if !s.hypernyms.contains(&hypernym) {
                s.hypernyms.push(hypernym);
            }
        }
    }

    /// 見出し語に語義を追加（登録順が検索結果の順序）
    pub fn add_lemma(&mut self, pos: PartOfSpeech, lemma: &str, senses: &[SenseId]) {
        let entry = self.lemmas.entry((pos, lemma.to_lowercase())).or_default();
        for s in senses {
            if !entry.contains(s) {
                entry.push(*s);
            }
        }
    }

    /// 不規則変化（例: ran → run）
    pub fn add_exception(&mut self, pos: PartOfSpeech, inflected: &str, base: &str) {
        self.exceptions
            .entry((pos, inflected.to_lowercase()))
            .or_default()
            .push(base.to_lowercase());
    }

    pub fn sense(&self, id: SenseId) -> Option<&Sense> {
        self.senses.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.senses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senses.is_empty()
    }

    fn has_lemma(&self, pos: PartOfSpeech, lemma: &str) -> bool {
        self.lemmas.contains_key(&(pos, lemma.to_string()))
    }

    /// 辞書に存在する基本形の候補
    ///
    /// 不規則変化に載っていれば変化形と基本形だけを試す。
    /// それ以外は語尾の置換を繰り返し、辞書に見つかった段階で止める。
    pub fn morphy(&self, form: &str, pos: PartOfSpeech) -> Vec<String> {
        if let Some(bases) = self.exceptions.get(&(pos, form.to_string())) {
            let candidates = std::iter::once(form.to_string()).chain(bases.iter().cloned());
            return self.known_forms(pos, candidates);
        }

        let mut seen: HashSet<String> = HashSet::from([form.to_string()]);
        let mut forms = apply_substitutions(pos, &[form.to_string()], &mut seen);

        let found = self.known_forms(pos, std::iter::once(form.to_string()).chain(forms.iter().cloned()));
        if !found.is_empty() {
            return found;
        }

        while !forms.is_empty() {
            forms = apply_substitutions(pos, &forms, &mut seen);
            let found = self.known_forms(pos, forms.iter().cloned());
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }

    fn known_forms(&self, pos: PartOfSpeech, candidates: impl Iterator<Item = String>) -> Vec<String> {
        let mut seen = HashSet::new();
        candidates
            .filter(|c| !c.is_empty() && self.has_lemma(pos, c))
            .filter(|c| seen.insert(c.clone()))
            .collect()
    }

    /// テキストから語義を検索（小文字化・空白は `_`）
    pub fn lookup(&self, text: &str) -> Vec<SenseId> {
        let form = text.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join("_");
        if form.is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for pos in PartOfSpeech::ALL {
            for base in self.morphy(&form, pos) {
                if let Some(senses) = self.lemmas.get(&(pos, base)) {
                    result.extend(senses.iter().copied().filter(|s| seen.insert(*s)));
                }
            }
        }
        result
    }

    fn hypernyms(&self, id: SenseId) -> &[SenseId] {
        self.sense(id).map(|s| s.hypernyms.as_slice()).unwrap_or(&[])
    }

    /// 自身を含む全上位語への最短距離
    fn ancestors(&self, id: SenseId) -> HashMap<SenseId, usize> {
        let mut dist = HashMap::new();
        let mut queue = VecDeque::from([(id, 0usize)]);

        while let Some((s, d)) = queue.pop_front() {
            if dist.contains_key(&s) {
                continue;
            }
            dist.insert(s, d);
            for &h in self.hypernyms(s) {
                queue.push_back((h, d + 1));
            }
        }
        dist
    }

    /// 根までの最長距離
    pub fn max_depth(&self, id: SenseId) -> usize {
        self.max_depth_guarded(id, &mut Vec::new())
    }

    fn max_depth_guarded(&self, id: SenseId, path: &mut Vec<SenseId>) -> usize {
        if path.contains(&id) {
            return 0;
        }
        path.push(id);
        let depth = self
            .hypernyms(id)
            .iter()
            .map(|&h| self.max_depth_guarded(h, path) + 1)
            .max()
            .unwrap_or(0);
        path.pop();
        depth
    }

    /// 根までの最短距離
    pub fn min_depth(&self, id: SenseId) -> usize {
        self.ancestors(id)
            .into_iter()
            .filter(|(s, _)| self.hypernyms(*s).is_empty())
            .map(|(_, d)| d)
            .min()
            .unwrap_or(0)
    }

    /// Wu-Palmer類似度（0.0〜1.0、比較不能なら None）
    pub fn wup_similarity(&self, a: SenseId, b: SenseId) -> Option<f64> {
        let sa = self.sense(a)?;
        let sb = self.sense(b)?;
        let simulate_root = sa.pos.needs_root() || sb.pos.needs_root();

        let anc_a = self.ancestors(a);
        let anc_b = self.ancestors(b);

        let common: Vec<SenseId> = anc_a
            .keys()
            .filter(|k| anc_b.contains_key(k))
            .copied()
            .collect();

        if common.is_empty() {
            if !simulate_root {
                return None;
            }
            // 仮想の根: 深さ1、距離は最遠の上位語 + 1
            let len_a = anc_a.values().max().copied().unwrap_or(0) + 1;
            let len_b = anc_b.values().max().copied().unwrap_or(0) + 1;
            return Some(2.0 / ((len_a + 1) + (len_b + 1)) as f64);
        }

        let best_min_depth = common.iter().map(|&s| self.min_depth(s)).max()?;
        let mut subsumers: Vec<SenseId> = common
            .into_iter()
            .filter(|&s| self.min_depth(s) == best_min_depth)
            .collect();
        subsumers.sort_by(|x, y| {
            let nx = self.sense(*x).map(|s| s.name.as_str()).unwrap_or("");
            let ny = self.sense(*y).map(|s| s.name.as_str()).unwrap_or("");
            nx.cmp(ny)
        });

        let subsumer = if subsumers.contains(&a) { a } else { *subsumers.first()? };
        let depth = self.max_depth(subsumer) + 1;
        let len_a = anc_a.get(&subsumer)? + depth;
        let len_b = anc_b.get(&subsumer)? + depth;

        Some((2 * depth) as f64 / (len_a + len_b) as f64)
    }
}

/// 語尾の置換を1段階適用（生成済みの形は除く）
fn apply_substitutions(pos: PartOfSpeech, forms: &[String], seen: &mut HashSet<String>) -> Vec<String> {
    let mut next = Vec::new();
    for form in forms {
        for (old, new) in pos.substitutions() {
            if let Some(stem) = form.strip_suffix(old) {
                let candidate = format!("{}{}", stem, new);
                if seen.insert(candidate.clone()) {
                    next.push(candidate);
                }
            }
        }
    }
    next
}

impl Taxonomy for SenseGraph {
    fn synsets(&self, text: &str) -> Result<Vec<SenseId>> {
        Ok(self.lookup(text))
    }

    fn wup_similarity(&self, a: SenseId, b: SenseId) -> Option<f64> {
        SenseGraph::wup_similarity(self, a, b)
    }
}
