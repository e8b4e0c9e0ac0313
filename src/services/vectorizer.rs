use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::{AppError, AppResult};
use crate::services::stopwords::is_stop_word;

/// Default cap on vocabulary size
pub const DEFAULT_MAX_FEATURES: usize = 5000;

/// Tokens shorter than this are never counted
const MIN_TOKEN_LEN: usize = 2;

/// Splits text into lowercase alphanumeric runs, dropping short tokens and
/// stop words.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= MIN_TOKEN_LEN)
        .map(str::to_lowercase)
        .filter(|token| !is_stop_word(token))
}

/// Frozen token -> column mapping.
///
/// Serialized as the ordered term list; the lookup table is rebuilt on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    terms: Vec<String>,
    columns: HashMap<String, usize>,
}

impl From<Vec<String>> for Vocabulary {
    fn from(terms: Vec<String>) -> Self {
        let columns = terms
            .iter()
            .enumerate()
            .map(|(column, term)| (term.clone(), column))
            .collect();
        Self { terms, columns }
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.terms
    }
}

impl Vocabulary {
    /// Learns the vocabulary from a corpus of tag strings.
    ///
    /// Terms are ranked by document frequency, ties going to the term seen
    /// first. The `max_features` best are kept and assigned columns in
    /// alphabetical order, so fitting the same corpus always yields the same
    /// model.
    pub fn fit<S: AsRef<str>>(corpus: &[S], max_features: usize) -> AppResult<Self> {
        if corpus.is_empty() {
            return Err(AppError::Build("cannot fit vocabulary on an empty corpus".to_string()));
        }

        let mut first_seen: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: Vec<(String, usize)> = Vec::new();

        for doc in corpus {
            let mut in_doc: HashSet<String> = HashSet::new();
            for token in tokenize(doc.as_ref()) {
                if !in_doc.insert(token.clone()) {
                    continue;
                }
                match first_seen.get(&token) {
                    Some(&slot) => doc_freq[slot].1 += 1,
                    None => {
                        first_seen.insert(token.clone(), doc_freq.len());
                        doc_freq.push((token, 1));
                    }
                }
            }
        }

        // Stable sort keeps first-seen order among equal frequencies
        doc_freq.sort_by(|a, b| b.1.cmp(&a.1));
        doc_freq.truncate(max_features);

        let mut terms: Vec<String> = doc_freq.into_iter().map(|(term, _)| term).collect();
        if terms.is_empty() {
            return Err(AppError::Build(
                "vocabulary is empty after stop-word filtering".to_string(),
            ));
        }
        terms.sort();

        tracing::debug!(size = terms.len(), "Vocabulary fitted");
        Ok(Self::from(terms))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn column(&self, term: &str) -> Option<usize> {
        self.columns.get(term).copied()
    }

    /// Terms in column order
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Encodes one document as a count vector over this vocabulary
    pub fn encode(&self, doc: &str) -> CountVector {
        let mut counts: HashMap<usize, u32> = HashMap::new();
        for token in tokenize(doc) {
            if let Some(column) = self.column(&token) {
                *counts.entry(column).or_insert(0) += 1;
            }
        }
        let mut entries: Vec<(usize, u32)> = counts.into_iter().collect();
        entries.sort_unstable_by_key(|&(column, _)| column);
        CountVector { entries }
    }

    /// Encodes every document of a corpus, one row per document
    pub fn transform<S: AsRef<str>>(&self, corpus: &[S]) -> VectorMatrix {
        VectorMatrix {
            width: self.len(),
            rows: corpus.iter().map(|doc| self.encode(doc.as_ref())).collect(),
        }
    }
}

/// Sparse row of non-negative term counts, sorted by column
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountVector {
    entries: Vec<(usize, u32)>,
}

impl CountVector {
    pub fn entries(&self) -> &[(usize, u32)] {
        &self.entries
    }

    pub fn get(&self, column: usize) -> u32 {
        self.entries
            .binary_search_by_key(&column, |&(c, _)| c)
            .map(|i| self.entries[i].1)
            .unwrap_or(0)
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// Squared euclidean norm
    pub fn norm_squared(&self) -> u64 {
        self.entries.iter().map(|&(_, n)| u64::from(n) * u64::from(n)).sum()
    }

    pub fn dot(&self, other: &CountVector) -> u64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0u64;
        while i < self.entries.len() && j < other.entries.len() {
            let (ca, na) = self.entries[i];
            let (cb, nb) = other.entries[j];
            match ca.cmp(&cb) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += u64::from(na) * u64::from(nb);
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// One count vector per catalog row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorMatrix {
    width: usize,
    rows: Vec<CountVector>,
}

impl VectorMatrix {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn rows(&self) -> &[CountVector] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
