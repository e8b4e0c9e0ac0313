use std::collections::HashMap;

use crate::models::TagRecord;

/// Ordered catalog rows plus a title index.
///
/// Titles need not be unique; lookups resolve to the first row carrying the title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    records: Vec<TagRecord>,
    by_title: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(records: Vec<TagRecord>) -> Self {
        let mut by_title = HashMap::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            by_title.entry(record.title.clone()).or_insert(index);
        }
        Self { records, by_title }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TagRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&TagRecord> {
        self.records.get(index)
    }

    /// Case-sensitive exact match
    pub fn lookup_by_title(&self, title: &str) -> Option<usize> {
        self.by_title.get(title).copied()
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|record| record.title.as_str())
    }

    /// Case-insensitive substring search in catalog order, stopping at `limit`.
    /// An empty query matches nothing.
    pub fn search_by_prefix_or_substring(&self, query: &str, limit: usize) -> Vec<String> {
        if query.is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        self.titles()
            .filter(|title| title.to_lowercase().contains(&needle))
            .take(limit)
            .map(str::to_string)
            .collect()
    }
}
