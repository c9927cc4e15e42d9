//! Summary text for each item.
//!
//! An item becomes part of the corpus only if it has both a title and an
//! abstract. No normalization happens here; the encoder owns that.

use serde::Serialize;

use crate::items::ItemCollection;

/// Separator placed between title and abstract.
pub const DEFAULT_SEPARATOR: &str = "; ";

/// Ordered id -> summary mapping. Entry order is the row/column order used
/// by vectors and the similarity matrix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    ids: Vec<String>,
    texts: Vec<String>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: impl Into<String>, text: impl Into<String>) {
        self.ids.push(id.into());
        self.texts.push(text.into());
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    #[cfg(test)]
    pub fn get(&self, id: &str) -> Option<&str> {
        self.ids
            .iter()
            .position(|i| i == id)
            .map(|pos| self.texts[pos].as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Corpus {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut corpus = Corpus::new();
        for (id, text) in iter {
            corpus.push(id, text);
        }
        corpus
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SummaryStats {
    pub total: usize,
    pub included: usize,
}

impl SummaryStats {
    pub fn skipped(&self) -> usize {
        self.total - self.included
    }
}

/// Build the corpus for a collection, skipping items without title or abstract.
pub fn build_summary(items: &ItemCollection, separator: &str) -> (Corpus, SummaryStats) {
    let mut corpus = Corpus::new();

    for record in items.iter() {
        let title = record.title.as_deref().filter(|t| !t.is_empty());
        let abstract_note = record.abstract_note.as_deref().filter(|a| !a.is_empty());

        if let (Some(title), Some(abstract_note)) = (title, abstract_note) {
            corpus.push(record.id.as_str(), format!("{title}{separator}{abstract_note}"));
        }
    }

    let stats = SummaryStats {
        total: items.len(),
        included: corpus.len(),
    };

    (corpus, stats)
}
