//! Term-weighting vector encoder.
//!
//! `fit` learns a vocabulary and smoothed IDF weights from the reference
//! corpus and returns an immutable [`FittedModel`]. The same model is then
//! used to `transform` both corpora so their vectors share one coordinate
//! space.
//!
//! Text handling:
//! 1. Lowercase
//! 2. Strip accents (NFKD, combining marks dropped)
//! 3. Tokens are runs of two or more word characters
//! 4. Drop stop words

use std::collections::{BTreeMap, HashMap, HashSet};

use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::ranking::errors::{CorpusRole, RankingError};
use crate::ranking::stopwords::StopWords;
use crate::ranking::summary::Corpus;

static TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("Failed to compile token regex"));

/// Vector normalization. Only unit Euclidean length is supported, which is
/// what makes dot products equal cosine similarity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    #[default]
    L2,
}

/// Settings that shape the fitted vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderOptions {
    /// Minimum number of reference documents a term must appear in
    pub min_df: usize,
    /// Maximum fraction of reference documents a term may appear in
    pub max_df: f32,
    pub stop_words: StopWords,
    pub norm: Norm,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            min_df: 1,
            max_df: 1.0,
            stop_words: StopWords::English,
            norm: Norm::L2,
        }
    }
}

/// Sparse vector with strictly increasing column indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    pub indices: Vec<u32>,
    pub values: Vec<f32>,
}

impl SparseVector {
    pub fn is_zero(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    #[cfg(test)]
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut a, mut b) = (0, 0);
        let mut sum = 0.0;
        while a < self.indices.len() && b < other.indices.len() {
            match self.indices[a].cmp(&other.indices[b]) {
                std::cmp::Ordering::Less => a += 1,
                std::cmp::Ordering::Greater => b += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[a] * other.values[b];
                    a += 1;
                    b += 1;
                }
            }
        }
        sum
    }

    pub fn l2_norm(&self) -> f32 {
        self.values.iter().map(|v| v * v).sum::<f32>().sqrt()
    }
}

/// Vectors for one corpus, in corpus order, tagged with the model dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct TermVectors {
    pub dimensions: usize,
    pub ids: Vec<String>,
    pub vectors: Vec<SparseVector>,
}

impl TermVectors {
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

/// Vocabulary and IDF weights learned from a reference corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedModel {
    /// Terms in column order (lexicographic)
    terms: Vec<String>,
    columns: HashMap<String, u32>,
    idf: Vec<f32>,
    stop_words: StopWords,
    norm: Norm,
}

impl FittedModel {
    pub fn dimensions(&self) -> usize {
        self.terms.len()
    }

    #[cfg(test)]
    pub fn vocabulary(&self) -> &[String] {
        &self.terms
    }

    pub fn column(&self, term: &str) -> Option<u32> {
        self.columns.get(term).copied()
    }

    #[cfg(test)]
    pub fn idf(&self, term: &str) -> Option<f32> {
        self.column(term).map(|c| self.idf[c as usize])
    }

    fn encode(&self, text: &str) -> SparseVector {
        let mut counts: BTreeMap<u32, f32> = BTreeMap::new();
        for token in tokenize(text, self.stop_words) {
            if let Some(col) = self.column(&token) {
                *counts.entry(col).or_insert(0.0) += 1.0;
            }
        }

        let (indices, values): (Vec<u32>, Vec<f32>) = counts
            .into_iter()
            .map(|(col, tf)| (col, tf * self.idf[col as usize]))
            .unzip();
        let mut vector = SparseVector { indices, values };

        match self.norm {
            Norm::L2 => {
                let norm = vector.l2_norm();
                if norm > 0.0 {
                    vector.values.iter_mut().for_each(|v| *v /= norm);
                }
            }
        }

        vector
    }
}

/// Lowercase and strip accents.
fn preprocess(text: &str) -> String {
    text.to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Split text into normalized terms with stop words removed.
pub fn tokenize(text: &str, stop_words: StopWords) -> Vec<String> {
    let text = preprocess(text);
    TOKEN_REGEX
        .find_iter(&text)
        .map(|m| m.as_str())
        .filter(|t| !stop_words.contains(t))
        .map(str::to_string)
        .collect()
}

/// Learn vocabulary and IDF weights from the reference corpus.
pub fn fit(reference: &Corpus, options: &EncoderOptions) -> Result<FittedModel, RankingError> {
    if reference.is_empty() {
        return Err(RankingError::EmptyCorpus(CorpusRole::Reference));
    }

    let n_docs = reference.len();

    // term -> number of documents containing it
    let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
    for text in reference.texts() {
        let unique: HashSet<String> = tokenize(text, options.stop_words).into_iter().collect();
        for term in unique {
            *document_frequency.entry(term).or_insert(0) += 1;
        }
    }

    let max_doc_count = options.max_df as f64 * n_docs as f64;
    let surviving: Vec<(String, usize)> = document_frequency
        .into_iter()
        .filter(|(_, df)| *df >= options.min_df && (*df as f64) <= max_doc_count)
        .collect();

    if surviving.is_empty() {
        return Err(RankingError::EmptyVocabulary {
            documents: n_docs,
            min_df: options.min_df,
            max_df: options.max_df,
        });
    }

    let mut terms = Vec::with_capacity(surviving.len());
    let mut columns = HashMap::with_capacity(surviving.len());
    let mut idf = Vec::with_capacity(surviving.len());

    for (col, (term, df)) in surviving.into_iter().enumerate() {
        let weight = ((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0;
        columns.insert(term.clone(), col as u32);
        terms.push(term);
        idf.push(weight as f32);
    }

    log::debug!(
        "fitted vocabulary of {} terms on {} reference documents",
        terms.len(),
        n_docs
    );

    Ok(FittedModel {
        terms,
        columns,
        idf,
        stop_words: options.stop_words,
        norm: options.norm,
    })
}

/// Encode every corpus entry with a fitted model, keeping corpus order.
pub fn transform(model: &FittedModel, corpus: &Corpus) -> TermVectors {
    let vectors: Vec<SparseVector> = corpus
        .texts()
        .par_iter()
        .map(|text| model.encode(text))
        .collect();

    let empty = vectors.iter().filter(|v| v.is_zero()).count();
    if empty > 0 {
        log::debug!(
            "{}/{} documents share no term with the vocabulary",
            empty,
            vectors.len()
        );
    }

    TermVectors {
        dimensions: model.dimensions(),
        ids: corpus.ids().to_vec(),
        vectors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(entries: &[(&str, &str)]) -> Corpus {
        entries.iter().map(|(id, text)| (*id, *text)).collect()
    }

    fn permissive() -> EncoderOptions {
        EncoderOptions::default()
    }

    #[test]
    fn test_tokenize_lowercases_and_strips_accents() {
        let tokens = tokenize("Café RÉSUMÉ naïve", StopWords::None);
        assert_eq!(tokens, vec!["cafe", "resume", "naive"]);
    }

    #[test]
    fn test_tokenize_drops_single_chars_and_stop_words() {
        let tokens = tokenize("A study of x-ray graphs; the survey", StopWords::English);
        assert_eq!(tokens, vec!["study", "ray", "graphs", "survey"]);
    }

    #[test]
    fn test_fit_vocabulary_is_sorted() {
        let reference = corpus(&[("a", "zebra apple mango"), ("b", "apple kiwi")]);
        let model = fit(&reference, &permissive()).unwrap();

        assert_eq!(model.vocabulary(), &["apple", "kiwi", "mango", "zebra"]);
        assert_eq!(model.column("kiwi"), Some(1));
    }

    #[test]
    fn test_fit_smoothed_idf() {
        let reference = corpus(&[("a", "apple kiwi"), ("b", "apple"), ("c", "apple")]);
        let model = fit(&reference, &permissive()).unwrap();

        // apple in every document: ln(4/4) + 1
        assert!((model.idf("apple").unwrap() - 1.0).abs() < 1e-6);
        // kiwi in one document: ln(4/2) + 1
        let expected = (2.0f32).ln() + 1.0;
        assert!((model.idf("kiwi").unwrap() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_fit_min_df_filter() {
        let reference = corpus(&[("a", "apple kiwi"), ("b", "apple mango")]);
        let options = EncoderOptions {
            min_df: 2,
            ..permissive()
        };
        let model = fit(&reference, &options).unwrap();
        assert_eq!(model.vocabulary(), &["apple"]);
    }

    #[test]
    fn test_fit_max_df_filter() {
        let reference = corpus(&[
            ("a", "apple kiwi"),
            ("b", "apple mango"),
            ("c", "apple melon"),
            ("d", "apple grape"),
        ]);
        let options = EncoderOptions {
            max_df: 0.5,
            ..permissive()
        };
        let model = fit(&reference, &options).unwrap();
        assert!(model.column("apple").is_none());
        assert_eq!(model.dimensions(), 4);
    }

    #[test]
    fn test_fit_empty_vocabulary_error() {
        let reference = corpus(&[("a", "graph neural networks")]);
        let options = EncoderOptions {
            min_df: 10,
            max_df: 0.25,
            ..permissive()
        };

        let result = fit(&reference, &options);
        assert!(matches!(
            result,
            Err(RankingError::EmptyVocabulary { documents: 1, min_df: 10, .. })
        ));
    }

    #[test]
    fn test_fit_only_stop_words_is_empty_vocabulary() {
        let reference = corpus(&[("a", "the of and")]);
        let result = fit(&reference, &permissive());
        assert!(matches!(result, Err(RankingError::EmptyVocabulary { .. })));
    }

    #[test]
    fn test_fit_empty_corpus_error() {
        let result = fit(&Corpus::new(), &permissive());
        assert!(matches!(
            result,
            Err(RankingError::EmptyCorpus(CorpusRole::Reference))
        ));
    }

    #[test]
    fn test_transform_unit_length() {
        let reference = corpus(&[("a", "apple apple kiwi"), ("b", "mango kiwi")]);
        let model = fit(&reference, &permissive()).unwrap();
        let vectors = transform(&model, &reference);

        assert_eq!(vectors.dimensions, 3);
        assert_eq!(vectors.ids, vec!["a", "b"]);
        for v in &vectors.vectors {
            assert!((v.l2_norm() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_transform_ignores_unknown_terms() {
        let reference = corpus(&[("a", "apple kiwi")]);
        let model = fit(&reference, &permissive()).unwrap();

        let candidates = corpus(&[("x", "banana cherry"), ("y", "kiwi banana")]);
        let vectors = transform(&model, &candidates);

        assert!(vectors.vectors[0].is_zero());
        assert_eq!(vectors.vectors[1].indices, vec![1]);
        assert!((vectors.vectors[1].values[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_transform_is_deterministic() {
        let reference = corpus(&[
            ("a", "Graph neural networks; message passing on graphs"),
            ("b", "Diffusion models; denoising score matching"),
            ("c", "Message passing for diffusion on graphs"),
        ]);

        let first = transform(&fit(&reference, &permissive()).unwrap(), &reference);
        let second = transform(&fit(&reference, &permissive()).unwrap(), &reference);

        assert_eq!(first, second);
        for (a, b) in first.vectors.iter().zip(second.vectors.iter()) {
            let bits_a: Vec<u32> = a.values.iter().map(|v| v.to_bits()).collect();
            let bits_b: Vec<u32> = b.values.iter().map(|v| v.to_bits()).collect();
            assert_eq!(bits_a, bits_b);
        }
    }

    #[test]
    fn test_sparse_dot() {
        let a = SparseVector {
            indices: vec![0, 2, 5],
            values: vec![1.0, 2.0, 3.0],
        };
        let b = SparseVector {
            indices: vec![2, 3, 5],
            values: vec![4.0, 1.0, 0.5],
        };
        assert!((a.dot(&b) - 9.5).abs() < 1e-6);
    }
}
