//! Dense cross-similarity between reference and candidate vectors.
//!
//! Vectors are L2-normalized, so a dot product is a cosine similarity.
//! Candidates are indexed by column once; each reference row then only
//! touches the postings of its own non-zero columns.

use rayon::prelude::*;

use crate::ranking::encoder::TermVectors;
use crate::ranking::errors::{CorpusRole, RankingError};

/// Row-major `rows x cols` similarity scores with the ids of both axes.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    rows: usize,
    cols: usize,
    scores: Vec<f32>,
    row_ids: Vec<String>,
    col_ids: Vec<String>,
}

impl SimilarityMatrix {
    /// Build a matrix from raw row-major scores.
    ///
    /// Returns `None` if the id lists do not match the score buffer shape.
    #[cfg(test)]
    pub fn from_scores(
        row_ids: Vec<String>,
        col_ids: Vec<String>,
        scores: Vec<f32>,
    ) -> Option<Self> {
        if row_ids.len() * col_ids.len() != scores.len() {
            return None;
        }
        Some(Self {
            rows: row_ids.len(),
            cols: col_ids.len(),
            scores,
            row_ids,
            col_ids,
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[cfg(test)]
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row < self.rows && col < self.cols {
            Some(self.scores[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn scores(&self) -> &[f32] {
        &self.scores
    }

    pub fn row_ids(&self) -> &[String] {
        &self.row_ids
    }

    pub fn col_ids(&self) -> &[String] {
        &self.col_ids
    }

    /// Split a flat index into `(row, col)`.
    pub fn unravel(&self, flat: usize) -> (usize, usize) {
        (flat / self.cols, flat % self.cols)
    }
}

/// Score every reference vector against every candidate vector.
pub fn score(
    reference: &TermVectors,
    candidates: &TermVectors,
) -> Result<SimilarityMatrix, RankingError> {
    if reference.dimensions != candidates.dimensions {
        return Err(RankingError::DimensionMismatch {
            reference: reference.dimensions,
            candidate: candidates.dimensions,
        });
    }
    if reference.is_empty() {
        return Err(RankingError::EmptyCorpus(CorpusRole::Reference));
    }
    if candidates.is_empty() {
        return Err(RankingError::EmptyCorpus(CorpusRole::Candidate));
    }

    // column -> [(candidate index, weight)]
    let mut postings: Vec<Vec<(u32, f32)>> = vec![Vec::new(); candidates.dimensions];
    for (j, vector) in candidates.vectors.iter().enumerate() {
        for (col, weight) in vector.iter() {
            postings[col as usize].push((j as u32, weight));
        }
    }

    let cols = candidates.len();
    let rows: Vec<Vec<f32>> = reference
        .vectors
        .par_iter()
        .map(|vector| {
            let mut row = vec![0.0f32; cols];
            for (col, weight) in vector.iter() {
                for &(j, other) in &postings[col as usize] {
                    row[j as usize] += weight * other;
                }
            }
            row
        })
        .collect();

    log::debug!(
        "scored {}x{} similarity matrix",
        reference.len(),
        candidates.len()
    );

    Ok(SimilarityMatrix {
        rows: reference.len(),
        cols,
        scores: rows.concat(),
        row_ids: reference.ids.clone(),
        col_ids: candidates.ids.clone(),
    })
}
