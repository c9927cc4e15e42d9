//! Top-K selection over a similarity matrix.
//!
//! Partitions the flat score buffer around the K-th best entry with
//! `select_nth_unstable_by` (average linear time), then sorts only the K
//! survivors. Ties are broken by ascending flat index so the result only
//! depends on the matrix contents.

use std::cmp::Ordering;
use std::num::NonZeroUsize;

use serde::Serialize;

use crate::ranking::scorer::SimilarityMatrix;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPair {
    pub reference_id: String,
    pub candidate_id: String,
    pub score: f32,
}

/// Best first: higher score, then lower flat index.
fn by_rank(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

/// Return the `k` highest-scoring pairs, best first.
pub fn select_top_k(matrix: &SimilarityMatrix, k: NonZeroUsize) -> Vec<RankedPair> {
    let mut entries: Vec<(usize, f32)> = matrix.scores().iter().copied().enumerate().collect();
    let k = k.get().min(entries.len());
    if k == 0 {
        return vec![];
    }

    if k < entries.len() {
        entries.select_nth_unstable_by(k - 1, by_rank);
        entries.truncate(k);
    }
    entries.sort_unstable_by(by_rank);

    entries
        .into_iter()
        .map(|(flat, score)| {
            let (row, col) = matrix.unravel(flat);
            RankedPair {
                reference_id: matrix.row_ids()[row].clone(),
                candidate_id: matrix.col_ids()[col].clone(),
                score,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: usize, cols: usize, scores: Vec<f32>) -> SimilarityMatrix {
        SimilarityMatrix::from_scores(
            (0..rows).map(|i| format!("ref-{i}")).collect(),
            (0..cols).map(|j| format!("cand-{j}")).collect(),
            scores,
        )
        .unwrap()
    }

    fn k(value: usize) -> NonZeroUsize {
        NonZeroUsize::new(value).unwrap()
    }

    #[test]
    fn test_top_k_basic() {
        let m = matrix(2, 3, vec![0.1, 0.9, 0.3, 0.7, 0.2, 0.8]);
        let pairs = select_top_k(&m, k(3));

        let scores: Vec<f32> = pairs.iter().map(|p| p.score).collect();
        assert_eq!(scores, vec![0.9, 0.8, 0.7]);
        assert_eq!(pairs[0].reference_id, "ref-0");
        assert_eq!(pairs[0].candidate_id, "cand-1");
        assert_eq!(pairs[1].reference_id, "ref-1");
        assert_eq!(pairs[1].candidate_id, "cand-2");
    }

    #[test]
    fn test_k_larger_than_matrix_returns_all_sorted() {
        let m = matrix(2, 2, vec![0.4, 0.1, 0.3, 0.2]);
        let pairs = select_top_k(&m, k(100));

        assert_eq!(pairs.len(), 4);
        let scores: Vec<f32> = pairs.iter().map(|p| p.score).collect();
        assert_eq!(scores, vec![0.4, 0.3, 0.2, 0.1]);

        let mut seen: Vec<(String, String)> = pairs
            .iter()
            .map(|p| (p.reference_id.clone(), p.candidate_id.clone()))
            .collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_ties_break_by_position() {
        let m = matrix(2, 2, vec![0.5, 0.5, 0.5, 0.5]);

        let pairs = select_top_k(&m, k(2));
        assert_eq!(pairs[0].candidate_id, "cand-0");
        assert_eq!(pairs[0].reference_id, "ref-0");
        assert_eq!(pairs[1].candidate_id, "cand-1");
        assert_eq!(pairs[1].reference_id, "ref-0");

        assert_eq!(select_top_k(&m, k(2)), pairs);
    }

    #[test]
    fn test_k_equal_to_entries() {
        let m = matrix(1, 3, vec![0.2, 0.6, 0.4]);
        let pairs = select_top_k(&m, k(3));
        let scores: Vec<f32> = pairs.iter().map(|p| p.score).collect();
        assert_eq!(scores, vec![0.6, 0.4, 0.2]);
    }
}
