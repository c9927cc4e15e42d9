//! Similarity ranking of feed items against a reference library.
//!
//! # Architecture
//!
//! - `merger`: Folds feed sources into one deduplicated collection
//! - `summary`: Title + abstract text per item
//! - `encoder`: Vocabulary/IDF fitting and sparse L2-normalized vectors
//! - `scorer`: Dense cross-similarity matrix
//! - `topk`: Partial selection of the best pairs
//! - `pipeline`: Runs the stages in order and reports counts

pub mod encoder;
mod errors;
pub mod merger;
mod pipeline;
pub mod scorer;
mod stopwords;
pub mod summary;
pub mod topk;

pub use encoder::{fit, transform, EncoderOptions, FittedModel, Norm, SparseVector, TermVectors};
pub use errors::{CorpusRole, RankingError};
pub use merger::MergeStats;
pub use pipeline::{PipelineStats, Ranker, RankingReport};
pub use scorer::{score, SimilarityMatrix};
pub use stopwords::StopWords;
pub use summary::{build_summary, Corpus, SummaryStats, DEFAULT_SEPARATOR};
pub use topk::{select_top_k, RankedPair};
