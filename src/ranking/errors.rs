use std::fmt;

/// Which side of the cross-product a corpus belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusRole {
    Reference,
    Candidate,
}

impl fmt::Display for CorpusRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorpusRole::Reference => write!(f, "reference"),
            CorpusRole::Candidate => write!(f, "candidate"),
        }
    }
}

/// Errors that abort a ranking batch.
#[derive(Debug, thiserror::Error)]
pub enum RankingError {
    #[error(
        "no term survives the frequency filters over {documents} reference documents \
         (min_df={min_df}, max_df={max_df})"
    )]
    EmptyVocabulary {
        documents: usize,
        min_df: usize,
        max_df: f32,
    },

    #[error("Dimension mismatch: reference vectors have {reference}, candidate vectors have {candidate}")]
    DimensionMismatch { reference: usize, candidate: usize },

    #[error("{0} corpus has no eligible items")]
    EmptyCorpus(CorpusRole),

    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),
}
