//! End-to-end ranking of feed items against the reference library.
//!
//! merge -> summarize -> fit on reference -> transform both -> score -> top K.
//! Any failing stage aborts the batch; there are no partial results.

use serde::Serialize;

use crate::config::RankingConfig;
use crate::items::ItemCollection;
use crate::ranking::encoder::{self, EncoderOptions};
use crate::ranking::errors::{CorpusRole, RankingError};
use crate::ranking::merger::{self, MergeStats};
use crate::ranking::scorer;
use crate::ranking::summary::{self, SummaryStats};
use crate::ranking::topk::{self, RankedPair};

/// Per-stage counts for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineStats {
    pub merge: MergeStats,
    pub reference: SummaryStats,
    pub candidates: SummaryStats,
    pub vocabulary_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingReport {
    pub pairs: Vec<RankedPair>,
    pub stats: PipelineStats,
    /// Merged feed the candidate ids refer to
    #[serde(skip)]
    pub feed: ItemCollection,
}

pub struct Ranker {
    config: RankingConfig,
}

impl Ranker {
    pub fn new(config: RankingConfig) -> Self {
        Self { config }
    }

    /// Rank merged feed sources against the reference collection.
    #[tracing::instrument(name = "rank", skip_all, fields(sources = sources.len()))]
    pub fn rank(
        &self,
        reference: &ItemCollection,
        sources: Vec<ItemCollection>,
    ) -> Result<RankingReport, RankingError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.thread_count())
            .build()
            .map_err(|e| RankingError::ThreadPool(e.to_string()))?;

        pool.install(|| self.run(reference, sources))
    }

    fn run(
        &self,
        reference: &ItemCollection,
        sources: Vec<ItemCollection>,
    ) -> Result<RankingReport, RankingError> {
        let (feed, merge_stats) = tracing::info_span!("merge").in_scope(|| merger::merge(sources));
        log::info!(
            "Merged {} feed items from {} sources ({} duplicates replaced).",
            merge_stats.items_merged,
            merge_stats.sources,
            merge_stats.duplicates_replaced
        );

        let separator = self.config.separator.as_str();
        let summarize_span = tracing::info_span!("summarize").entered();

        let (reference_corpus, reference_stats) = summary::build_summary(reference, separator);
        log::info!(
            "Created summary for {}/{} documents ({} skipped).",
            reference_stats.included,
            reference_stats.total,
            reference_stats.skipped()
        );

        let (feed_corpus, feed_stats) = summary::build_summary(&feed, separator);
        log::info!(
            "Created summary for {}/{} feed items ({} skipped).",
            feed_stats.included,
            feed_stats.total,
            feed_stats.skipped()
        );
        drop(summarize_span);

        if reference_corpus.is_empty() {
            return Err(RankingError::EmptyCorpus(CorpusRole::Reference));
        }
        if feed_corpus.is_empty() {
            return Err(RankingError::EmptyCorpus(CorpusRole::Candidate));
        }

        let (model, reference_vectors, feed_vectors) =
            tracing::info_span!("encode").in_scope(|| {
                let model = encoder::fit(&reference_corpus, &self.encoder_options())?;
                log::info!("Vocabulary holds {} terms.", model.dimensions());

                let reference_vectors = encoder::transform(&model, &reference_corpus);
                let feed_vectors = encoder::transform(&model, &feed_corpus);
                Ok::<_, RankingError>((model, reference_vectors, feed_vectors))
            })?;

        let matrix = tracing::info_span!("score")
            .in_scope(|| scorer::score(&reference_vectors, &feed_vectors))?;
        let pairs = topk::select_top_k(&matrix, self.config.top_k);

        let (rows, cols) = matrix.shape();
        log::debug!("selected {} of {}x{} pairs", pairs.len(), rows, cols);

        Ok(RankingReport {
            pairs,
            stats: PipelineStats {
                merge: merge_stats,
                reference: reference_stats,
                candidates: feed_stats,
                vocabulary_size: model.dimensions(),
            },
            feed,
        })
    }

    fn encoder_options(&self) -> EncoderOptions {
        EncoderOptions {
            min_df: self.config.min_df,
            max_df: self.config.max_df,
            stop_words: self.config.stop_words,
            norm: self.config.norm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ItemRecord;
    use std::num::NonZeroUsize;

    fn permissive(top_k: usize) -> RankingConfig {
        RankingConfig {
            min_df: 1,
            max_df: 1.0,
            top_k: NonZeroUsize::new(top_k).unwrap(),
            ..Default::default()
        }
    }

    fn collection(records: Vec<ItemRecord>) -> ItemCollection {
        records.into_iter().collect()
    }

    #[test]
    fn test_rank_reports_stats() {
        let reference = collection(vec![
            ItemRecord::new("lib-1", "Graph neural networks").with_abstract("message passing"),
            ItemRecord::new("lib-2", "No abstract here"),
        ]);
        let feed = vec![
            collection(vec![
                ItemRecord::new("f-1", "Message passing graphs").with_abstract("a survey"),
            ]),
            collection(vec![
                ItemRecord::new("f-1", "Message passing graphs").with_abstract("a survey, v2"),
                ItemRecord::new("f-2", "Cooking").with_abstract("recipes"),
            ]),
        ];

        let report = Ranker::new(permissive(5)).rank(&reference, feed).unwrap();

        assert_eq!(report.stats.merge.items_merged, 2);
        assert_eq!(report.stats.merge.duplicates_replaced, 1);
        assert_eq!(report.stats.reference, SummaryStats { total: 2, included: 1 });
        assert_eq!(report.stats.candidates, SummaryStats { total: 2, included: 2 });
        assert_eq!(report.pairs.len(), 2);
        assert_eq!(report.pairs[0].candidate_id, "f-1");

        // merged feed comes back with the later source's record
        assert_eq!(report.feed.len(), 2);
        assert_eq!(
            report.feed.get("f-1").unwrap().abstract_note.as_deref(),
            Some("a survey, v2")
        );
    }

    #[test]
    fn test_rank_empty_reference_corpus() {
        let reference = collection(vec![ItemRecord::new("lib-1", "Title only")]);
        let feed = vec![collection(vec![
            ItemRecord::new("f-1", "Feed").with_abstract("item"),
        ])];

        let result = Ranker::new(permissive(1)).rank(&reference, feed);
        assert!(matches!(
            result,
            Err(RankingError::EmptyCorpus(CorpusRole::Reference))
        ));
    }

    #[test]
    fn test_rank_empty_candidate_corpus() {
        let reference = collection(vec![
            ItemRecord::new("lib-1", "Graph").with_abstract("networks"),
        ]);

        let result = Ranker::new(permissive(1)).rank(&reference, vec![]);
        assert!(matches!(
            result,
            Err(RankingError::EmptyCorpus(CorpusRole::Candidate))
        ));
    }

    #[test]
    fn test_rank_default_filters_on_tiny_library() {
        let reference = collection(vec![
            ItemRecord::new("lib-1", "Graph").with_abstract("networks"),
        ]);
        let feed = vec![collection(vec![
            ItemRecord::new("f-1", "Graph").with_abstract("networks"),
        ])];

        let result = Ranker::new(RankingConfig::default()).rank(&reference, feed);
        assert!(matches!(result, Err(RankingError::EmptyVocabulary { .. })));
    }
}
