//! Plain-text rendering of items and ranked pairs.

use crate::items::{ItemCollection, ItemRecord};
use crate::ranking::{RankedPair, RankingReport};

fn field(name: &str, value: &str) -> String {
    format!("        {name:16}: {value}\n")
}

pub fn format_record(record: &ItemRecord) -> String {
    let mut buffer = field("id", &record.id);
    if let Some(title) = &record.title {
        buffer.push_str(&field("title", title));
    }
    if let Some(abstract_note) = &record.abstract_note {
        buffer.push_str(&field("abstractNote", abstract_note));
    }
    if !record.creators.is_empty() {
        buffer.push_str(&field("creators", &record.creators.join(", ")));
    }
    if let Some(link) = &record.link {
        buffer.push_str(&field("link", link));
    }
    buffer
}

pub fn format_items(items: &ItemCollection) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, record)| format!("{i:4}\n{}", format_record(record)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_side(items: &ItemCollection, id: &str) -> String {
    items
        .get(id)
        .map(format_record)
        .unwrap_or_else(|| field("id", id))
}

fn format_pair(pair: &RankedPair, library: &ItemCollection, feed: &ItemCollection) -> String {
    format!(
        "{}    matches\n{}    Score: {:.4}\n",
        format_side(library, &pair.reference_id),
        format_side(feed, &pair.candidate_id),
        pair.score
    )
}

/// Render stage counts followed by every pair with both full records.
pub fn format_report(report: &RankingReport, library: &ItemCollection) -> String {
    let stats = &report.stats;
    let mut buffer = format!(
        "library: {}/{} summarized ({} skipped), feed: {}/{} summarized ({} skipped, {} merged from {} sources), vocabulary: {} terms\n\n",
        stats.reference.included,
        stats.reference.total,
        stats.reference.skipped(),
        stats.candidates.included,
        stats.candidates.total,
        stats.candidates.skipped(),
        stats.merge.items_merged,
        stats.merge.sources,
        stats.vocabulary_size
    );

    for (rank, pair) in report.pairs.iter().enumerate() {
        buffer.push_str(&format!("#{}\n", rank + 1));
        buffer.push_str(&format_pair(pair, library, &report.feed));
        buffer.push_str("----\n");
    }
    buffer
}
