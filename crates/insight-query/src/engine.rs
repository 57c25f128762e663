use std::sync::Arc;

use insight_core::labels::Labels;
use insight_core::{InsightResult, QueryMatch};
use insight_index::{EmbeddingProvider, SummaryIndex};
use tracing::warn;

use crate::rewrite::SummaryRewriter;

/// Per-call query knobs.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// How many nearest neighbors to retrieve before filtering.
    pub top_k: usize,
    /// Keep only results whose parsed domain equals this value.
    pub domain: Option<String>,
    /// Keep only results whose parsed tag equals this value.
    pub tag: Option<String>,
    /// Pass the top-ranked result through the rewrite post-processor.
    pub rewrite: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            top_k: 5,
            domain: None,
            tag: None,
            rewrite: false,
        }
    }
}

/// Long-lived query handle over an opened summary index.
///
/// Constructed once by the caller (load once, query many) and passed by
/// reference into each [`QueryEngine::query`] call; there is no process-wide
/// singleton. The index is never mutated here, so a shared engine can serve
/// concurrent queries without synchronization.
pub struct QueryEngine {
    index: SummaryIndex,
    embedder: Arc<dyn EmbeddingProvider>,
    rewriter: Option<Arc<dyn SummaryRewriter>>,
}

impl QueryEngine {
    /// Create an engine over an opened index and its embedding provider.
    ///
    /// The provider must be the same one (same model, same dimension) the
    /// index was built with; a dimension drift surfaces as a search error.
    pub fn new(index: SummaryIndex, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            index,
            embedder,
            rewriter: None,
        }
    }

    /// Attach a rewrite post-processor. Chainable builder method.
    pub fn with_rewriter(mut self, rewriter: Arc<dyn SummaryRewriter>) -> Self {
        self.rewriter = Some(rewriter);
        self
    }

    /// The index this engine answers from.
    pub fn index(&self) -> &SummaryIndex {
        &self.index
    }

    /// Answer a free-text question with the closest stored summaries.
    ///
    /// Embeds the question, retrieves the `top_k` nearest records, resolves
    /// each to its summary text and parsed labels, and returns matches in
    /// ascending-distance order (lower score = closer).
    ///
    /// Domain/tag filters apply strictly after retrieval: a filtered-out
    /// result is not backfilled by the next-nearest unseen record, so a
    /// narrow filter can return fewer than `top_k`, or zero, matches even
    /// when matching records exist further down the ranking. A filter that
    /// matches nothing yields an empty list, not an error.
    ///
    /// When `rewrite` is set and a rewriter is attached, only the top-ranked
    /// surviving match's text is rewritten; its score and rank are unchanged,
    /// and a rewriter failure falls back to the original text.
    pub async fn query(&self, text: &str, options: &QueryOptions) -> InsightResult<Vec<QueryMatch>> {
        let query_vector = self.embedder.embed(text).await?;
        let neighbors = self.index.vectors().search(&query_vector, options.top_k)?;

        let mut matches = Vec::with_capacity(neighbors.len());
        for (position, distance) in neighbors {
            let summary = self.index.summaries().get(position)?;
            let labels = Labels::parse(summary);

            if let Some(domain) = &options.domain {
                if labels.domain != *domain {
                    continue;
                }
            }
            if let Some(tag) = &options.tag {
                if labels.tag != *tag {
                    continue;
                }
            }

            matches.push(QueryMatch {
                score: distance,
                summary: summary.to_string(),
                domain: labels.domain,
                tag: labels.tag,
            });
        }

        if options.rewrite {
            if let (Some(rewriter), Some(top)) = (&self.rewriter, matches.first_mut()) {
                match rewriter.rewrite(&top.summary).await {
                    Ok(rewritten) => top.summary = rewritten,
                    Err(e) => {
                        warn!(error = %e, "rewrite failed, keeping original summary");
                    }
                }
            }
        }

        Ok(matches)
    }
}
