use async_trait::async_trait;
use insight_core::InsightResult;

/// Trait for the optional rewrite post-processor.
///
/// Implementations rephrase a retrieved summary for readability. The query
/// pipeline treats every rewrite failure as "no rewrite": the original text
/// is returned and the query still succeeds, so an implementation may fail
/// freely (a remote rephrasing service being down must never break search).
#[async_trait]
pub trait SummaryRewriter: Send + Sync {
    /// Produce a reader-friendly rendition of `text`.
    async fn rewrite(&self, text: &str) -> InsightResult<String>;
}

/// Local rewriter that strips the `[domain:..][tag:..]` prefix and collapses
/// runs of whitespace.
///
/// Summaries carry their classification labels inline, which is useful for
/// filtering but noisy to read back to a person. This is the offline
/// counterpart to a model-backed rephrasing service; swap one in behind the
/// same trait for fluent rewording.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixStripRewriter;

#[async_trait]
impl SummaryRewriter for PrefixStripRewriter {
    async fn rewrite(&self, text: &str) -> InsightResult<String> {
        let stripped = strip_label_prefix(text);
        let collapsed: Vec<&str> = stripped.split_whitespace().collect();
        Ok(collapsed.join(" "))
    }
}

/// Remove a leading `[domain:..]` segment and, if present, the `[tag:..]`
/// segment that follows it. Text without the convention is returned as-is.
fn strip_label_prefix(text: &str) -> &str {
    let Some(after_domain) = skip_bracket(text, "[domain:") else {
        return text;
    };
    skip_bracket(after_domain, "[tag:").unwrap_or(after_domain)
}

fn skip_bracket<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(prefix)?;
    let end = rest.find(']')?;
    Some(&rest[end + 1..])
}
