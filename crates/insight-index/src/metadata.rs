use insight_core::{InsightError, InsightResult};

/// Ordered summary text storage, positionally aligned with a
/// [`crate::VectorStore`].
///
/// Position `i` here and in the vector store describe the same logical
/// record. Appends preserve input order and never touch existing positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataStore {
    summaries: Vec<String>,
}

impl MetadataStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of summaries currently stored.
    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    /// Whether the store holds no summaries.
    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    /// Append summaries in input order.
    pub fn append(&mut self, texts: Vec<String>) {
        self.summaries.extend(texts);
    }

    /// Return the summary at `position`.
    ///
    /// Fails with [`InsightError::OutOfRange`] when `position` is at or past
    /// the current length; that signals either a caller bug or a corrupted
    /// index, never a condition to paper over.
    pub fn get(&self, position: usize) -> InsightResult<&str> {
        self.summaries
            .get(position)
            .map(String::as_str)
            .ok_or(InsightError::OutOfRange {
                position,
                len: self.summaries.len(),
            })
    }

    /// Iterate over all summaries in position order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.summaries.iter().map(String::as_str)
    }

    /// Rebuild a store from decoded snapshot lines.
    pub(crate) fn from_lines(summaries: Vec<String>) -> Self {
        Self { summaries }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn append_preserves_order() {
        let mut store = MetadataStore::new();
        store.append(vec!["first".to_string(), "second".to_string()]);
        store.append(vec!["third".to_string()]);

        assert_eq!(store.len(), 3);
        assert_eq!(store.get(0).unwrap(), "first");
        assert_eq!(store.get(1).unwrap(), "second");
        assert_eq!(store.get(2).unwrap(), "third");
    }

    #[test]
    fn get_past_end_is_out_of_range() {
        let mut store = MetadataStore::new();
        store.append(vec!["only".to_string()]);

        let err = store.get(1).unwrap_err();
        assert!(matches!(
            err,
            InsightError::OutOfRange {
                position: 1,
                len: 1
            }
        ));
    }

    #[test]
    fn iter_walks_positions_in_order() {
        let mut store = MetadataStore::new();
        store.append(vec!["a".to_string(), "b".to_string(), "c".to_string()]);
        let collected: Vec<&str> = store.iter().collect();
        assert_eq!(collected, vec!["a", "b", "c"]);
    }
}
