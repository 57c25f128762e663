use insight_core::{InsightError, InsightResult};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::embedding::EmbeddingProvider;
use crate::metadata::MetadataStore;
use crate::snapshot::{self, IndexPaths};
use crate::store::VectorStore;

/// The combined (vector store, metadata store) pair, owned and persisted as
/// one unit.
///
/// A `SummaryIndex` is created once by [`SummaryIndex::build`] and then grown
/// by independent producers through sequential [`SummaryIndex::update`]
/// calls; each call's records land after all prior records, so positions
/// reflect update order. There is no in-band locking: builds and updates are
/// offline, exclusive-access operations, and running one updater at a time is
/// operational discipline rather than a library guarantee. A loaded index is
/// immutable during the query phase, so concurrent reads need no
/// synchronization.
#[derive(Debug)]
pub struct SummaryIndex {
    paths: IndexPaths,
    vectors: VectorStore,
    summaries: MetadataStore,
}

impl SummaryIndex {
    /// Build a fresh index from an initial producer batch and persist it.
    ///
    /// Embeds every summary (one provider call per batch, order preserved),
    /// fixes the store dimension from the provider output, and writes both
    /// artifacts. Fails with [`InsightError::EmptyBatch`] when `summaries`
    /// is empty: an index must start with at least one record.
    pub async fn build(
        base: impl Into<PathBuf>,
        summaries: Vec<String>,
        embedder: &dyn EmbeddingProvider,
    ) -> InsightResult<Self> {
        if summaries.is_empty() {
            return Err(InsightError::EmptyBatch);
        }

        let embeddings = embedder.embed_batch(&summaries).await?;
        let dimension = embeddings.first().map(Vec::len).unwrap_or_default();
        if dimension == 0 {
            return Err(InsightError::Embedding(
                "provider returned zero-dimension vectors".to_string(),
            ));
        }

        let mut vectors = VectorStore::new(dimension);
        vectors.append(&embeddings)?;

        let mut texts = MetadataStore::new();
        texts.append(summaries);

        let index = Self {
            paths: IndexPaths::new(base),
            vectors,
            summaries: texts,
        };
        index.persist().await?;
        info!(
            records = index.len(),
            dimension,
            base = %index.paths.base().display(),
            "built summary index"
        );
        Ok(index)
    }

    /// Open an index from its persisted artifact pair.
    ///
    /// A length disagreement between the two artifacts is reported as a
    /// [`InsightError::Persistence`] error and never auto-repaired; the
    /// sanctioned recovery is a full rebuild from the producers.
    pub async fn open(base: impl Into<PathBuf>) -> InsightResult<Self> {
        let paths = IndexPaths::new(base);

        let vector_path = paths.vectors();
        let vector_bytes = read_artifact(&vector_path).await?;
        let vectors = snapshot::decode_vectors(&vector_bytes, &vector_path)?;

        let summary_path = paths.summaries();
        let summary_bytes = read_artifact(&summary_path).await?;
        let summaries = snapshot::decode_summaries(&summary_bytes, &summary_path)?;

        if vectors.len() != summaries.len() {
            return Err(InsightError::Persistence(format!(
                "artifact pair desynchronized under {}: {} vectors vs {} summaries; rebuild the index from producers",
                paths.base().display(),
                vectors.len(),
                summaries.len()
            )));
        }

        Ok(Self {
            paths,
            vectors,
            summaries,
        })
    }

    /// Append a producer batch and persist the grown pair.
    ///
    /// The vector append and the text append carry the identical batch in the
    /// identical order, and both in-memory stores grow before anything is
    /// written, so a persisted pair always describes the same records.
    /// Returns the position assigned to the batch's first record.
    ///
    /// Fails with [`InsightError::EmptyBatch`] on an empty batch and with
    /// [`InsightError::DimensionMismatch`] when the provider's output no
    /// longer matches the stored dimension (the index is left unchanged).
    pub async fn update(
        &mut self,
        summaries: Vec<String>,
        embedder: &dyn EmbeddingProvider,
    ) -> InsightResult<usize> {
        if summaries.is_empty() {
            return Err(InsightError::EmptyBatch);
        }

        let embeddings = embedder.embed_batch(&summaries).await?;
        let start = self.vectors.append(&embeddings)?;
        let batch_len = summaries.len();
        self.summaries.append(summaries);

        self.persist().await?;
        info!(
            appended = batch_len,
            start_position = start,
            records = self.len(),
            base = %self.paths.base().display(),
            "updated summary index"
        );
        Ok(start)
    }

    /// Number of records in the index.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the index holds no records.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// The fixed embedding dimension of this index.
    pub fn dimension(&self) -> usize {
        self.vectors.dimension()
    }

    /// The artifact paths of this index.
    pub fn paths(&self) -> &IndexPaths {
        &self.paths
    }

    /// The vector store half of the pair.
    pub fn vectors(&self) -> &VectorStore {
        &self.vectors
    }

    /// The metadata store half of the pair.
    pub fn summaries(&self) -> &MetadataStore {
        &self.summaries
    }

    /// Write both artifacts as whole-file snapshots.
    ///
    /// Each snapshot is staged to a temporary sibling first, and nothing is
    /// renamed into place until both staged writes have succeeded, so a
    /// failed write never claims success and never clobbers a readable pair.
    /// A crash between the two renames can still leave one artifact ahead of
    /// the other; [`SummaryIndex::open`] detects that as a length desync, and
    /// recovery is re-running the update or rebuilding from producers.
    async fn persist(&self) -> InsightResult<()> {
        let vector_path = self.paths.vectors();
        let summary_path = self.paths.summaries();

        if let Some(parent) = vector_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let vector_staged = snapshot::staging_path(&vector_path);
        let summary_staged = snapshot::staging_path(&summary_path);

        tokio::fs::write(&vector_staged, snapshot::encode_vectors(&self.vectors)).await?;
        tokio::fs::write(&summary_staged, snapshot::encode_summaries(&self.summaries)?).await?;

        tokio::fs::rename(&vector_staged, &vector_path).await?;
        tokio::fs::rename(&summary_staged, &summary_path).await?;
        Ok(())
    }
}

async fn read_artifact(path: &Path) -> InsightResult<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| InsightError::Persistence(format!("failed to read {}: {e}", path.display())))
}
