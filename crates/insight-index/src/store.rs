use insight_core::{InsightError, InsightResult};
use std::cmp::Ordering;

/// Fixed-dimension vector storage with exact nearest-neighbor search.
///
/// Vectors are held in one contiguous row-major buffer; position `i` is the
/// slice `data[i * dimension .. (i + 1) * dimension]`. The store is strictly
/// append-only and the dimension is fixed at creation.
///
/// Search is a brute-force O(N·D) scan per query. That is the intentional
/// scaling ceiling for this index: at tens of thousands of short business
/// summaries the scan is fast and exact, and there is no approximate
/// structure to drift out of sync with the metadata. If record counts ever
/// outgrow this, the evolution path is a pluggable search strategy behind
/// the same contract, not a silent algorithm change.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorStore {
    dimension: usize,
    data: Vec<f32>,
}

impl VectorStore {
    /// Create an empty store, fixing the dimension for its lifetime.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: Vec::new(),
        }
    }

    /// The fixed vector dimension of this store.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of vectors currently stored.
    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    /// Whether the store holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append vectors in input order, returning the position assigned to the
    /// first one.
    ///
    /// Every input vector is validated against the store dimension before
    /// anything is written: on [`InsightError::DimensionMismatch`] the store
    /// is left unchanged.
    pub fn append(&mut self, vectors: &[Vec<f32>]) -> InsightResult<usize> {
        for vector in vectors {
            if vector.len() != self.dimension {
                return Err(InsightError::DimensionMismatch {
                    expected: self.dimension,
                    actual: vector.len(),
                });
            }
        }

        let start = self.len();
        for vector in vectors {
            self.data.extend_from_slice(vector);
        }
        Ok(start)
    }

    /// Return the vector stored at `position`, if any.
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        if position >= self.len() {
            return None;
        }
        let offset = position * self.dimension;
        Some(&self.data[offset..offset + self.dimension])
    }

    /// Find the `k` stored vectors closest to `query` by squared Euclidean
    /// distance, closest first.
    ///
    /// Returns `min(k, len)` `(position, distance)` pairs sorted by
    /// non-decreasing distance; equal distances rank the earlier insertion
    /// first, so results are deterministic. `k == 0` yields no results.
    ///
    /// Fails with [`InsightError::EmptyStore`] when no vectors are stored and
    /// with [`InsightError::DimensionMismatch`] when the query vector's
    /// length differs from the store dimension.
    pub fn search(&self, query: &[f32], k: usize) -> InsightResult<Vec<(usize, f32)>> {
        if self.is_empty() {
            return Err(InsightError::EmptyStore);
        }
        if query.len() != self.dimension {
            return Err(InsightError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, row)| (position, squared_distance(query, row)))
            .collect();

        scored.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(k);

        Ok(scored)
    }

    /// Rebuild a store from a flat row-major buffer (snapshot decoding).
    pub(crate) fn from_flat(dimension: usize, data: Vec<f32>) -> Self {
        Self { dimension, data }
    }

    /// The flat row-major buffer (snapshot encoding).
    pub(crate) fn as_flat_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Squared Euclidean distance between two equal-length vectors.
fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
