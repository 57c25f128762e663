//! Core types and error definitions for the Insight summary index.
//!
//! This crate provides the foundational types shared across all Insight
//! crates: the unified error enum, the result alias, the query result shape,
//! and the domain/tag label convention parser.
//!
//! # Main types
//!
//! - [`InsightError`] — Unified error enum for all Insight subsystems.
//! - [`InsightResult`] — Convenience alias for `Result<T, InsightError>`.
//! - [`QueryMatch`] — One ranked answer produced by the query pipeline.
//! - [`labels::Labels`] — Domain/tag labels parsed from a summary prefix.

/// Domain/tag label extraction from summary text.
pub mod labels;

use serde::{Deserialize, Serialize};

// --- Error types ---

/// Top-level error type for the Insight summary index.
///
/// Structural invariant violations (dimension mismatch, desynchronized
/// artifact pair) are never auto-repaired; they are reported so the operator
/// can rebuild the index from the producers.
#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    /// A vector's length violates the store's fixed dimension. The store is
    /// left unchanged.
    #[error("dimension mismatch: store expects {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimension the store was created with.
        expected: usize,
        /// The dimension of the offending vector.
        actual: usize,
    },

    /// A search was issued against a store holding no records.
    #[error("vector store is empty")]
    EmptyStore,

    /// A build or update was attempted with zero summaries.
    #[error("summary batch is empty")]
    EmptyBatch,

    /// A positional lookup beyond the current store length.
    #[error("position {position} out of range for store of length {len}")]
    OutOfRange {
        /// The requested position.
        position: usize,
        /// The store length at lookup time.
        len: usize,
    },

    /// The embedding provider failed or is unreachable.
    #[error("embedding provider error: {0}")]
    Embedding(String),

    /// Snapshot corruption, an unreadable artifact, or a desynchronized
    /// artifact pair.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`InsightError`].
pub type InsightResult<T> = Result<T, InsightError>;

// --- Query result shape ---

/// A single ranked answer from the query pipeline.
///
/// Results are ordered by ascending `score`; lower means closer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryMatch {
    /// Squared Euclidean distance between the question embedding and the
    /// matched record's vector.
    pub score: f32,
    /// The stored summary text. For the top-ranked match this may be the
    /// rewritten phrasing when a rewrite post-processor is configured.
    pub summary: String,
    /// Domain label parsed from the summary prefix (`"unknown"` if absent).
    pub domain: String,
    /// Tag label parsed from the summary prefix (`"unknown"` if absent).
    pub tag: String,
}
