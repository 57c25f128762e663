//! The query pipeline: answering a free-text question against a loaded
//! summary index.
//!
//! The pipeline embeds the question, runs exact nearest-neighbor search over
//! the vector store, resolves hits to their summary texts and labels, applies
//! optional post-retrieval domain/tag filters, and can pass the top hit
//! through a rewrite post-processor for readability.
//!
//! # Main types
//!
//! - [`QueryEngine`] — Long-lived handle over an opened index, shared across
//!   many `query` calls.
//! - [`QueryOptions`] — Per-call knobs: `top_k`, filters, rewrite toggle.
//! - [`SummaryRewriter`] — Trait for the optional rewrite post-processor.
//! - [`PrefixStripRewriter`] — Local rewriter that drops the label prefix.

/// The query engine and its per-call options.
pub mod engine;
/// The rewrite post-processor trait and the local implementation.
pub mod rewrite;

pub use engine::{QueryEngine, QueryOptions};
pub use rewrite::{PrefixStripRewriter, SummaryRewriter};
