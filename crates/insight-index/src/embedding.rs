use async_trait::async_trait;
use insight_core::{InsightError, InsightResult};
use std::collections::HashMap;

/// Trait for computing text embeddings (fixed-dimension vector
/// representations).
///
/// A provider must report one dimension for its whole lifetime and must be
/// deterministic enough that re-embedding the same text yields a rank-stable
/// neighborhood.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Compute the embedding vector for a single text.
    async fn embed(&self, text: &str) -> InsightResult<Vec<f32>>;

    /// Compute embeddings for a batch of texts, preserving input order.
    async fn embed_batch(&self, texts: &[String]) -> InsightResult<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Dimension of the vectors produced by this provider.
    fn dimension(&self) -> usize;
}

/// Local term-frequency hashing embedder.
///
/// Maps a bag of lowercased words onto a fixed-size dense vector via three
/// FNV-1a hash positions per word, then L2-normalizes. Deterministic and
/// dependency-free, which makes it the offline and test provider; swap in a
/// real sentence-embedding service for production relevance.
pub struct HashEmbedding {
    dimension: usize,
}

/// Hash salts and the weight each salted position receives.
const SALTED_WEIGHTS: [(u8, f32); 3] = [(0, 1.0), (1, 0.7), (2, 0.5)];

impl HashEmbedding {
    /// Create a provider producing vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for HashEmbedding {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedding {
    async fn embed(&self, text: &str) -> InsightResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(InsightError::Embedding(
                "cannot embed empty text".to_string(),
            ));
        }

        let mut vector = vec![0.0f32; self.dimension];

        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 1)
            .collect();

        let mut freq: HashMap<&str, f32> = HashMap::new();
        for word in &words {
            *freq.entry(word).or_insert(0.0) += 1.0;
        }

        let total = words.len() as f32;
        if total == 0.0 {
            return Ok(vector);
        }

        // Each word lands on three salted hash positions with decaying
        // weight, spreading mass across the vector.
        for (word, count) in &freq {
            let tf = count / total;
            for (salt, weight) in SALTED_WEIGHTS {
                let position = match salt {
                    0 => fnv1a(word.as_bytes()) as usize,
                    salt => fnv1a(&[word.as_bytes(), &[salt]].concat()) as usize,
                };
                vector[position % self.dimension] += tf * weight;
            }
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// FNV-1a hash.
fn fnv1a(data: &[u8]) -> u32 {
    let mut hash: u32 = 2166136261;
    for &byte in data {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(16777619);
    }
    hash
}

/// Client for a remote embedding service.
///
/// Sends `POST {endpoint}` with `{"texts": [...]}` and expects
/// `{"embeddings": [[f32; D], ...]}` with one vector per input text.
/// Any transport, status, or shape failure surfaces as
/// [`InsightError::Embedding`].
#[cfg(feature = "http-embeddings")]
pub struct HttpEmbedding {
    client: reqwest::Client,
    endpoint: String,
    dimension: usize,
}

#[cfg(feature = "http-embeddings")]
impl HttpEmbedding {
    /// Create a client for the given endpoint, producing vectors of the
    /// given dimension.
    pub fn new(endpoint: impl Into<String>, dimension: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            dimension,
        }
    }
}

#[cfg(feature = "http-embeddings")]
#[derive(serde::Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
}

#[cfg(feature = "http-embeddings")]
#[derive(serde::Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[cfg(feature = "http-embeddings")]
#[async_trait]
impl EmbeddingProvider for HttpEmbedding {
    async fn embed(&self, text: &str) -> InsightResult<Vec<f32>> {
        let batch = [text.to_string()];
        let mut vectors = self.embed_batch(&batch).await?;
        vectors
            .pop()
            .ok_or_else(|| InsightError::Embedding("service returned no embedding".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> InsightResult<Vec<Vec<f32>>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&EmbedRequest { texts })
            .send()
            .await
            .map_err(|e| {
                InsightError::Embedding(format!("request to {} failed: {e}", self.endpoint))
            })?
            .error_for_status()
            .map_err(|e| {
                InsightError::Embedding(format!("{} returned an error status: {e}", self.endpoint))
            })?;

        let body: EmbedResponse = response.json().await.map_err(|e| {
            InsightError::Embedding(format!("invalid response from {}: {e}", self.endpoint))
        })?;

        if body.embeddings.len() != texts.len() {
            return Err(InsightError::Embedding(format!(
                "service returned {} embeddings for {} texts",
                body.embeddings.len(),
                texts.len()
            )));
        }
        for vector in &body.embeddings {
            if vector.len() != self.dimension {
                return Err(InsightError::Embedding(format!(
                    "service returned a {}-dimension vector, expected {}",
                    vector.len(),
                    self.dimension
                )));
            }
        }

        Ok(body.embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_embedding_dimension() {
        let embedder = HashEmbedding::new(128);
        assert_eq!(embedder.dimension(), 128);
        let vector = embedder.embed("hello world").await.unwrap();
        assert_eq!(vector.len(), 128);
    }

    #[tokio::test]
    async fn hash_embedding_normalized() {
        let embedder = HashEmbedding::default();
        let vector = embedder.embed("the quick brown fox jumps").await.unwrap();
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.01);
    }

    #[tokio::test]
    async fn hash_embedding_deterministic() {
        let embedder = HashEmbedding::default();
        let v1 = embedder.embed("monthly overdue totals").await.unwrap();
        let v2 = embedder.embed("monthly overdue totals").await.unwrap();
        assert_eq!(v1, v2);
    }

    #[tokio::test]
    async fn hash_embedding_similar_texts_closer() {
        let embedder = HashEmbedding::default();
        let v1 = embedder.embed("accounts opened last year").await.unwrap();
        let v2 = embedder.embed("accounts closed last year").await.unwrap();
        let v3 = embedder.embed("chocolate cake baking recipe").await.unwrap();

        let d12 = squared_distance(&v1, &v2);
        let d13 = squared_distance(&v1, &v3);
        assert!(
            d12 < d13,
            "related texts ({d12}) should be closer than unrelated ({d13})"
        );
    }

    #[tokio::test]
    async fn hash_embedding_rejects_empty_text() {
        let embedder = HashEmbedding::default();
        assert!(embedder.embed("").await.is_err());
        assert!(embedder.embed("   ").await.is_err());
    }

    #[tokio::test]
    async fn embed_batch_preserves_order() {
        let embedder = HashEmbedding::default();
        let texts = vec![
            "first summary".to_string(),
            "second summary".to_string(),
            "third summary".to_string(),
        ];
        let vectors = embedder.embed_batch(&texts).await.unwrap();
        assert_eq!(vectors.len(), 3);
        for (text, vector) in texts.iter().zip(&vectors) {
            let single = embedder.embed(text).await.unwrap();
            assert_eq!(&single, vector, "batch order must match input order");
        }
    }

    fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| {
                let d = x - y;
                d * d
            })
            .sum()
    }
}
