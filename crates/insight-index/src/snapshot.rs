//! On-disk snapshot codec for the paired index artifacts.
//!
//! An index persists as two files derived from one base path, always read and
//! written together:
//!
//! - `<base>.vec` — binary vector snapshot:
//!
//!   ```text
//!   magic: b"ISVX"        (4 bytes)
//!   version: u16 LE       (2 bytes)
//!   dimension: u32 LE     (4 bytes)
//!   count: u64 LE         (8 bytes)
//!   payload: count * dimension f32 LE values
//!   ```
//!
//! - `<base>.sum` — one JSON-encoded summary string per line; line `i` is
//!   position `i`.
//!
//! Both snapshots are whole-file rewrites; there is no incremental format.

use insight_core::{InsightError, InsightResult};
use std::path::{Path, PathBuf};

use crate::metadata::MetadataStore;
use crate::store::VectorStore;

const VECTOR_MAGIC: [u8; 4] = *b"ISVX";
const VECTOR_FORMAT_VERSION: u16 = 1;
const VECTOR_HEADER_LEN: usize = 4 + 2 + 4 + 8;

/// The two artifact paths an index derives from its shared base path.
///
/// A base of `data/insight` yields `data/insight.vec` and `data/insight.sum`.
#[derive(Debug, Clone)]
pub struct IndexPaths {
    base: PathBuf,
}

impl IndexPaths {
    /// Derive artifact paths from a shared base path.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// The shared base path.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Path of the binary vector snapshot.
    pub fn vectors(&self) -> PathBuf {
        self.with_suffix(".vec")
    }

    /// Path of the summary snapshot.
    pub fn summaries(&self) -> PathBuf {
        self.with_suffix(".sum")
    }

    fn with_suffix(&self, suffix: &str) -> PathBuf {
        let mut os = self.base.clone().into_os_string();
        os.push(suffix);
        PathBuf::from(os)
    }
}

/// Encode the vector store into the binary snapshot layout.
pub(crate) fn encode_vectors(store: &VectorStore) -> Vec<u8> {
    let data = store.as_flat_slice();
    let mut buf = Vec::with_capacity(VECTOR_HEADER_LEN + data.len() * 4);
    buf.extend_from_slice(&VECTOR_MAGIC);
    buf.extend_from_slice(&VECTOR_FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&(store.dimension() as u32).to_le_bytes());
    buf.extend_from_slice(&(store.len() as u64).to_le_bytes());
    for value in data {
        buf.extend_from_slice(&value.to_le_bytes());
    }
    buf
}

/// Decode a binary vector snapshot, validating the header against the
/// payload.
pub(crate) fn decode_vectors(bytes: &[u8], path: &Path) -> InsightResult<VectorStore> {
    if bytes.len() < VECTOR_HEADER_LEN {
        return Err(corrupt(path, "truncated header"));
    }
    if bytes[..4] != VECTOR_MAGIC {
        return Err(corrupt(path, "bad magic"));
    }
    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != VECTOR_FORMAT_VERSION {
        return Err(corrupt(
            path,
            &format!("unsupported format version {version}"),
        ));
    }
    let dimension = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]) as usize;
    let count = u64::from_le_bytes([
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15], bytes[16], bytes[17],
    ]) as usize;

    if dimension == 0 && count > 0 {
        return Err(corrupt(path, "zero dimension with nonzero record count"));
    }
    let expected_payload = count
        .checked_mul(dimension)
        .and_then(|values| values.checked_mul(4))
        .ok_or_else(|| corrupt(path, "record count overflows"))?;

    let payload = &bytes[VECTOR_HEADER_LEN..];
    if payload.len() != expected_payload {
        return Err(corrupt(
            path,
            &format!(
                "payload of {} bytes does not match header ({count} records of dimension {dimension})",
                payload.len()
            ),
        ));
    }

    let data: Vec<f32> = payload
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();
    Ok(VectorStore::from_flat(dimension, data))
}

/// Encode the metadata store as JSONL.
pub(crate) fn encode_summaries(store: &MetadataStore) -> InsightResult<Vec<u8>> {
    let mut out = String::new();
    for summary in store.iter() {
        out.push_str(&serde_json::to_string(summary)?);
        out.push('\n');
    }
    Ok(out.into_bytes())
}

/// Decode a JSONL metadata snapshot.
pub(crate) fn decode_summaries(bytes: &[u8], path: &Path) -> InsightResult<MetadataStore> {
    let text = std::str::from_utf8(bytes).map_err(|_| corrupt(path, "not valid UTF-8"))?;
    let mut summaries = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let summary: String = serde_json::from_str(line)
            .map_err(|e| corrupt(path, &format!("invalid entry on line {}: {e}", line_no + 1)))?;
        summaries.push(summary);
    }
    Ok(MetadataStore::from_lines(summaries))
}

/// Temporary sibling used for the write-then-rename protocol.
pub(crate) fn staging_path(target: &Path) -> PathBuf {
    let mut os = target.to_path_buf().into_os_string();
    os.push(".tmp");
    PathBuf::from(os)
}

fn corrupt(path: &Path, detail: &str) -> InsightError {
    InsightError::Persistence(format!("{}: {detail}", path.display()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn index_paths_append_suffixes() {
        let paths = IndexPaths::new("data/insight");
        assert_eq!(paths.vectors(), PathBuf::from("data/insight.vec"));
        assert_eq!(paths.summaries(), PathBuf::from("data/insight.sum"));
        assert_eq!(paths.base(), Path::new("data/insight"));
    }

    #[test]
    fn vector_snapshot_roundtrip() {
        let mut store = VectorStore::new(3);
        store
            .append(&[vec![1.0, -2.5, 0.0], vec![0.25, 4.0, -1.0]])
            .unwrap();

        let bytes = encode_vectors(&store);
        let decoded = decode_vectors(&bytes, Path::new("test.vec")).unwrap();
        assert_eq!(decoded, store);
    }

    #[test]
    fn empty_vector_snapshot_roundtrip() {
        let store = VectorStore::new(8);
        let bytes = encode_vectors(&store);
        let decoded = decode_vectors(&bytes, Path::new("test.vec")).unwrap();
        assert_eq!(decoded.len(), 0);
        assert_eq!(decoded.dimension(), 8);
    }

    #[test]
    fn truncated_vector_snapshot_is_persistence_error() {
        let mut store = VectorStore::new(3);
        store.append(&[vec![1.0, 2.0, 3.0]]).unwrap();
        let mut bytes = encode_vectors(&store);
        bytes.truncate(bytes.len() - 2);

        let err = decode_vectors(&bytes, Path::new("test.vec")).unwrap_err();
        assert!(matches!(err, InsightError::Persistence(_)));
    }

    #[test]
    fn bad_magic_is_persistence_error() {
        let mut store = VectorStore::new(2);
        store.append(&[vec![1.0, 2.0]]).unwrap();
        let mut bytes = encode_vectors(&store);
        bytes[0] = b'X';

        let err = decode_vectors(&bytes, Path::new("test.vec")).unwrap_err();
        assert!(matches!(err, InsightError::Persistence(_)));
    }

    #[test]
    fn unsupported_version_is_persistence_error() {
        let store = VectorStore::new(2);
        let mut bytes = encode_vectors(&store);
        bytes[4] = 0xFF;
        bytes[5] = 0xFF;

        let err = decode_vectors(&bytes, Path::new("test.vec")).unwrap_err();
        assert!(matches!(err, InsightError::Persistence(_)));
    }

    #[test]
    fn summary_snapshot_roundtrip() {
        let mut store = MetadataStore::new();
        store.append(vec![
            "[domain:payments][tag:latefee_rev] Partner 'X': fees 12.50".to_string(),
            "plain summary with \"quotes\"\nand a newline".to_string(),
        ]);

        let bytes = encode_summaries(&store).unwrap();
        let decoded = decode_summaries(&bytes, Path::new("test.sum")).unwrap();
        assert_eq!(decoded, store);
    }

    #[test]
    fn invalid_summary_line_is_persistence_error() {
        let bytes = b"\"fine\"\nnot json\n".to_vec();
        let err = decode_summaries(&bytes, Path::new("test.sum")).unwrap_err();
        assert!(matches!(err, InsightError::Persistence(_)));
    }

    #[test]
    fn staging_path_is_a_sibling() {
        let staged = staging_path(Path::new("data/insight.vec"));
        assert_eq!(staged, PathBuf::from("data/insight.vec.tmp"));
    }
}
