// src/store/mod.rs

mod json;
mod memory;

pub use json::JsonFileStore;
pub use memory::MemoryStore;

use anyhow::{Context, Result};
use tracing::error;

use crate::types::{Dataset, DatasetMetadata, DrawRecord};

/// Blob holding the draws, ascending by contest id.
pub const DATABASE_KEY: &str = "megasena_database";
/// Blob holding the dataset metadata.
pub const METADATA_KEY: &str = "megasena_metadata";

/// Where a finished dataset lives between runs. Holds at most one dataset; `put`
/// replaces it wholesale.
pub trait DatasetStore {
    fn put(&mut self, dataset: &Dataset) -> Result<()>;

    /// `None` when nothing is stored, or when what is stored cannot be trusted.
    fn get(&self) -> Result<Option<Dataset>>;

    /// Only the metadata blob, without decoding the draws.
    fn metadata(&self) -> Result<Option<DatasetMetadata>>;

    fn delete(&mut self) -> Result<()>;

    /// Bytes held by both blobs; 0 unless both are present.
    fn size_bytes(&self) -> Result<u64>;

    fn exists(&self) -> Result<bool> {
        Ok(self.get()?.is_some())
    }
}

/// The two blobs for `dataset`: draws first, metadata second.
pub(crate) fn encode(dataset: &Dataset) -> Result<(Vec<u8>, Vec<u8>)> {
    let draws = serde_json::to_vec(dataset.records()).context("serializing draws")?;
    let meta = serde_json::to_vec(dataset.metadata()).context("serializing metadata")?;
    Ok((draws, meta))
}

pub(crate) fn decode_metadata(meta: &[u8]) -> Option<DatasetMetadata> {
    match serde_json::from_slice(meta) {
        Ok(m) => Some(m),
        Err(e) => {
            error!(error = %e, "stored metadata is corrupt, ignoring it");
            None
        }
    }
}

/// Rebuild a dataset from its blobs. Anything corrupt or inconsistent is logged and
/// dropped.
pub(crate) fn decode(draws: &[u8], meta: &[u8]) -> Option<Dataset> {
    let metadata = decode_metadata(meta)?;
    let records: Vec<DrawRecord> = match serde_json::from_slice(draws) {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "stored draws are corrupt, ignoring them");
            return None;
        }
    };
    match Dataset::from_parts(records, metadata) {
        Ok(d) => Some(d),
        Err(e) => {
            error!(error = %e, "stored dataset is inconsistent, ignoring it");
            None
        }
    }
}

/// `1536` → `"1.50 KB"`. Anything past megabytes is still shown in MB.
pub fn format_storage_size(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["B", "KB", "MB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_storage_size() {
        assert_eq!(format_storage_size(0), "0 B");
        assert_eq!(format_storage_size(512), "512.00 B");
        assert_eq!(format_storage_size(1536), "1.50 KB");
        assert_eq!(format_storage_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_storage_size(3 * 1024 * 1024 * 1024), "3072.00 MB");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode(b"[]", b"{not json").is_none());
        assert!(decode(b"nope", br#"{"totalDraws":0}"#).is_none());
    }
}
