use anyhow::Result;

use super::{decode, decode_metadata, encode, DatasetStore};
use crate::types::{Dataset, DatasetMetadata};

/// Keeps the two encoded blobs in memory. Mostly for tests and embedding callers.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    draws: Option<Vec<u8>>,
    meta: Option<Vec<u8>>,
}

impl DatasetStore for MemoryStore {
    fn put(&mut self, dataset: &Dataset) -> Result<()> {
        let (draws, meta) = encode(dataset)?;
        self.draws = Some(draws);
        self.meta = Some(meta);
        Ok(())
    }

    fn get(&self) -> Result<Option<Dataset>> {
        Ok(match (&self.draws, &self.meta) {
            (Some(draws), Some(meta)) => decode(draws, meta),
            _ => None,
        })
    }

    fn metadata(&self) -> Result<Option<DatasetMetadata>> {
        Ok(self.meta.as_deref().and_then(decode_metadata))
    }

    fn delete(&mut self) -> Result<()> {
        self.draws = None;
        self.meta = None;
        Ok(())
    }

    fn size_bytes(&self) -> Result<u64> {
        Ok(match (&self.draws, &self.meta) {
            (Some(d), Some(m)) => (d.len() + m.len()) as u64,
            _ => 0,
        })
    }
}
