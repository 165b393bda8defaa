use anyhow::{Context, Result};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, error, info};

use super::{decode, decode_metadata, encode, DatasetStore, DATABASE_KEY, METADATA_KEY};
use crate::types::{Dataset, DatasetMetadata};

/// Stores the dataset as `<dir>/megasena_database.json` and `<dir>/megasena_metadata.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Use `dir`, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating store directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Missing file → `None`. An unreadable file is logged and also `None`.
    fn read_blob(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.path(key);
        match fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                error!("Skipping unreadable {:?}: {}", path, e);
                None
            }
        }
    }

    fn tmp_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{key}.json.tmp"))
    }

    /// Write `bytes` to the dot-tmp sibling of `key`, flushed to disk. A partial tmp file
    /// is removed on failure.
    fn stage_blob(&self, key: &str, bytes: &[u8]) -> Result<PathBuf> {
        let tmp_path = self.tmp_path(key);
        let written = fs::File::create(&tmp_path)
            .and_then(|mut tmp| {
                tmp.write_all(bytes)?;
                tmp.sync_all()
            })
            .with_context(|| format!("writing {:?}", tmp_path));
        if written.is_err() && tmp_path.is_file() {
            let _ = fs::remove_file(&tmp_path);
        }
        written.map(|()| tmp_path)
    }

    fn commit_blob(&self, key: &str, tmp_path: &Path) -> Result<()> {
        let path = self.path(key);
        fs::rename(tmp_path, &path)
            .with_context(|| format!("renaming {:?} -> {:?}", tmp_path, path))?;
        debug!(?path, "committed blob");
        Ok(())
    }

    fn remove_blob(&self, key: &str) -> Result<()> {
        let path = self.path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {:?}", path)),
        }
    }

    fn blob_len(&self, key: &str) -> Option<u64> {
        fs::metadata(self.path(key)).ok().map(|m| m.len())
    }
}

impl DatasetStore for JsonFileStore {
    fn put(&mut self, dataset: &Dataset) -> Result<()> {
        let (draws, meta) = encode(dataset)?;

        // 1) stage both blobs; the stored dataset is untouched until both are on disk
        let draws_tmp = self.stage_blob(DATABASE_KEY, &draws)?;
        let meta_tmp = match self.stage_blob(METADATA_KEY, &meta) {
            Ok(p) => p,
            Err(e) => {
                let _ = fs::remove_file(&draws_tmp);
                return Err(e);
            }
        };

        // 2) swap both in
        self.commit_blob(DATABASE_KEY, &draws_tmp)?;
        self.commit_blob(METADATA_KEY, &meta_tmp)?;
        info!(
            dir = %self.dir.display(),
            draws = dataset.metadata().total_draws,
            "dataset saved"
        );
        Ok(())
    }

    fn get(&self) -> Result<Option<Dataset>> {
        let draws = self.read_blob(DATABASE_KEY);
        let meta = self.read_blob(METADATA_KEY);
        let (Some(draws), Some(meta)) = (draws, meta) else {
            return Ok(None);
        };
        Ok(decode(&draws, &meta))
    }

    fn metadata(&self) -> Result<Option<DatasetMetadata>> {
        Ok(self
            .read_blob(METADATA_KEY)
            .and_then(|meta| decode_metadata(&meta)))
    }

    fn delete(&mut self) -> Result<()> {
        self.remove_blob(DATABASE_KEY)?;
        self.remove_blob(METADATA_KEY)?;
        info!(dir = %self.dir.display(), "dataset deleted");
        Ok(())
    }

    fn size_bytes(&self) -> Result<u64> {
        Ok(match (self.blob_len(DATABASE_KEY), self.blob_len(METADATA_KEY)) {
            (Some(d), Some(m)) => d + m,
            _ => 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::summary::summarize;
    use crate::types::DrawRecord;
    use chrono::{NaiveDate, Utc};
    use tempfile::tempdir;

    fn dataset(ids: &[u32]) -> Dataset {
        let records = ids
            .iter()
            .map(|&contest_id| DrawRecord {
                contest_id,
                draw_date: NaiveDate::from_ymd_opt(2019, 12, 31).unwrap(),
                numbers: [5, 10, 20, 30, 40, 50],
            })
            .collect();
        summarize(records, 2, Utc::now()).unwrap()
    }

    #[test]
    fn test_round_trip_through_files() -> Result<()> {
        let tmp = tempdir()?;
        let mut store = JsonFileStore::new(tmp.path().join("nested/data"))?;
        assert!(store.get()?.is_none());

        let ds = dataset(&[7, 5, 6]);
        store.put(&ds)?;
        assert!(store.dir().join("megasena_database.json").is_file());
        assert!(store.dir().join("megasena_metadata.json").is_file());
        assert!(!store.dir().join(".megasena_database.json.tmp").exists());

        // a fresh handle sees the same data
        let reopened = JsonFileStore::new(store.dir())?;
        assert_eq!(reopened.get()?, Some(ds));
        assert_eq!(reopened.metadata()?.map(|m| m.skipped_row_count), Some(2));
        assert!(reopened.exists()?);
        Ok(())
    }

    #[test]
    fn test_metadata_json_shape() -> Result<()> {
        let tmp = tempdir()?;
        let mut store = JsonFileStore::new(tmp.path())?;
        store.put(&dataset(&[1, 2]))?;
        let raw: serde_json::Value =
            serde_json::from_slice(&fs::read(tmp.path().join("megasena_metadata.json"))?)?;
        assert_eq!(raw["totalDraws"], 2);
        assert_eq!(raw["firstContestId"], 1);
        assert_eq!(raw["lastContestId"], 2);
        assert_eq!(raw["skippedRowCount"], 2);
        assert!(raw["ingestedAtTimestamp"].is_string());
        Ok(())
    }

    #[test]
    fn test_corrupt_blob_is_treated_as_absent() -> Result<()> {
        let tmp = tempdir()?;
        let mut store = JsonFileStore::new(tmp.path())?;
        store.put(&dataset(&[1]))?;
        fs::write(tmp.path().join("megasena_database.json"), b"{ broken")?;
        assert!(store.get()?.is_none());
        assert!(!store.exists()?);
        // metadata alone is still readable
        assert!(store.metadata()?.is_some());
        Ok(())
    }

    #[test]
    fn test_failed_put_keeps_previous_dataset() -> Result<()> {
        let tmp = tempdir()?;
        let mut store = JsonFileStore::new(tmp.path())?;
        let first = dataset(&[1, 2, 3]);
        store.put(&first)?;

        // a directory squatting on the metadata tmp path makes staging fail
        let blocker = tmp.path().join(".megasena_metadata.json.tmp");
        fs::create_dir(&blocker)?;
        assert!(store.put(&dataset(&[9])).is_err());

        assert_eq!(store.get()?, Some(first));
        assert!(!tmp.path().join(".megasena_database.json.tmp").exists());

        fs::remove_dir(&blocker)?;
        store.put(&dataset(&[9]))?;
        assert_eq!(store.get()?.map(|d| d.metadata().last_contest_id), Some(9));
        Ok(())
    }

    #[test]
    fn test_size_and_delete() -> Result<()> {
        let tmp = tempdir()?;
        let mut store = JsonFileStore::new(tmp.path())?;
        assert_eq!(store.size_bytes()?, 0);
        store.put(&dataset(&[1, 2, 3]))?;
        let size = store.size_bytes()?;
        let expected = fs::metadata(tmp.path().join("megasena_database.json"))?.len()
            + fs::metadata(tmp.path().join("megasena_metadata.json"))?.len();
        assert_eq!(size, expected);

        fs::remove_file(tmp.path().join("megasena_metadata.json"))?;
        assert_eq!(store.size_bytes()?, 0);

        store.delete()?;
        store.delete()?;
        assert!(store.get()?.is_none());
        Ok(())
    }
}
