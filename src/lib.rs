//! Mega-Sena results spreadsheet ingestion.
//!
//! A workbook goes in, a [`Dataset`] of validated draws comes out: ascending by contest id,
//! with metadata derived from the accepted rows. Malformed rows are skipped and reported,
//! never fatal; only the four [`IngestError`] kinds abort an ingestion.

pub mod config;
pub mod error;
pub mod process;
pub mod store;
pub mod types;
pub mod vocab;

pub use config::{AppConfig, IngestConfig, PriceTable, StoreConfig};
pub use error::{IngestError, MissingColumns, Role};
pub use process::{
    ingest_bytes, ingest_file, ingest_grid, ingest_into, ingest_reader, Ingestion, Progress,
    ProgressSink,
};
pub use store::{format_storage_size, DatasetStore, JsonFileStore, MemoryStore};
pub use types::{Dataset, DatasetMetadata, DrawRecord, RawCell, RowSkip, SkipReason};
pub use vocab::Vocabulary;
