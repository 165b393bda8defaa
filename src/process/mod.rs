// src/process/mod.rs
//
// bytes → reader → layout → header → columns → extract → summary

pub mod columns;
pub mod date_parser;
pub mod extract;
pub mod header;
pub mod layout;
pub mod reader;
pub mod summary;
pub mod utils;

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{info, instrument, warn};

use crate::config::IngestConfig;
use crate::error::IngestError;
use crate::store::DatasetStore;
use crate::types::{row_is_blank, Dataset, Grid, RowSkip};

/// Receiver of human-readable progress lines. Observability only: nothing it does
/// changes the outcome of an ingestion.
pub trait ProgressSink {
    fn emit(&mut self, message: &str);
}

impl<F: FnMut(&str)> ProgressSink for F {
    fn emit(&mut self, message: &str) {
        self(message)
    }
}

/// Progress channel for one ingestion. Every line is also logged.
pub struct Progress<'a> {
    sink: Option<&'a mut dyn ProgressSink>,
}

impl<'a> Progress<'a> {
    pub fn new(sink: &'a mut dyn ProgressSink) -> Self {
        Self { sink: Some(sink) }
    }

    pub fn silent() -> Self {
        Self { sink: None }
    }

    pub fn report(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        info!(target: "megasena_ingest::progress", "{message}");
        if let Some(sink) = self.sink.as_mut() {
            sink.emit(message);
        }
    }
}

/// A successful ingestion: the dataset plus why each skipped row was skipped.
#[derive(Debug, Clone)]
pub struct Ingestion {
    pub dataset: Dataset,
    pub skips: Vec<RowSkip>,
}

/// Run every stage after decoding, from layout normalization to the summary.
#[instrument(level = "info", skip_all, fields(rows = grid.len()))]
pub fn ingest_grid(
    grid: Grid,
    config: &IngestConfig,
    progress: &mut Progress<'_>,
) -> Result<Ingestion, IngestError> {
    if grid.iter().all(|row| row_is_blank(row)) {
        progress.report("sheet has no data");
        return Err(IngestError::NoValidRecords {
            rows_scanned: 0,
            skipped: 0,
        });
    }

    // 1) condensed rows → columns
    let (grid, delimiter) = layout::normalize_layout(grid);
    if let Some(d) = delimiter {
        progress.report(format!("condensed layout, split on {d:?}"));
    }

    // 2) header
    let location = header::locate_header(&grid, &config.vocabulary, config.header_scan_rows);
    if location.matched {
        progress.report(format!("header found at row {}", location.index));
    } else {
        progress.report(format!(
            "no header recognised in the first {} rows, trying row 0",
            config.header_scan_rows
        ));
    }

    // 3) columns
    let header_row = grid.get(location.index).map(Vec::as_slice).unwrap_or(&[]);
    let map = columns::resolve_columns(header_row, &config.vocabulary).map_err(|missing| {
        progress.report(format!("could not identify columns: {missing}"));
        IngestError::MissingRequiredColumns(missing)
    })?;
    progress.report(format!(
        "columns: contest={}, date={}, numbers={:?}",
        map.contest_id, map.draw_date, map.numbers
    ));

    // 4) rows
    let extraction = extract::extract_records(
        &grid,
        location.data_start(),
        &map,
        config.logged_skip_limit,
    );
    let accepted = extraction.records.len();
    let skipped = extraction.skips.len();
    progress.report(format!("processed: {accepted} valid, {skipped} skipped"));
    if skipped > 0 {
        warn!(skipped, "some rows were skipped");
    }

    // 5) sort + metadata
    let dataset = summary::summarize(extraction.records, skipped, Utc::now()).ok_or(
        IngestError::NoValidRecords {
            rows_scanned: extraction.rows_scanned,
            skipped,
        },
    )?;
    info!(
        total = dataset.metadata().total_draws,
        first = dataset.metadata().first_contest_id,
        last = dataset.metadata().last_contest_id,
        skipped,
        "ingestion complete"
    );
    Ok(Ingestion {
        dataset,
        skips: extraction.skips,
    })
}

/// Ingest a whole spreadsheet held in memory.
#[instrument(level = "info", skip_all, fields(size = bytes.len()))]
pub fn ingest_bytes(
    bytes: &[u8],
    config: &IngestConfig,
    progress: &mut Progress<'_>,
) -> Result<Ingestion, IngestError> {
    progress.report(format!("file loaded ({} bytes)", bytes.len()));
    let (grid, sheet) = reader::read_first_sheet(bytes).map_err(|e| {
        progress.report(format!("parse error: {e}"));
        e
    })?;
    progress.report(format!(
        "sheet `{}` (1 of {}): {} rows x {} columns",
        sheet.name, sheet.sheet_count, sheet.rows, sheet.columns
    ));
    ingest_grid(grid, config, progress)
}

/// Buffer `reader` fully, then ingest. The read is the only await point.
pub async fn ingest_reader<R>(
    mut reader: R,
    config: &IngestConfig,
    progress: &mut Progress<'_>,
) -> Result<Ingestion, IngestError>
where
    R: AsyncRead + Unpin,
{
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .await
        .map_err(|e| IngestError::UnreadableFile(format!("reading input: {e}")))?;
    ingest_bytes(&bytes, config, progress)
}

/// Open `path` and ingest it. A file that cannot be opened is `UnreadableFile`.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub async fn ingest_file(
    path: impl AsRef<Path>,
    config: &IngestConfig,
    progress: &mut Progress<'_>,
) -> Result<Ingestion, IngestError> {
    let path = path.as_ref();
    let file = File::open(path)
        .await
        .map_err(|e| IngestError::UnreadableFile(format!("opening {}: {e}", path.display())))?;
    ingest_reader(file, config, progress).await
}

/// Ingest and, on success, replace whatever `store` held with the new dataset.
pub fn ingest_into<S>(
    store: &mut S,
    bytes: &[u8],
    config: &IngestConfig,
    progress: &mut Progress<'_>,
) -> Result<Ingestion>
where
    S: DatasetStore + ?Sized,
{
    let ingestion = ingest_bytes(bytes, config, progress)?;
    store.put(&ingestion.dataset).context("saving ingested dataset")?;
    progress.report(format!(
        "saved {} draws",
        ingestion.dataset.metadata().total_draws
    ));
    Ok(ingestion)
}
