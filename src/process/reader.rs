// src/process/reader.rs

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::io::Cursor;
use tracing::{debug, instrument};

use crate::error::IngestError;
use crate::types::{row_is_blank, Grid, RawCell};

/// What the reader saw, for progress reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetInfo {
    pub name: String,
    pub sheet_count: usize,
    pub rows: usize,
    pub columns: usize,
}

/// Decode a workbook buffer (`.xlsx`, `.xls`, `.xlsb`, `.ods`) into the grid of its first sheet.
///
/// The grid spans the sheet's used range, fully blank rows are dropped and every
/// remaining row has the same width.
#[instrument(level = "debug", skip(bytes), fields(size = bytes.len()))]
pub fn read_first_sheet(bytes: &[u8]) -> Result<(Grid, SheetInfo), IngestError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| IngestError::UnreadableFile(e.to_string()))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let Some(first) = sheet_names.first() else {
        return Err(IngestError::EmptyWorkbook);
    };

    let range = workbook
        .worksheet_range(first)
        .map_err(|e| IngestError::UnreadableFile(format!("sheet `{first}`: {e}")))?;

    let grid = range_to_grid(&range);
    let info = SheetInfo {
        name: first.clone(),
        sheet_count: sheet_names.len(),
        rows: grid.len(),
        columns: range.width(),
    };
    debug!(sheet = %info.name, rows = info.rows, columns = info.columns, "decoded first sheet");
    Ok((grid, info))
}

fn range_to_grid(range: &Range<Data>) -> Grid {
    range
        .rows()
        .map(|row| row.iter().map(data_to_cell).collect::<Vec<_>>())
        .filter(|row| !row_is_blank(row))
        .collect()
}

/// Typed calamine cell → raw cell. Date-typed cells keep their serial number; the
/// extractor decides what the number means.
fn data_to_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::Absent,
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Float(f) => RawCell::Number(*f),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Bool(b) => RawCell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => RawCell::Number(dt.as_f64()),
        Data::DateTimeIso(s) => RawCell::Text(s.clone()),
        Data::DurationIso(s) => RawCell::Text(s.clone()),
        Data::Error(e) => RawCell::Text(e.to_string()),
    }
}
