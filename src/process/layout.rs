use tracing::debug;

use crate::types::{row_is_blank, Grid, RawCell, RawRow};

/// Delimiters a condensed export may use, in priority order.
pub const DELIMITERS: [char; 3] = ['\t', ';', ','];

/// The text of a row that carries exactly one populated cell, if that cell is text.
fn sole_text(row: &[RawCell]) -> Option<&str> {
    let mut populated = row.iter().filter(|c| !c.is_blank());
    match (populated.next(), populated.next()) {
        (Some(RawCell::Text(s)), None) => Some(s),
        _ => None,
    }
}

/// Decide, from the first populated row only, whether the grid is condensed and by what.
pub fn detect_delimiter(grid: &Grid) -> Option<char> {
    let first = grid.iter().find(|row| !row_is_blank(row))?;
    let text = sole_text(first)?;
    DELIMITERS.into_iter().find(|d| text.contains(*d))
}

fn split_row(text: &str, delimiter: char) -> RawRow {
    text.split(delimiter)
        .map(|part| {
            if part.trim().is_empty() {
                RawCell::Absent
            } else {
                RawCell::Text(part.to_string())
            }
        })
        .collect()
}

/// Re-split condensed rows into columns. Rows that already span several cells pass
/// through untouched; a grid with no condensed first row is returned as is.
pub fn normalize_layout(grid: Grid) -> (Grid, Option<char>) {
    let Some(delimiter) = detect_delimiter(&grid) else {
        return (grid, None);
    };
    debug!(delimiter = ?delimiter, "condensed layout detected");

    let normalized = grid
        .into_iter()
        .map(|row| {
            let split = sole_text(&row).map(|text| split_row(text, delimiter));
            split.unwrap_or(row)
        })
        .collect();
    (normalized, Some(delimiter))
}
