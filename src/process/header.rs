use tracing::{debug, warn};

use crate::process::utils::header_text;
use crate::types::{row_is_blank, Grid, RawCell};
use crate::vocab::Vocabulary;

/// Where the header sits and whether the vocabulary actually recognised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLocation {
    pub index: usize,
    /// `false` when no row matched and row 0 is used as a best guess.
    pub matched: bool,
}

impl HeaderLocation {
    /// First data row.
    pub fn data_start(&self) -> usize {
        self.index + 1
    }
}

/// All cell texts of a row, lower-cased and space-joined.
fn row_text(row: &[RawCell]) -> String {
    row.iter()
        .filter(|c| !c.is_blank())
        .map(header_text)
        .collect::<Vec<_>>()
        .join(" ")
}

fn mentions(text: &str, terms: &[String]) -> bool {
    terms.iter().any(|t| !t.is_empty() && text.contains(t.as_str()))
}

/// A header names a contest column together with a ball/number column, or names the
/// draw date with a full phrase.
pub fn is_header_row(row: &[RawCell], vocab: &Vocabulary) -> bool {
    let text = row_text(row);
    (mentions(&text, &vocab.header_contest) && mentions(&text, &vocab.header_numbers))
        || mentions(&text, &vocab.header_date_phrases)
}

/// Scan the first `scan_rows` rows for a header; fall back to row 0.
pub fn locate_header(grid: &Grid, vocab: &Vocabulary, scan_rows: usize) -> HeaderLocation {
    for (index, row) in grid.iter().enumerate().take(scan_rows) {
        if row_is_blank(row) {
            continue;
        }
        if is_header_row(row, vocab) {
            debug!(index, "header row found");
            return HeaderLocation {
                index,
                matched: true,
            };
        }
    }
    warn!(scan_rows, "no header row recognised, using row 0");
    HeaderLocation {
        index: 0,
        matched: false,
    }
}
