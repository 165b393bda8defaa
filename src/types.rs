// src/types.rs

use anyhow::{ensure, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How many winning numbers make up one draw.
pub const NUMBERS_PER_DRAW: usize = 6;
/// Smallest number a ball can carry.
pub const NUMBER_MIN: u8 = 1;
/// Largest number a ball can carry.
pub const NUMBER_MAX: u8 = 60;

/// One cell as decoded from the spreadsheet, before any interpretation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Text(String),
    Number(f64),
    Absent,
}

impl RawCell {
    /// `true` for absent cells and for text cells holding only whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            RawCell::Absent => true,
            RawCell::Text(s) => s.trim().is_empty(),
            RawCell::Number(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawCell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Text the way a person would read it in the sheet; whole numbers drop the `.0`.
    pub fn display(&self) -> String {
        match self {
            RawCell::Text(s) => s.clone(),
            RawCell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            RawCell::Number(n) => n.to_string(),
            RawCell::Absent => String::new(),
        }
    }
}

impl From<&str> for RawCell {
    fn from(s: &str) -> Self {
        RawCell::Text(s.to_string())
    }
}

impl From<f64> for RawCell {
    fn from(n: f64) -> Self {
        RawCell::Number(n)
    }
}

pub type RawRow = Vec<RawCell>;

/// Rows of raw cells. Row lengths may differ until the layout is normalized.
pub type Grid = Vec<RawRow>;

/// `true` when every cell of `row` is blank (or the row has no cells at all).
pub fn row_is_blank(row: &[RawCell]) -> bool {
    row.iter().all(RawCell::is_blank)
}

/// A single historical draw, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawRecord {
    pub contest_id: u32,
    pub draw_date: NaiveDate,
    /// Strictly ascending, each within `NUMBER_MIN..=NUMBER_MAX`.
    pub numbers: [u8; NUMBERS_PER_DRAW],
}

impl DrawRecord {
    /// Checks the invariants a persisted record must hold.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.contest_id >= 1, "contest id {} is below 1", self.contest_id);
        for n in self.numbers {
            ensure!(
                (NUMBER_MIN..=NUMBER_MAX).contains(&n),
                "contest {}: number {} outside {}..={}",
                self.contest_id,
                n,
                NUMBER_MIN,
                NUMBER_MAX
            );
        }
        ensure!(
            self.numbers.windows(2).all(|w| w[0] < w[1]),
            "contest {}: numbers {:?} are not strictly ascending",
            self.contest_id,
            self.numbers
        );
        Ok(())
    }
}

/// Aggregates derived from the records of a [`Dataset`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetMetadata {
    pub total_draws: usize,
    pub first_contest_id: u32,
    pub last_contest_id: u32,
    #[serde(rename = "ingestedAtTimestamp")]
    pub ingested_at: DateTime<Utc>,
    pub skipped_row_count: usize,
}

/// The canonical, persisted artifact: records ascending by contest id plus their metadata.
///
/// Only built by the summarizer or by [`Dataset::from_parts`], which re-checks every
/// invariant, so the metadata always agrees with the records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DatasetParts")]
pub struct Dataset {
    records: Vec<DrawRecord>,
    metadata: DatasetMetadata,
}

/// Unchecked wire shape of a [`Dataset`]; deserializing goes through `from_parts`.
#[derive(Deserialize)]
struct DatasetParts {
    records: Vec<DrawRecord>,
    metadata: DatasetMetadata,
}

impl TryFrom<DatasetParts> for Dataset {
    type Error = anyhow::Error;

    fn try_from(parts: DatasetParts) -> Result<Self> {
        Dataset::from_parts(parts.records, parts.metadata)
    }
}

impl Dataset {
    pub(crate) fn new_unchecked(records: Vec<DrawRecord>, metadata: DatasetMetadata) -> Self {
        Self { records, metadata }
    }

    /// Reassemble a dataset from separately stored parts, rejecting anything inconsistent.
    pub fn from_parts(records: Vec<DrawRecord>, metadata: DatasetMetadata) -> Result<Self> {
        let dataset = Self { records, metadata };
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn records(&self) -> &[DrawRecord] {
        &self.records
    }

    pub fn metadata(&self) -> &DatasetMetadata {
        &self.metadata
    }

    pub fn into_parts(self) -> (Vec<DrawRecord>, DatasetMetadata) {
        (self.records, self.metadata)
    }

    /// The draw with the highest contest id.
    pub fn latest_draw(&self) -> Option<&DrawRecord> {
        self.records.last()
    }

    /// The last `n` draws, oldest first. `n == 0` means all of them.
    pub fn last_n(&self, n: usize) -> &[DrawRecord] {
        if n == 0 || n >= self.records.len() {
            return &self.records;
        }
        &self.records[self.records.len() - n..]
    }

    /// Up to `count` draws immediately preceding the latest one, oldest first.
    pub fn previous_draws(&self, count: usize) -> &[DrawRecord] {
        let end = self.records.len().saturating_sub(1);
        let start = end.saturating_sub(count);
        &self.records[start..end]
    }

    /// Structural check for a dataset that came from outside the pipeline.
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.records.is_empty(), "dataset has no draws");
        for record in &self.records {
            record.validate()?;
        }
        ensure!(
            self.records
                .windows(2)
                .all(|w| w[0].contest_id <= w[1].contest_id),
            "draws are not ordered by contest id"
        );

        let meta = &self.metadata;
        ensure!(
            meta.total_draws == self.records.len(),
            "metadata claims {} draws, found {}",
            meta.total_draws,
            self.records.len()
        );
        let first = self.records[0].contest_id;
        let last = self.records[self.records.len() - 1].contest_id;
        ensure!(
            meta.first_contest_id == first && meta.last_contest_id == last,
            "metadata contest range {}..{} does not match draws {}..{}",
            meta.first_contest_id,
            meta.last_contest_id,
            first,
            last
        );
        Ok(())
    }
}

/// Why a data row did not become a [`DrawRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("row is empty")]
    EmptyRow,
    #[error("contest id cell is empty")]
    MissingContestId,
    #[error("contest id `{0}` is not a positive integer")]
    InvalidContestId(String),
    #[error("draw date cell is empty")]
    MissingDate,
    #[error("ball {ball}: `{value}` is not an integer")]
    InvalidNumber { ball: usize, value: String },
    #[error("numbers cell `{0}` is not a number list")]
    MalformedNumberList(String),
    #[error("number {0} is outside {min}..={max}", min = NUMBER_MIN, max = NUMBER_MAX)]
    NumberOutOfRange(i64),
    #[error("expected {expected} numbers, found {found}", expected = NUMBERS_PER_DRAW)]
    WrongNumberCount { found: usize },
    #[error("numbers {0:?} contain duplicates")]
    DuplicateNumbers(Vec<u8>),
    #[error("draw date `{0}` is not a recognised date")]
    InvalidDate(String),
}

/// A skipped data row: its index in the normalized grid and the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSkip {
    pub row: usize,
    pub reason: SkipReason,
}
