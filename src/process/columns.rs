use tracing::debug;

use crate::error::{MissingColumns, Role};
use crate::process::utils::header_text;
use crate::types::{RawCell, NUMBERS_PER_DRAW};
use crate::vocab::Vocabulary;

/// Where the winning numbers live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberColumns {
    /// One cell holds the whole list.
    Packed(usize),
    /// One column per ball, in ball order.
    Discrete([usize; NUMBERS_PER_DRAW]),
}

/// Column index per semantic role, resolved once per ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRoleMap {
    pub contest_id: usize,
    pub draw_date: usize,
    pub numbers: NumberColumns,
}

/// First column whose header equals or contains any of `terms`.
pub fn find_column(header: &[String], terms: &[String]) -> Option<usize> {
    header.iter().position(|cell| {
        !cell.is_empty()
            && terms
                .iter()
                .any(|t| !t.is_empty() && (cell == t || cell.contains(t.as_str())))
    })
}

fn resolve_numbers(header: &[String], vocab: &Vocabulary) -> (Option<NumberColumns>, usize) {
    if let Some(idx) = find_column(header, &vocab.numbers_packed) {
        return (Some(NumberColumns::Packed(idx)), 0);
    }

    let found: Vec<usize> = (1..=NUMBERS_PER_DRAW)
        .filter_map(|ball| find_column(header, &vocab.ball_candidates(ball)))
        .collect();
    let count = found.len();
    let discrete = <[usize; NUMBERS_PER_DRAW]>::try_from(found)
        .ok()
        .map(NumberColumns::Discrete);
    (discrete, count)
}

/// Map header cells to roles. The packed numbers column wins over discrete ball columns.
pub fn resolve_columns(
    header_row: &[RawCell],
    vocab: &Vocabulary,
) -> Result<ColumnRoleMap, MissingColumns> {
    let header: Vec<String> = header_row.iter().map(header_text).collect();

    let contest_id = find_column(&header, &vocab.contest_id);
    let draw_date = find_column(&header, &vocab.draw_date);
    let (numbers, balls_found) = resolve_numbers(&header, vocab);
    debug!(?contest_id, ?draw_date, ?numbers, balls_found, "resolved columns");

    match (contest_id, draw_date, numbers) {
        (Some(contest_id), Some(draw_date), Some(numbers)) => Ok(ColumnRoleMap {
            contest_id,
            draw_date,
            numbers,
        }),
        _ => {
            let mut missing = Vec::new();
            if contest_id.is_none() {
                missing.push(Role::ContestId);
            }
            if draw_date.is_none() {
                missing.push(Role::DrawDate);
            }
            if numbers.is_none() {
                missing.push(Role::Numbers);
            }
            Err(MissingColumns {
                missing,
                balls_found,
                header: header_row.iter().map(RawCell::display).collect(),
            })
        }
    }
}
