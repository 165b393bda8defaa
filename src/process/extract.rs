// src/process/extract.rs

use tracing::debug;

use crate::process::columns::{ColumnRoleMap, NumberColumns};
use crate::process::date_parser::parse_draw_date;
use crate::process::utils::{cell_to_int, parse_number_list};
use crate::types::{
    row_is_blank, DrawRecord, Grid, RawCell, RowSkip, SkipReason, NUMBERS_PER_DRAW, NUMBER_MAX,
    NUMBER_MIN,
};

static ABSENT: RawCell = RawCell::Absent;

/// Records accepted from the data rows, plus every skipped row and why.
#[derive(Debug, Default)]
pub struct Extraction {
    pub records: Vec<DrawRecord>,
    pub skips: Vec<RowSkip>,
    pub rows_scanned: usize,
}

fn cell(row: &[RawCell], idx: usize) -> &RawCell {
    row.get(idx).unwrap_or(&ABSENT)
}

fn raw_numbers(row: &[RawCell], columns: &NumberColumns) -> Result<Vec<i64>, SkipReason> {
    match columns {
        NumberColumns::Discrete(indices) => indices
            .iter()
            .enumerate()
            .map(|(ball, &idx)| {
                let c = cell(row, idx);
                cell_to_int(c).ok_or_else(|| SkipReason::InvalidNumber {
                    ball: ball + 1,
                    value: c.display(),
                })
            })
            .collect(),
        NumberColumns::Packed(idx) => {
            let c = cell(row, *idx);
            parse_number_list(c).ok_or_else(|| SkipReason::MalformedNumberList(c.display()))
        }
    }
}

/// Range-check, count, sort and de-duplicate a parsed number list.
pub fn validate_numbers(raw: &[i64]) -> Result<[u8; NUMBERS_PER_DRAW], SkipReason> {
    let range = i64::from(NUMBER_MIN)..=i64::from(NUMBER_MAX);
    if let Some(&bad) = raw.iter().find(|n| !range.contains(n)) {
        return Err(SkipReason::NumberOutOfRange(bad));
    }
    let mut numbers: [u8; NUMBERS_PER_DRAW] = raw
        .iter()
        .map(|&n| n as u8)
        .collect::<Vec<_>>()
        .try_into()
        .map_err(|_| SkipReason::WrongNumberCount { found: raw.len() })?;
    numbers.sort_unstable();
    if numbers.windows(2).any(|w| w[0] == w[1]) {
        return Err(SkipReason::DuplicateNumbers(numbers.to_vec()));
    }
    Ok(numbers)
}

/// Decode one data row. Steps run in a fixed order and the first failure decides the
/// skip reason.
pub fn extract_row(row: &[RawCell], map: &ColumnRoleMap) -> Result<DrawRecord, SkipReason> {
    if row_is_blank(row) {
        return Err(SkipReason::EmptyRow);
    }

    // 1) contest id present
    let contest_cell = cell(row, map.contest_id);
    if contest_cell.is_blank() {
        return Err(SkipReason::MissingContestId);
    }

    // 2) contest id is a positive integer
    let contest_id = cell_to_int(contest_cell)
        .filter(|&n| n >= 1)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| SkipReason::InvalidContestId(contest_cell.display()))?;

    // 3) date present
    let date_cell = cell(row, map.draw_date);
    if date_cell.is_blank() {
        return Err(SkipReason::MissingDate);
    }

    // 4) numbers
    let numbers = validate_numbers(&raw_numbers(row, &map.numbers)?)?;

    // 5) date decodes
    let draw_date = parse_draw_date(date_cell)?;

    Ok(DrawRecord {
        contest_id,
        draw_date,
        numbers,
    })
}

/// Decode every row from `start` on. A bad row is recorded and skipped; it never stops
/// the scan.
pub fn extract_records(
    grid: &Grid,
    start: usize,
    map: &ColumnRoleMap,
    logged_skip_limit: usize,
) -> Extraction {
    let mut out = Extraction::default();
    for (index, row) in grid.iter().enumerate().skip(start) {
        out.rows_scanned += 1;
        match extract_row(row, map) {
            Ok(record) => out.records.push(record),
            Err(reason) => {
                if out.skips.len() < logged_skip_limit {
                    debug!(row = index, %reason, "skipping row");
                }
                out.skips.push(RowSkip { row: index, reason });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn discrete_map() -> ColumnRoleMap {
        ColumnRoleMap {
            contest_id: 0,
            draw_date: 1,
            numbers: NumberColumns::Discrete([2, 3, 4, 5, 6, 7]),
        }
    }

    fn packed_map() -> ColumnRoleMap {
        ColumnRoleMap {
            contest_id: 0,
            draw_date: 1,
            numbers: NumberColumns::Packed(2),
        }
    }

    fn numeric_row(contest: f64, date: &str, balls: [f64; 6]) -> Vec<RawCell> {
        let mut row = vec![RawCell::Number(contest), RawCell::from(date)];
        row.extend(balls.iter().map(|&b| RawCell::Number(b)));
        row
    }

    #[test]
    fn test_accepts_and_sorts() {
        let row = numeric_row(100.0, "01/05/2020", [3.0, 47.0, 12.0, 8.0, 55.0, 21.0]);
        let record = extract_row(&row, &discrete_map()).unwrap();
        assert_eq!(record.contest_id, 100);
        assert_eq!(record.draw_date, NaiveDate::from_ymd_opt(2020, 5, 1).unwrap());
        assert_eq!(record.numbers, [3, 8, 12, 21, 47, 55]);
    }

    #[test]
    fn test_skip_reasons_follow_step_order() {
        let map = discrete_map();
        let mut row = numeric_row(1.0, "01/05/2020", [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        row[0] = RawCell::Absent;
        assert_eq!(extract_row(&row, &map), Err(SkipReason::MissingContestId));

        row[0] = RawCell::from("n/a");
        assert_eq!(
            extract_row(&row, &map),
            Err(SkipReason::InvalidContestId("n/a".into()))
        );

        row[0] = RawCell::Number(0.0);
        assert!(matches!(extract_row(&row, &map), Err(SkipReason::InvalidContestId(_))));

        row[0] = RawCell::Number(5.0);
        row[1] = RawCell::from(" ");
        assert_eq!(extract_row(&row, &map), Err(SkipReason::MissingDate));

        // a bad ball is reported before a bad date
        row[1] = RawCell::from("not a date");
        row[4] = RawCell::Absent;
        assert_eq!(
            extract_row(&row, &map),
            Err(SkipReason::InvalidNumber { ball: 3, value: String::new() })
        );

        row[4] = RawCell::Number(3.0);
        assert_eq!(
            extract_row(&row, &map),
            Err(SkipReason::InvalidDate("not a date".into()))
        );
    }

    #[test]
    fn test_out_of_range_is_skipped_not_clamped() {
        let row = numeric_row(1.0, "01/05/2020", [0.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(
            extract_row(&row, &discrete_map()),
            Err(SkipReason::NumberOutOfRange(0))
        );
        let row = numeric_row(1.0, "01/05/2020", [1.0, 2.0, 3.0, 4.0, 5.0, 61.0]);
        assert_eq!(
            extract_row(&row, &discrete_map()),
            Err(SkipReason::NumberOutOfRange(61))
        );
    }

    #[test]
    fn test_duplicates_are_rejected() {
        let row = numeric_row(1.0, "01/05/2020", [7.0, 2.0, 7.0, 4.0, 5.0, 6.0]);
        assert_eq!(
            extract_row(&row, &discrete_map()),
            Err(SkipReason::DuplicateNumbers(vec![2, 4, 5, 6, 7, 7]))
        );
    }

    #[test]
    fn test_packed_lists() {
        let map = packed_map();
        let row = |nums: &str| {
            vec![
                RawCell::from("2525"),
                RawCell::from("01/10/2022"),
                RawCell::from(nums),
            ]
        };

        let record = extract_row(&row("[6, 5, 4, 3, 2, 1]"), &map).unwrap();
        assert_eq!(record.numbers, [1, 2, 3, 4, 5, 6]);
        assert_eq!(
            extract_row(&row("10,20,30,40,50,60"), &map).unwrap().numbers,
            [10, 20, 30, 40, 50, 60]
        );
        assert_eq!(
            extract_row(&row("[1, 2, 3]"), &map),
            Err(SkipReason::WrongNumberCount { found: 3 })
        );
        assert_eq!(
            extract_row(&row("[1, 2, three]"), &map),
            Err(SkipReason::MalformedNumberList("[1, 2, three]".into()))
        );
    }

    #[test]
    fn test_extract_records_isolates_bad_rows() {
        let grid = vec![
            vec![RawCell::from("header")],
            numeric_row(2.0, "02/05/2020", [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            vec![RawCell::Absent],
            numeric_row(1.0, "01/05/2020", [1.0, 2.0, 3.0, 4.0, 5.0, 99.0]),
            numeric_row(3.0, "03/05/2020", [1.0, 2.0, 3.0, 4.0, 5.0, 7.0]),
        ];
        let out = extract_records(&grid, 1, &discrete_map(), 5);
        assert_eq!(out.rows_scanned, 4);
        assert_eq!(out.records.iter().map(|r| r.contest_id).collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(
            out.skips,
            vec![
                RowSkip { row: 2, reason: SkipReason::EmptyRow },
                RowSkip { row: 3, reason: SkipReason::NumberOutOfRange(99) },
            ]
        );
    }
}
