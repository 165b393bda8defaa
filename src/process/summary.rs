use chrono::{DateTime, Utc};

use crate::types::{Dataset, DatasetMetadata, DrawRecord};

/// Stable sort by contest id. Equal ids keep their input order.
pub fn sort_records(records: &mut [DrawRecord]) {
    records.sort_by_key(|r| r.contest_id);
}

/// Sort the accepted records and derive the metadata. `None` for an empty list: a
/// dataset is never empty.
pub fn summarize(
    mut records: Vec<DrawRecord>,
    skipped_row_count: usize,
    ingested_at: DateTime<Utc>,
) -> Option<Dataset> {
    sort_records(&mut records);
    let first_contest_id = records.first()?.contest_id;
    let last_contest_id = records.last()?.contest_id;
    let metadata = DatasetMetadata {
        total_draws: records.len(),
        first_contest_id,
        last_contest_id,
        ingested_at,
        skipped_row_count,
    };
    Some(Dataset::new_unchecked(records, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn draw(contest_id: u32, day: u32) -> DrawRecord {
        DrawRecord {
            contest_id,
            draw_date: NaiveDate::from_ymd_opt(2021, 1, day).unwrap(),
            numbers: [1, 2, 3, 4, 5, 6],
        }
    }

    #[test]
    fn test_summarize_sorts_and_derives_metadata() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let ds = summarize(vec![draw(30, 3), draw(10, 1), draw(20, 2)], 4, at).unwrap();
        let ids: Vec<_> = ds.records().iter().map(|r| r.contest_id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
        let meta = ds.metadata();
        assert_eq!(meta.total_draws, 3);
        assert_eq!(meta.first_contest_id, 10);
        assert_eq!(meta.last_contest_id, 30);
        assert_eq!(meta.skipped_row_count, 4);
        assert_eq!(meta.ingested_at, at);
        assert!(ds.validate().is_ok());
    }

    #[test]
    fn test_sort_is_idempotent_and_stable() {
        let mut records = vec![draw(2, 5), draw(1, 1), draw(2, 3)];
        sort_records(&mut records);
        let once = records.clone();
        sort_records(&mut records);
        assert_eq!(records, once);
        // equal ids keep input order
        assert_eq!(records[1].draw_date.format("%d").to_string(), "05");
        assert_eq!(records[2].draw_date.format("%d").to_string(), "03");
    }

    #[test]
    fn test_empty_input_gives_no_dataset() {
        assert!(summarize(Vec::new(), 3, Utc::now()).is_none());
    }
}
