use std::fmt;

use thiserror::Error;

use crate::types::NUMBERS_PER_DRAW;

/// A semantic role a header column can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    ContestId,
    DrawDate,
    Numbers,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::ContestId => "contestId",
            Role::DrawDate => "drawDate",
            Role::Numbers => "numbers",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which roles the header could not satisfy, and what the header looked like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingColumns {
    pub missing: Vec<Role>,
    /// Discrete ball columns found when no packed numbers column exists.
    pub balls_found: usize,
    /// Header cells as read, for the caller's diagnostics.
    pub header: Vec<String>,
}

impl fmt::Display for MissingColumns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.missing.iter().map(Role::as_str).collect();
        write!(
            f,
            "missing {} (ball columns found: {}/{}); header: {:?}",
            names.join(", "),
            self.balls_found,
            NUMBERS_PER_DRAW,
            self.header
        )
    }
}

/// Failures that abort a whole ingestion. Bad individual rows never end up here.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("workbook has no sheets")]
    EmptyWorkbook,

    #[error("not a readable spreadsheet: {0}")]
    UnreadableFile(String),

    #[error("required columns not identified: {0}")]
    MissingRequiredColumns(MissingColumns),

    #[error("no valid draws found ({rows_scanned} data rows scanned, {skipped} skipped)")]
    NoValidRecords { rows_scanned: usize, skipped: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message_carries_diagnostics() {
        let err = IngestError::MissingRequiredColumns(MissingColumns {
            missing: vec![Role::DrawDate, Role::Numbers],
            balls_found: 4,
            header: vec!["Concurso".into(), "Bola1".into()],
        });
        let msg = err.to_string();
        assert!(msg.contains("drawDate, numbers"), "{msg}");
        assert!(msg.contains("4/6"), "{msg}");
        assert!(msg.contains("\"Concurso\""), "{msg}");
    }
}
