//! Column-name vocabularies, kept as data so new export layouts only need new terms.
//!
//! All terms are matched lower-cased and by containment, so `"concurso"` also matches
//! `"Nº Concurso"`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::types::NUMBERS_PER_DRAW;

/// Term lists per role. `Default` is empty; [`Vocabulary::builtin`] holds the known layouts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    /// Header cells naming the contest id column.
    pub contest_id: Vec<String>,
    /// Header cells naming the draw date column.
    pub draw_date: Vec<String>,
    /// Header cells naming a single column holding all numbers.
    pub numbers_packed: Vec<String>,
    /// Bases that combine with an index 1..=6 into a discrete ball column (`bola 1`, `d1`).
    pub ball_prefixes: Vec<String>,
    /// Separators allowed between a multi-letter base and its index.
    pub ball_separators: Vec<String>,
    /// Header detection: a row mentioning one of these...
    pub header_contest: Vec<String>,
    /// ...and one of these is a header row.
    pub header_numbers: Vec<String>,
    /// Header detection: a row mentioning one of these is a header row on its own.
    pub header_date_phrases: Vec<String>,
}

fn terms(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Vocabulary {
    pub fn builtin() -> Self {
        Self {
            contest_id: terms(&["concurso", "contest", "concursonumber"]),
            draw_date: terms(&["data", "date", "data do sorteio", "data sorteio"]),
            numbers_packed: terms(&["numbers", "dezenas", "bolas"]),
            ball_prefixes: terms(&["bola", "dezena", "b", "d"]),
            ball_separators: terms(&["", " ", "_", "-"]),
            header_contest: terms(&["concurso", "contest"]),
            header_numbers: terms(&["bola", "dezena", "number"]),
            header_date_phrases: terms(&["data do sorteio", "draw date"]),
        }
    }

    /// Append the terms of `other` that are not already known, lower-cased.
    pub fn extend(&mut self, other: Vocabulary) {
        fn merge(into: &mut Vec<String>, from: Vec<String>) {
            for term in from {
                let term = term.to_lowercase();
                if !into.contains(&term) {
                    into.push(term);
                }
            }
        }
        merge(&mut self.contest_id, other.contest_id);
        merge(&mut self.draw_date, other.draw_date);
        merge(&mut self.numbers_packed, other.numbers_packed);
        merge(&mut self.ball_prefixes, other.ball_prefixes);
        merge(&mut self.ball_separators, other.ball_separators);
        merge(&mut self.header_contest, other.header_contest);
        merge(&mut self.header_numbers, other.header_numbers);
        merge(&mut self.header_date_phrases, other.header_date_phrases);
    }

    /// Built-in terms extended by a YAML document of the same shape.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let extra: Vocabulary = serde_yaml::from_str(yaml).context("parsing vocabulary YAML")?;
        let mut vocab = Self::builtin();
        vocab.extend(extra);
        Ok(vocab)
    }

    /// Header spellings probed for ball `index` (1-based).
    ///
    /// Single-letter bases only match glued to the index (`b1`); `d 1` would hit too much.
    pub fn ball_candidates(&self, index: usize) -> Vec<String> {
        debug_assert!((1..=NUMBERS_PER_DRAW).contains(&index));
        let mut out = Vec::new();
        for prefix in &self.ball_prefixes {
            if prefix.chars().count() == 1 {
                out.push(format!("{prefix}{index}"));
                continue;
            }
            for sep in &self.ball_separators {
                out.push(format!("{prefix}{sep}{index}"));
            }
        }
        out
    }
}
