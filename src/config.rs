// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    env, fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::vocab::Vocabulary;

/// Knobs for one ingestion run.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestConfig {
    /// How many leading rows the header search looks at.
    pub header_scan_rows: usize,
    pub vocabulary: Vocabulary,
    /// How many skip reasons get logged individually before going quiet.
    pub logged_skip_limit: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            header_scan_rows: 20,
            vocabulary: Vocabulary::builtin(),
            logged_skip_limit: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
        }
    }
}

/// Ticket prices by how many numbers a single bet marks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceTable(BTreeMap<u8, f64>);

impl Default for PriceTable {
    fn default() -> Self {
        Self(BTreeMap::from([
            (6, 6.00),
            (7, 42.00),
            (8, 168.00),
            (9, 504.00),
            (10, 1260.00),
            (11, 2772.00),
            (12, 5544.00),
            (13, 10296.00),
            (14, 18018.00),
            (15, 30030.00),
            (16, 48048.00),
            (17, 74256.00),
            (18, 111384.00),
            (19, 162792.00),
            (20, 232560.00),
        ]))
    }
}

impl PriceTable {
    pub fn price_for(&self, numbers: u8) -> Option<f64> {
        self.0.get(&numbers).copied()
    }

    pub fn set_price(&mut self, numbers: u8, price: f64) {
        self.0.insert(numbers, price);
    }

    /// How many bets of `numbers` numbers `budget` pays for.
    pub fn affordable_bets(&self, budget: f64, numbers: u8) -> Option<u64> {
        let price = self.price_for(numbers)?;
        if price <= 0.0 || budget < 0.0 {
            return Some(0);
        }
        Some((budget / price).floor() as u64)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

/// Everything the binary needs, assembled from defaults, an optional YAML file and env.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub ingest: IngestConfig,
    pub store: StoreConfig,
    pub prices: PriceTable,
}

/// On-disk shape: every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    header_scan_rows: Option<usize>,
    logged_skip_limit: Option<usize>,
    vocabulary: Option<Vocabulary>,
    store_dir: Option<PathBuf>,
    prices: Option<BTreeMap<u8, f64>>,
}

impl AppConfig {
    /// Defaults overlaid with `yaml`. Vocabulary terms extend the built-in ones,
    /// prices override per entry.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: FileConfig = serde_yaml::from_str(yaml).context("parsing config YAML")?;
        let mut cfg = AppConfig::default();
        if let Some(n) = file.header_scan_rows {
            cfg.ingest.header_scan_rows = n;
        }
        if let Some(n) = file.logged_skip_limit {
            cfg.ingest.logged_skip_limit = n;
        }
        if let Some(vocab) = file.vocabulary {
            cfg.ingest.vocabulary.extend(vocab);
        }
        if let Some(dir) = file.store_dir {
            cfg.store.dir = dir;
        }
        for (numbers, price) in file.prices.unwrap_or_default() {
            cfg.prices.set_price(numbers, price);
        }
        Ok(cfg)
    }

    /// Load from `path` (or `MEGASENA_CONFIG` when `None`), then apply env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| env::var_os("MEGASENA_CONFIG").map(PathBuf::from));
        let mut cfg = match path {
            Some(p) => {
                debug!(path = %p.display(), "loading config");
                let text = fs::read_to_string(&p)
                    .with_context(|| format!("reading config {}", p.display()))?;
                Self::from_yaml_str(&text).with_context(|| format!("in {}", p.display()))?
            }
            None => AppConfig::default(),
        };
        cfg.apply_env(|key| env::var(key).ok())?;
        Ok(cfg)
    }

    /// Apply `MEGASENA_HEADER_SCAN_ROWS` and `MEGASENA_STORE_DIR` as looked up by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("MEGASENA_HEADER_SCAN_ROWS") {
            self.ingest.header_scan_rows = v
                .trim()
                .parse()
                .with_context(|| format!("MEGASENA_HEADER_SCAN_ROWS={v:?} is not a count"))?;
        }
        if let Some(v) = lookup("MEGASENA_STORE_DIR") {
            self.store.dir = PathBuf::from(v);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_table_defaults() {
        let prices = PriceTable::default();
        assert_eq!(prices.price_for(6), Some(6.0));
        assert_eq!(prices.price_for(20), Some(232560.0));
        assert_eq!(prices.price_for(21), None);
        assert_eq!(prices.affordable_bets(100.0, 7), Some(2));
        assert_eq!(prices.affordable_bets(5.99, 6), Some(0));
        assert_eq!(prices.affordable_bets(100.0, 5), None);
    }

    #[test]
    fn test_yaml_overlay() -> Result<()> {
        let cfg = AppConfig::from_yaml_str(
            r#"
header_scan_rows: 40
store_dir: /tmp/megasena
vocabulary:
  draw_date: ["fecha"]
prices:
  6: 5.0
"#,
        )?;
        assert_eq!(cfg.ingest.header_scan_rows, 40);
        assert_eq!(cfg.ingest.logged_skip_limit, 5);
        assert!(cfg.ingest.vocabulary.draw_date.contains(&"fecha".to_string()));
        assert!(cfg.ingest.vocabulary.draw_date.contains(&"data".to_string()));
        assert_eq!(cfg.store.dir, PathBuf::from("/tmp/megasena"));
        assert_eq!(cfg.prices.price_for(6), Some(5.0));
        assert_eq!(cfg.prices.price_for(7), Some(42.0));
        Ok(())
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(AppConfig::from_yaml_str("header_rows: 3\n").is_err());
    }

    #[test]
    fn test_env_overrides() -> Result<()> {
        let mut cfg = AppConfig::default();
        cfg.apply_env(|k| match k {
            "MEGASENA_HEADER_SCAN_ROWS" => Some("7".into()),
            "MEGASENA_STORE_DIR" => Some("elsewhere".into()),
            _ => None,
        })?;
        assert_eq!(cfg.ingest.header_scan_rows, 7);
        assert_eq!(cfg.store.dir, PathBuf::from("elsewhere"));

        assert!(cfg
            .apply_env(|k| (k == "MEGASENA_HEADER_SCAN_ROWS").then(|| "many".to_string()))
            .is_err());
        Ok(())
    }
}
