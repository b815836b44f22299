//! Benchmark lookup: percentile bands for salary and equity.
//!
//! `BenchmarkProvider` is the seam: the engine only ever asks for a band by
//! (family, level, geo, stage). Sourcing is up to the implementation:
//! - `BuiltinBenchmarks`: formula-driven table compiled into the binary (default)
//! - `TableBenchmarks`: rows loaded from a JSON file at startup
//! - `MemoizedBenchmarks`: read-through cache around either, safe to share across requests

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compensation::models::{
    Benchmark, BenchmarkSet, CompanyStage, Geo, JobFamily, JobLevel,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkKey {
    pub job_family: JobFamily,
    pub job_level: JobLevel,
    pub geo: Geo,
    pub stage: CompanyStage,
}

#[derive(Debug, Error)]
pub enum TableLoadError {
    #[error("could not read table file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse table file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid table row: {0}")]
    InvalidRow(String),
}

/// Read-only benchmark source. Implementations must be cheap to call and free of I/O.
pub trait BenchmarkProvider: Send + Sync {
    fn lookup(&self, key: &BenchmarkKey) -> Option<BenchmarkSet>;
}

/// Looks up a band and re-validates it, so a misbehaving provider can never hand
/// the scorer an unordered band.
pub fn validated_lookup(provider: &dyn BenchmarkProvider, key: &BenchmarkKey) -> Option<BenchmarkSet> {
    let raw = provider.lookup(key)?;
    let salary = raw.salary.revalidated()?;
    Some(BenchmarkSet {
        salary,
        equity_percent: raw.equity_percent.and_then(Benchmark::revalidated),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// BuiltinBenchmarks
// ────────────────────────────────────────────────────────────────────────────

/// Median base salary for an engineering role in the Bay Area at Series A.
fn level_base_salary(level: JobLevel) -> f64 {
    match level {
        JobLevel::Intern => 70_000.0,
        JobLevel::Junior => 120_000.0,
        JobLevel::Mid => 150_000.0,
        JobLevel::Senior => 185_000.0,
        JobLevel::Staff => 220_000.0,
        JobLevel::Principal => 250_000.0,
        JobLevel::Director => 240_000.0,
        JobLevel::Vp => 270_000.0,
        JobLevel::CLevel => 260_000.0,
    }
}

fn family_multiplier(family: JobFamily) -> f64 {
    match family {
        JobFamily::Engineering | JobFamily::Executive => 1.0,
        JobFamily::DataScience => 0.98,
        JobFamily::Product => 0.97,
        JobFamily::Legal => 0.95,
        JobFamily::Design => 0.88,
        JobFamily::Marketing | JobFamily::Finance => 0.82,
        JobFamily::Sales => 0.80,
        JobFamily::Operations | JobFamily::HrPeople => 0.75,
        JobFamily::CustomerSuccess => 0.70,
    }
}

fn geo_multiplier(geo: Geo) -> f64 {
    match geo {
        Geo::Sv => 1.0,
        Geo::Nyc => 0.97,
        Geo::Seattle => 0.93,
        Geo::Boston | Geo::La => 0.88,
        Geo::RemoteUs => 0.85,
        Geo::Austin => 0.82,
        Geo::Denver | Geo::Chicago => 0.80,
        Geo::International => 0.60,
    }
}

fn stage_cash_multiplier(stage: CompanyStage) -> f64 {
    match stage {
        CompanyStage::PreSeed => 0.80,
        CompanyStage::Seed => 0.88,
        CompanyStage::SeriesA => 1.0,
        CompanyStage::SeriesB => 1.07,
        CompanyStage::SeriesCPlus => 1.12,
    }
}

/// Median fully-diluted grant (%) at Series A.
fn level_equity_percent(level: JobLevel) -> f64 {
    match level {
        JobLevel::Intern => 0.005,
        JobLevel::Junior => 0.05,
        JobLevel::Mid => 0.10,
        JobLevel::Senior => 0.20,
        JobLevel::Staff => 0.35,
        JobLevel::Principal => 0.50,
        JobLevel::Director => 0.60,
        JobLevel::Vp => 1.00,
        JobLevel::CLevel => 2.00,
    }
}

fn stage_equity_multiplier(stage: CompanyStage) -> f64 {
    match stage {
        CompanyStage::PreSeed => 3.0,
        CompanyStage::Seed => 2.0,
        CompanyStage::SeriesA => 1.0,
        CompanyStage::SeriesB => 0.5,
        CompanyStage::SeriesCPlus => 0.25,
    }
}

const SALARY_P25_RATIO: f64 = 0.87;
const SALARY_P75_RATIO: f64 = 1.15;
const EQUITY_P25_RATIO: f64 = 0.6;
const EQUITY_P75_RATIO: f64 = 1.6;

fn round_to(value: f64, step: f64) -> f64 {
    (value / step).round() * step
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinBenchmarks;

impl BenchmarkProvider for BuiltinBenchmarks {
    fn lookup(&self, key: &BenchmarkKey) -> Option<BenchmarkSet> {
        let salary_p50 = level_base_salary(key.job_level)
            * family_multiplier(key.job_family)
            * geo_multiplier(key.geo)
            * stage_cash_multiplier(key.stage);
        let equity_p50 = level_equity_percent(key.job_level) * stage_equity_multiplier(key.stage);

        let salary = Benchmark::validated(
            round_to(salary_p50 * SALARY_P25_RATIO, 1_000.0),
            round_to(salary_p50, 1_000.0),
            round_to(salary_p50 * SALARY_P75_RATIO, 1_000.0),
        )?;
        let equity_percent = Benchmark::validated(
            round_to(equity_p50 * EQUITY_P25_RATIO, 0.001),
            round_to(equity_p50, 0.001),
            round_to(equity_p50 * EQUITY_P75_RATIO, 0.001),
        );

        Some(BenchmarkSet {
            salary,
            equity_percent,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// TableBenchmarks
// ────────────────────────────────────────────────────────────────────────────

/// One row of a benchmark table file (a JSON array of these).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkRow {
    #[serde(flatten)]
    pub key: BenchmarkKey,
    pub salary: Benchmark,
    #[serde(default)]
    pub equity_percent: Option<Benchmark>,
}

#[derive(Debug, Clone, Default)]
pub struct TableBenchmarks {
    rows: HashMap<BenchmarkKey, BenchmarkSet>,
}

impl TableBenchmarks {
    /// Builds a table, rejecting any row whose bands are not ordered and non-negative.
    pub fn from_rows(rows: Vec<BenchmarkRow>) -> Result<Self, TableLoadError> {
        let mut table = HashMap::with_capacity(rows.len());
        for row in rows {
            let bands = std::iter::once(&row.salary).chain(row.equity_percent.as_ref());
            for band in bands {
                if !band.is_ordered() {
                    return Err(TableLoadError::InvalidRow(format!(
                        "band for {:?} must satisfy 0 <= p25 <= p50 <= p75",
                        row.key
                    )));
                }
            }
            table.insert(
                row.key,
                BenchmarkSet {
                    salary: row.salary,
                    equity_percent: row.equity_percent,
                },
            );
        }
        Ok(Self { rows: table })
    }

    pub fn from_json(json: &str) -> Result<Self, TableLoadError> {
        let rows: Vec<BenchmarkRow> = serde_json::from_str(json)?;
        Self::from_rows(rows)
    }

    pub fn from_path(path: &Path) -> Result<Self, TableLoadError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl BenchmarkProvider for TableBenchmarks {
    fn lookup(&self, key: &BenchmarkKey) -> Option<BenchmarkSet> {
        self.rows.get(key).copied()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MemoizedBenchmarks
// ────────────────────────────────────────────────────────────────────────────

/// Read-through memoization. Misses are cached too, so a provider is asked at most
/// once per key. A poisoned lock degrades to uncached lookups.
pub struct MemoizedBenchmarks<P> {
    inner: P,
    cache: RwLock<HashMap<BenchmarkKey, Option<BenchmarkSet>>>,
}

impl<P: BenchmarkProvider> MemoizedBenchmarks<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    pub fn cached_keys(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }
}

impl<P: BenchmarkProvider> BenchmarkProvider for MemoizedBenchmarks<P> {
    fn lookup(&self, key: &BenchmarkKey) -> Option<BenchmarkSet> {
        if let Ok(cache) = self.cache.read() {
            if let Some(hit) = cache.get(key) {
                return *hit;
            }
        }

        let value = self.inner.lookup(key);
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(*key, value);
        }
        value
    }
}
