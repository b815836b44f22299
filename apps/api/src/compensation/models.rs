//! Record types shared by every stage of offer evaluation.
//!
//! Field names serialize in camelCase and enum values in kebab-case; report
//! formatters downstream read these shapes field-for-field.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Role
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobFamily {
    Engineering,
    Product,
    Design,
    DataScience,
    Marketing,
    Sales,
    Operations,
    Finance,
    Legal,
    HrPeople,
    CustomerSuccess,
    Executive,
}

impl JobFamily {
    #[cfg(test)]
    pub const ALL: [JobFamily; 12] = [
        JobFamily::Engineering,
        JobFamily::Product,
        JobFamily::Design,
        JobFamily::DataScience,
        JobFamily::Marketing,
        JobFamily::Sales,
        JobFamily::Operations,
        JobFamily::Finance,
        JobFamily::Legal,
        JobFamily::HrPeople,
        JobFamily::CustomerSuccess,
        JobFamily::Executive,
    ];
}

/// Seniority ladder. Declaration order is the seniority order, so `Ord`
/// comparisons and `index()` arithmetic agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobLevel {
    Intern,
    Junior,
    Mid,
    Senior,
    Staff,
    Principal,
    Director,
    Vp,
    CLevel,
}

impl JobLevel {
    pub const ALL: [JobLevel; 9] = [
        JobLevel::Intern,
        JobLevel::Junior,
        JobLevel::Mid,
        JobLevel::Senior,
        JobLevel::Staff,
        JobLevel::Principal,
        JobLevel::Director,
        JobLevel::Vp,
        JobLevel::CLevel,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Clamps out-of-range indices to the top of the ladder.
    pub fn from_index(index: usize) -> JobLevel {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }

    /// Moves `steps` rungs up the ladder, stopping at `CLevel`.
    pub fn boosted(self, steps: usize) -> JobLevel {
        Self::from_index(self.index().saturating_add(steps))
    }

    /// Levels whose equity grants normally need a board resolution.
    pub fn is_executive_track(self) -> bool {
        matches!(self, JobLevel::Director | JobLevel::Vp | JobLevel::CLevel)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocationType {
    Remote,
    Hybrid,
    Onsite,
}

/// Named compensation markets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Geo {
    Sv,
    Nyc,
    Seattle,
    Boston,
    La,
    Austin,
    Denver,
    Chicago,
    RemoteUs,
    International,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleProfile {
    pub title: String,
    pub normalized_title: String,
    pub job_family: JobFamily,
    pub job_level: JobLevel,
    pub location_type: LocationType,
    pub geo: Geo,
}

// ────────────────────────────────────────────────────────────────────────────
// Company
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompanyStage {
    #[serde(rename = "pre-seed")]
    PreSeed,
    #[serde(rename = "seed")]
    Seed,
    #[serde(rename = "series-a")]
    SeriesA,
    #[serde(rename = "series-b")]
    SeriesB,
    #[serde(rename = "series-c+")]
    SeriesCPlus,
}

impl CompanyStage {
    pub const ALL: [CompanyStage; 5] = [
        CompanyStage::PreSeed,
        CompanyStage::Seed,
        CompanyStage::SeriesA,
        CompanyStage::SeriesB,
        CompanyStage::SeriesCPlus,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CompanyStage::PreSeed => "pre-seed",
            CompanyStage::Seed => "seed",
            CompanyStage::SeriesA => "Series A",
            CompanyStage::SeriesB => "Series B",
            CompanyStage::SeriesCPlus => "Series C+",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapTable {
    #[serde(default)]
    pub option_pool_size: Option<f64>,
    #[serde(default)]
    pub option_pool_remaining: Option<f64>,
    #[serde(default, rename = "last409ADate")]
    pub last_409a_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyContext {
    pub stage: CompanyStage,
    #[serde(default)]
    pub runway_months: Option<f64>,
    #[serde(default)]
    pub cap_table: Option<CapTable>,
    /// Current monthly burn; the stage default is used when absent.
    #[serde(default)]
    pub monthly_burn: Option<f64>,
    /// Post-money valuation of the last round; the stage default is used when absent.
    #[serde(default)]
    pub post_money_valuation: Option<f64>,
}

impl CompanyContext {
    #[cfg(test)]
    pub fn new(stage: CompanyStage) -> Self {
        Self {
            stage,
            runway_months: None,
            cap_table: None,
            monthly_burn: None,
            post_money_valuation: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenProgram {
    pub enabled: bool,
    #[serde(default)]
    pub lockup_months: u32,
    #[serde(default)]
    pub token_price: Option<f64>,
}

// ────────────────────────────────────────────────────────────────────────────
// Package
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EquityType {
    Iso,
    Nso,
    RestrictedStock,
    Token,
    None,
}

impl EquityType {
    pub fn is_stock_option(self) -> bool {
        matches!(self, EquityType::Iso | EquityType::Nso)
    }
}

/// Change-of-control acceleration, ordered from least to most employee-favourable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Acceleration {
    #[default]
    None,
    DoubleTrigger,
    SingleTrigger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VestingTerms {
    #[serde(default = "default_vesting_years")]
    pub vesting_years: f64,
    #[serde(default = "default_cliff_months")]
    pub cliff_months: u32,
    /// Post-termination exercise window. Absent means the common 90-day default.
    #[serde(default)]
    pub exercise_window_days: Option<u32>,
    #[serde(default)]
    pub acceleration: Acceleration,
}

pub const DEFAULT_EXERCISE_WINDOW_DAYS: u32 = 90;

fn default_vesting_years() -> f64 {
    4.0
}

fn default_cliff_months() -> u32 {
    12
}

impl Default for VestingTerms {
    fn default() -> Self {
        Self {
            vesting_years: default_vesting_years(),
            cliff_months: default_cliff_months(),
            exercise_window_days: None,
            acceleration: Acceleration::None,
        }
    }
}

impl VestingTerms {
    pub fn effective_exercise_window_days(&self) -> u32 {
        self.exercise_window_days
            .unwrap_or(DEFAULT_EXERCISE_WINDOW_DAYS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueBand {
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompPackage {
    pub equity_type: EquityType,
    pub base_salary: f64,
    #[serde(default)]
    pub bonus_target: f64,
    #[serde(default)]
    pub equity_option_count: Option<f64>,
    #[serde(default, rename = "equityPercentFD")]
    pub equity_percent_fd: Option<f64>,
    #[serde(default)]
    pub strike_price: Option<f64>,
    #[serde(default)]
    pub token_amount: Option<f64>,
    #[serde(default)]
    pub burn_delta_monthly: Option<f64>,
    #[serde(default)]
    pub pool_impact_percent: Option<f64>,
    #[serde(default)]
    pub pool_remaining_after: Option<f64>,
    #[serde(default)]
    pub vesting: VestingTerms,
    /// Filled in by the scorer; ignored on input.
    #[serde(default)]
    pub scores: Option<PackageScores>,
    #[serde(default)]
    pub expected_value_band: Option<ValueBand>,
    #[serde(default)]
    pub is_recommended: bool,
}

impl CompPackage {
    #[cfg(test)]
    pub fn new(equity_type: EquityType, base_salary: f64) -> Self {
        Self {
            equity_type,
            base_salary,
            bonus_target: 0.0,
            equity_option_count: None,
            equity_percent_fd: None,
            strike_price: None,
            token_amount: None,
            burn_delta_monthly: None,
            pool_impact_percent: None,
            pool_remaining_after: None,
            vesting: VestingTerms::default(),
            scores: None,
            expected_value_band: None,
            is_recommended: false,
        }
    }

    /// Ownership used for scoring: an explicit zero when no equity is offered.
    pub fn effective_equity_percent(&self) -> Option<f64> {
        match self.equity_type {
            EquityType::None => Some(self.equity_percent_fd.unwrap_or(0.0)),
            _ => self.equity_percent_fd,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Benchmarks
// ────────────────────────────────────────────────────────────────────────────

/// Percentile band for a single metric. Construct through [`Benchmark::validated`]
/// at any trust boundary so `p25 <= p50 <= p75` holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Benchmark {
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
}

impl Benchmark {
    /// Rejects non-finite values, clamps negatives to zero and sorts the band.
    pub fn validated(p25: f64, p50: f64, p75: f64) -> Option<Benchmark> {
        if !(p25.is_finite() && p50.is_finite() && p75.is_finite()) {
            return None;
        }
        let mut values = [p25.max(0.0), p50.max(0.0), p75.max(0.0)];
        values.sort_by(|a, b| a.total_cmp(b));
        Some(Benchmark {
            p25: values[0],
            p50: values[1],
            p75: values[2],
        })
    }

    pub fn is_ordered(&self) -> bool {
        0.0 <= self.p25 && self.p25 <= self.p50 && self.p50 <= self.p75
    }

    pub fn revalidated(self) -> Option<Benchmark> {
        Self::validated(self.p25, self.p50, self.p75)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkSet {
    pub salary: Benchmark,
    #[serde(default)]
    pub equity_percent: Option<Benchmark>,
}

// ────────────────────────────────────────────────────────────────────────────
// Scores
// ────────────────────────────────────────────────────────────────────────────

/// Ordered score taxonomy, worst first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoreCategory {
    Concerning,
    BelowMarket,
    Fair,
    Good,
    Excellent,
}

impl ScoreCategory {
    pub fn from_score(score: u32) -> ScoreCategory {
        match score {
            s if s >= 85 => ScoreCategory::Excellent,
            s if s >= 70 => ScoreCategory::Good,
            s if s >= 55 => ScoreCategory::Fair,
            s if s >= 40 => ScoreCategory::BelowMarket,
            _ => ScoreCategory::Concerning,
        }
    }
}

/// One scored dimension. `score`, `percentile` and `category` are all `None`
/// when the dimension could not be computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubScore {
    pub score: Option<u32>,
    pub percentile: Option<u32>,
    pub verdict: String,
    pub category: Option<ScoreCategory>,
}

impl SubScore {
    pub fn unknown(verdict: impl Into<String>) -> Self {
        Self {
            score: None,
            percentile: None,
            verdict: verdict.into(),
            category: None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.score.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallScore {
    pub score: Option<u32>,
    pub category: Option<ScoreCategory>,
    pub headline: String,
    pub paragraph: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageScores {
    pub cash_score: SubScore,
    pub equity_score: SubScore,
    pub terms_score: SubScore,
    pub overall_score: OverallScore,
}

// ────────────────────────────────────────────────────────────────────────────
// Flags, suggestions, scenarios
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskFlagType {
    #[serde(rename = "409a-dependency")]
    Valuation409A,
    #[serde(rename = "iso-limit")]
    IsoLimit,
    #[serde(rename = "tax-treatment")]
    TaxTreatment,
    #[serde(rename = "83b-election")]
    Election83B,
    #[serde(rename = "token-withholding")]
    TokenWithholding,
    #[serde(rename = "token-lockup")]
    TokenLockup,
    #[serde(rename = "token-regulatory")]
    TokenRegulatory,
    #[serde(rename = "pool-exhaustion")]
    PoolExhaustion,
    #[serde(rename = "runway-impact")]
    RunwayImpact,
    #[serde(rename = "jurisdiction")]
    Jurisdiction,
    #[serde(rename = "board-approval")]
    BoardApproval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
    Positive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFlag {
    #[serde(rename = "type")]
    pub flag_type: RiskFlagType,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub action_required: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionCategory {
    Standard,
    NonObvious,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegotiationSuggestion {
    pub title: String,
    pub category: SuggestionCategory,
    pub current_value: String,
    pub suggested_value: String,
    pub rationale: String,
    pub suggested_language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitScenario {
    pub name: String,
    pub exit_multiple: f64,
    pub dilution_percent: f64,
    pub years_to_exit: f64,
    pub probability: f64,
    /// `None` when ownership is unknown.
    pub net_equity_value: Option<f64>,
}

/// Names an input the engine needed but did not get, with the question a
/// caller can put to the user to fill it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingDataWarning {
    pub field: String,
    pub question: String,
}
