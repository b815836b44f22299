//! Package Scorer: places a cash + equity package against percentile benchmarks.
//!
//! Algorithm:
//! 1. Cash: `baseSalary` against the salary band, piecewise-linear between anchors
//!    (0 → 0, p25 → 40, p50 → 65, p75 → 85, p75 + spread → 100).
//! 2. Equity: `equityPercentFD` against the equity band, same anchors. Unknown
//!    ownership or a missing band → explicit unknown sub-score.
//! 3. Terms: vesting, exercise window and acceleration each rated 0..=3, mapped to
//!    25/50/75/100 and averaged.
//! 4. Overall: fixed weights below; unknown dimensions drop out and the rest is renormalised.

use crate::compensation::models::{
    Acceleration, Benchmark, BenchmarkSet, CompPackage, CompanyContext, EquityType,
    OverallScore, PackageScores, RoleProfile, ScoreCategory, SubScore, VestingTerms,
};

pub const CASH_WEIGHT: f64 = 0.45;
pub const EQUITY_WEIGHT: f64 = 0.35;
pub const TERMS_WEIGHT: f64 = 0.20;

const SCORE_ANCHORS: [f64; 5] = [0.0, 40.0, 65.0, 85.0, 100.0];
const PERCENTILE_ANCHORS: [f64; 5] = [0.0, 25.0, 50.0, 75.0, 95.0];
const MAX_PERCENTILE: f64 = 99.0;
/// Minimum width of the top segment, as a share of p75.
const MIN_SPREAD_RATIO: f64 = 0.10;

const MAX_RATING: u8 = 3;

// ────────────────────────────────────────────────────────────────────────────
// Band placement
// ────────────────────────────────────────────────────────────────────────────

/// Where a value falls inside a band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandPlacement {
    pub score: u32,
    pub percentile: u32,
}

fn band_points(band: &Benchmark) -> [f64; 5] {
    let spread = (band.p75 - band.p50).max(band.p75 * MIN_SPREAD_RATIO);
    [0.0, band.p25, band.p50, band.p75, band.p75 + spread]
}

/// Linear interpolation over non-decreasing `xs`; flat beyond both ends.
fn interpolate(value: f64, xs: &[f64; 5], ys: &[f64; 5]) -> f64 {
    if value <= xs[0] {
        return ys[0];
    }
    for i in 1..xs.len() {
        if value <= xs[i] {
            let width = xs[i] - xs[i - 1];
            if width <= f64::EPSILON {
                return ys[i];
            }
            return ys[i - 1] + (value - xs[i - 1]) / width * (ys[i] - ys[i - 1]);
        }
    }
    ys[ys.len() - 1]
}

/// Returns `None` for a degenerate band (median of zero) rather than inventing a score.
pub fn place_in_band(value: f64, band: &Benchmark) -> Option<BandPlacement> {
    if band.p50 <= 0.0 || !value.is_finite() {
        return None;
    }
    let xs = band_points(band);
    let score = interpolate(value, &xs, &SCORE_ANCHORS).round().clamp(0.0, 100.0);
    let percentile = interpolate(value, &xs, &PERCENTILE_ANCHORS)
        .round()
        .clamp(0.0, MAX_PERCENTILE);
    Some(BandPlacement {
        score: score as u32,
        percentile: percentile as u32,
    })
}

fn position_phrase(percentile: u32) -> &'static str {
    match percentile {
        p if p >= 75 => "top quartile",
        p if p >= 50 => "above the median",
        p if p >= 25 => "below the median",
        _ => "bottom quartile",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Dimension scores
// ────────────────────────────────────────────────────────────────────────────

pub fn score_cash(package: &CompPackage, benchmarks: Option<&BenchmarkSet>) -> SubScore {
    let Some(set) = benchmarks else {
        return SubScore::unknown("Unknown: no salary benchmark for this role and market");
    };
    let Some(placement) = place_in_band(package.base_salary, &set.salary) else {
        return SubScore::unknown("Unknown: salary benchmark is empty");
    };

    SubScore {
        score: Some(placement.score),
        percentile: Some(placement.percentile),
        verdict: format!(
            "Base salary of {} is in the {} (~p{}) against a market median of {}",
            format_currency(package.base_salary),
            position_phrase(placement.percentile),
            placement.percentile,
            format_currency(set.salary.p50)
        ),
        category: Some(ScoreCategory::from_score(placement.score)),
    }
}

pub fn score_equity(package: &CompPackage, benchmarks: Option<&BenchmarkSet>) -> SubScore {
    let Some(percent) = package.effective_equity_percent() else {
        return SubScore::unknown(
            "Unknown: the fully diluted ownership percentage was not provided",
        );
    };
    let Some(band) = benchmarks.and_then(|b| b.equity_percent) else {
        return SubScore::unknown("Unknown: no equity benchmark for this role and stage");
    };
    let Some(placement) = place_in_band(percent, &band) else {
        return SubScore::unknown("Unknown: equity benchmark is empty");
    };

    let verdict = if package.equity_type == EquityType::None {
        format!(
            "No equity offered; comparable roles receive a median of {}",
            format_percent(band.p50)
        )
    } else {
        format!(
            "{} fully diluted is in the {} (~p{}) against a market median of {}",
            format_percent(percent),
            position_phrase(placement.percentile),
            placement.percentile,
            format_percent(band.p50)
        )
    };

    SubScore {
        score: Some(placement.score),
        percentile: Some(placement.percentile),
        verdict,
        category: Some(ScoreCategory::from_score(placement.score)),
    }
}

/// Ordinal ratings (0 worst ..= 3 best) of the three terms dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermsRatings {
    pub vesting: u8,
    pub exercise: u8,
    pub acceleration: u8,
}

pub fn rate_vesting(terms: &VestingTerms) -> u8 {
    let years = terms.vesting_years;
    let cliff = terms.cliff_months;
    if years <= 3.0 && cliff <= 6 {
        3
    } else if years <= 4.0 && cliff <= 12 {
        2
    } else if years <= 4.0 || (years <= 5.0 && cliff <= 12) {
        1
    } else {
        0
    }
}

pub fn rate_exercise(equity_type: EquityType, terms: &VestingTerms) -> u8 {
    if !equity_type.is_stock_option() {
        // Nothing to exercise, nothing to lose on departure.
        return MAX_RATING;
    }
    match terms.effective_exercise_window_days() {
        d if d >= 3650 => 3,
        d if d >= 1825 => 2,
        d if d > 90 => 1,
        _ => 0,
    }
}

pub fn rate_acceleration(acceleration: Acceleration) -> u8 {
    match acceleration {
        Acceleration::None => 0,
        Acceleration::DoubleTrigger => 2,
        Acceleration::SingleTrigger => 3,
    }
}

pub fn rate_terms(package: &CompPackage) -> TermsRatings {
    TermsRatings {
        vesting: rate_vesting(&package.vesting),
        exercise: rate_exercise(package.equity_type, &package.vesting),
        acceleration: rate_acceleration(package.vesting.acceleration),
    }
}

fn rating_points(rating: u8) -> f64 {
    25.0 * (1.0 + f64::from(rating.min(MAX_RATING)))
}

pub fn score_terms(package: &CompPackage) -> SubScore {
    if package.equity_type == EquityType::None {
        return SubScore::unknown("Unknown: no equity, so there are no equity terms to assess");
    }

    let ratings = rate_terms(package);
    let score = ((rating_points(ratings.vesting)
        + rating_points(ratings.exercise)
        + rating_points(ratings.acceleration))
        / 3.0)
        .round() as u32;

    let terms = &package.vesting;
    let exercise = if package.equity_type.is_stock_option() {
        format!(
            "{}-day exercise window",
            terms.effective_exercise_window_days()
        )
    } else {
        "no exercise step".to_string()
    };
    let acceleration = match terms.acceleration {
        Acceleration::None => "no acceleration",
        Acceleration::DoubleTrigger => "double-trigger acceleration",
        Acceleration::SingleTrigger => "single-trigger acceleration",
    };

    SubScore {
        score: Some(score),
        percentile: None,
        verdict: format!(
            "{}-year vest with a {}-month cliff, {exercise}, {acceleration}",
            trim_number(terms.vesting_years),
            terms.cliff_months
        ),
        category: Some(ScoreCategory::from_score(score)),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Overall
// ────────────────────────────────────────────────────────────────────────────

fn weighted_overall(cash: &SubScore, equity: &SubScore, terms: &SubScore) -> Option<u32> {
    let parts = [
        (cash.score, CASH_WEIGHT),
        (equity.score, EQUITY_WEIGHT),
        (terms.score, TERMS_WEIGHT),
    ];
    let (sum, weight) = parts
        .iter()
        .filter_map(|(score, w)| score.map(|s| (f64::from(s) * w, *w)))
        .fold((0.0, 0.0), |(acc, total), (s, w)| (acc + s, total + w));

    if weight <= 0.0 {
        return None;
    }
    Some((sum / weight).round().clamp(0.0, 100.0) as u32)
}

fn headline(category: ScoreCategory) -> &'static str {
    match category {
        ScoreCategory::Excellent => "An excellent offer, well above market",
        ScoreCategory::Good => "A strong offer with room for small improvements",
        ScoreCategory::Fair => "A fair offer, close to market",
        ScoreCategory::BelowMarket => "Below market: worth negotiating",
        ScoreCategory::Concerning => "Concerning: significant gaps against market",
    }
}

fn build_paragraph(
    score: u32,
    role: &RoleProfile,
    company: &CompanyContext,
    dims: &[(&str, &SubScore)],
) -> String {
    let mut sentences = vec![format!(
        "Scored {score}/100 for a {} at a {} company.",
        role.normalized_title,
        company.stage.label()
    )];

    let weakest = dims
        .iter()
        .filter_map(|(name, s)| s.score.map(|v| (*name, v)))
        .min_by_key(|(_, v)| *v);
    let strongest = dims
        .iter()
        .filter_map(|(name, s)| s.score.map(|v| (*name, v)))
        .max_by_key(|(_, v)| *v);

    if let (Some((weak_name, weak)), Some((strong_name, strong))) = (weakest, strongest) {
        if weak_name != strong_name {
            sentences.push(format!(
                "Strongest area: {strong_name} ({strong}/100). Weakest area: {weak_name} ({weak}/100)."
            ));
        }
    }

    for (name, sub) in dims.iter().filter(|(_, s)| s.is_unknown()) {
        sentences.push(format!("{name} was not scored: {}.", sub.verdict));
    }

    sentences.join(" ")
}

/// Scores a package. Pure; benchmarks are looked up by the caller.
pub fn score(
    package: &CompPackage,
    role: &RoleProfile,
    company: &CompanyContext,
    benchmarks: Option<&BenchmarkSet>,
) -> PackageScores {
    let cash_score = score_cash(package, benchmarks);
    let equity_score = score_equity(package, benchmarks);
    let terms_score = score_terms(package);

    let overall_score = match weighted_overall(&cash_score, &equity_score, &terms_score) {
        Some(value) => {
            let category = ScoreCategory::from_score(value);
            OverallScore {
                score: Some(value),
                category: Some(category),
                headline: headline(category).to_string(),
                paragraph: build_paragraph(
                    value,
                    role,
                    company,
                    &[
                        ("Cash", &cash_score),
                        ("Equity", &equity_score),
                        ("Terms", &terms_score),
                    ],
                ),
            }
        }
        None => OverallScore {
            score: None,
            category: None,
            headline: "Not enough data to score this offer".to_string(),
            paragraph: "No dimension of the package could be compared against market data."
                .to_string(),
        },
    };

    PackageScores {
        cash_score,
        equity_score,
        terms_score,
        overall_score,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Formatting helpers (shared with the negotiation generator)
// ────────────────────────────────────────────────────────────────────────────

pub fn format_currency(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{}%", trim_number((value * 1000.0).round() / 1000.0))
}

pub fn trim_number(value: f64) -> String {
    let text = format!("{value:.3}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compensation::models::{CompanyStage, Geo, JobFamily, JobLevel, LocationType};

    fn band(p25: f64, p50: f64, p75: f64) -> Benchmark {
        Benchmark { p25, p50, p75 }
    }

    fn benchmarks() -> BenchmarkSet {
        BenchmarkSet {
            salary: band(160_000.0, 185_000.0, 213_000.0),
            equity_percent: Some(band(0.12, 0.2, 0.32)),
        }
    }

    fn role() -> RoleProfile {
        RoleProfile {
            title: "Senior Software Engineer".to_string(),
            normalized_title: "Senior Software Engineer".to_string(),
            job_family: JobFamily::Engineering,
            job_level: JobLevel::Senior,
            location_type: LocationType::Onsite,
            geo: Geo::Sv,
        }
    }

    fn package(salary: f64, percent: Option<f64>) -> CompPackage {
        let mut p = CompPackage::new(EquityType::Iso, salary);
        p.equity_percent_fd = percent;
        p
    }

    #[test]
    fn test_band_anchor_points() {
        let b = band(160_000.0, 185_000.0, 213_000.0);
        assert_eq!(place_in_band(160_000.0, &b).unwrap().score, 40);
        assert_eq!(place_in_band(185_000.0, &b).unwrap().score, 65);
        assert_eq!(place_in_band(213_000.0, &b).unwrap().score, 85);
        assert_eq!(place_in_band(185_000.0, &b).unwrap().percentile, 50);
        assert_eq!(place_in_band(1_000_000.0, &b).unwrap().score, 100);
        assert_eq!(place_in_band(1_000_000.0, &b).unwrap().percentile, 95);
        assert_eq!(place_in_band(0.0, &b).unwrap().score, 0);
    }

    #[test]
    fn test_cash_score_monotonic_in_salary() {
        let set = benchmarks();
        let mut previous = 0;
        for salary in (100_000..=400_000).step_by(5_000) {
            let s = score_cash(&package(salary as f64, None), Some(&set))
                .score
                .unwrap();
            assert!(s >= previous, "salary {salary} scored {s} < {previous}");
            previous = s;
        }
    }

    #[test]
    fn test_degenerate_band_is_safe() {
        assert!(place_in_band(100.0, &band(0.0, 0.0, 0.0)).is_none());
        // Flat band: no division by zero, still monotonic.
        let flat = band(100.0, 100.0, 100.0);
        assert!(place_in_band(99.0, &flat).unwrap().score <= place_in_band(101.0, &flat).unwrap().score);
    }

    #[test]
    fn test_equity_unknown_when_percent_missing() {
        let s = score_equity(&package(185_000.0, None), Some(&benchmarks()));
        assert!(s.is_unknown());
        assert!(s.percentile.is_none());
        assert!(s.category.is_none());
        assert!(s.verdict.starts_with("Unknown"));
    }

    #[test]
    fn test_equity_unknown_when_band_missing() {
        let set = BenchmarkSet {
            salary: band(1.0, 2.0, 3.0),
            equity_percent: None,
        };
        assert!(score_equity(&package(185_000.0, Some(0.2)), Some(&set)).is_unknown());
    }

    #[test]
    fn test_no_equity_scores_zero_not_unknown() {
        let p = CompPackage::new(EquityType::None, 185_000.0);
        let s = score_equity(&p, Some(&benchmarks()));
        assert_eq!(s.score, Some(0));
        assert!(s.verdict.contains("No equity"));
    }

    #[test]
    fn test_terms_standard_package() {
        // 4y/1y cliff = 2, 90 days = 0, no acceleration = 0 → (75 + 25 + 25) / 3
        let s = score_terms(&package(185_000.0, Some(0.2)));
        assert_eq!(s.score, Some(42));
        assert!(s.verdict.contains("4-year vest"));
        assert!(s.verdict.contains("90-day"));
    }

    #[test]
    fn test_terms_monotonic_across_ordinal_grid() {
        let vestings = [(5.0, 18), (5.0, 12), (4.0, 12), (3.0, 6)];
        let windows = [90, 365, 1825, 3650];
        let accels = [
            Acceleration::None,
            Acceleration::DoubleTrigger,
            Acceleration::SingleTrigger,
        ];

        let score_for = |v: usize, w: usize, a: usize| {
            let mut p = package(185_000.0, Some(0.2));
            p.vesting = VestingTerms {
                vesting_years: vestings[v].0,
                cliff_months: vestings[v].1,
                exercise_window_days: Some(windows[w]),
                acceleration: accels[a],
            };
            score_terms(&p).score.unwrap()
        };

        for v in 0..vestings.len() {
            for w in 0..windows.len() {
                for a in 0..accels.len() {
                    let base = score_for(v, w, a);
                    if v + 1 < vestings.len() {
                        assert!(score_for(v + 1, w, a) >= base);
                    }
                    if w + 1 < windows.len() {
                        assert!(score_for(v, w + 1, a) >= base);
                    }
                    if a + 1 < accels.len() {
                        assert!(score_for(v, w, a + 1) >= base);
                    }
                }
            }
        }
    }

    #[test]
    fn test_restricted_stock_exercise_rated_best() {
        let p = CompPackage::new(EquityType::RestrictedStock, 100_000.0);
        assert_eq!(rate_terms(&p).exercise, 3);
    }

    #[test]
    fn test_overall_renormalises_without_equity() {
        let scores = score(
            &package(185_000.0, None),
            &role(),
            &CompanyContext::new(CompanyStage::SeriesA),
            Some(&benchmarks()),
        );
        // cash 65 @ 0.45, terms 42 @ 0.20 → (29.25 + 8.4) / 0.65 = 57.9
        assert_eq!(scores.overall_score.score, Some(58));
        assert_eq!(scores.overall_score.category, Some(ScoreCategory::Fair));
        assert!(scores.overall_score.paragraph.contains("Equity was not scored"));
    }

    #[test]
    fn test_overall_without_any_benchmark_or_equity() {
        let scores = score(
            &CompPackage::new(EquityType::None, 90_000.0),
            &role(),
            &CompanyContext::new(CompanyStage::Seed),
            None,
        );
        assert!(scores.overall_score.score.is_none());
        assert!(scores.cash_score.is_unknown());
    }

    #[test]
    fn test_overall_headline_matches_category() {
        let scores = score(
            &package(213_000.0, Some(0.32)),
            &role(),
            &CompanyContext::new(CompanyStage::SeriesA),
            Some(&benchmarks()),
        );
        // 85 * 0.45 + 85 * 0.35 + 42 * 0.20 = 76.4
        assert_eq!(scores.overall_score.score, Some(76));
        assert_eq!(scores.overall_score.category, Some(ScoreCategory::Good));
        assert!(scores.overall_score.headline.contains("strong"));
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_currency(1_234_567.4), "$1,234,567");
        assert_eq!(format_currency(999.0), "$999");
        assert_eq!(format_percent(0.25), "0.25%");
        assert_eq!(format_percent(1.0), "1%");
        assert_eq!(trim_number(4.0), "4");
    }
}
