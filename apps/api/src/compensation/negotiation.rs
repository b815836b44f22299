//! Negotiation Generator: ranked asks with paste-ready clause language.
//!
//! Every candidate is scored with an integer impact and the list is stable-sorted,
//! so equal impacts keep generation order and output is deterministic:
//!
//! | driver                         | impact  |
//! |--------------------------------|---------|
//! | critical risk flag             | 100     |
//! | base salary below median       | 70..=90 |
//! | equity below median            | 65..=85 |
//! | warning risk flag              | 60      |
//! | non-standard vesting schedule  | 55      |
//! | exercise window, acceleration  | 50      |
//! | board approval timing          | 30      |
//! | signing bonus                  | 20      |

use crate::compensation::exit_scenarios::ExitModel;
use crate::compensation::models::{
    Acceleration, BenchmarkSet, CompPackage, CompanyContext, EquityType, NegotiationSuggestion,
    RiskFlag, RiskFlagType, Severity, SuggestionCategory,
};
use crate::compensation::package_scorer::{
    format_currency, format_percent, rate_vesting, trim_number,
};

pub const CRITICAL_FLAG_IMPACT: u8 = 100;
pub const CASH_GAP_BASE_IMPACT: u8 = 70;
pub const EQUITY_GAP_BASE_IMPACT: u8 = 65;
pub const MAX_GAP_BONUS: f64 = 20.0;
pub const WARNING_FLAG_IMPACT: u8 = 60;
pub const VESTING_IMPACT: u8 = 55;
pub const TERMS_IMPACT: u8 = 50;
pub const BOARD_TIMING_IMPACT: u8 = 30;
pub const COSMETIC_IMPACT: u8 = 20;

/// Exercise window worth asking for, in days.
const EXTENDED_EXERCISE_DAYS: u32 = 1825;

pub struct NegotiationContext<'a> {
    pub package: &'a CompPackage,
    pub benchmarks: Option<&'a BenchmarkSet>,
    pub flags: &'a [RiskFlag],
    pub company: &'a CompanyContext,
    pub exit_model: &'a ExitModel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedSuggestion {
    pub impact: u8,
    pub suggestion: NegotiationSuggestion,
}

fn ranked(
    impact: u8,
    category: SuggestionCategory,
    title: &str,
    current_value: impl Into<String>,
    suggested_value: impl Into<String>,
    rationale: impl Into<String>,
    suggested_language: impl Into<String>,
) -> RankedSuggestion {
    RankedSuggestion {
        impact,
        suggestion: NegotiationSuggestion {
            title: title.to_string(),
            category,
            current_value: current_value.into(),
            suggested_value: suggested_value.into(),
            rationale: rationale.into(),
            suggested_language: suggested_language.into(),
        },
    }
}

/// Suggestions, most impactful first.
pub fn generate(ctx: &NegotiationContext<'_>) -> Vec<NegotiationSuggestion> {
    generate_ranked(ctx)
        .into_iter()
        .map(|r| r.suggestion)
        .collect()
}

pub fn generate_ranked(ctx: &NegotiationContext<'_>) -> Vec<RankedSuggestion> {
    let (critical, warning) = flag_types_by_severity(ctx.flags);

    let mut out: Vec<RankedSuggestion> = Vec::new();
    out.extend(critical.iter().filter_map(|t| critical_flag_ask(*t, ctx)));
    out.extend(cash_ask(ctx));
    out.extend(equity_ask(ctx));
    out.extend(warning.iter().filter_map(|t| warning_flag_ask(*t, ctx)));
    out.extend(vesting_ask(ctx.package));
    out.extend(exercise_window_ask(ctx.package));
    out.extend(acceleration_ask(ctx.package));
    if ctx
        .flags
        .iter()
        .any(|f| f.flag_type == RiskFlagType::BoardApproval)
    {
        out.push(board_timing_ask());
    }
    out.push(signing_bonus_ask(ctx.package));

    out.sort_by(|a, b| b.impact.cmp(&a.impact));
    out
}

/// Flag types in first-seen order; a type with any critical flag is critical only.
fn flag_types_by_severity(flags: &[RiskFlag]) -> (Vec<RiskFlagType>, Vec<RiskFlagType>) {
    let mut critical = Vec::new();
    for f in flags.iter().filter(|f| f.severity == Severity::Critical) {
        if !critical.contains(&f.flag_type) {
            critical.push(f.flag_type);
        }
    }
    let mut warning = Vec::new();
    for f in flags.iter().filter(|f| f.severity == Severity::Warning) {
        if !critical.contains(&f.flag_type) && !warning.contains(&f.flag_type) {
            warning.push(f.flag_type);
        }
    }
    (critical, warning)
}

fn critical_flag_ask(t: RiskFlagType, ctx: &NegotiationContext<'_>) -> Option<RankedSuggestion> {
    let s = match t {
        RiskFlagType::Election83B => ranked(
            CRITICAL_FLAG_IMPACT,
            SuggestionCategory::NonObvious,
            "Get company support for the 83(b) election",
            "Employee files alone",
            "Company prepares the filing and covers any tax due",
            "The 83(b) deadline is 30 days from grant and cannot be extended. Missing it means \
             paying ordinary income tax on every vesting tranche at the value on that date.",
            "Please have counsel prepare my Section 83(b) election together with the stock \
             purchase agreement, and provide a tax gross-up for any income recognized on filing.",
        ),
        RiskFlagType::PoolExhaustion => ranked(
            CRITICAL_FLAG_IMPACT,
            SuggestionCategory::NonObvious,
            "Confirm the grant is reserved before signing",
            pool_current_value(ctx),
            "Shares reserved under the current plan and a refresh commitment",
            "The remaining option pool is too small to cover this grant comfortably. If the \
             board has to expand the pool first, your grant date and strike price can slip.",
            "Please confirm in writing that the shares for my grant are reserved under the \
             current equity plan and will be approved at the next board meeting at the \
             current strike price.",
        ),
        RiskFlagType::RunwayImpact => runway_ask(CRITICAL_FLAG_IMPACT, ctx),
        _ => return None,
    };
    Some(s)
}

fn warning_flag_ask(t: RiskFlagType, ctx: &NegotiationContext<'_>) -> Option<RankedSuggestion> {
    let s = match t {
        RiskFlagType::Valuation409A => ranked(
            WARNING_FLAG_IMPACT,
            SuggestionCategory::NonObvious,
            "Ask for a current 409A valuation",
            "No current 409A on file",
            "Grant priced off a 409A less than 12 months old",
            "Options priced without a current 409A can be treated as discounted, which brings \
             immediate income tax plus a 20% penalty under Section 409A.",
            "Could you confirm the date and per-share value of the company's most recent 409A \
             valuation, and that my strike price will be set from a valuation no older than \
             12 months?",
        ),
        RiskFlagType::IsoLimit => ranked(
            WARNING_FLAG_IMPACT,
            SuggestionCategory::NonObvious,
            "Allow early exercise",
            "Options exercisable only as they vest",
            "Early exercise permitted with an 83(b) election",
            "More than $100,000 of options vest each year, so part of the grant will be taxed \
             as NSOs. Exercising early while the spread is small keeps more of it in ISO \
             treatment and starts the capital gains clock.",
            "I'd like the option agreement to permit early exercise of unvested shares, \
             subject to the company's standard repurchase right.",
        ),
        RiskFlagType::RunwayImpact => runway_ask(WARNING_FLAG_IMPACT, ctx),
        RiskFlagType::PoolExhaustion => ranked(
            WARNING_FLAG_IMPACT,
            SuggestionCategory::NonObvious,
            "Confirm the shares are reserved",
            pool_current_value(ctx),
            "Written confirmation of reserved shares",
            "This grant takes a large share of the remaining pool. Confirming the reservation \
             now avoids a delay if the pool has to be expanded.",
            "Please confirm that the shares for my grant are reserved under the current \
             equity plan.",
        ),
        RiskFlagType::TokenWithholding => ranked(
            WARNING_FLAG_IMPACT,
            SuggestionCategory::NonObvious,
            "Net-settle tax withholding on token vesting",
            "Withholding funded by the employee",
            "Company withholds tokens to cover taxes",
            "Token vesting is taxable even while tokens cannot be sold. Without net settlement \
             you must pay the withholding in cash.",
            "I'd like the token grant to allow net settlement, with the company withholding \
             enough tokens at each vesting date to cover the required tax withholding.",
        ),
        RiskFlagType::TokenRegulatory => ranked(
            WARNING_FLAG_IMPACT,
            SuggestionCategory::NonObvious,
            "Get a written token grant agreement",
            "Token terms described informally",
            "Signed grant agreement with a fallback to cash or equity",
            "Token grants can be restructured if the regulatory treatment changes. A written \
             agreement with a fallback protects the value you were promised.",
            "Please document the token grant in a signed agreement that provides equivalent \
             cash or equity compensation if the tokens cannot be delivered as described.",
        ),
        RiskFlagType::Jurisdiction => ranked(
            WARNING_FLAG_IMPACT,
            SuggestionCategory::Standard,
            "Clarify the employing entity",
            "Employment outside the United States",
            "Named local entity or employer of record, equity under a local sub-plan",
            "US option plans and benefits may not apply in your country. The employing entity \
             decides your tax treatment, statutory benefits and how equity is granted.",
            "Could you confirm which entity will employ me, and whether my equity will be \
             granted under a sub-plan that is qualified in my country of residence?",
        ),
        _ => return None,
    };
    Some(s)
}

fn runway_ask(impact: u8, ctx: &NegotiationContext<'_>) -> RankedSuggestion {
    let runway = ctx
        .company
        .runway_months
        .map(|m| format!("{} months of runway", trim_number(m)))
        .unwrap_or_else(|| "Runway not disclosed".to_string());
    ranked(
        impact,
        SuggestionCategory::NonObvious,
        "Negotiate severance protection",
        runway,
        "Three months of base salary as severance",
        "The company's runway is short and adding this role shortens it further. Severance \
         covers the gap if the next round does not close.",
        "If my employment is terminated without cause within the first 12 months, I'd like \
         to receive severance equal to three months of base salary.",
    )
}

fn pool_current_value(ctx: &NegotiationContext<'_>) -> String {
    ctx.package
        .pool_impact_percent
        .map(|p| format!("Grant uses {} of the remaining pool", format_percent(p)))
        .unwrap_or_else(|| "Option pool mostly granted".to_string())
}

/// Impact bonus proportional to how far below the median a value sits.
fn gap_bonus(value: f64, median: f64) -> u8 {
    if median <= 0.0 {
        return 0;
    }
    let gap = ((median - value) / median).clamp(0.0, 1.0);
    (gap * 100.0).min(MAX_GAP_BONUS).round() as u8
}

fn cash_ask(ctx: &NegotiationContext<'_>) -> Option<RankedSuggestion> {
    let band = ctx.benchmarks?.salary;
    let base = ctx.package.base_salary;
    if base >= band.p50 {
        return None;
    }
    let percentile = ctx
        .package
        .scores
        .as_ref()
        .and_then(|s| s.cash_score.percentile)
        .map(|p| format!(" (about p{p})"))
        .unwrap_or_default();
    Some(ranked(
        CASH_GAP_BASE_IMPACT + gap_bonus(base, band.p50),
        SuggestionCategory::Standard,
        "Raise base salary toward the market median",
        format_currency(base),
        format_currency(band.p50),
        format!(
            "Your base salary{percentile} is {} below the median of {} for this role, level \
             and market.",
            format_currency(band.p50 - base),
            format_currency(band.p50)
        ),
        format!(
            "Based on market data for this role, I'd like to ask for a base salary of {}.",
            format_currency(band.p50)
        ),
    ))
}

fn equity_ask(ctx: &NegotiationContext<'_>) -> Option<RankedSuggestion> {
    let band = ctx.benchmarks?.equity_percent?;
    let package = ctx.package;
    let percent = package.effective_equity_percent()?;
    if percent >= band.p50 {
        return None;
    }

    let mut rationale = format!(
        "Your grant of {} is below the median of {} for this role at this stage.",
        format_percent(percent),
        format_percent(band.p50)
    );
    if let Some(value) = ctx.exit_model.probability_weighted_value {
        rationale.push_str(&format!(
            " Across the modelled exit outcomes it is worth about {} today",
            format_currency(value)
        ));
        if percent > 0.0 {
            rationale.push_str(&format!(
                ", against about {} at the median grant.",
                format_currency(value * band.p50 / percent)
            ));
        } else {
            rationale.push('.');
        }
    }

    let suggested_count = package
        .equity_option_count
        .filter(|_| percent > 0.0)
        .map(|count| (count * band.p50 / percent).round());
    let (current_value, suggested_value) = match (package.equity_option_count, suggested_count) {
        (Some(count), Some(target)) => (
            format!("{} ({} shares)", format_percent(percent), trim_number(count)),
            format!("{} ({} shares)", format_percent(band.p50), trim_number(target)),
        ),
        _ => (format_percent(percent), format_percent(band.p50)),
    };
    let language = match suggested_count {
        Some(target) => format!(
            "I'd like to ask for an equity grant of {} shares, about {} of the fully diluted \
             shares outstanding.",
            trim_number(target),
            format_percent(band.p50)
        ),
        None => format!(
            "I'd like to ask for an equity grant equal to {} of the fully diluted shares \
             outstanding.",
            format_percent(band.p50)
        ),
    };

    Some(ranked(
        EQUITY_GAP_BASE_IMPACT + gap_bonus(percent, band.p50),
        SuggestionCategory::Standard,
        "Increase the equity grant",
        current_value,
        suggested_value,
        rationale,
        language,
    ))
}

fn has_vesting_equity(package: &CompPackage) -> bool {
    package.equity_type != EquityType::None
}

fn vesting_ask(package: &CompPackage) -> Option<RankedSuggestion> {
    if !has_vesting_equity(package) || rate_vesting(&package.vesting) >= 2 {
        return None;
    }
    let v = &package.vesting;
    Some(ranked(
        VESTING_IMPACT,
        SuggestionCategory::Standard,
        "Move to a standard vesting schedule",
        format!(
            "{}-year vest, {}-month cliff",
            trim_number(v.vesting_years),
            v.cliff_months
        ),
        "4-year vest, 12-month cliff",
        "The schedule is longer or more back-loaded than the market norm of four years \
         with a one-year cliff.",
        "I'd like the grant to vest over four years with a one-year cliff and monthly \
         vesting thereafter.",
    ))
}

fn exercise_window_ask(package: &CompPackage) -> Option<RankedSuggestion> {
    if !package.equity_type.is_stock_option() {
        return None;
    }
    let days = package.vesting.effective_exercise_window_days();
    if days >= EXTENDED_EXERCISE_DAYS {
        return None;
    }
    Some(ranked(
        TERMS_IMPACT,
        SuggestionCategory::NonObvious,
        "Extend the post-termination exercise window",
        format!("{days} days"),
        "5 years",
        "With a short window you must buy your vested options, and possibly pay tax on the \
         spread, within weeks of leaving or lose them.",
        "I'd like my vested options to remain exercisable for five years after my \
         employment ends.",
    ))
}

fn acceleration_ask(package: &CompPackage) -> Option<RankedSuggestion> {
    if !has_vesting_equity(package) || package.vesting.acceleration != Acceleration::None {
        return None;
    }
    Some(ranked(
        TERMS_IMPACT,
        SuggestionCategory::NonObvious,
        "Add double-trigger acceleration",
        "No acceleration",
        "Full acceleration on termination within 12 months of a change of control",
        "Without acceleration an acquirer can let you go after closing and your unvested \
         equity is forfeited.",
        "If the company is acquired and my employment is terminated without cause or I \
         resign for good reason within 12 months after closing, all of my unvested equity \
         will vest immediately.",
    ))
}

fn board_timing_ask() -> RankedSuggestion {
    ranked(
        BOARD_TIMING_IMPACT,
        SuggestionCategory::Standard,
        "Confirm when the board will approve the grant",
        "Approval date not stated",
        "Approval at the next scheduled board meeting",
        "The strike price is set on the approval date. A delayed approval can mean a higher \
         strike if the valuation moves.",
        "Could you confirm that my grant will be presented for approval at the next board \
         meeting after my start date?",
    )
}

fn signing_bonus_ask(package: &CompPackage) -> RankedSuggestion {
    let suggested = (package.base_salary * 0.1 / 1_000.0).round() * 1_000.0;
    ranked(
        COSMETIC_IMPACT,
        SuggestionCategory::Standard,
        "Ask for a signing bonus",
        "None",
        format_currency(suggested),
        "A one-time bonus is often easier to approve than a higher base and can offset \
         a forfeited bonus or unvested equity at your current employer.",
        format!(
            "To help offset what I leave behind at my current employer, I'd like to ask for \
             a one-time signing bonus of {}.",
            format_currency(suggested)
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compensation::models::{Benchmark, CompanyStage};

    fn benchmarks() -> BenchmarkSet {
        BenchmarkSet {
            salary: Benchmark {
                p25: 160_000.0,
                p50: 185_000.0,
                p75: 213_000.0,
            },
            equity_percent: Some(Benchmark {
                p25: 0.12,
                p50: 0.2,
                p75: 0.32,
            }),
        }
    }

    fn flag(flag_type: RiskFlagType, severity: Severity) -> RiskFlag {
        RiskFlag {
            flag_type,
            severity,
            title: "t".to_string(),
            description: "d".to_string(),
            action_required: None,
        }
    }

    fn run(
        package: &CompPackage,
        flags: &[RiskFlag],
        bench: Option<&BenchmarkSet>,
    ) -> Vec<RankedSuggestion> {
        let company = CompanyContext::new(CompanyStage::SeriesA);
        let exit = ExitModel {
            scenarios: vec![],
            paper_value: None,
            probability_weighted_value: Some(100_000.0),
            expected_value_band: None,
        };
        generate_ranked(&NegotiationContext {
            package,
            benchmarks: bench,
            flags,
            company: &company,
            exit_model: &exit,
        })
    }

    fn titles(out: &[RankedSuggestion]) -> Vec<&str> {
        out.iter().map(|r| r.suggestion.title.as_str()).collect()
    }

    #[test]
    fn test_sorted_by_impact_descending() {
        let mut package = CompPackage::new(EquityType::Iso, 150_000.0);
        package.equity_percent_fd = Some(0.1);
        let flags = [
            flag(RiskFlagType::Valuation409A, Severity::Warning),
            flag(RiskFlagType::PoolExhaustion, Severity::Critical),
        ];
        let out = run(&package, &flags, Some(&benchmarks()));
        assert!(out.windows(2).all(|w| w[0].impact >= w[1].impact));
        assert_eq!(out[0].impact, CRITICAL_FLAG_IMPACT);
        assert_eq!(out.last().map(|r| r.impact), Some(COSMETIC_IMPACT));
    }

    #[test]
    fn test_critical_flag_before_cosmetic() {
        let package = CompPackage::new(EquityType::RestrictedStock, 300_000.0);
        let flags = [flag(RiskFlagType::Election83B, Severity::Critical)];
        let out = run(&package, &flags, None);
        let t = titles(&out);
        let election = t
            .iter()
            .position(|s| s.contains("83(b)"))
            .expect("83(b) ask");
        let bonus = t
            .iter()
            .position(|s| s.contains("signing bonus"))
            .expect("signing bonus ask");
        assert_eq!(election, 0);
        assert!(election < bonus);
    }

    #[test]
    fn test_language_differs_from_rationale() {
        let mut package = CompPackage::new(EquityType::Iso, 120_000.0);
        package.equity_percent_fd = Some(0.05);
        package.equity_option_count = Some(10_000.0);
        let flags = [
            flag(RiskFlagType::Valuation409A, Severity::Warning),
            flag(RiskFlagType::IsoLimit, Severity::Warning),
            flag(RiskFlagType::RunwayImpact, Severity::Critical),
            flag(RiskFlagType::Jurisdiction, Severity::Warning),
            flag(RiskFlagType::BoardApproval, Severity::Info),
        ];
        for r in run(&package, &flags, Some(&benchmarks())) {
            assert!(!r.suggestion.suggested_language.is_empty());
            assert_ne!(r.suggestion.suggested_language, r.suggestion.rationale);
        }
    }

    #[test]
    fn test_cash_gap_scales_impact() {
        let bench = benchmarks();
        let near = run(&CompPackage::new(EquityType::None, 180_000.0), &[], Some(&bench));
        let far = run(&CompPackage::new(EquityType::None, 100_000.0), &[], Some(&bench));
        let cash_impact = |out: &[RankedSuggestion]| {
            out.iter()
                .find(|r| r.suggestion.title.starts_with("Raise base salary"))
                .map(|r| r.impact)
        };
        assert_eq!(cash_impact(&near), Some(73));
        assert_eq!(cash_impact(&far), Some(90));

        let at_median = run(&CompPackage::new(EquityType::None, 185_000.0), &[], Some(&bench));
        assert_eq!(cash_impact(&at_median), None);
    }

    #[test]
    fn test_cash_ask_is_standard() {
        let out = run(
            &CompPackage::new(EquityType::None, 150_000.0),
            &[],
            Some(&benchmarks()),
        );
        let cash = out
            .iter()
            .find(|r| r.suggestion.title.starts_with("Raise base salary"))
            .expect("cash ask");
        assert_eq!(cash.suggestion.category, SuggestionCategory::Standard);
        assert_eq!(cash.suggestion.suggested_value, "$185,000");
    }

    #[test]
    fn test_equity_ask_cites_weighted_value_and_share_count() {
        let mut package = CompPackage::new(EquityType::Iso, 200_000.0);
        package.equity_percent_fd = Some(0.1);
        package.equity_option_count = Some(20_000.0);
        let out = run(&package, &[], Some(&benchmarks()));
        let equity = out
            .iter()
            .find(|r| r.suggestion.title == "Increase the equity grant")
            .expect("equity ask");
        assert_eq!(equity.impact, 85);
        assert!(equity.suggestion.rationale.contains("$100,000"));
        assert!(equity.suggestion.rationale.contains("$200,000"));
        assert_eq!(equity.suggestion.suggested_value, "0.2% (40000 shares)");
    }

    #[test]
    fn test_no_equity_ask_when_ownership_unknown() {
        let package = CompPackage::new(EquityType::Iso, 200_000.0);
        let out = run(&package, &[], Some(&benchmarks()));
        assert!(!titles(&out).contains(&"Increase the equity grant"));
    }

    #[test]
    fn test_non_obvious_tags() {
        let package = CompPackage::new(EquityType::Nso, 200_000.0);
        let out = run(&package, &[], None);
        let category = |title: &str| {
            out.iter()
                .find(|r| r.suggestion.title == title)
                .map(|r| r.suggestion.category)
        };
        assert_eq!(
            category("Extend the post-termination exercise window"),
            Some(SuggestionCategory::NonObvious)
        );
        assert_eq!(
            category("Add double-trigger acceleration"),
            Some(SuggestionCategory::NonObvious)
        );
        assert_eq!(
            category("Ask for a signing bonus"),
            Some(SuggestionCategory::Standard)
        );
    }

    #[test]
    fn test_good_terms_produce_no_term_asks() {
        let mut package = CompPackage::new(EquityType::Iso, 200_000.0);
        package.vesting.exercise_window_days = Some(3650);
        package.vesting.acceleration = Acceleration::DoubleTrigger;
        let out = run(&package, &[], None);
        let t = titles(&out);
        assert!(!t.contains(&"Extend the post-termination exercise window"));
        assert!(!t.contains(&"Add double-trigger acceleration"));
        assert!(!t.contains(&"Move to a standard vesting schedule"));
    }

    #[test]
    fn test_long_vesting_gets_standard_ask() {
        let mut package = CompPackage::new(EquityType::Iso, 200_000.0);
        package.vesting.vesting_years = 6.0;
        package.vesting.cliff_months = 24;
        let out = run(&package, &[], None);
        let vesting = out
            .iter()
            .find(|r| r.suggestion.title == "Move to a standard vesting schedule")
            .expect("vesting ask");
        assert_eq!(vesting.impact, VESTING_IMPACT);
        assert_eq!(vesting.suggestion.current_value, "6-year vest, 24-month cliff");
    }

    #[test]
    fn test_flag_types_deduplicated_by_highest_severity() {
        let package = CompPackage::new(EquityType::Iso, 200_000.0);
        let flags = [
            flag(RiskFlagType::PoolExhaustion, Severity::Warning),
            flag(RiskFlagType::PoolExhaustion, Severity::Critical),
        ];
        let out = run(&package, &flags, None);
        let pool: Vec<_> = out
            .iter()
            .filter(|r| r.suggestion.title.contains("reserved"))
            .collect();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].impact, CRITICAL_FLAG_IMPACT);
    }

    #[test]
    fn test_deterministic() {
        let mut package = CompPackage::new(EquityType::Iso, 150_000.0);
        package.equity_percent_fd = Some(0.1);
        let flags = [
            flag(RiskFlagType::Valuation409A, Severity::Warning),
            flag(RiskFlagType::Jurisdiction, Severity::Warning),
        ];
        let a = run(&package, &flags, Some(&benchmarks()));
        let b = run(&package, &flags, Some(&benchmarks()));
        assert_eq!(a, b);
    }
}
