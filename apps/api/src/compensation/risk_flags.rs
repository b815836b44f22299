//! Risk Flagger: independent compliance and structural checks.
//!
//! Each rule is a pure `fn(&FlagContext) -> Vec<RiskFlag>`. Every rule runs on every
//! evaluation and the results are concatenated; no rule can suppress or overwrite
//! another rule's flag.

use chrono::{Months, NaiveDate};

use crate::compensation::models::{
    CompPackage, CompanyContext, EquityType, Geo, RiskFlag, RiskFlagType, RoleProfile, Severity,
    TokenProgram,
};
use crate::compensation::package_scorer::{format_currency, format_percent, trim_number};
use crate::compensation::stage_defaults::StageDefaults;

pub const ISO_ANNUAL_LIMIT: f64 = 100_000.0;
pub const VALUATION_MAX_AGE_MONTHS: u32 = 12;
pub const POOL_IMPACT_WARNING: f64 = 25.0;
pub const POOL_IMPACT_CRITICAL: f64 = 50.0;
pub const POOL_UTILIZATION_WARNING: f64 = 70.0;
pub const POOL_UTILIZATION_CRITICAL: f64 = 85.0;
pub const RUNWAY_WATCH_MONTHS: f64 = 18.0;
pub const RUNWAY_CRITICAL_MONTHS: f64 = 12.0;
pub const RUNWAY_DROP_MONTHS: f64 = 1.0;
pub const BOARD_APPROVAL_PERCENT: f64 = 0.5;
/// Fully loaded cost of a salary dollar (payroll taxes, benefits).
pub const EMPLOYER_COST_MULTIPLIER: f64 = 1.2;

/// Everything a rule may look at.
pub struct FlagContext<'a> {
    pub package: &'a CompPackage,
    pub company: &'a CompanyContext,
    pub role: &'a RoleProfile,
    pub token_program: Option<&'a TokenProgram>,
    pub stage_defaults: &'a StageDefaults,
    /// Reference date for valuation staleness.
    pub as_of: NaiveDate,
}

type FlagRule = fn(&FlagContext<'_>) -> Vec<RiskFlag>;

const RULES: &[FlagRule] = &[
    check_409a_dependency,
    check_iso_limit,
    check_tax_treatment,
    check_83b_election,
    check_token_withholding,
    check_token_lockup,
    check_token_regulatory,
    check_pool_impact,
    check_pool_exhaustion,
    check_runway_impact,
    check_jurisdiction,
    check_board_approval,
];

pub fn generate_risk_flags(ctx: &FlagContext<'_>) -> Vec<RiskFlag> {
    RULES.iter().flat_map(|rule| rule(ctx)).collect()
}

fn flag(
    flag_type: RiskFlagType,
    severity: Severity,
    title: impl Into<String>,
    description: impl Into<String>,
    action_required: Option<&str>,
) -> RiskFlag {
    RiskFlag {
        flag_type,
        severity,
        title: title.into(),
        description: description.into(),
        action_required: action_required.map(str::to_string),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Derived figures (explicit input always wins over a derived or default value)
// ────────────────────────────────────────────────────────────────────────────

pub fn effective_strike_price(ctx: &FlagContext<'_>) -> f64 {
    ctx.package
        .strike_price
        .unwrap_or_else(|| ctx.stage_defaults.for_stage(ctx.company.stage).strike_price)
}

/// Option value that first becomes exercisable each year.
pub fn annual_vesting_value(ctx: &FlagContext<'_>) -> Option<f64> {
    let count = ctx.package.equity_option_count?;
    let years = if ctx.package.vesting.vesting_years > 0.0 {
        ctx.package.vesting.vesting_years
    } else {
        4.0
    };
    Some(count / years * effective_strike_price(ctx))
}

pub fn effective_burn_delta(package: &CompPackage) -> f64 {
    package
        .burn_delta_monthly
        .unwrap_or((package.base_salary + package.bonus_target) / 12.0 * EMPLOYER_COST_MULTIPLIER)
}

/// `optionCount / poolRemaining × 100` when the package does not state it.
pub fn effective_pool_impact(package: &CompPackage, company: &CompanyContext) -> Option<f64> {
    if package.pool_impact_percent.is_some() {
        return package.pool_impact_percent;
    }
    let count = package.equity_option_count?;
    let remaining = company.cap_table.as_ref()?.option_pool_remaining?;
    (remaining > 0.0).then(|| count / remaining * 100.0)
}

pub fn effective_pool_remaining_after(
    package: &CompPackage,
    company: &CompanyContext,
) -> Option<f64> {
    if package.pool_remaining_after.is_some() {
        return package.pool_remaining_after;
    }
    let count = package.equity_option_count?;
    let remaining = company.cap_table.as_ref()?.option_pool_remaining?;
    Some((remaining - count).max(0.0))
}

/// Percent of the pool already granted.
pub fn pool_utilization(company: &CompanyContext) -> Option<f64> {
    let cap = company.cap_table.as_ref()?;
    let size = cap.option_pool_size?;
    let remaining = cap.option_pool_remaining?;
    (size > 0.0).then(|| (size - remaining) * 100.0 / size)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunwayProjection {
    pub current_months: f64,
    pub after_hire_months: f64,
}

impl RunwayProjection {
    pub fn drop_months(&self) -> f64 {
        self.current_months - self.after_hire_months
    }
}

pub fn project_runway(ctx: &FlagContext<'_>) -> Option<RunwayProjection> {
    let current = ctx.company.runway_months?;
    let burn = ctx
        .company
        .monthly_burn
        .unwrap_or_else(|| ctx.stage_defaults.for_stage(ctx.company.stage).monthly_burn);
    let new_burn = burn + effective_burn_delta(ctx.package);
    if burn <= 0.0 || new_burn <= 0.0 {
        return None;
    }
    Some(RunwayProjection {
        current_months: current,
        after_hire_months: current * burn / new_burn,
    })
}

pub fn is_valuation_stale(last: Option<NaiveDate>, as_of: NaiveDate) -> bool {
    match last.and_then(|d| d.checked_add_months(Months::new(VALUATION_MAX_AGE_MONTHS))) {
        Some(expires) => as_of > expires,
        None => true,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Rules
// ────────────────────────────────────────────────────────────────────────────

fn check_409a_dependency(ctx: &FlagContext<'_>) -> Vec<RiskFlag> {
    if !ctx.package.equity_type.is_stock_option() {
        return vec![];
    }
    let last = ctx
        .company
        .cap_table
        .as_ref()
        .and_then(|c| c.last_409a_date);

    if !is_valuation_stale(last, ctx.as_of) {
        return vec![flag(
            RiskFlagType::Valuation409A,
            Severity::Info,
            "Strike price is set by the 409A valuation",
            format!(
                "The strike price should match the most recent 409A valuation{}.",
                last.map(|d| format!(" ({d})")).unwrap_or_default()
            ),
            None,
        )];
    }

    let description = match last {
        Some(d) => format!(
            "The last 409A valuation ({d}) is more than {VALUATION_MAX_AGE_MONTHS} months old. \
             Options priced off a stale valuation can be treated as discounted and taxed under Section 409A."
        ),
        None => "No 409A valuation is on file. Options granted without a current valuation risk \
                 being treated as discounted and taxed under Section 409A."
            .to_string(),
    };
    vec![flag(
        RiskFlagType::Valuation409A,
        Severity::Warning,
        "409A valuation missing or out of date",
        description,
        Some("Ask for the date and per-share price of the most recent 409A valuation"),
    )]
}

fn check_iso_limit(ctx: &FlagContext<'_>) -> Vec<RiskFlag> {
    if ctx.package.equity_type != EquityType::Iso {
        return vec![];
    }
    match annual_vesting_value(ctx) {
        Some(annual) if annual > ISO_ANNUAL_LIMIT => vec![flag(
            RiskFlagType::IsoLimit,
            Severity::Warning,
            "Grant exceeds the ISO $100,000 annual limit",
            format!(
                "About {} of options first become exercisable each year. Anything above {} \
                 per year is treated as NSOs, taxed as ordinary income at exercise.",
                format_currency(annual),
                format_currency(ISO_ANNUAL_LIMIT)
            ),
            Some("Confirm how the company will designate the portion above the ISO limit"),
        )],
        _ => vec![],
    }
}

fn check_tax_treatment(ctx: &FlagContext<'_>) -> Vec<RiskFlag> {
    let (title, description) = match ctx.package.equity_type {
        EquityType::Iso => (
            "ISO tax treatment",
            "ISOs are not taxed at exercise for regular tax, but the spread counts toward the \
             alternative minimum tax. Holding shares 1 year after exercise and 2 years after \
             grant qualifies gains for long-term capital gains rates.",
        ),
        EquityType::Nso => (
            "NSO tax treatment",
            "The spread between strike price and fair market value is taxed as ordinary income \
             at exercise, with withholding. Later gains are capital gains.",
        ),
        _ => return vec![],
    };
    vec![flag(
        RiskFlagType::TaxTreatment,
        Severity::Info,
        title,
        description,
        None,
    )]
}

fn check_83b_election(ctx: &FlagContext<'_>) -> Vec<RiskFlag> {
    if ctx.package.equity_type != EquityType::RestrictedStock {
        return vec![];
    }
    vec![flag(
        RiskFlagType::Election83B,
        Severity::Critical,
        "83(b) election must be filed within 30 days",
        "Restricted stock is taxed as it vests unless an 83(b) election is filed with the IRS \
         within 30 days of the grant. The deadline cannot be extended and a missed election \
         cannot be fixed later.",
        Some("File Form 83(b) with the IRS within 30 days of the grant date and keep proof of mailing"),
    )]
}

fn token_program_enabled(ctx: &FlagContext<'_>) -> bool {
    ctx.token_program.is_some_and(|t| t.enabled)
}

/// `tokenAmount × tokenPrice` when both are known.
pub fn token_grant_value(ctx: &FlagContext<'_>) -> Option<f64> {
    let amount = ctx.package.token_amount?;
    let price = ctx.token_program?.token_price?;
    Some(amount * price)
}

fn check_token_withholding(ctx: &FlagContext<'_>) -> Vec<RiskFlag> {
    if ctx.package.token_amount.is_none() || !token_program_enabled(ctx) {
        return vec![];
    }
    let mut description = "Tokens are generally taxed as ordinary income at fair market value \
                           when they vest, even if they cannot be sold yet. Withholding must be \
                           funded in cash or by selling tokens."
        .to_string();
    if let Some(value) = token_grant_value(ctx) {
        description.push_str(&format!(
            " At the current token price the full grant is worth about {}, all of it \
             taxable as it vests.",
            format_currency(value)
        ));
    }
    vec![flag(
        RiskFlagType::TokenWithholding,
        Severity::Warning,
        "Token vesting creates a tax bill",
        description,
        Some("Ask how the company will handle withholding on token vesting events"),
    )]
}

fn check_token_lockup(ctx: &FlagContext<'_>) -> Vec<RiskFlag> {
    let Some(program) = ctx.token_program.filter(|t| t.lockup_months > 0) else {
        return vec![];
    };
    vec![flag(
        RiskFlagType::TokenLockup,
        Severity::Info,
        "Tokens are locked up after vesting",
        format!(
            "Vested tokens cannot be transferred for {} months. Taxes may be due before the \
             tokens can be sold.",
            program.lockup_months
        ),
        None,
    )]
}

fn check_token_regulatory(ctx: &FlagContext<'_>) -> Vec<RiskFlag> {
    if ctx.package.token_amount.is_none() || !token_program_enabled(ctx) {
        return vec![];
    }
    vec![flag(
        RiskFlagType::TokenRegulatory,
        Severity::Warning,
        "Token compensation has regulatory uncertainty",
        "Whether a token is a security affects how it can be granted, sold and reported. \
         Rules differ by jurisdiction and are still changing.",
        Some("Ask whether the token grant has been reviewed by securities counsel"),
    )]
}

fn check_pool_impact(ctx: &FlagContext<'_>) -> Vec<RiskFlag> {
    let Some(impact) = effective_pool_impact(ctx.package, ctx.company) else {
        return vec![];
    };
    let severity = if impact > POOL_IMPACT_CRITICAL {
        Severity::Critical
    } else if impact > POOL_IMPACT_WARNING {
        Severity::Warning
    } else {
        return vec![];
    };
    vec![flag(
        RiskFlagType::PoolExhaustion,
        severity,
        "This grant uses a large share of the option pool",
        format!(
            "The grant consumes {} of the remaining option pool. The company may need a pool \
             increase, which requires board and stockholder approval, to hire after you.",
            format_percent(impact)
        ),
        Some("Confirm the shares for this grant are reserved under the current plan"),
    )]
}

fn check_pool_exhaustion(ctx: &FlagContext<'_>) -> Vec<RiskFlag> {
    let Some(utilized) = pool_utilization(ctx.company) else {
        return vec![];
    };
    let severity = if utilized > POOL_UTILIZATION_CRITICAL {
        Severity::Critical
    } else if utilized > POOL_UTILIZATION_WARNING {
        Severity::Warning
    } else {
        return vec![];
    };
    vec![flag(
        RiskFlagType::PoolExhaustion,
        severity,
        "Option pool is nearly exhausted",
        format!(
            "{} of the option pool is already granted. Refresh grants and future hires will \
             likely require a pool expansion that dilutes every holder.",
            format_percent(utilized)
        ),
        None,
    )]
}

fn check_runway_impact(ctx: &FlagContext<'_>) -> Vec<RiskFlag> {
    let Some(projection) = project_runway(ctx) else {
        return vec![];
    };
    if projection.current_months >= RUNWAY_WATCH_MONTHS
        || projection.drop_months() <= RUNWAY_DROP_MONTHS
    {
        return vec![];
    }
    let severity = if projection.after_hire_months < RUNWAY_CRITICAL_MONTHS {
        Severity::Critical
    } else {
        Severity::Warning
    };
    vec![flag(
        RiskFlagType::RunwayImpact,
        severity,
        "This hire shortens the company's runway",
        format!(
            "Runway drops from {} to about {} months once this role's cost is added to the burn.",
            trim_number(projection.current_months),
            trim_number((projection.after_hire_months * 10.0).round() / 10.0)
        ),
        Some("Ask when the company plans to raise next and what happens if the round slips"),
    )]
}

fn check_jurisdiction(ctx: &FlagContext<'_>) -> Vec<RiskFlag> {
    if ctx.role.geo != Geo::International {
        return vec![];
    }
    vec![flag(
        RiskFlagType::Jurisdiction,
        Severity::Warning,
        "Role is outside the United States",
        "US option plans, tax treatment and employment terms may not apply. Equity may need a \
         local sub-plan and employment may run through an employer of record.",
        Some("Confirm the employing entity and whether the equity plan covers your country"),
    )]
}

fn check_board_approval(ctx: &FlagContext<'_>) -> Vec<RiskFlag> {
    let large_grant = ctx
        .package
        .equity_percent_fd
        .is_some_and(|p| p > BOARD_APPROVAL_PERCENT);
    if !ctx.role.job_level.is_executive_track() && !large_grant {
        return vec![];
    }
    vec![flag(
        RiskFlagType::BoardApproval,
        Severity::Info,
        "Grant requires board approval",
        "Equity for senior leaders and large grants is approved by the board. The strike \
         price is fixed on the approval date, not the offer date.",
        None,
    )]
}
