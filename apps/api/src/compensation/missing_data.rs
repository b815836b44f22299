//! Gaps in the input that limited the evaluation, each paired with the question
//! that would close it.

use crate::compensation::models::{CompPackage, CompanyContext, EquityType, MissingDataWarning};

/// What the evaluator could not resolve on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionGaps {
    /// Location was neither supplied nor found in the title or context.
    pub location_unknown: bool,
    /// No benchmark band exists for the role, market and stage.
    pub benchmarks_unavailable: bool,
}

fn warning(field: &str, question: &str) -> MissingDataWarning {
    MissingDataWarning {
        field: field.to_string(),
        question: question.to_string(),
    }
}

pub fn collect(
    package: &CompPackage,
    company: &CompanyContext,
    gaps: ResolutionGaps,
) -> Vec<MissingDataWarning> {
    let mut out = Vec::new();
    let has_equity = package.equity_type != EquityType::None;
    let is_option = package.equity_type.is_stock_option();

    if has_equity && package.equity_percent_fd.is_none() {
        out.push(warning(
            "equityPercentFD",
            "What percentage of the company's fully diluted shares does this grant represent?",
        ));
    }
    if is_option && package.strike_price.is_none() {
        out.push(warning(
            "strikePrice",
            "What is the strike (exercise) price per share of the options?",
        ));
    }
    if is_option
        && company
            .cap_table
            .as_ref()
            .and_then(|c| c.last_409a_date)
            .is_none()
    {
        out.push(warning(
            "last409ADate",
            "When was the company's most recent 409A valuation?",
        ));
    }
    if company.runway_months.is_none() {
        out.push(warning(
            "runwayMonths",
            "How many months of runway does the company have at its current burn rate?",
        ));
    }
    if has_equity && company.post_money_valuation.is_none() {
        out.push(warning(
            "postMoneyValuation",
            "What was the post-money valuation of the company's most recent round?",
        ));
    }
    if gaps.location_unknown {
        out.push(warning(
            "geo",
            "Where is the role based, and is it remote, hybrid or onsite?",
        ));
    }
    if gaps.benchmarks_unavailable {
        out.push(warning(
            "benchmarks",
            "Do you have salary data for comparable roles to compare this offer against?",
        ));
    }
    out
}
