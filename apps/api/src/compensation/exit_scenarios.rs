//! Exit Scenario Model: probability-weighted value of the equity grant.
//!
//! The scenario set is fixed and its probabilities sum to 1. Paper value is
//! `equityPercentFD / 100 × post-money valuation`; each scenario applies its exit
//! multiple and the dilution expected before that exit. Unknown ownership is
//! never guessed: every value comes back `None`.

use serde::{Deserialize, Serialize};

use crate::compensation::models::{CompPackage, CompanyContext, ExitScenario, ValueBand};
use crate::compensation::stage_defaults::StageDefaults;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioSpec {
    pub name: &'static str,
    pub exit_multiple: f64,
    pub dilution_percent: f64,
    pub years_to_exit: f64,
    pub probability: f64,
}

pub const SCENARIOS: [ScenarioSpec; 4] = [
    ScenarioSpec {
        name: "Shutdown",
        exit_multiple: 0.0,
        dilution_percent: 0.0,
        years_to_exit: 3.0,
        probability: 0.35,
    },
    ScenarioSpec {
        name: "Modest acquisition",
        exit_multiple: 1.5,
        dilution_percent: 30.0,
        years_to_exit: 4.0,
        probability: 0.30,
    },
    ScenarioSpec {
        name: "Strong acquisition",
        exit_multiple: 5.0,
        dilution_percent: 45.0,
        years_to_exit: 6.0,
        probability: 0.25,
    },
    ScenarioSpec {
        name: "IPO",
        exit_multiple: 15.0,
        dilution_percent: 60.0,
        years_to_exit: 8.0,
        probability: 0.10,
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitModel {
    pub scenarios: Vec<ExitScenario>,
    /// Current value of the grant at the last post-money valuation.
    pub paper_value: Option<f64>,
    pub probability_weighted_value: Option<f64>,
    pub expected_value_band: Option<ValueBand>,
}

/// `None` when the ownership percentage is unknown.
pub fn paper_value(
    package: &CompPackage,
    company: &CompanyContext,
    defaults: &StageDefaults,
) -> Option<f64> {
    let percent = package.effective_equity_percent()?;
    let valuation = company
        .post_money_valuation
        .unwrap_or_else(|| defaults.for_stage(company.stage).post_money_valuation);
    Some((percent * valuation / 100.0).max(0.0))
}

pub fn net_equity_value(paper: f64, spec: &ScenarioSpec) -> f64 {
    (paper * spec.exit_multiple * (1.0 - spec.dilution_percent / 100.0)).max(0.0)
}

/// Runs an arbitrary scenario set. `model_exits` uses the fixed [`SCENARIOS`].
pub fn model_with(specs: &[ScenarioSpec], paper: Option<f64>) -> ExitModel {
    let scenarios: Vec<ExitScenario> = specs
        .iter()
        .map(|spec| ExitScenario {
            name: spec.name.to_string(),
            exit_multiple: spec.exit_multiple,
            dilution_percent: spec.dilution_percent,
            years_to_exit: spec.years_to_exit,
            probability: spec.probability,
            net_equity_value: paper.map(|p| net_equity_value(p, spec)),
        })
        .collect();

    let probability_weighted_value = paper.map(|_| {
        scenarios
            .iter()
            .map(|s| s.probability * s.net_equity_value.unwrap_or(0.0))
            .sum()
    });

    let values: Vec<f64> = scenarios
        .iter()
        .filter_map(|s| s.net_equity_value)
        .filter(|v| *v > 0.0)
        .collect();
    let expected_value_band = match (
        values.iter().copied().reduce(f64::min),
        values.iter().copied().reduce(f64::max),
    ) {
        (Some(low), Some(high)) => Some(ValueBand { low, high }),
        _ => None,
    };

    ExitModel {
        scenarios,
        paper_value: paper,
        probability_weighted_value,
        expected_value_band,
    }
}

pub fn model_exits(
    package: &CompPackage,
    company: &CompanyContext,
    defaults: &StageDefaults,
) -> ExitModel {
    model_with(&SCENARIOS, paper_value(package, company, defaults))
}
