//! Evaluator: runs one offer through the whole engine, or ranks a set of offers.
//!
//! Pipeline: role → benchmarks → scores → flags → exit model → suggestions.
//! Pure apart from `tracing` output; benchmark lookups go through the provider
//! handed in by the caller.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compensation::benchmarks::{validated_lookup, BenchmarkKey, BenchmarkProvider};
use crate::compensation::exit_scenarios::model_exits;
use crate::compensation::missing_data::{self, ResolutionGaps};
use crate::compensation::models::{
    BenchmarkSet, CompPackage, CompanyContext, ExitScenario, Geo, JobFamily, JobLevel,
    LocationType, MissingDataWarning, NegotiationSuggestion, RiskFlag, RoleProfile,
    TokenProgram,
};
use crate::compensation::negotiation::{self, NegotiationContext};
use crate::compensation::package_scorer;
use crate::compensation::risk_flags::{
    effective_pool_impact, effective_pool_remaining_after, generate_risk_flags, FlagContext,
};
use crate::compensation::role_normalizer::{canonical_title, normalize, AlternativeMapping};
use crate::compensation::stage_defaults::StageDefaults;

/// Role as supplied by the caller. Anything given explicitly overrides what the
/// normalizer infers from the title.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleInput {
    pub title: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub job_family: Option<JobFamily>,
    #[serde(default)]
    pub job_level: Option<JobLevel>,
    #[serde(default)]
    pub location_type: Option<LocationType>,
    #[serde(default)]
    pub geo: Option<Geo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferInput {
    pub role: RoleInput,
    pub company: CompanyContext,
    pub package: CompPackage,
    #[serde(default)]
    pub token_program: Option<TokenProgram>,
    /// Reference date for time-based checks; today when absent.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferEvaluation {
    pub role: RoleProfile,
    pub role_confidence: u8,
    pub alternative_mappings: Vec<AlternativeMapping>,
    pub benchmarks: Option<BenchmarkSet>,
    pub package: CompPackage,
    pub flags: Vec<RiskFlag>,
    pub suggestions: Vec<NegotiationSuggestion>,
    pub exit_scenarios: Vec<ExitScenario>,
    pub paper_value: Option<f64>,
    pub probability_weighted_value: Option<f64>,
    pub missing_data: Vec<MissingDataWarning>,
}

impl OfferEvaluation {
    pub fn overall_score(&self) -> Option<u32> {
        self.package
            .scores
            .as_ref()
            .and_then(|s| s.overall_score.score)
    }
}

pub struct ResolvedRole {
    pub profile: RoleProfile,
    pub confidence: u8,
    pub alternative_mappings: Vec<AlternativeMapping>,
    pub location_unknown: bool,
}

/// Normalizes the title, then lets explicit fields win. A role whose family and
/// level are both supplied is taken at full confidence.
pub fn resolve_role(input: &RoleInput) -> ResolvedRole {
    let normalized = normalize(&input.title, input.context.as_deref());
    let mut inferred = normalized.role_profile;

    let overridden = input.job_family.is_some() || input.job_level.is_some();
    let fully_specified = input.job_family.is_some() && input.job_level.is_some();
    if overridden {
        inferred.job_family = input.job_family.unwrap_or(inferred.job_family);
        inferred.job_level = input.job_level.unwrap_or(inferred.job_level);
        inferred.normalized_title = canonical_title(inferred.job_family, inferred.job_level);
    }

    let location_type = input.location_type.or(inferred.location_type);
    let geo = input.geo.or(inferred.geo);
    let location_unknown = location_type.is_none() && geo.is_none();

    let profile = inferred.complete(
        location_type.unwrap_or(LocationType::Remote),
        geo.unwrap_or(Geo::RemoteUs),
    );

    ResolvedRole {
        profile,
        confidence: if fully_specified { 100 } else { normalized.confidence },
        alternative_mappings: if fully_specified {
            Vec::new()
        } else {
            normalized.alternative_mappings
        },
        location_unknown,
    }
}

/// Fills pool figures derivable from the cap table. Explicit input is never replaced.
fn with_derived_pool_fields(mut package: CompPackage, company: &CompanyContext) -> CompPackage {
    package.pool_impact_percent = effective_pool_impact(&package, company);
    package.pool_remaining_after = effective_pool_remaining_after(&package, company);
    package
}

pub fn evaluate(
    input: &OfferInput,
    provider: &dyn BenchmarkProvider,
    defaults: &StageDefaults,
) -> OfferEvaluation {
    let role = resolve_role(&input.role);
    let company = &input.company;
    let mut package = with_derived_pool_fields(input.package.clone(), company);
    // Output-only fields; whatever the caller sent is discarded.
    package.scores = None;
    package.expected_value_band = None;
    package.is_recommended = false;

    let key = BenchmarkKey {
        job_family: role.profile.job_family,
        job_level: role.profile.job_level,
        geo: role.profile.geo,
        stage: company.stage,
    };
    let benchmarks = validated_lookup(provider, &key);
    if benchmarks.is_none() {
        debug!(?key, "no benchmark band");
    }

    package.scores = Some(package_scorer::score(
        &package,
        &role.profile,
        company,
        benchmarks.as_ref(),
    ));

    let as_of = input.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let flags = generate_risk_flags(&FlagContext {
        package: &package,
        company,
        role: &role.profile,
        token_program: input.token_program.as_ref(),
        stage_defaults: defaults,
        as_of,
    });

    let exit_model = model_exits(&package, company, defaults);
    package.expected_value_band = exit_model.expected_value_band;

    let suggestions = negotiation::generate(&NegotiationContext {
        package: &package,
        benchmarks: benchmarks.as_ref(),
        flags: &flags,
        company,
        exit_model: &exit_model,
    });

    let missing_data = missing_data::collect(
        &package,
        company,
        ResolutionGaps {
            location_unknown: role.location_unknown,
            benchmarks_unavailable: benchmarks.is_none(),
        },
    );

    debug!(
        family = ?role.profile.job_family,
        level = ?role.profile.job_level,
        flags = flags.len(),
        suggestions = suggestions.len(),
        "offer evaluated"
    );

    OfferEvaluation {
        role: role.profile,
        role_confidence: role.confidence,
        alternative_mappings: role.alternative_mappings,
        benchmarks,
        package,
        flags,
        suggestions,
        exit_scenarios: exit_model.scenarios,
        paper_value: exit_model.paper_value,
        probability_weighted_value: exit_model.probability_weighted_value,
        missing_data,
    }
}

/// Evaluates every offer and marks the one with the highest overall score as
/// recommended. Ties keep the earliest; unscored offers never win.
pub fn compare(
    inputs: &[OfferInput],
    provider: &dyn BenchmarkProvider,
    defaults: &StageDefaults,
) -> Vec<OfferEvaluation> {
    let mut evaluations: Vec<OfferEvaluation> = inputs
        .iter()
        .map(|input| evaluate(input, provider, defaults))
        .collect();

    let mut best: Option<(usize, u32)> = None;
    for (i, eval) in evaluations.iter().enumerate() {
        if let Some(score) = eval.overall_score() {
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((i, score));
            }
        }
    }
    if let Some((i, _)) = best {
        evaluations[i].package.is_recommended = true;
    }
    evaluations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compensation::benchmarks::BuiltinBenchmarks;
    use crate::compensation::models::{CapTable, CompanyStage, EquityType, RiskFlagType, Severity};
    use serde_json::json;

    struct NoBenchmarks;

    impl BenchmarkProvider for NoBenchmarks {
        fn lookup(&self, _key: &BenchmarkKey) -> Option<BenchmarkSet> {
            None
        }
    }

    fn input(title: &str, base: f64, percent: Option<f64>) -> OfferInput {
        let mut package = CompPackage::new(EquityType::Iso, base);
        package.equity_percent_fd = percent;
        OfferInput {
            role: RoleInput {
                title: title.to_string(),
                geo: Some(Geo::Sv),
                location_type: Some(LocationType::Onsite),
                ..RoleInput::default()
            },
            company: CompanyContext::new(CompanyStage::SeriesA),
            package,
            token_program: None,
            as_of: NaiveDate::from_ymd_opt(2026, 10, 1),
        }
    }

    #[test]
    fn test_evaluate_full_pipeline() {
        let eval = evaluate(
            &input("Senior Software Engineer", 185_000.0, Some(0.2)),
            &BuiltinBenchmarks,
            &StageDefaults::default(),
        );
        assert_eq!(eval.role.job_family, JobFamily::Engineering);
        assert_eq!(eval.role.job_level, JobLevel::Senior);
        assert!(eval.benchmarks.is_some());
        let scores = eval.package.scores.as_ref().expect("scores");
        assert_eq!(scores.cash_score.score, Some(65));
        assert!(eval.overall_score().is_some());
        assert_eq!(eval.exit_scenarios.len(), 4);
        assert!(eval.probability_weighted_value.is_some());
        assert!(eval.package.expected_value_band.is_some());
        assert!(!eval.suggestions.is_empty());
        assert!(eval
            .flags
            .iter()
            .any(|f| f.flag_type == RiskFlagType::Valuation409A));
    }

    #[test]
    fn test_unknown_ownership_yields_no_values() {
        let eval = evaluate(
            &input("Software Engineer", 150_000.0, None),
            &BuiltinBenchmarks,
            &StageDefaults::default(),
        );
        assert_eq!(eval.probability_weighted_value, None);
        assert!(eval.exit_scenarios.iter().all(|s| s.net_equity_value.is_none()));
        assert!(eval
            .missing_data
            .iter()
            .any(|w| w.field == "equityPercentFD"));
        let scores = eval.package.scores.expect("scores");
        assert!(scores.equity_score.is_unknown());
    }

    #[test]
    fn test_missing_benchmarks_reported() {
        let eval = evaluate(
            &input("Software Engineer", 150_000.0, Some(0.1)),
            &NoBenchmarks,
            &StageDefaults::default(),
        );
        assert!(eval.benchmarks.is_none());
        assert!(eval.missing_data.iter().any(|w| w.field == "benchmarks"));
        let scores = eval.package.scores.expect("scores");
        assert!(scores.cash_score.is_unknown());
    }

    #[test]
    fn test_explicit_role_fields_override_inference() {
        let role = resolve_role(&RoleInput {
            title: "Wizard".to_string(),
            job_family: Some(JobFamily::Design),
            job_level: Some(JobLevel::Staff),
            ..RoleInput::default()
        });
        assert_eq!(role.profile.job_family, JobFamily::Design);
        assert_eq!(role.profile.job_level, JobLevel::Staff);
        assert_eq!(role.profile.normalized_title, "Staff Product Designer");
        assert_eq!(role.confidence, 100);
        assert!(role.location_unknown);
        assert_eq!(role.profile.geo, Geo::RemoteUs);
    }

    #[test]
    fn test_location_inferred_from_context() {
        let role = resolve_role(&RoleInput {
            title: "Product Manager".to_string(),
            context: Some("Fully remote team".to_string()),
            ..RoleInput::default()
        });
        assert!(!role.location_unknown);
        assert_eq!(role.profile.location_type, LocationType::Remote);
    }

    #[test]
    fn test_pool_fields_derived_from_cap_table() {
        let mut offer = input("Software Engineer", 150_000.0, Some(0.1));
        offer.package.equity_option_count = Some(750_000.0);
        offer.company.cap_table = Some(CapTable {
            option_pool_size: Some(2_000_000.0),
            option_pool_remaining: Some(1_000_000.0),
            last_409a_date: None,
        });
        let eval = evaluate(&offer, &BuiltinBenchmarks, &StageDefaults::default());
        assert_eq!(eval.package.pool_impact_percent, Some(75.0));
        assert_eq!(eval.package.pool_remaining_after, Some(250_000.0));
        assert!(eval
            .flags
            .iter()
            .any(|f| f.flag_type == RiskFlagType::PoolExhaustion
                && f.severity == Severity::Critical));
    }

    #[test]
    fn test_compare_recommends_exactly_one() {
        let inputs = vec![
            input("Software Engineer", 120_000.0, Some(0.05)),
            input("Software Engineer", 200_000.0, Some(0.3)),
            input("Software Engineer", 200_000.0, Some(0.3)),
        ];
        let evals = compare(&inputs, &BuiltinBenchmarks, &StageDefaults::default());
        let recommended: Vec<usize> = evals
            .iter()
            .enumerate()
            .filter(|(_, e)| e.package.is_recommended)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(recommended, vec![1]);
    }

    #[test]
    fn test_client_recommendation_flag_is_ignored() {
        let mut offer = input("Software Engineer", 150_000.0, Some(0.1));
        offer.package.is_recommended = true;
        let eval = evaluate(&offer, &BuiltinBenchmarks, &StageDefaults::default());
        assert!(!eval.package.is_recommended);
    }

    #[test]
    fn test_compare_overrides_client_recommendation() {
        let mut loser = input("Software Engineer", 120_000.0, Some(0.05));
        loser.package.is_recommended = true;
        let winner = input("Software Engineer", 230_000.0, Some(0.3));
        let evals = compare(
            &[loser, winner],
            &BuiltinBenchmarks,
            &StageDefaults::default(),
        );
        let flags: Vec<bool> = evals.iter().map(|e| e.package.is_recommended).collect();
        assert_eq!(flags, vec![false, true]);
    }

    #[test]
    fn test_compare_tie_keeps_first_option() {
        let inputs = vec![input("Software Engineer", 120_000.0, None); 2];
        let evals = compare(&inputs, &NoBenchmarks, &StageDefaults::default());
        assert!(evals[0].package.is_recommended);
        assert!(!evals[1].package.is_recommended);
    }

    #[test]
    fn test_offer_input_deserializes_from_camel_case() {
        let input: OfferInput = serde_json::from_value(json!({
            "role": { "title": "Staff Engineer", "geo": "nyc" },
            "company": {
                "stage": "series-b",
                "runwayMonths": 30,
                "capTable": { "optionPoolRemaining": 500000, "last409ADate": "2026-04-01" }
            },
            "package": {
                "equityType": "nso",
                "baseSalary": 230000,
                "equityPercentFD": 0.15,
                "vesting": { "acceleration": "double-trigger" }
            },
            "asOf": "2026-10-01"
        }))
        .expect("valid input");
        assert_eq!(input.role.geo, Some(Geo::Nyc));
        assert_eq!(input.company.stage, CompanyStage::SeriesB);
        assert_eq!(input.package.equity_percent_fd, Some(0.15));
        assert_eq!(input.package.vesting.vesting_years, 4.0);
        assert_eq!(input.as_of, NaiveDate::from_ymd_opt(2026, 10, 1));
    }
}
