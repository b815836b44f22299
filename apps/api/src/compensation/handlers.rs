use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::compensation::evaluator::{compare, evaluate, OfferEvaluation, OfferInput};
use crate::compensation::role_normalizer::{normalize, RoleNormalization};
use crate::errors::AppError;
use crate::models::usage::Tool;
use crate::state::AppState;
use crate::usage::record_use;

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_CONTEXT_CHARS: usize = 10_000;
pub const MIN_COMPARE_OFFERS: usize = 2;
pub const MAX_COMPARE_OFFERS: usize = 5;
const MAX_VESTING_YEARS: f64 = 10.0;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeRequest {
    pub title: String,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareRequest {
    pub offers: Vec<OfferInput>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareResponse {
    pub evaluations: Vec<OfferEvaluation>,
    pub recommended_index: Option<usize>,
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

fn validate_text(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

fn validate_title(title: &str, context: Option<&str>) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("title must not be empty".to_string()));
    }
    validate_text("title", title, MAX_TITLE_CHARS)?;
    if let Some(ctx) = context {
        validate_text("context", ctx, MAX_CONTEXT_CHARS)?;
    }
    Ok(())
}

fn non_negative(field: &str, value: Option<f64>) -> Result<(), AppError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(AppError::Validation(format!(
            "{field} must be a non-negative number"
        ))),
        _ => Ok(()),
    }
}

fn validate_offer(input: &OfferInput) -> Result<(), AppError> {
    validate_title(&input.role.title, input.role.context.as_deref())?;

    let p = &input.package;
    non_negative("package.baseSalary", Some(p.base_salary))?;
    non_negative("package.bonusTarget", Some(p.bonus_target))?;
    non_negative("package.equityOptionCount", p.equity_option_count)?;
    non_negative("package.strikePrice", p.strike_price)?;
    non_negative("package.tokenAmount", p.token_amount)?;
    non_negative("package.burnDeltaMonthly", p.burn_delta_monthly)?;
    non_negative("package.poolImpactPercent", p.pool_impact_percent)?;
    non_negative("package.poolRemainingAfter", p.pool_remaining_after)?;
    non_negative("package.equityPercentFD", p.equity_percent_fd)?;
    if p.equity_percent_fd.is_some_and(|v| v > 100.0) {
        return Err(AppError::Validation(
            "package.equityPercentFD must be at most 100".to_string(),
        ));
    }
    let years = p.vesting.vesting_years;
    if !years.is_finite() || years <= 0.0 || years > MAX_VESTING_YEARS {
        return Err(AppError::Validation(format!(
            "package.vesting.vestingYears must be greater than 0 and at most {MAX_VESTING_YEARS}"
        )));
    }

    let c = &input.company;
    non_negative("company.runwayMonths", c.runway_months)?;
    non_negative("company.monthlyBurn", c.monthly_burn)?;
    non_negative("company.postMoneyValuation", c.post_money_valuation)?;
    if let Some(cap) = &c.cap_table {
        non_negative("company.capTable.optionPoolSize", cap.option_pool_size)?;
        non_negative(
            "company.capTable.optionPoolRemaining",
            cap.option_pool_remaining,
        )?;
        if let (Some(size), Some(remaining)) = (cap.option_pool_size, cap.option_pool_remaining) {
            if remaining > size {
                return Err(AppError::Validation(
                    "company.capTable.optionPoolRemaining must not exceed optionPoolSize"
                        .to_string(),
                ));
            }
        }
    }

    if let Some(token) = &input.token_program {
        non_negative("tokenProgram.tokenPrice", token.token_price)?;
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/roles/normalize
pub async fn handle_normalize_role(
    State(state): State<AppState>,
    Json(req): Json<NormalizeRequest>,
) -> Result<Json<RoleNormalization>, AppError> {
    validate_title(&req.title, req.context.as_deref())?;
    let result = normalize(&req.title, req.context.as_deref());
    record_use(&state, Tool::RoleNormalizer).await;
    Ok(Json(result))
}

/// POST /api/v1/offers/evaluate
pub async fn handle_evaluate_offer(
    State(state): State<AppState>,
    Json(input): Json<OfferInput>,
) -> Result<Json<OfferEvaluation>, AppError> {
    validate_offer(&input)?;
    let evaluation = evaluate(&input, state.benchmarks.as_ref(), &state.stage_defaults);
    info!(
        overall = ?evaluation.overall_score(),
        flags = evaluation.flags.len(),
        missing = evaluation.missing_data.len(),
        "Offer evaluated"
    );
    record_use(&state, Tool::OfferEvaluation).await;
    Ok(Json(evaluation))
}

/// POST /api/v1/offers/compare
pub async fn handle_compare_offers(
    State(state): State<AppState>,
    Json(req): Json<CompareRequest>,
) -> Result<Json<CompareResponse>, AppError> {
    let count = req.offers.len();
    if !(MIN_COMPARE_OFFERS..=MAX_COMPARE_OFFERS).contains(&count) {
        return Err(AppError::Validation(format!(
            "compare takes between {MIN_COMPARE_OFFERS} and {MAX_COMPARE_OFFERS} offers, got {count}"
        )));
    }
    for (i, offer) in req.offers.iter().enumerate() {
        validate_offer(offer).map_err(|e| match e {
            AppError::Validation(msg) => AppError::Validation(format!("offers[{i}]: {msg}")),
            other => other,
        })?;
    }

    let evaluations = compare(&req.offers, state.benchmarks.as_ref(), &state.stage_defaults);
    let recommended_index = evaluations.iter().position(|e| e.package.is_recommended);
    info!(offers = count, ?recommended_index, "Offers compared");
    record_use(&state, Tool::OfferComparison).await;

    Ok(Json(CompareResponse {
        evaluations,
        recommended_index,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn offer(base: f64) -> Value {
        json!({
            "role": { "title": "Senior Software Engineer", "geo": "sv", "locationType": "onsite" },
            "company": { "stage": "series-a", "runwayMonths": 24 },
            "package": {
                "equityType": "iso",
                "baseSalary": base,
                "equityPercentFD": 0.2,
                "strikePrice": 1.0
            },
            "asOf": "2026-10-01"
        })
    }

    fn offer_input(value: Value) -> OfferInput {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_normalize_handler() {
        let Json(result) = handle_normalize_role(
            State(AppState::for_tests()),
            Json(NormalizeRequest {
                title: "Head of Growth".to_string(),
                context: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(result.role_profile.normalized_title, "Director of Marketing");
    }

    #[tokio::test]
    async fn test_empty_title_rejected() {
        let err = handle_normalize_role(
            State(AppState::for_tests()),
            Json(NormalizeRequest {
                title: "   ".to_string(),
                context: None,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_evaluate_handler_records_usage() {
        let state = AppState::for_tests();
        let Json(eval) = handle_evaluate_offer(State(state.clone()), Json(offer_input(offer(185_000.0))))
            .await
            .unwrap();
        assert!(eval.overall_score().is_some());

        let counts = state.usage.usage_counts().await.unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].tool, "offer-evaluation");
        assert_eq!(counts[0].count, 1);
    }

    #[tokio::test]
    async fn test_negative_salary_rejected() {
        let err = handle_evaluate_offer(
            State(AppState::for_tests()),
            Json(offer_input(offer(-1.0))),
        )
        .await
        .unwrap_err();
        match err {
            AppError::Validation(msg) => assert!(msg.contains("baseSalary")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_offer_validation_rules() {
        let mut input = offer_input(offer(150_000.0));
        assert!(validate_offer(&input).is_ok());

        input.package.equity_percent_fd = Some(101.0);
        assert!(validate_offer(&input).is_err());

        let mut input = offer_input(offer(150_000.0));
        input.package.vesting.vesting_years = 0.0;
        assert!(validate_offer(&input).is_err());

        let mut input = offer_input(offer(150_000.0));
        input.company.runway_months = Some(f64::NAN);
        assert!(validate_offer(&input).is_err());
    }

    #[test]
    fn test_pool_remaining_cannot_exceed_size() {
        let mut value = offer(150_000.0);
        value["company"]["capTable"] = json!({ "optionPoolSize": 100, "optionPoolRemaining": 200 });
        assert!(validate_offer(&offer_input(value)).is_err());
    }

    #[tokio::test]
    async fn test_compare_handler() {
        let Json(resp) = handle_compare_offers(
            State(AppState::for_tests()),
            Json(CompareRequest {
                offers: vec![offer_input(offer(150_000.0)), offer_input(offer(210_000.0))],
            }),
        )
        .await
        .unwrap();
        assert_eq!(resp.evaluations.len(), 2);
        assert_eq!(resp.recommended_index, Some(1));
    }

    #[tokio::test]
    async fn test_compare_ignores_client_recommendation() {
        let mut losing = offer(120_000.0);
        losing["package"]["isRecommended"] = json!(true);
        let Json(resp) = handle_compare_offers(
            State(AppState::for_tests()),
            Json(CompareRequest {
                offers: vec![offer_input(losing), offer_input(offer(230_000.0))],
            }),
        )
        .await
        .unwrap();
        assert_eq!(resp.recommended_index, Some(1));
        assert_eq!(
            resp.evaluations
                .iter()
                .filter(|e| e.package.is_recommended)
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_compare_requires_two_to_five_offers() {
        let err = handle_compare_offers(
            State(AppState::for_tests()),
            Json(CompareRequest {
                offers: vec![offer_input(offer(150_000.0))],
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = handle_compare_offers(
            State(AppState::for_tests()),
            Json(CompareRequest {
                offers: (0..6).map(|_| offer_input(offer(150_000.0))).collect(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_compare_error_names_offer_index() {
        let err = handle_compare_offers(
            State(AppState::for_tests()),
            Json(CompareRequest {
                offers: vec![offer_input(offer(150_000.0)), offer_input(offer(-5.0))],
            }),
        )
        .await
        .unwrap_err();
        match err {
            AppError::Validation(msg) => assert!(msg.starts_with("offers[1]")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
