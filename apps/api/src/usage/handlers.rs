use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::usage::{FeedbackRow, NewFeedback, Tool, ToolUsageRow};
use crate::state::AppState;

pub const MAX_COMMENT_CHARS: usize = 2000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub tool: Tool,
    /// 1 – 5
    pub rating: i16,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStatsResponse {
    pub tools: Vec<ToolUsageRow>,
    pub total: i64,
}

fn validate_feedback(req: FeedbackRequest) -> Result<NewFeedback, AppError> {
    if !(1..=5).contains(&req.rating) {
        return Err(AppError::Validation(
            "rating must be between 1 and 5".to_string(),
        ));
    }
    let comment = req
        .comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    if comment
        .as_ref()
        .is_some_and(|c| c.chars().count() > MAX_COMMENT_CHARS)
    {
        return Err(AppError::Validation(format!(
            "comment must be at most {MAX_COMMENT_CHARS} characters"
        )));
    }
    Ok(NewFeedback {
        tool: req.tool,
        rating: req.rating,
        comment,
    })
}

/// POST /api/v1/offers/feedback
pub async fn handle_feedback(
    State(state): State<AppState>,
    Json(req): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<FeedbackRow>), AppError> {
    let feedback = validate_feedback(req)?;
    let row = state.usage.record_feedback(feedback).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/stats/usage
pub async fn handle_usage_stats(
    State(state): State<AppState>,
) -> Result<Json<UsageStatsResponse>, AppError> {
    let tools = state.usage.usage_counts().await?;
    let total = tools.iter().map(|t| t.count).sum();
    Ok(Json(UsageStatsResponse { tools, total }))
}
