use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Engine entry points whose use is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tool {
    RoleNormalizer,
    OfferEvaluation,
    OfferComparison,
}

impl Tool {
    pub fn as_str(self) -> &'static str {
        match self {
            Tool::RoleNormalizer => "role-normalizer",
            Tool::OfferEvaluation => "offer-evaluation",
            Tool::OfferComparison => "offer-comparison",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ToolUsageRow {
    pub tool: String,
    pub count: i64,
    pub last_used_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRow {
    pub id: Uuid,
    pub tool: String,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Feedback as accepted from a user, after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFeedback {
    pub tool: Tool,
    pub rating: i16,
    pub comment: Option<String>,
}
