//! Usage store: anonymous tool counters and opt-in feedback.
//!
//! `AppState` holds an `Arc<dyn UsageStore>`: `PgUsageStore` when `DATABASE_URL`
//! is set, `InMemoryUsageStore` otherwise.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::usage::{FeedbackRow, NewFeedback, Tool, ToolUsageRow};

#[async_trait]
pub trait UsageStore: Send + Sync {
    async fn record_tool_use(&self, tool: Tool) -> Result<(), AppError>;

    /// Counters sorted by tool name.
    async fn usage_counts(&self) -> Result<Vec<ToolUsageRow>, AppError>;

    async fn record_feedback(&self, feedback: NewFeedback) -> Result<FeedbackRow, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// PgUsageStore
// ────────────────────────────────────────────────────────────────────────────

pub struct PgUsageStore {
    pool: PgPool,
}

impl PgUsageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageStore for PgUsageStore {
    async fn record_tool_use(&self, tool: Tool) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO tool_usage (tool, count, last_used_at)
            VALUES ($1, 1, now())
            ON CONFLICT (tool)
            DO UPDATE SET count = tool_usage.count + 1, last_used_at = now()
            "#,
        )
        .bind(tool.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn usage_counts(&self) -> Result<Vec<ToolUsageRow>, AppError> {
        let rows: Vec<ToolUsageRow> =
            sqlx::query_as("SELECT tool, count, last_used_at FROM tool_usage ORDER BY tool")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }

    async fn record_feedback(&self, feedback: NewFeedback) -> Result<FeedbackRow, AppError> {
        let row: FeedbackRow = sqlx::query_as(
            r#"
            INSERT INTO offer_feedback (id, tool, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING id, tool, rating, comment, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(feedback.tool.as_str())
        .bind(feedback.rating)
        .bind(feedback.comment)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// InMemoryUsageStore
// ────────────────────────────────────────────────────────────────────────────

/// Process-local store for development and tests. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryUsageStore {
    counts: RwLock<HashMap<Tool, ToolUsageRow>>,
    feedback: RwLock<Vec<FeedbackRow>>,
}

impl InMemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn feedback(&self) -> Vec<FeedbackRow> {
        self.feedback.read().await.clone()
    }
}

#[async_trait]
impl UsageStore for InMemoryUsageStore {
    async fn record_tool_use(&self, tool: Tool) -> Result<(), AppError> {
        let now = Utc::now();
        let mut counts = self.counts.write().await;
        let row = counts.entry(tool).or_insert_with(|| ToolUsageRow {
            tool: tool.as_str().to_string(),
            count: 0,
            last_used_at: now,
        });
        row.count += 1;
        row.last_used_at = now;
        Ok(())
    }

    async fn usage_counts(&self) -> Result<Vec<ToolUsageRow>, AppError> {
        let mut rows: Vec<ToolUsageRow> = self.counts.read().await.values().cloned().collect();
        rows.sort_by(|a, b| a.tool.cmp(&b.tool));
        Ok(rows)
    }

    async fn record_feedback(&self, feedback: NewFeedback) -> Result<FeedbackRow, AppError> {
        let row = FeedbackRow {
            id: Uuid::new_v4(),
            tool: feedback.tool.as_str().to_string(),
            rating: feedback.rating,
            comment: feedback.comment,
            created_at: Utc::now(),
        };
        self.feedback.write().await.push(row.clone());
        Ok(row)
    }
}
