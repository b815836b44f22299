pub mod handlers;
pub mod store;

use tracing::warn;

use crate::models::usage::Tool;
use crate::state::AppState;

/// Counts a tool invocation. A failed write is logged and never fails the request.
pub async fn record_use(state: &AppState, tool: Tool) {
    if let Err(e) = state.usage.record_tool_use(tool).await {
        warn!(tool = tool.as_str(), "failed to record tool usage: {e}");
    }
}
