use std::sync::Arc;

use crate::compensation::benchmarks::BenchmarkProvider;
use crate::compensation::stage_defaults::StageDefaults;
use crate::usage::store::UsageStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Read-only benchmark source, memoized. Built-in table unless
    /// BENCHMARK_TABLE_PATH is set.
    pub benchmarks: Arc<dyn BenchmarkProvider>,
    pub stage_defaults: Arc<StageDefaults>,
    /// Usage counters and feedback. Postgres when DATABASE_URL is set.
    pub usage: Arc<dyn UsageStore>,
}

#[cfg(test)]
impl AppState {
    pub fn for_tests() -> Self {
        use crate::compensation::benchmarks::BuiltinBenchmarks;
        use crate::usage::store::InMemoryUsageStore;

        AppState {
            benchmarks: Arc::new(BuiltinBenchmarks),
            stage_defaults: Arc::new(StageDefaults::default()),
            usage: Arc::new(InMemoryUsageStore::new()),
        }
    }
}
