pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::compensation::handlers;
use crate::errors::AppError;
use crate::state::AppState;
use crate::usage::handlers as usage;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Role normalization
        .route(
            "/api/v1/roles/normalize",
            post(handlers::handle_normalize_role),
        )
        // Offer evaluation
        .route(
            "/api/v1/offers/evaluate",
            post(handlers::handle_evaluate_offer),
        )
        .route(
            "/api/v1/offers/compare",
            post(handlers::handle_compare_offers),
        )
        .route("/api/v1/offers/feedback", post(usage::handle_feedback))
        // Usage
        .route("/api/v1/stats/usage", get(usage::handle_usage_stats))
        .fallback(not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_route() {
        let app = build_router(AppState::for_tests());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_validation_error_is_bad_request() {
        let app = build_router(AppState::for_tests());
        let response = app
            .oneshot(
                Request::post("/api/v1/roles/normalize")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"title":""}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let app = build_router(AppState::for_tests());
        let response = app
            .oneshot(Request::get("/api/v1/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
