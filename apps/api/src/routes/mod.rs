pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::assessment::handlers as assessment;
use crate::matching::handlers as matching;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Assessment API
        .route(
            "/api/v1/assessment/questions",
            get(assessment::handle_get_questions),
        )
        .route("/api/v1/assessment/submit", post(assessment::handle_submit))
        .route(
            "/api/v1/assessment/results",
            get(assessment::handle_get_results),
        )
        // Matching API
        .route("/api/v1/posts/like", post(matching::handle_like_post))
        .route(
            "/api/v1/recruiter/like-candidate",
            post(matching::handle_like_candidate),
        )
        .route("/api/v1/matches", get(matching::handle_list_matches))
        .route(
            "/api/v1/matches/post/:post_id",
            get(matching::handle_post_matches),
        )
        .with_state(state)
}
