use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/checkin", post(handlers::checkin))
        .route("/api/feedback", get(handlers::get_feedback))
        .route("/api/activities", get(handlers::get_activities))
        .route("/api/activities/apply", post(handlers::apply_activity))
        .route("/api/export", get(handlers::export_csv))
        .route("/api/entries", delete(handlers::clear_entries))
        .route("/ai-response", post(handlers::ai_response))
        .with_state(state)
}
