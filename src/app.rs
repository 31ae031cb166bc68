use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/habits",
            get(handlers::list_habits).post(handlers::create_habit),
        )
        .route(
            "/api/habits/:id",
            get(handlers::get_habit)
                .put(handlers::update_habit)
                .delete(handlers::delete_habit),
        )
        .route("/api/habits/:id/check-in", post(handlers::check_in))
        .route("/api/habits/:id/performance", get(handlers::get_performance))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .with_state(state)
}
