use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post, put}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/auth/signup", post(handlers::sign_up))
        .route("/api/auth/signin", post(handlers::sign_in))
        .route("/api/auth/signout", post(handlers::sign_out))
        .route("/api/me", get(handlers::me))
        .route("/api/profile", put(handlers::update_profile))
        .route("/api/onboarding", get(handlers::onboarding_get))
        .route("/api/onboarding/answer", post(handlers::onboarding_answer))
        .route("/api/onboarding/next", post(handlers::onboarding_next))
        .route("/api/onboarding/back", post(handlers::onboarding_back))
        .route("/api/routines", get(handlers::get_routines))
        .route("/api/routines/toggle", post(handlers::toggle_routine))
        .route("/api/achievements", get(handlers::get_achievements))
        .route("/api/progress/latest", get(handlers::latest_progress))
        .route("/api/progress", put(handlers::upsert_progress))
        .with_state(state)
}
