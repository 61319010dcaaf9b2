use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;
use crate::{auth, dashboard, feedback};

/// All routes. CORS and trace layers are applied by the binary.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/feedback", post(feedback::create_feedback))
        // GET reads the segment as a username, PUT as a feedback id; the
        // matcher requires a single parameter name for both.
        .route(
            "/feedback/{id}",
            get(feedback::list_feedback).put(feedback::update_feedback),
        )
        .route("/feedback/{id}/acknowledge", patch(feedback::acknowledge_feedback))
        .route("/feedback/{id}/comment", patch(feedback::add_comment))
        .route("/dashboard/manager/{username}", get(dashboard::manager_dashboard))
        .route("/dashboard/employee/{username}", get(dashboard::employee_dashboard))
        .with_state(state)
}
