use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/folders", get(handlers::get_folders))
        .route("/api/folders/navigate", post(handlers::navigate))
        .route("/api/folders/:id/open", post(handlers::open_folder))
        .route("/api/working", get(handlers::get_working))
        .route("/api/folder/close", post(handlers::close_folder))
        .route("/api/day/reset", post(handlers::reset_day))
        .route("/api/tasks/:id/toggle", post(handlers::toggle_task))
        .route("/api/incomplete/clear", post(handlers::clear_incomplete))
        .route("/api/note", put(handlers::update_note))
        .route("/api/animation/complete", post(handlers::animation_complete))
        .with_state(state)
}
