use axum::{
    Router,
    routing::{delete, get, post},
};

use super::handlers::{delete_ascent, get_points, log_ascent};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ascents", post(log_ascent))
        .route("/ascents/:id", delete(delete_ascent))
        .route("/points", get(get_points))
}
