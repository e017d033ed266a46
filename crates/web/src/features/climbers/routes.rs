use axum::{
    Router,
    routing::{get, post, put},
};

use super::handlers::{
    check_promotion, create_climber, get_climber, list_climber_ascents, list_climbers,
    recompute_score, resolve_promotion,
};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_climbers).post(create_climber))
        .route("/:id", get(get_climber))
        .route("/:id/promotion", put(resolve_promotion))
        .route("/:id/promotion/check", post(check_promotion))
        .route("/:id/score/recompute", post(recompute_score))
        .route("/:id/ascents", get(list_climber_ascents))
}
