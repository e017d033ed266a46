use axum::{
    Router,
    routing::{delete, get},
};

use super::handlers::{
    get_ranking, list_candidates, propose_candidate, submit_ranking, withdraw_candidate,
};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/subjects/:kind/:target_id/candidates",
            get(list_candidates).post(propose_candidate),
        )
        .route(
            "/subjects/:kind/:target_id/ranking",
            get(get_ranking).put(submit_ranking),
        )
        .route("/candidates/:id", delete(withdraw_candidate))
}
