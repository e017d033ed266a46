use axum::{Router, routing::get};

use super::handlers::get_leaderboard;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(get_leaderboard))
}
