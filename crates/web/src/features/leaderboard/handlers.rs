use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use storage::{dto::climber::LeaderboardEntry, services::climbers};

use crate::AppState;
use crate::error::WebError;

#[utoipa::path(
    get,
    path = "/api/leaderboard",
    responses(
        (status = 200, description = "Climbers by running score, highest first", body = Vec<LeaderboardEntry>)
    ),
    tag = "leaderboard"
)]
pub async fn get_leaderboard(State(state): State<AppState>) -> Result<Response, WebError> {
    let entries = climbers::leaderboard(state.store.as_ref()).await?;

    Ok(Json(entries).into_response())
}
