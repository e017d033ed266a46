use tracing::{info, warn};
use uuid::Uuid;

use crate::dto::climber::{CreateClimberRequest, LeaderboardEntry};
use crate::error::Result;
use crate::models::{Climber, NewClimber};
use crate::store::LeagueStore;

/// Register a league member from an already validated request
pub async fn register_climber<S>(store: &S, request: &CreateClimberRequest) -> Result<Climber>
where
    S: LeagueStore + ?Sized,
{
    let climber = store
        .create_climber(&NewClimber {
            climber_id: request.climber_id.unwrap_or_else(Uuid::new_v4),
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            nickname: request.nickname.clone(),
            working_grade: request.working_grade,
            ascents_of_next_grade: request.ascents_of_next_grade,
        })
        .await?;

    info!(
        climber_id = %climber.climber_id,
        working_grade = climber.working_grade,
        "Climber registered"
    );

    Ok(climber)
}

/// Climbers by running score, highest first. Ties share no rank; they are
/// broken by name.
pub async fn leaderboard<S>(store: &S) -> Result<Vec<LeaderboardEntry>>
where
    S: LeagueStore + ?Sized,
{
    let mut climbers = store.list_climbers().await?;
    climbers.sort_by(|a, b| {
        b.running_score
            .cmp(&a.running_score)
            .then_with(|| a.last_name.cmp(&b.last_name))
            .then_with(|| a.first_name.cmp(&b.first_name))
    });

    Ok(climbers
        .into_iter()
        .zip(1..)
        .map(|(climber, rank)| LeaderboardEntry {
            rank,
            display_name: climber.display_name(),
            climber_id: climber.climber_id,
            running_score: climber.running_score,
            working_grade: climber.working_grade,
            ascents_of_next_grade: climber.ascents_of_next_grade,
            promotion_input_needed: climber.promotion_input_needed,
        })
        .collect())
}

/// Rebuild the running score from the logbook, pricing each ascent against
/// its own tier snapshot.
pub async fn recompute_running_score<S>(store: &S, climber_id: Uuid) -> Result<Climber>
where
    S: LeagueStore + ?Sized,
{
    let climber = store.get_climber(climber_id).await?;
    let ascents = store.list_ascents(climber_id).await?;
    let total: i64 = ascents.iter().map(|a| a.points()).sum();

    if total != climber.running_score {
        warn!(
            %climber_id,
            stored = climber.running_score,
            recomputed = total,
            "Running score drifted from logbook"
        );
    }

    store.set_running_score(climber_id, total).await
}
