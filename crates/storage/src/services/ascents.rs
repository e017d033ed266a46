use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dto::ascent::LogAscentRequest;
use crate::error::{Result, StorageError};
use crate::models::{Ascent, NewAscent};
use crate::services::points::compute_points;
use crate::services::working_grade::{GradeState, PromotionOutcome, check_promotion};
use crate::store::LeagueStore;

#[derive(Debug, Clone)]
pub struct LoggedAscent {
    pub ascent: Ascent,
    pub points: i64,
    pub running_score: i64,
    pub promotion: PromotionOutcome,
}

/// Log a send for `climber_id`. `request` must already have passed its
/// `Validate` checks.
///
/// The climber's current tier is snapshotted onto the ascent and the ascent
/// is priced against it. The promotion check runs afterwards, so an ascent
/// that triggers a promotion is still priced at the old tier. Once the ascent
/// is recorded this never returns `StateConflict`.
pub async fn log_ascent<S>(
    store: &S,
    climber_id: Uuid,
    request: &LogAscentRequest,
) -> Result<LoggedAscent>
where
    S: LeagueStore + ?Sized,
{
    let climber = store.get_climber(climber_id).await?;
    // Pending climbers are priced at their new tier too
    let working_grade_when_sent = GradeState::of(&climber).tier();
    let points = compute_points(working_grade_when_sent, request.absolute_grade, request.is_flash);

    let ascent = store
        .record_ascent(
            &NewAscent {
                climber_id,
                name: request.name.trim().to_string(),
                description: request.description.clone(),
                absolute_grade: request.absolute_grade,
                working_grade_when_sent,
                is_flash: request.is_flash,
                sent_date: request
                    .sent_date
                    .unwrap_or_else(|| Utc::now().date_naive()),
            },
            points,
        )
        .await?;

    info!(
        %climber_id,
        ascent_id = %ascent.ascent_id,
        absolute_grade = ascent.absolute_grade,
        working_grade_when_sent,
        is_flash = ascent.is_flash,
        points,
        "Ascent logged"
    );

    // The ascent is committed. Losing the promotion race means a concurrent
    // log already promoted this climber, so this call reports no change.
    let promotion = match check_promotion(store, climber_id).await {
        Ok(outcome) => outcome,
        Err(e) if e.is_retryable() => PromotionOutcome::unchanged(),
        Err(e) => return Err(e),
    };
    let running_score = store.get_climber(climber_id).await?.running_score;

    Ok(LoggedAscent {
        ascent,
        points,
        running_score,
        promotion,
    })
}

/// Delete an ascent on behalf of its owner and take its points back off the
/// running score. The working grade is never lowered.
pub async fn remove_ascent<S>(store: &S, ascent_id: Uuid, requester_id: Uuid) -> Result<()>
where
    S: LeagueStore + ?Sized,
{
    let ascent = store.get_ascent(ascent_id).await?;
    if ascent.climber_id != requester_id {
        warn!(%ascent_id, %requester_id, "Rejected ascent deletion by non-owner");
        return Err(StorageError::forbidden(
            "Only the climber who logged an ascent can delete it",
        ));
    }

    store.delete_ascent(ascent_id, ascent.points()).await?;

    info!(%ascent_id, climber_id = %ascent.climber_id, points = ascent.points(), "Ascent deleted");

    Ok(())
}

/// A climber's ascents, most recent send first.
pub async fn logbook<S>(store: &S, climber_id: Uuid) -> Result<Vec<Ascent>>
where
    S: LeagueStore + ?Sized,
{
    // 404 for unknown climbers rather than an empty logbook
    store.get_climber(climber_id).await?;

    let mut ascents = store.list_ascents(climber_id).await?;
    ascents.sort_by(|a, b| {
        b.sent_date
            .cmp(&a.sent_date)
            .then_with(|| b.create_date.cmp(&a.create_date))
    });

    Ok(ascents)
}
