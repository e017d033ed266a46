//! Working-grade progression.
//!
//! A climber is either `Stable(t)` or `PendingPromotionInput(t)`. A stable
//! climber at tier `t` is promoted to `t + 1` once they hold `t + 1` sends at
//! absolute grade `t + 1`, counting both logbook ascents and the off-book
//! counter `ascents_of_next_grade`. Promotion puts them in
//! `PendingPromotionInput(t + 1)` with a provisional counter of 0 until they
//! report how many off-book `t + 2` sends they already had.
//!
//! Promotion only moves the tier used for the next logged ascent. Points of
//! existing ascents are priced from their own snapshot and never change.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Ascent, Climber};
use crate::store::LeagueStore;

/// Where a climber sits in the promotion state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "tier", rename_all = "snake_case")]
pub enum GradeState {
    Stable(i32),
    PendingPromotionInput(i32),
}

impl GradeState {
    pub fn of(climber: &Climber) -> Self {
        if climber.promotion_input_needed {
            GradeState::PendingPromotionInput(climber.working_grade)
        } else {
            GradeState::Stable(climber.working_grade)
        }
    }

    pub fn tier(&self) -> i32 {
        match *self {
            GradeState::Stable(tier) | GradeState::PendingPromotionInput(tier) => tier,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PromotionOutcome {
    pub promoted: bool,
    pub new_tier: Option<i32>,
}

impl PromotionOutcome {
    pub fn unchanged() -> Self {
        Self {
            promoted: false,
            new_tier: None,
        }
    }

    pub fn promoted_to(tier: i32) -> Self {
        Self {
            promoted: true,
            new_tier: Some(tier),
        }
    }
}

/// Sends needed at `grade` to hold it as working grade.
pub fn promotion_threshold(grade: i32) -> i32 {
    grade
}

/// Logbook ascents at exactly `grade`.
pub fn sends_at(ascents: &[Ascent], grade: i32) -> i32 {
    ascents
        .iter()
        .filter(|a| a.absolute_grade == grade)
        .count()
        .try_into()
        .unwrap_or(i32::MAX)
}

/// Valid values for the reconciliation count after a promotion to the
/// climber's current tier: `0..=working_grade + 1`.
pub fn reconciliation_range(climber: &Climber) -> RangeInclusive<i32> {
    0..=promotion_threshold(climber.working_grade + 1)
}

/// Whether a stable climber has earned the next tier.
pub fn is_promotion_due(climber: &Climber, ascents: &[Ascent]) -> bool {
    if climber.promotion_input_needed {
        return false;
    }

    let next = climber.working_grade + 1;
    let held = sends_at(ascents, next).saturating_add(climber.ascents_of_next_grade);
    held >= promotion_threshold(next)
}

/// Promote the climber if their history has reached the next tier.
///
/// At most one tier per call. A climber already waiting on reconciliation is
/// never promoted again until they resolve it.
pub async fn check_promotion<S>(store: &S, climber_id: Uuid) -> Result<PromotionOutcome>
where
    S: LeagueStore + ?Sized,
{
    let climber = store.get_climber(climber_id).await?;
    let ascents = store.list_ascents(climber_id).await?;

    if !is_promotion_due(&climber, &ascents) {
        return Ok(PromotionOutcome::unchanged());
    }

    let promoted = store
        .promote_climber(climber_id, climber.working_grade)
        .await
        .inspect_err(|e| {
            if e.is_retryable() {
                warn!(%climber_id, tier = climber.working_grade, "Promotion lost a concurrent update");
            }
        })?;

    info!(
        %climber_id,
        from = climber.working_grade,
        to = promoted.working_grade,
        "Climber promoted, awaiting next-grade reconciliation"
    );

    Ok(PromotionOutcome::promoted_to(promoted.working_grade))
}

/// Supply the off-book next-grade count after a promotion and return to `Stable`.
pub async fn resolve_promotion<S>(
    store: &S,
    climber_id: Uuid,
    next_grade_count: i32,
) -> Result<Climber>
where
    S: LeagueStore + ?Sized,
{
    let climber = store.get_climber(climber_id).await?;

    if !climber.promotion_input_needed {
        return Err(StorageError::validation(format!(
            "Climber {} has no pending promotion",
            climber_id
        )));
    }

    let range = reconciliation_range(&climber);
    if !range.contains(&next_grade_count) {
        warn!(%climber_id, next_grade_count, "Rejected out-of-range reconciliation count");
        return Err(StorageError::validation(format!(
            "ascents_of_next_grade must be between {} and {}, got {}",
            range.start(),
            range.end(),
            next_grade_count
        )));
    }

    let resolved = store
        .resolve_promotion(climber_id, climber.working_grade, next_grade_count)
        .await?;

    info!(
        %climber_id,
        tier = resolved.working_grade,
        ascents_of_next_grade = next_grade_count,
        "Promotion reconciled"
    );

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::{NewAscent, NewClimber};
    use crate::store::MemoryStore;

    async fn climber_at(store: &MemoryStore, tier: i32) -> Uuid {
        let climber_id = Uuid::new_v4();
        store
            .create_climber(&NewClimber {
                climber_id,
                first_name: "Ada".to_string(),
                last_name: "Crimp".to_string(),
                nickname: None,
                working_grade: tier,
                ascents_of_next_grade: 0,
            })
            .await
            .unwrap();
        climber_id
    }

    async fn send(store: &MemoryStore, climber_id: Uuid, grade: i32) {
        let tier = store.get_climber(climber_id).await.unwrap().working_grade;
        store
            .record_ascent(
                &NewAscent {
                    climber_id,
                    name: format!("V{} problem", grade),
                    description: String::new(),
                    absolute_grade: grade,
                    working_grade_when_sent: tier,
                    is_flash: false,
                    sent_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                },
                0,
            )
            .await
            .unwrap();
    }

    #[test]
    fn test_threshold_is_exact_grade() {
        assert_eq!(promotion_threshold(1), 1);
        assert_eq!(promotion_threshold(6), 6);
    }

    #[tokio::test]
    async fn test_promotion_at_exact_threshold() {
        let store = MemoryStore::new();
        let climber_id = climber_at(&store, 5).await;

        for _ in 0..5 {
            send(&store, climber_id, 6).await;
        }
        let outcome = check_promotion(&store, climber_id).await.unwrap();
        assert_eq!(outcome, PromotionOutcome::unchanged());

        send(&store, climber_id, 6).await;
        let outcome = check_promotion(&store, climber_id).await.unwrap();
        assert_eq!(outcome, PromotionOutcome::promoted_to(6));

        let climber = store.get_climber(climber_id).await.unwrap();
        assert_eq!(climber.working_grade, 6);
        assert!(climber.promotion_input_needed);
        assert_eq!(GradeState::of(&climber), GradeState::PendingPromotionInput(6));
    }

    #[tokio::test]
    async fn test_off_book_counter_counts_towards_threshold() {
        let store = MemoryStore::new();
        let climber_id = Uuid::new_v4();
        store
            .create_climber(&NewClimber {
                climber_id,
                first_name: "Lin".to_string(),
                last_name: "Sloper".to_string(),
                nickname: None,
                working_grade: 3,
                ascents_of_next_grade: 3,
            })
            .await
            .unwrap();

        send(&store, climber_id, 4).await;
        let outcome = check_promotion(&store, climber_id).await.unwrap();
        assert_eq!(outcome.new_tier, Some(4));
    }

    #[tokio::test]
    async fn test_other_grades_do_not_count() {
        let store = MemoryStore::new();
        let climber_id = climber_at(&store, 2).await;

        for grade in [1, 2, 2, 4, 5, 5] {
            send(&store, climber_id, grade).await;
        }
        let outcome = check_promotion(&store, climber_id).await.unwrap();
        assert!(!outcome.promoted);
    }

    #[tokio::test]
    async fn test_pending_climber_is_not_promoted_twice() {
        let store = MemoryStore::new();
        let climber_id = climber_at(&store, 0).await;

        send(&store, climber_id, 1).await;
        assert!(check_promotion(&store, climber_id).await.unwrap().promoted);

        send(&store, climber_id, 2).await;
        send(&store, climber_id, 2).await;
        let outcome = check_promotion(&store, climber_id).await.unwrap();
        assert!(!outcome.promoted);
        assert_eq!(store.get_climber(climber_id).await.unwrap().working_grade, 1);

        resolve_promotion(&store, climber_id, 0).await.unwrap();
        let outcome = check_promotion(&store, climber_id).await.unwrap();
        assert_eq!(outcome.new_tier, Some(2));
    }

    #[tokio::test]
    async fn test_resolve_rejects_out_of_range() {
        let store = MemoryStore::new();
        let climber_id = climber_at(&store, 5).await;
        for _ in 0..6 {
            send(&store, climber_id, 6).await;
        }
        check_promotion(&store, climber_id).await.unwrap();
        let before = store.get_climber(climber_id).await.unwrap();
        assert_eq!(reconciliation_range(&before), 0..=7);

        for bad in [-1, 8, 100] {
            let err = resolve_promotion(&store, climber_id, bad).await.unwrap_err();
            assert!(matches!(err, StorageError::Validation(_)));
        }
        assert_eq!(store.get_climber(climber_id).await.unwrap(), before);

        let resolved = resolve_promotion(&store, climber_id, 7).await.unwrap();
        assert_eq!(resolved.ascents_of_next_grade, 7);
        assert!(!resolved.promotion_input_needed);
        assert_eq!(GradeState::of(&resolved), GradeState::Stable(6));
    }

    #[tokio::test]
    async fn test_resolve_without_pending_promotion() {
        let store = MemoryStore::new();
        let climber_id = climber_at(&store, 4).await;

        let err = resolve_promotion(&store, climber_id, 1).await.unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unknown_climber() {
        let store = MemoryStore::new();
        let err = check_promotion(&store, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn test_stale_promotion_is_a_conflict() {
        let store = MemoryStore::new();
        let climber_id = climber_at(&store, 0).await;
        send(&store, climber_id, 1).await;

        // Someone else promoted first
        store.promote_climber(climber_id, 0).await.unwrap();
        let err = store.promote_climber(climber_id, 0).await.unwrap_err();
        assert!(err.is_retryable());
    }
}
