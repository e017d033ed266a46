//! The record-store boundary the scoring and ranking services run against.
//!
//! Everything a service needs from persistence goes through [`LeagueStore`].
//! Implementations must make the two racy operations atomic:
//! [`LeagueStore::promote_climber`] is a compare-and-swap on the expected tier,
//! and [`LeagueStore::replace_ballot`] never lets a reader observe a mix of the
//! old and new ballot.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{
    Ascent, BallotEntry, BallotFilter, Candidate, Climber, NewAscent, NewCandidate, NewClimber,
    Subject,
};

mod memory;
mod postgres;

pub use memory::MemoryStore;

pub(crate) fn quota_exceeded(candidate: &NewCandidate, quota: usize) -> StorageError {
    StorageError::validation(format!(
        "At most {} live {} candidates per proposer",
        quota, candidate.subject.kind
    ))
}

#[async_trait]
pub trait LeagueStore: Send + Sync {
    async fn create_climber(&self, climber: &NewClimber) -> Result<Climber>;

    async fn get_climber(&self, climber_id: Uuid) -> Result<Climber>;

    async fn list_climbers(&self) -> Result<Vec<Climber>>;

    /// `working_grade += 1`, flag set, counter reset to 0, but only while the
    /// climber is still `Stable(expected_tier)`. Otherwise `StateConflict`.
    async fn promote_climber(&self, climber_id: Uuid, expected_tier: i32) -> Result<Climber>;

    /// Writes the counter and clears the flag in one step, but only while the
    /// climber is still `PendingPromotionInput(expected_tier)`.
    async fn resolve_promotion(
        &self,
        climber_id: Uuid,
        expected_tier: i32,
        ascents_of_next_grade: i32,
    ) -> Result<Climber>;

    async fn set_running_score(&self, climber_id: Uuid, running_score: i64) -> Result<Climber>;

    async fn list_ascents(&self, climber_id: Uuid) -> Result<Vec<Ascent>>;

    async fn get_ascent(&self, ascent_id: Uuid) -> Result<Ascent>;

    /// Inserts the ascent and adds `points` to the owner's running score atomically.
    async fn record_ascent(&self, ascent: &NewAscent, points: i64) -> Result<Ascent>;

    /// Deletes the ascent and subtracts `points` from the owner's running score atomically.
    async fn delete_ascent(&self, ascent_id: Uuid, points: i64) -> Result<()>;

    /// Live candidates of a subject in insertion order.
    async fn list_candidates(&self, subject: Subject) -> Result<Vec<Candidate>>;

    async fn get_candidate(&self, candidate_id: Uuid) -> Result<Candidate>;

    /// Creates the candidate unless its proposer already holds `quota` live
    /// candidates for the subject. The count and the insert are one atomic step.
    async fn create_candidate(&self, candidate: &NewCandidate, quota: usize) -> Result<Candidate>;

    /// Deletes the candidate and every ballot row ranking it. The requester must
    /// be the proposer.
    async fn delete_candidate(&self, candidate_id: Uuid, requester_id: Uuid) -> Result<()>;

    async fn list_ballots(&self, filter: BallotFilter) -> Result<Vec<BallotEntry>>;

    /// Replaces the voter's whole ballot for `subject` with `ranked_ids`,
    /// `ranked_ids[i]` getting rank `i + 1`.
    async fn replace_ballot(
        &self,
        voter_id: Uuid,
        subject: Subject,
        ranked_ids: &[Uuid],
    ) -> Result<Vec<BallotEntry>>;
}
