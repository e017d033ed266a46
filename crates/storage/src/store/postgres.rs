use async_trait::async_trait;
use uuid::Uuid;

use super::LeagueStore;
use crate::Database;
use crate::error::Result;
use crate::models::{
    Ascent, BallotEntry, BallotFilter, Candidate, Climber, NewAscent, NewCandidate, NewClimber,
    Subject,
};
use crate::repository::{
    ascent::AscentRepository, ballot::BallotRepository, candidate::CandidateRepository,
    climber::ClimberRepository,
};

#[async_trait]
impl LeagueStore for Database {
    async fn create_climber(&self, climber: &NewClimber) -> Result<Climber> {
        ClimberRepository::new(self.pool()).create(climber).await
    }

    async fn get_climber(&self, climber_id: Uuid) -> Result<Climber> {
        ClimberRepository::new(self.pool()).find_by_id(climber_id).await
    }

    async fn list_climbers(&self) -> Result<Vec<Climber>> {
        ClimberRepository::new(self.pool()).list().await
    }

    async fn promote_climber(&self, climber_id: Uuid, expected_tier: i32) -> Result<Climber> {
        ClimberRepository::new(self.pool())
            .promote(climber_id, expected_tier)
            .await
    }

    async fn resolve_promotion(
        &self,
        climber_id: Uuid,
        expected_tier: i32,
        ascents_of_next_grade: i32,
    ) -> Result<Climber> {
        ClimberRepository::new(self.pool())
            .resolve_promotion(climber_id, expected_tier, ascents_of_next_grade)
            .await
    }

    async fn set_running_score(&self, climber_id: Uuid, running_score: i64) -> Result<Climber> {
        ClimberRepository::new(self.pool())
            .set_running_score(climber_id, running_score)
            .await
    }

    async fn list_ascents(&self, climber_id: Uuid) -> Result<Vec<Ascent>> {
        AscentRepository::new(self.pool())
            .list_for_climber(climber_id)
            .await
    }

    async fn get_ascent(&self, ascent_id: Uuid) -> Result<Ascent> {
        AscentRepository::new(self.pool()).find_by_id(ascent_id).await
    }

    async fn record_ascent(&self, ascent: &NewAscent, points: i64) -> Result<Ascent> {
        AscentRepository::new(self.pool())
            .create_and_credit(ascent, points)
            .await
    }

    async fn delete_ascent(&self, ascent_id: Uuid, points: i64) -> Result<()> {
        AscentRepository::new(self.pool())
            .delete_and_debit(ascent_id, points)
            .await
    }

    async fn list_candidates(&self, subject: Subject) -> Result<Vec<Candidate>> {
        CandidateRepository::new(self.pool())
            .list_for_subject(subject)
            .await
    }

    async fn get_candidate(&self, candidate_id: Uuid) -> Result<Candidate> {
        CandidateRepository::new(self.pool())
            .find_by_id(candidate_id)
            .await
    }

    async fn create_candidate(&self, candidate: &NewCandidate, quota: usize) -> Result<Candidate> {
        CandidateRepository::new(self.pool())
            .create(candidate, quota)
            .await
    }

    async fn delete_candidate(&self, candidate_id: Uuid, requester_id: Uuid) -> Result<()> {
        CandidateRepository::new(self.pool())
            .delete(candidate_id, requester_id)
            .await
    }

    async fn list_ballots(&self, filter: BallotFilter) -> Result<Vec<BallotEntry>> {
        BallotRepository::new(self.pool()).list(filter).await
    }

    async fn replace_ballot(
        &self,
        voter_id: Uuid,
        subject: Subject,
        ranked_ids: &[Uuid],
    ) -> Result<Vec<BallotEntry>> {
        BallotRepository::new(self.pool())
            .replace(voter_id, subject, ranked_ids)
            .await
    }
}
