use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::LeagueStore;
use crate::error::{Result, StorageError};
use crate::models::{
    Ascent, BallotEntry, BallotFilter, Candidate, Climber, NewAscent, NewCandidate, NewClimber,
    Subject,
};

#[derive(Default)]
struct Tables {
    climbers: Vec<Climber>,
    ascents: Vec<Ascent>,
    candidates: Vec<Candidate>,
    ballots: Vec<BallotEntry>,
}

impl Tables {
    fn climber_mut(&mut self, climber_id: Uuid) -> Result<&mut Climber> {
        self.climbers
            .iter_mut()
            .find(|c| c.climber_id == climber_id)
            .ok_or(StorageError::NotFound)
    }
}

/// In-process store. Every trait call holds the single table lock for its
/// whole duration, which gives the same atomicity the Postgres store gets from
/// transactions.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeagueStore for MemoryStore {
    async fn create_climber(&self, climber: &NewClimber) -> Result<Climber> {
        let mut tables = self.tables.lock().await;

        if tables
            .climbers
            .iter()
            .any(|c| c.climber_id == climber.climber_id)
        {
            return Err(StorageError::ConstraintViolation(
                "Climber is already registered".to_string(),
            ));
        }

        let created = Climber {
            climber_id: climber.climber_id,
            first_name: climber.first_name.clone(),
            last_name: climber.last_name.clone(),
            nickname: climber.nickname.clone(),
            working_grade: climber.working_grade,
            running_score: 0,
            ascents_of_next_grade: climber.ascents_of_next_grade,
            promotion_input_needed: false,
            created_at: Utc::now().naive_utc(),
        };
        tables.climbers.push(created.clone());

        Ok(created)
    }

    async fn get_climber(&self, climber_id: Uuid) -> Result<Climber> {
        let mut tables = self.tables.lock().await;
        tables.climber_mut(climber_id).map(|c| c.clone())
    }

    async fn list_climbers(&self) -> Result<Vec<Climber>> {
        let tables = self.tables.lock().await;
        Ok(tables.climbers.clone())
    }

    async fn promote_climber(&self, climber_id: Uuid, expected_tier: i32) -> Result<Climber> {
        let mut tables = self.tables.lock().await;
        let climber = tables.climber_mut(climber_id)?;

        if climber.working_grade != expected_tier || climber.promotion_input_needed {
            return Err(StorageError::conflict(format!(
                "climber {} is no longer stable at tier {}",
                climber_id, expected_tier
            )));
        }

        climber.working_grade += 1;
        climber.promotion_input_needed = true;
        climber.ascents_of_next_grade = 0;

        Ok(climber.clone())
    }

    async fn resolve_promotion(
        &self,
        climber_id: Uuid,
        expected_tier: i32,
        ascents_of_next_grade: i32,
    ) -> Result<Climber> {
        let mut tables = self.tables.lock().await;
        let climber = tables.climber_mut(climber_id)?;

        if climber.working_grade != expected_tier || !climber.promotion_input_needed {
            return Err(StorageError::conflict(format!(
                "climber {} has no pending promotion at tier {}",
                climber_id, expected_tier
            )));
        }

        climber.ascents_of_next_grade = ascents_of_next_grade;
        climber.promotion_input_needed = false;

        Ok(climber.clone())
    }

    async fn set_running_score(&self, climber_id: Uuid, running_score: i64) -> Result<Climber> {
        let mut tables = self.tables.lock().await;
        let climber = tables.climber_mut(climber_id)?;
        climber.running_score = running_score;
        Ok(climber.clone())
    }

    async fn list_ascents(&self, climber_id: Uuid) -> Result<Vec<Ascent>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .ascents
            .iter()
            .filter(|a| a.climber_id == climber_id)
            .cloned()
            .collect())
    }

    async fn get_ascent(&self, ascent_id: Uuid) -> Result<Ascent> {
        let tables = self.tables.lock().await;
        tables
            .ascents
            .iter()
            .find(|a| a.ascent_id == ascent_id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn record_ascent(&self, ascent: &NewAscent, points: i64) -> Result<Ascent> {
        let mut tables = self.tables.lock().await;
        tables.climber_mut(ascent.climber_id)?.running_score += points;

        let created = Ascent {
            ascent_id: Uuid::new_v4(),
            climber_id: ascent.climber_id,
            name: ascent.name.clone(),
            description: ascent.description.clone(),
            absolute_grade: ascent.absolute_grade,
            working_grade_when_sent: ascent.working_grade_when_sent,
            is_flash: ascent.is_flash,
            sent_date: ascent.sent_date,
            create_date: Utc::now().naive_utc(),
        };
        tables.ascents.push(created.clone());

        Ok(created)
    }

    async fn delete_ascent(&self, ascent_id: Uuid, points: i64) -> Result<()> {
        let mut tables = self.tables.lock().await;
        let index = tables
            .ascents
            .iter()
            .position(|a| a.ascent_id == ascent_id)
            .ok_or(StorageError::NotFound)?;

        let removed = tables.ascents.remove(index);
        tables.climber_mut(removed.climber_id)?.running_score -= points;

        Ok(())
    }

    async fn list_candidates(&self, subject: Subject) -> Result<Vec<Candidate>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .candidates
            .iter()
            .filter(|c| c.subject() == subject)
            .cloned()
            .collect())
    }

    async fn get_candidate(&self, candidate_id: Uuid) -> Result<Candidate> {
        let tables = self.tables.lock().await;
        tables
            .candidates
            .iter()
            .find(|c| c.candidate_id == candidate_id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn create_candidate(&self, candidate: &NewCandidate, quota: usize) -> Result<Candidate> {
        let mut tables = self.tables.lock().await;

        if !tables
            .climbers
            .iter()
            .any(|c| c.climber_id == candidate.subject.target_climber_id)
        {
            return Err(StorageError::NotFound);
        }

        let held = tables
            .candidates
            .iter()
            .filter(|c| c.subject() == candidate.subject && c.proposed_by == candidate.proposed_by)
            .count();
        if held >= quota {
            return Err(super::quota_exceeded(candidate, quota));
        }

        let created = Candidate {
            candidate_id: Uuid::new_v4(),
            kind: candidate.subject.kind,
            target_climber_id: candidate.subject.target_climber_id,
            proposed_by: candidate.proposed_by,
            value: candidate.value.clone(),
            created_at: Utc::now().naive_utc(),
        };
        tables.candidates.push(created.clone());

        Ok(created)
    }

    async fn delete_candidate(&self, candidate_id: Uuid, requester_id: Uuid) -> Result<()> {
        let mut tables = self.tables.lock().await;
        let index = tables
            .candidates
            .iter()
            .position(|c| c.candidate_id == candidate_id)
            .ok_or(StorageError::NotFound)?;

        if tables.candidates[index].proposed_by != requester_id {
            return Err(StorageError::forbidden(
                "Only the proposer can delete a candidate",
            ));
        }

        tables.candidates.remove(index);
        tables.ballots.retain(|b| b.candidate_id != candidate_id);

        Ok(())
    }

    async fn list_ballots(&self, filter: BallotFilter) -> Result<Vec<BallotEntry>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .ballots
            .iter()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect())
    }

    async fn replace_ballot(
        &self,
        voter_id: Uuid,
        subject: Subject,
        ranked_ids: &[Uuid],
    ) -> Result<Vec<BallotEntry>> {
        let mut tables = self.tables.lock().await;

        let live: HashSet<Uuid> = tables
            .candidates
            .iter()
            .filter(|c| c.subject() == subject)
            .map(|c| c.candidate_id)
            .collect();
        if let Some(foreign) = ranked_ids.iter().find(|id| !live.contains(id)) {
            return Err(StorageError::validation(format!(
                "Candidate {} does not belong to {}",
                foreign, subject
            )));
        }

        tables.ballots.retain(|b| {
            !(b.voter_id == voter_id
                && b.kind == subject.kind
                && b.target_climber_id == subject.target_climber_id)
        });

        let now = Utc::now().naive_utc();
        let entries: Vec<BallotEntry> = ranked_ids
            .iter()
            .zip(1..)
            .map(|(candidate_id, rank)| BallotEntry {
                voter_id,
                kind: subject.kind,
                target_climber_id: subject.target_climber_id,
                candidate_id: *candidate_id,
                rank,
                created_at: now,
            })
            .collect();
        tables.ballots.extend(entries.iter().cloned());

        Ok(entries)
    }
}
