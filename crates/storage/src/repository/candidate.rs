use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Candidate, NewCandidate, Subject};

const CANDIDATE_COLUMNS: &str = "candidate_id, kind, target_climber_id, proposed_by, value, created_at";

pub struct CandidateRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CandidateRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Live candidates of a subject, oldest first
    pub async fn list_for_subject(&self, subject: Subject) -> Result<Vec<Candidate>> {
        let candidates = sqlx::query_as::<_, Candidate>(&format!(
            r#"
            SELECT {CANDIDATE_COLUMNS}
            FROM candidates
            WHERE kind = $1 AND target_climber_id = $2
            ORDER BY created_at, candidate_id
            "#
        ))
        .bind(subject.kind)
        .bind(subject.target_climber_id)
        .fetch_all(self.pool)
        .await?;

        Ok(candidates)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Candidate> {
        let candidate = sqlx::query_as::<_, Candidate>(&format!(
            "SELECT {CANDIDATE_COLUMNS} FROM candidates WHERE candidate_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(candidate)
    }

    /// Insert a candidate unless the proposer is already at `quota` for the
    /// subject. The advisory lock serializes proposals per (proposer, subject).
    pub async fn create(&self, candidate: &NewCandidate, quota: usize) -> Result<Candidate> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!(
                "candidate:{}:{}",
                candidate.proposed_by, candidate.subject
            ))
            .execute(&mut *tx)
            .await?;

        let held: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM candidates
            WHERE kind = $1 AND target_climber_id = $2 AND proposed_by = $3
            "#,
        )
        .bind(candidate.subject.kind)
        .bind(candidate.subject.target_climber_id)
        .bind(candidate.proposed_by)
        .fetch_one(&mut *tx)
        .await?;

        if held >= i64::try_from(quota).unwrap_or(i64::MAX) {
            return Err(crate::store::quota_exceeded(candidate, quota));
        }

        let created = sqlx::query_as::<_, Candidate>(&format!(
            r#"
            INSERT INTO candidates (kind, target_climber_id, proposed_by, value)
            VALUES ($1, $2, $3, $4)
            RETURNING {CANDIDATE_COLUMNS}
            "#
        ))
        .bind(candidate.subject.kind)
        .bind(candidate.subject.target_climber_id)
        .bind(candidate.proposed_by)
        .bind(&candidate.value)
        .fetch_one(&mut *tx)
        .await
        .map_err(StorageError::from)
        .map_err(|e| {
            // Unknown target climber
            if e.is_foreign_key_violation() {
                StorageError::NotFound
            } else {
                e
            }
        })?;

        tx.commit().await?;

        Ok(created)
    }

    /// Delete a candidate on behalf of its proposer. Ballot rows go with it
    /// through the foreign key cascade.
    pub async fn delete(&self, id: Uuid, requester_id: Uuid) -> Result<()> {
        let existing = self.find_by_id(id).await?;
        if existing.proposed_by != requester_id {
            return Err(StorageError::forbidden(
                "Only the proposer can delete a candidate",
            ));
        }

        let result = sqlx::query("DELETE FROM candidates WHERE candidate_id = $1 AND proposed_by = $2")
            .bind(id)
            .bind(requester_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}
