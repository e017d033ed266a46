use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{BallotEntry, BallotFilter, Subject};

pub struct BallotRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BallotRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: BallotFilter) -> Result<Vec<BallotEntry>> {
        let mut query = QueryBuilder::new(
            r#"
            SELECT voter_id, kind, target_climber_id, candidate_id, rank, created_at
            FROM ballot_entries
            WHERE 1=1
            "#,
        );

        if let Some(voter_id) = filter.voter_id {
            query.push(" AND voter_id = ");
            query.push_bind(voter_id);
        }

        if let Some(kind) = filter.kind {
            query.push(" AND kind = ");
            query.push_bind(kind);
        }

        if let Some(target_climber_id) = filter.target_climber_id {
            query.push(" AND target_climber_id = ");
            query.push_bind(target_climber_id);
        }

        query.push(" ORDER BY voter_id, kind, target_climber_id, rank");

        let entries: Vec<BallotEntry> = query.build_query_as().fetch_all(self.pool).await?;

        Ok(entries)
    }

    /// Delete-then-insert of one voter's ballot inside a single transaction.
    ///
    /// The advisory lock serializes concurrent replaces for the same
    /// (voter, subject) so two submissions cannot interleave their rows.
    pub async fn replace(
        &self,
        voter_id: Uuid,
        subject: Subject,
        ranked_ids: &[Uuid],
    ) -> Result<Vec<BallotEntry>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!("ballot:{}:{}", voter_id, subject))
            .execute(&mut *tx)
            .await?;

        let live: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM candidates
            WHERE kind = $1 AND target_climber_id = $2 AND candidate_id = ANY($3)
            "#,
        )
        .bind(subject.kind)
        .bind(subject.target_climber_id)
        .bind(ranked_ids)
        .fetch_one(&mut *tx)
        .await?;

        if live != ranked_ids.len() as i64 {
            return Err(StorageError::validation(format!(
                "Ranking contains candidates that do not belong to {}",
                subject
            )));
        }

        sqlx::query(
            "DELETE FROM ballot_entries WHERE voter_id = $1 AND kind = $2 AND target_climber_id = $3",
        )
        .bind(voter_id)
        .bind(subject.kind)
        .bind(subject.target_climber_id)
        .execute(&mut *tx)
        .await?;

        let mut entries = Vec::with_capacity(ranked_ids.len());
        for (candidate_id, rank) in ranked_ids.iter().zip(1..) {
            let entry = sqlx::query_as::<_, BallotEntry>(
                r#"
                INSERT INTO ballot_entries (voter_id, kind, target_climber_id, candidate_id, rank)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING voter_id, kind, target_climber_id, candidate_id, rank, created_at
                "#,
            )
            .bind(voter_id)
            .bind(subject.kind)
            .bind(subject.target_climber_id)
            .bind(candidate_id)
            .bind(rank)
            .fetch_one(&mut *tx)
            .await?;
            entries.push(entry);
        }

        tx.commit().await?;

        Ok(entries)
    }
}
