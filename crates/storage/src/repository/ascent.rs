use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Ascent, NewAscent};

const ASCENT_COLUMNS: &str = "ascent_id, climber_id, name, description, absolute_grade, \
     working_grade_when_sent, is_flash, sent_date, create_date";

pub struct AscentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AscentRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Ascents of one climber, newest first
    pub async fn list_for_climber(&self, climber_id: Uuid) -> Result<Vec<Ascent>> {
        let ascents = sqlx::query_as::<_, Ascent>(&format!(
            r#"
            SELECT {ASCENT_COLUMNS}
            FROM ascents
            WHERE climber_id = $1
            ORDER BY sent_date DESC, create_date DESC
            "#
        ))
        .bind(climber_id)
        .fetch_all(self.pool)
        .await?;

        Ok(ascents)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Ascent> {
        let ascent = sqlx::query_as::<_, Ascent>(&format!(
            "SELECT {ASCENT_COLUMNS} FROM ascents WHERE ascent_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(ascent)
    }

    /// Insert an ascent and credit its points in the same transaction
    pub async fn create_and_credit(&self, ascent: &NewAscent, points: i64) -> Result<Ascent> {
        let mut tx = self.pool.begin().await?;

        let credited = sqlx::query(
            "UPDATE climbers SET running_score = running_score + $2 WHERE climber_id = $1",
        )
        .bind(ascent.climber_id)
        .bind(points)
        .execute(&mut *tx)
        .await?;

        if credited.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        let created = sqlx::query_as::<_, Ascent>(&format!(
            r#"
            INSERT INTO ascents (climber_id, name, description, absolute_grade,
                                 working_grade_when_sent, is_flash, sent_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ASCENT_COLUMNS}
            "#
        ))
        .bind(ascent.climber_id)
        .bind(&ascent.name)
        .bind(&ascent.description)
        .bind(ascent.absolute_grade)
        .bind(ascent.working_grade_when_sent)
        .bind(ascent.is_flash)
        .bind(ascent.sent_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(created)
    }

    /// Delete an ascent and debit its points in the same transaction
    pub async fn delete_and_debit(&self, id: Uuid, points: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let climber_id: Option<Uuid> =
            sqlx::query_scalar("DELETE FROM ascents WHERE ascent_id = $1 RETURNING climber_id")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let climber_id = climber_id.ok_or(StorageError::NotFound)?;

        sqlx::query("UPDATE climbers SET running_score = running_score - $2 WHERE climber_id = $1")
            .bind(climber_id)
            .bind(points)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
