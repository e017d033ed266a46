use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Climber, NewClimber};

const CLIMBER_COLUMNS: &str = "climber_id, first_name, last_name, nickname, working_grade, \
     running_score, ascents_of_next_grade, promotion_input_needed, created_at";

pub struct ClimberRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ClimberRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all climbers
    pub async fn list(&self) -> Result<Vec<Climber>> {
        let climbers = sqlx::query_as::<_, Climber>(&format!(
            "SELECT {CLIMBER_COLUMNS} FROM climbers ORDER BY last_name, first_name"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(climbers)
    }

    /// Find climber by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Climber> {
        let climber = sqlx::query_as::<_, Climber>(&format!(
            "SELECT {CLIMBER_COLUMNS} FROM climbers WHERE climber_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(climber)
    }

    /// Register a new climber
    pub async fn create(&self, climber: &NewClimber) -> Result<Climber> {
        let created = sqlx::query_as::<_, Climber>(&format!(
            r#"
            INSERT INTO climbers (climber_id, first_name, last_name, nickname,
                                  working_grade, ascents_of_next_grade)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CLIMBER_COLUMNS}
            "#
        ))
        .bind(climber.climber_id)
        .bind(&climber.first_name)
        .bind(&climber.last_name)
        .bind(&climber.nickname)
        .bind(climber.working_grade)
        .bind(climber.ascents_of_next_grade)
        .fetch_one(self.pool)
        .await
        .map_err(StorageError::from)
        .map_err(|e| {
            if e.is_unique_violation() {
                StorageError::ConstraintViolation("Climber is already registered".to_string())
            } else {
                e
            }
        })?;

        Ok(created)
    }

    /// Compare-and-swap promotion from `Stable(expected_tier)`
    pub async fn promote(&self, id: Uuid, expected_tier: i32) -> Result<Climber> {
        let promoted = sqlx::query_as::<_, Climber>(&format!(
            r#"
            UPDATE climbers
            SET working_grade = working_grade + 1,
                promotion_input_needed = TRUE,
                ascents_of_next_grade = 0
            WHERE climber_id = $1
              AND working_grade = $2
              AND promotion_input_needed = FALSE
            RETURNING {CLIMBER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(expected_tier)
        .fetch_optional(self.pool)
        .await?;

        match promoted {
            Some(climber) => Ok(climber),
            None => Err(self.missing_or_conflict(id, "is no longer stable at", expected_tier).await),
        }
    }

    /// Compare-and-swap resolution of `PendingPromotionInput(expected_tier)`
    pub async fn resolve_promotion(
        &self,
        id: Uuid,
        expected_tier: i32,
        ascents_of_next_grade: i32,
    ) -> Result<Climber> {
        let resolved = sqlx::query_as::<_, Climber>(&format!(
            r#"
            UPDATE climbers
            SET ascents_of_next_grade = $3,
                promotion_input_needed = FALSE
            WHERE climber_id = $1
              AND working_grade = $2
              AND promotion_input_needed = TRUE
            RETURNING {CLIMBER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(expected_tier)
        .bind(ascents_of_next_grade)
        .fetch_optional(self.pool)
        .await?;

        match resolved {
            Some(climber) => Ok(climber),
            None => {
                Err(self
                    .missing_or_conflict(id, "has no pending promotion at", expected_tier)
                    .await)
            }
        }
    }

    pub async fn set_running_score(&self, id: Uuid, running_score: i64) -> Result<Climber> {
        let climber = sqlx::query_as::<_, Climber>(&format!(
            "UPDATE climbers SET running_score = $2 WHERE climber_id = $1 RETURNING {CLIMBER_COLUMNS}"
        ))
        .bind(id)
        .bind(running_score)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(climber)
    }

    async fn missing_or_conflict(&self, id: Uuid, what: &str, tier: i32) -> StorageError {
        match self.find_by_id(id).await {
            Ok(_) => StorageError::conflict(format!("climber {} {} tier {}", id, what, tier)),
            Err(e) => e,
        }
    }
}
