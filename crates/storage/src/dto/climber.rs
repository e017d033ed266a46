use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::Climber;
use crate::services::working_grade::reconciliation_range;

/// Highest grade on the V scale the league records.
pub const MAX_GRADE: i32 = 17;

/// Response containing a climber and their promotion status
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClimberResponse {
    pub climber_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub nickname: Option<String>,
    pub working_grade: i32,
    pub running_score: i64,
    pub ascents_of_next_grade: i32,
    pub promotion_input_needed: bool,
    /// Accepted values for the reconciliation count, present only while a
    /// promotion is waiting on it.
    pub reconciliation_range: Option<ReconciliationRange>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReconciliationRange {
    pub min: i32,
    pub max: i32,
}

impl From<Climber> for ClimberResponse {
    fn from(climber: Climber) -> Self {
        let reconciliation_range = climber.promotion_input_needed.then(|| {
            let range = reconciliation_range(&climber);
            ReconciliationRange {
                min: *range.start(),
                max: *range.end(),
            }
        });

        Self {
            climber_id: climber.climber_id,
            first_name: climber.first_name,
            last_name: climber.last_name,
            nickname: climber.nickname,
            working_grade: climber.working_grade,
            running_score: climber.running_score,
            ascents_of_next_grade: climber.ascents_of_next_grade,
            promotion_input_needed: climber.promotion_input_needed,
            reconciliation_range,
            created_at: climber.created_at,
        }
    }
}

/// Request payload for registering a climber
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_starting_counter"))]
pub struct CreateClimberRequest {
    /// Identity-provider id of the member. Generated when absent.
    pub climber_id: Option<Uuid>,

    #[validate(length(
        min = 1,
        max = 255,
        message = "First name must be between 1 and 255 characters"
    ))]
    pub first_name: String,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Last name must be between 1 and 255 characters"
    ))]
    pub last_name: String,

    #[validate(length(min = 1, max = 64))]
    pub nickname: Option<String>,

    #[validate(range(min = 0, max = 17, message = "Working grade must be between 0 and 17"))]
    pub working_grade: i32,

    #[serde(default)]
    pub ascents_of_next_grade: i32,
}

// The starting counter obeys the same bound as a reconciliation
fn validate_starting_counter(
    req: &CreateClimberRequest,
) -> Result<(), validator::ValidationError> {
    if (0..=req.working_grade + 1).contains(&req.ascents_of_next_grade) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("ascents_of_next_grade_out_of_range")
            .with_message("ascents_of_next_grade must be between 0 and working_grade + 1".into()))
    }
}

/// Request payload for reconciling a pending promotion
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResolvePromotionRequest {
    pub ascents_of_next_grade: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub climber_id: Uuid,
    pub display_name: String,
    pub running_score: i64,
    pub working_grade: i32,
    pub ascents_of_next_grade: i32,
    pub promotion_input_needed: bool,
}
