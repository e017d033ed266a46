use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Climber {
    pub climber_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub nickname: Option<String>,
    pub working_grade: i32,
    pub running_score: i64,
    /// Sends at `working_grade + 1` that are not in the league logbook.
    pub ascents_of_next_grade: i32,
    pub promotion_input_needed: bool,
    pub created_at: NaiveDateTime,
}

impl Climber {
    pub fn display_name(&self) -> String {
        match &self.nickname {
            Some(nickname) => format!("{} \"{}\" {}", self.first_name, nickname, self.last_name),
            None => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

/// Fields of a climber that the store assigns itself are absent here.
#[derive(Debug, Clone)]
pub struct NewClimber {
    pub climber_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub nickname: Option<String>,
    pub working_grade: i32,
    pub ascents_of_next_grade: i32,
}
