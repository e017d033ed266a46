use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Subject, SubjectKind};

/// A proposed nickname (the text) or profile photo (its URL) for a climber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Candidate {
    pub candidate_id: Uuid,
    pub kind: SubjectKind,
    pub target_climber_id: Uuid,
    pub proposed_by: Uuid,
    pub value: String,
    pub created_at: NaiveDateTime,
}

impl Candidate {
    pub fn subject(&self) -> Subject {
        Subject::new(self.kind, self.target_climber_id)
    }
}

#[derive(Debug, Clone)]
pub struct NewCandidate {
    pub subject: Subject,
    pub proposed_by: Uuid,
    pub value: String,
}
