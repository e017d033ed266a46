use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::SubjectKind;

/// One row of a ranked-choice ballot. A voter's ballot for a subject is the set
/// of rows sharing `(voter_id, kind, target_climber_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BallotEntry {
    pub voter_id: Uuid,
    pub kind: SubjectKind,
    pub target_climber_id: Uuid,
    pub candidate_id: Uuid,
    /// 1 is most preferred.
    pub rank: i32,
    pub created_at: NaiveDateTime,
}

/// Optional filters for listing ballot rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct BallotFilter {
    pub voter_id: Option<Uuid>,
    pub kind: Option<SubjectKind>,
    pub target_climber_id: Option<Uuid>,
}

impl BallotFilter {
    pub fn matches(&self, entry: &BallotEntry) -> bool {
        self.voter_id.is_none_or(|v| v == entry.voter_id)
            && self.kind.is_none_or(|k| k == entry.kind)
            && self
                .target_climber_id
                .is_none_or(|t| t == entry.target_climber_id)
    }
}
