use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{BallotEntry, Candidate, Subject};

/// Request payload for proposing a nickname or profile photo
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProposeCandidateRequest {
    /// The nickname text, or the photo URL
    pub value: String,
}

/// Request payload for saving a ranking, most preferred first
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitRankingRequest {
    pub candidate_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RankedCandidate {
    /// The voter's explicit rank, absent when they have not ranked it yet
    pub rank: Option<i32>,
    pub candidate: Candidate,
}

/// One voter's view of a subject in effective order
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RankingResponse {
    pub subject: Subject,
    pub voter_id: Uuid,
    pub candidates: Vec<RankedCandidate>,
}

impl RankingResponse {
    pub fn new(subject: Subject, voter_id: Uuid, ordered: Vec<Candidate>, ballot: &[BallotEntry]) -> Self {
        let candidates = ordered
            .into_iter()
            .map(|candidate| RankedCandidate {
                rank: ballot
                    .iter()
                    .find(|entry| entry.candidate_id == candidate.candidate_id)
                    .map(|entry| entry.rank),
                candidate,
            })
            .collect();

        Self {
            subject,
            voter_id,
            candidates,
        }
    }
}
