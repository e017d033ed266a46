//! Nickname and profile-photo mini-elections.
//!
//! Each voter keeps at most one ballot per subject. Submitting a ranking
//! replaces the previous one wholesale. The effective order shown back to a
//! voter is their own last ranking, followed by the candidates they have not
//! ranked yet.

use std::collections::{HashMap, HashSet};

use tracing::{info, warn};
use uuid::Uuid;
use validator::ValidateUrl;

use crate::dto::voting::RankingResponse;
use crate::error::{Result, StorageError};
use crate::models::{BallotEntry, BallotFilter, Candidate, NewCandidate, Subject, SubjectKind};
use crate::store::LeagueStore;

/// Live candidates a single proposer may hold per subject.
pub const CANDIDATE_QUOTA: usize = 2;

/// Replace the voter's ballot for `subject` with `ordered_candidate_ids`.
///
/// Rejects duplicates and candidates outside the subject before anything is
/// written. An empty ranking clears the ballot.
pub async fn submit_ranking<S>(
    store: &S,
    voter_id: Uuid,
    subject: Subject,
    ordered_candidate_ids: &[Uuid],
) -> Result<Vec<BallotEntry>>
where
    S: LeagueStore + ?Sized,
{
    let mut seen = HashSet::with_capacity(ordered_candidate_ids.len());
    if let Some(duplicate) = ordered_candidate_ids.iter().find(|id| !seen.insert(**id)) {
        warn!(%voter_id, %subject, %duplicate, "Rejected ranking with duplicate candidate");
        return Err(StorageError::validation(format!(
            "Candidate {} is ranked more than once",
            duplicate
        )));
    }

    let live: HashSet<Uuid> = store
        .list_candidates(subject)
        .await?
        .into_iter()
        .map(|c| c.candidate_id)
        .collect();
    if let Some(foreign) = ordered_candidate_ids.iter().find(|id| !live.contains(id)) {
        warn!(%voter_id, %subject, %foreign, "Rejected ranking with foreign candidate");
        return Err(StorageError::validation(format!(
            "Candidate {} does not belong to {}",
            foreign, subject
        )));
    }

    let ballot = store
        .replace_ballot(voter_id, subject, ordered_candidate_ids)
        .await?;

    info!(%voter_id, %subject, ranked = ballot.len(), "Ballot replaced");

    Ok(ballot)
}

/// Sort key of a candidate. Unranked candidates get a sentinel that sorts
/// after every explicit rank.
fn sort_key(ranks: &HashMap<Uuid, i32>, candidate_id: &Uuid) -> (bool, i32) {
    match ranks.get(candidate_id) {
        Some(rank) => (false, *rank),
        None => (true, 0),
    }
}

/// Order `candidates` by the voter's ballot. Unranked candidates keep their
/// relative input order after all ranked ones.
pub fn order_by_ballot(candidates: Vec<Candidate>, ballot: &[BallotEntry]) -> Vec<Candidate> {
    let ranks: HashMap<Uuid, i32> = ballot
        .iter()
        .map(|entry| (entry.candidate_id, entry.rank))
        .collect();

    let mut ordered = candidates;
    // stable sort keeps insertion order among the unranked
    ordered.sort_by_key(|c| sort_key(&ranks, &c.candidate_id));
    ordered
}

async fn voter_ballot<S>(store: &S, voter_id: Uuid, subject: Subject) -> Result<Vec<BallotEntry>>
where
    S: LeagueStore + ?Sized,
{
    store
        .list_ballots(BallotFilter {
            voter_id: Some(voter_id),
            kind: Some(subject.kind),
            target_climber_id: Some(subject.target_climber_id),
        })
        .await
}

/// The voter's editing view of a subject: live candidates, ranked ones first
/// by ascending rank, unranked ones after in insertion order.
pub async fn effective_order<S>(store: &S, voter_id: Uuid, subject: Subject) -> Result<Vec<Candidate>>
where
    S: LeagueStore + ?Sized,
{
    let candidates = store.list_candidates(subject).await?;
    let ballot = voter_ballot(store, voter_id, subject).await?;

    Ok(order_by_ballot(candidates, &ballot))
}

/// [`effective_order`] with each candidate's explicit rank attached.
pub async fn ranking_view<S>(store: &S, voter_id: Uuid, subject: Subject) -> Result<RankingResponse>
where
    S: LeagueStore + ?Sized,
{
    let candidates = store.list_candidates(subject).await?;
    let ballot = voter_ballot(store, voter_id, subject).await?;
    let ordered = order_by_ballot(candidates, &ballot);

    Ok(RankingResponse::new(subject, voter_id, ordered, &ballot))
}

/// Propose a nickname or photo for a climber, within the proposer's quota.
pub async fn propose_candidate<S>(
    store: &S,
    proposer_id: Uuid,
    subject: Subject,
    value: &str,
) -> Result<Candidate>
where
    S: LeagueStore + ?Sized,
{
    let value = value.trim();
    validate_candidate_value(subject.kind, value)?;

    let candidate = store
        .create_candidate(
            &NewCandidate {
                subject,
                proposed_by: proposer_id,
                value: value.to_string(),
            },
            CANDIDATE_QUOTA,
        )
        .await
        .inspect_err(|e| {
            if matches!(e, StorageError::Validation(_)) {
                warn!(%proposer_id, %subject, "Candidate quota exceeded");
            }
        })?;

    info!(%proposer_id, %subject, candidate_id = %candidate.candidate_id, "Candidate proposed");

    Ok(candidate)
}

/// Withdraw a candidate. Only its proposer may do so; ballots ranking it lose
/// that row and keep the relative order of the rest.
pub async fn withdraw_candidate<S>(store: &S, candidate_id: Uuid, requester_id: Uuid) -> Result<()>
where
    S: LeagueStore + ?Sized,
{
    let candidate = store.get_candidate(candidate_id).await?;
    if candidate.proposed_by != requester_id {
        warn!(%candidate_id, %requester_id, "Rejected withdrawal by non-proposer");
        return Err(StorageError::forbidden(
            "Only the proposer can withdraw a candidate",
        ));
    }

    store.delete_candidate(candidate_id, requester_id).await?;
    info!(%candidate_id, subject = %candidate.subject(), "Candidate withdrawn");
    Ok(())
}

fn validate_candidate_value(kind: SubjectKind, value: &str) -> Result<()> {
    match kind {
        SubjectKind::Nickname => {
            let len = value.chars().count();
            if !(1..=64).contains(&len) {
                return Err(StorageError::validation(
                    "Nickname must be between 1 and 64 characters",
                ));
            }
        }
        SubjectKind::ProfilePhoto => {
            if !value.validate_url() {
                return Err(StorageError::validation(
                    "Profile photo must be a valid URL",
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewClimber;
    use crate::store::MemoryStore;

    async fn setup() -> (MemoryStore, Subject) {
        let store = MemoryStore::new();
        let target = Uuid::new_v4();
        store
            .create_climber(&NewClimber {
                climber_id: target,
                first_name: "Sam".to_string(),
                last_name: "Heel".to_string(),
                nickname: None,
                working_grade: 4,
                ascents_of_next_grade: 0,
            })
            .await
            .unwrap();
        (store, Subject::nickname(target))
    }

    fn ids(candidates: &[Candidate]) -> Vec<Uuid> {
        candidates.iter().map(|c| c.candidate_id).collect()
    }

    #[tokio::test]
    async fn test_ranking_replace_leaves_no_residue() {
        let (store, subject) = setup().await;
        let voter = Uuid::new_v4();
        let a = propose_candidate(&store, Uuid::new_v4(), subject, "Crimpy").await.unwrap();
        let b = propose_candidate(&store, Uuid::new_v4(), subject, "Beta").await.unwrap();
        let c = propose_candidate(&store, Uuid::new_v4(), subject, "Dyno").await.unwrap();

        submit_ranking(&store, voter, subject, &[a.candidate_id, b.candidate_id, c.candidate_id])
            .await
            .unwrap();
        submit_ranking(&store, voter, subject, &[c.candidate_id, a.candidate_id])
            .await
            .unwrap();

        let ballot = store
            .list_ballots(BallotFilter {
                voter_id: Some(voter),
                ..Default::default()
            })
            .await
            .unwrap();
        let mut rows: Vec<(Uuid, i32)> = ballot.iter().map(|e| (e.candidate_id, e.rank)).collect();
        rows.sort_by_key(|(_, rank)| *rank);
        assert_eq!(rows, vec![(c.candidate_id, 1), (a.candidate_id, 2)]);
    }

    #[tokio::test]
    async fn test_effective_order_appends_unranked() {
        let (store, subject) = setup().await;
        let voter = Uuid::new_v4();
        let a = propose_candidate(&store, Uuid::new_v4(), subject, "Crimpy").await.unwrap();
        let b = propose_candidate(&store, Uuid::new_v4(), subject, "Beta").await.unwrap();
        let c = propose_candidate(&store, Uuid::new_v4(), subject, "Dyno").await.unwrap();

        let fresh = effective_order(&store, voter, subject).await.unwrap();
        assert_eq!(ids(&fresh), vec![a.candidate_id, b.candidate_id, c.candidate_id]);

        submit_ranking(&store, voter, subject, &[c.candidate_id]).await.unwrap();
        let ordered = effective_order(&store, voter, subject).await.unwrap();
        assert_eq!(ids(&ordered), vec![c.candidate_id, a.candidate_id, b.candidate_id]);
    }

    #[tokio::test]
    async fn test_ranking_view_reports_explicit_ranks() {
        let (store, subject) = setup().await;
        let voter = Uuid::new_v4();
        let a = propose_candidate(&store, Uuid::new_v4(), subject, "Crimpy").await.unwrap();
        let b = propose_candidate(&store, Uuid::new_v4(), subject, "Beta").await.unwrap();

        submit_ranking(&store, voter, subject, &[b.candidate_id]).await.unwrap();
        let view = ranking_view(&store, voter, subject).await.unwrap();

        let ranks: Vec<(Uuid, Option<i32>)> = view
            .candidates
            .iter()
            .map(|r| (r.candidate.candidate_id, r.rank))
            .collect();
        assert_eq!(ranks, vec![(b.candidate_id, Some(1)), (a.candidate_id, None)]);
        assert_eq!(view.subject, subject);
    }

    #[tokio::test]
    async fn test_ballots_are_per_voter_and_subject() {
        let (store, subject) = setup().await;
        let photo_subject = Subject::profile_photo(subject.target_climber_id);
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let a = propose_candidate(&store, alice, subject, "Crimpy").await.unwrap();
        let b = propose_candidate(&store, bob, subject, "Beta").await.unwrap();
        let p = propose_candidate(&store, bob, photo_subject, "https://img.example/p.jpg")
            .await
            .unwrap();

        submit_ranking(&store, alice, subject, &[b.candidate_id, a.candidate_id]).await.unwrap();
        submit_ranking(&store, alice, photo_subject, &[p.candidate_id]).await.unwrap();
        submit_ranking(&store, bob, subject, &[a.candidate_id]).await.unwrap();

        let alice_view = effective_order(&store, alice, subject).await.unwrap();
        assert_eq!(ids(&alice_view), vec![b.candidate_id, a.candidate_id]);

        let bob_view = effective_order(&store, bob, subject).await.unwrap();
        assert_eq!(ids(&bob_view), vec![a.candidate_id, b.candidate_id]);

        let all = store.list_ballots(BallotFilter::default()).await.unwrap();
        assert_eq!(all.len(), 4);
    }

    #[tokio::test]
    async fn test_malformed_ranking_writes_nothing() {
        let (store, subject) = setup().await;
        let voter = Uuid::new_v4();
        let a = propose_candidate(&store, Uuid::new_v4(), subject, "Crimpy").await.unwrap();
        let b = propose_candidate(&store, Uuid::new_v4(), subject, "Beta").await.unwrap();
        submit_ranking(&store, voter, subject, &[b.candidate_id, a.candidate_id]).await.unwrap();

        let err = submit_ranking(&store, voter, subject, &[a.candidate_id, a.candidate_id])
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));

        let err = submit_ranking(&store, voter, subject, &[a.candidate_id, Uuid::new_v4()])
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));

        let other = Subject::profile_photo(subject.target_climber_id);
        let err = submit_ranking(&store, voter, other, &[a.candidate_id]).await.unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));

        let view = effective_order(&store, voter, subject).await.unwrap();
        assert_eq!(ids(&view), vec![b.candidate_id, a.candidate_id]);
    }

    #[tokio::test]
    async fn test_candidate_quota() {
        let (store, subject) = setup().await;
        let proposer = Uuid::new_v4();

        let first = propose_candidate(&store, proposer, subject, "Crimpy").await.unwrap();
        propose_candidate(&store, proposer, subject, "Beta").await.unwrap();

        let err = propose_candidate(&store, proposer, subject, "Dyno").await.unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));

        // quota is per subject
        let photo = Subject::profile_photo(subject.target_climber_id);
        propose_candidate(&store, proposer, photo, "https://img.example/a.png")
            .await
            .unwrap();

        withdraw_candidate(&store, first.candidate_id, proposer).await.unwrap();
        propose_candidate(&store, proposer, subject, "Dyno").await.unwrap();
    }

    #[tokio::test]
    async fn test_only_proposer_can_withdraw() {
        let (store, subject) = setup().await;
        let proposer = Uuid::new_v4();
        let candidate = propose_candidate(&store, proposer, subject, "Crimpy").await.unwrap();

        let err = withdraw_candidate(&store, candidate.candidate_id, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Forbidden(_)));
        assert_eq!(store.list_candidates(subject).await.unwrap().len(), 1);

        let err = withdraw_candidate(&store, Uuid::new_v4(), proposer).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn test_withdrawn_candidate_leaves_ballots() {
        let (store, subject) = setup().await;
        let voter = Uuid::new_v4();
        let proposer = Uuid::new_v4();
        let a = propose_candidate(&store, proposer, subject, "Crimpy").await.unwrap();
        let b = propose_candidate(&store, Uuid::new_v4(), subject, "Beta").await.unwrap();
        submit_ranking(&store, voter, subject, &[a.candidate_id, b.candidate_id]).await.unwrap();

        withdraw_candidate(&store, a.candidate_id, proposer).await.unwrap();

        let view = effective_order(&store, voter, subject).await.unwrap();
        assert_eq!(ids(&view), vec![b.candidate_id]);
        let ballot = store.list_ballots(BallotFilter::default()).await.unwrap();
        assert_eq!(ballot.len(), 1);
    }

    #[tokio::test]
    async fn test_candidate_values_are_validated() {
        let (store, subject) = setup().await;
        let proposer = Uuid::new_v4();

        let err = propose_candidate(&store, proposer, subject, "   ").await.unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));

        let photo = Subject::profile_photo(subject.target_climber_id);
        let err = propose_candidate(&store, proposer, photo, "not a url").await.unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));

        let missing = Subject::nickname(Uuid::new_v4());
        let err = propose_candidate(&store, proposer, missing, "Ghost").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[test]
    fn test_order_by_ballot_sentinel() {
        let now = chrono::Utc::now().naive_utc();
        let target = Uuid::new_v4();
        let make = |value: &str| Candidate {
            candidate_id: Uuid::new_v4(),
            kind: SubjectKind::Nickname,
            target_climber_id: target,
            proposed_by: Uuid::new_v4(),
            value: value.to_string(),
            created_at: now,
        };
        let candidates = vec![make("a"), make("b"), make("c"), make("d")];
        let ballot = vec![
            BallotEntry {
                voter_id: Uuid::nil(),
                kind: SubjectKind::Nickname,
                target_climber_id: target,
                candidate_id: candidates[3].candidate_id,
                rank: 2,
                created_at: now,
            },
            BallotEntry {
                voter_id: Uuid::nil(),
                kind: SubjectKind::Nickname,
                target_climber_id: target,
                candidate_id: candidates[1].candidate_id,
                rank: 1,
                created_at: now,
            },
        ];

        let values: Vec<String> = order_by_ballot(candidates, &ballot)
            .into_iter()
            .map(|c| c.value)
            .collect();
        assert_eq!(values, vec!["b", "d", "a", "c"]);
    }
}
