use async_trait::async_trait;
use chrono::NaiveDate;
use storage::dto::ascent::LogAscentRequest;
use storage::error::{Result, StorageError};
use storage::models::{
    Ascent, BallotEntry, BallotFilter, Candidate, Climber, NewAscent, NewCandidate, NewClimber,
    Subject,
};
use storage::services::{ascents, ranked_choice};
use storage::{LeagueStore, MemoryStore};
use uuid::Uuid;

/// Delegates to a [`MemoryStore`] but lets concurrent callers overtake each
/// other. Every promotion attempt is preceded by a rival request promoting
/// the same climber first.
struct RacingStore {
    inner: MemoryStore,
}

#[async_trait]
impl LeagueStore for RacingStore {
    async fn create_climber(&self, climber: &NewClimber) -> Result<Climber> {
        self.inner.create_climber(climber).await
    }

    async fn get_climber(&self, climber_id: Uuid) -> Result<Climber> {
        self.inner.get_climber(climber_id).await
    }

    async fn list_climbers(&self) -> Result<Vec<Climber>> {
        self.inner.list_climbers().await
    }

    async fn promote_climber(&self, climber_id: Uuid, expected_tier: i32) -> Result<Climber> {
        self.inner.promote_climber(climber_id, expected_tier).await?;
        self.inner.promote_climber(climber_id, expected_tier).await
    }

    async fn resolve_promotion(
        &self,
        climber_id: Uuid,
        expected_tier: i32,
        ascents_of_next_grade: i32,
    ) -> Result<Climber> {
        self.inner
            .resolve_promotion(climber_id, expected_tier, ascents_of_next_grade)
            .await
    }

    async fn set_running_score(&self, climber_id: Uuid, running_score: i64) -> Result<Climber> {
        self.inner.set_running_score(climber_id, running_score).await
    }

    async fn list_ascents(&self, climber_id: Uuid) -> Result<Vec<Ascent>> {
        self.inner.list_ascents(climber_id).await
    }

    async fn get_ascent(&self, ascent_id: Uuid) -> Result<Ascent> {
        self.inner.get_ascent(ascent_id).await
    }

    async fn record_ascent(&self, ascent: &NewAscent, points: i64) -> Result<Ascent> {
        self.inner.record_ascent(ascent, points).await
    }

    async fn delete_ascent(&self, ascent_id: Uuid, points: i64) -> Result<()> {
        self.inner.delete_ascent(ascent_id, points).await
    }

    async fn list_candidates(&self, subject: Subject) -> Result<Vec<Candidate>> {
        tokio::task::yield_now().await;
        self.inner.list_candidates(subject).await
    }

    async fn get_candidate(&self, candidate_id: Uuid) -> Result<Candidate> {
        self.inner.get_candidate(candidate_id).await
    }

    async fn create_candidate(&self, candidate: &NewCandidate, quota: usize) -> Result<Candidate> {
        tokio::task::yield_now().await;
        self.inner.create_candidate(candidate, quota).await
    }

    async fn delete_candidate(&self, candidate_id: Uuid, requester_id: Uuid) -> Result<()> {
        self.inner.delete_candidate(candidate_id, requester_id).await
    }

    async fn list_ballots(&self, filter: BallotFilter) -> Result<Vec<BallotEntry>> {
        self.inner.list_ballots(filter).await
    }

    async fn replace_ballot(
        &self,
        voter_id: Uuid,
        subject: Subject,
        ranked_ids: &[Uuid],
    ) -> Result<Vec<BallotEntry>> {
        self.inner.replace_ballot(voter_id, subject, ranked_ids).await
    }
}

async fn racing_store_with_climber(working_grade: i32) -> (RacingStore, Uuid) {
    let store = RacingStore {
        inner: MemoryStore::new(),
    };
    let climber_id = Uuid::new_v4();
    store
        .create_climber(&NewClimber {
            climber_id,
            first_name: "Janja".to_string(),
            last_name: "Garnbret".to_string(),
            nickname: None,
            working_grade,
            ascents_of_next_grade: 0,
        })
        .await
        .unwrap();
    (store, climber_id)
}

#[tokio::test]
async fn test_log_ascent_after_losing_promotion_race() {
    let (store, climber_id) = racing_store_with_climber(0).await;

    let logged = ascents::log_ascent(
        &store,
        climber_id,
        &LogAscentRequest {
            name: "Warm-up arete".to_string(),
            description: String::new(),
            absolute_grade: 1,
            is_flash: false,
            sent_date: NaiveDate::from_ymd_opt(2025, 9, 2),
        },
    )
    .await
    .unwrap();

    // The rival did the promotion; this call only logged the send
    assert!(!logged.promotion.promoted);
    assert_eq!(logged.points, 125);
    assert_eq!(logged.running_score, 125);

    let climber = store.get_climber(climber_id).await.unwrap();
    assert_eq!(climber.working_grade, 1);
    assert!(climber.promotion_input_needed);
    assert_eq!(store.list_ascents(climber_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_proposals_respect_quota() {
    let (store, target) = racing_store_with_climber(5).await;
    let subject = Subject::nickname(target);
    let proposer = Uuid::new_v4();

    let (a, b, c) = tokio::join!(
        ranked_choice::propose_candidate(&store, proposer, subject, "Pinch"),
        ranked_choice::propose_candidate(&store, proposer, subject, "Sidepull"),
        ranked_choice::propose_candidate(&store, proposer, subject, "Undercling"),
    );

    let results = [a, b, c];
    let accepted = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(accepted, ranked_choice::CANDIDATE_QUOTA);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, StorageError::Validation(_)))
    );
    assert_eq!(store.list_candidates(subject).await.unwrap().len(), 2);
}
