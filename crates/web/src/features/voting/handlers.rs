use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    LeagueStore,
    dto::voting::{ProposeCandidateRequest, RankingResponse, SubmitRankingRequest},
    models::{Candidate, Subject, SubjectKind},
    services::ranked_choice,
};
use uuid::Uuid;

use crate::AppState;
use crate::error::WebError;
use crate::middleware::identity::ActingUser;

fn subject_from_path(kind: &str, target_id: Uuid) -> Result<Subject, WebError> {
    let kind: SubjectKind = kind.parse().map_err(WebError::BadRequest)?;
    Ok(Subject::new(kind, target_id))
}

#[utoipa::path(
    get,
    path = "/api/subjects/{kind}/{target_id}/candidates",
    params(
        ("kind" = String, Path, description = "nickname or profile_photo"),
        ("target_id" = Uuid, Path, description = "Climber the candidates are for")
    ),
    responses(
        (status = 200, description = "Live candidates in insertion order", body = Vec<Candidate>),
        (status = 400, description = "Unknown subject kind")
    ),
    tag = "voting"
)]
pub async fn list_candidates(
    State(state): State<AppState>,
    Path((kind, target_id)): Path<(String, Uuid)>,
) -> Result<Response, WebError> {
    let subject = subject_from_path(&kind, target_id)?;
    let candidates = state.store.list_candidates(subject).await?;

    Ok(Json(candidates).into_response())
}

#[utoipa::path(
    post,
    path = "/api/subjects/{kind}/{target_id}/candidates",
    params(
        ("kind" = String, Path, description = "nickname or profile_photo"),
        ("target_id" = Uuid, Path, description = "Climber the candidate is for")
    ),
    request_body = ProposeCandidateRequest,
    responses(
        (status = 201, description = "Candidate proposed", body = Candidate),
        (status = 400, description = "Invalid value or quota exceeded"),
        (status = 401, description = "Missing x-climber-id header"),
        (status = 404, description = "Target climber not found")
    ),
    tag = "voting"
)]
pub async fn propose_candidate(
    State(state): State<AppState>,
    ActingUser(proposer): ActingUser,
    Path((kind, target_id)): Path<(String, Uuid)>,
    Json(req): Json<ProposeCandidateRequest>,
) -> Result<Response, WebError> {
    let subject = subject_from_path(&kind, target_id)?;
    let candidate =
        ranked_choice::propose_candidate(state.store.as_ref(), proposer, subject, &req.value)
            .await?;

    Ok((StatusCode::CREATED, Json(candidate)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/candidates/{id}",
    params(
        ("id" = Uuid, Path, description = "Candidate id")
    ),
    responses(
        (status = 204, description = "Candidate withdrawn"),
        (status = 403, description = "Only the proposer may withdraw"),
        (status = 401, description = "Missing x-climber-id header"),
        (status = 404, description = "Candidate not found")
    ),
    tag = "voting"
)]
pub async fn withdraw_candidate(
    State(state): State<AppState>,
    ActingUser(requester): ActingUser,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    ranked_choice::withdraw_candidate(state.store.as_ref(), id, requester).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    get,
    path = "/api/subjects/{kind}/{target_id}/ranking",
    params(
        ("kind" = String, Path, description = "nickname or profile_photo"),
        ("target_id" = Uuid, Path, description = "Climber the election is for")
    ),
    responses(
        (status = 200, description = "The acting voter's effective order", body = RankingResponse),
        (status = 400, description = "Unknown subject kind"),
        (status = 401, description = "Missing x-climber-id header")
    ),
    tag = "voting"
)]
pub async fn get_ranking(
    State(state): State<AppState>,
    ActingUser(voter): ActingUser,
    Path((kind, target_id)): Path<(String, Uuid)>,
) -> Result<Response, WebError> {
    let subject = subject_from_path(&kind, target_id)?;
    let view = ranked_choice::ranking_view(state.store.as_ref(), voter, subject).await?;

    Ok(Json(view).into_response())
}

#[utoipa::path(
    put,
    path = "/api/subjects/{kind}/{target_id}/ranking",
    params(
        ("kind" = String, Path, description = "nickname or profile_photo"),
        ("target_id" = Uuid, Path, description = "Climber the election is for")
    ),
    request_body = SubmitRankingRequest,
    responses(
        (status = 200, description = "Ballot replaced", body = RankingResponse),
        (status = 400, description = "Duplicate or foreign candidate, nothing written"),
        (status = 401, description = "Missing x-climber-id header")
    ),
    tag = "voting"
)]
pub async fn submit_ranking(
    State(state): State<AppState>,
    ActingUser(voter): ActingUser,
    Path((kind, target_id)): Path<(String, Uuid)>,
    Json(req): Json<SubmitRankingRequest>,
) -> Result<Response, WebError> {
    let subject = subject_from_path(&kind, target_id)?;
    let store = state.store.as_ref();

    ranked_choice::submit_ranking(store, voter, subject, &req.candidate_ids).await?;
    let view = ranked_choice::ranking_view(store, voter, subject).await?;

    Ok(Json(view).into_response())
}
