use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    LeagueStore,
    dto::{
        ascent::AscentResponse,
        climber::{ClimberResponse, CreateClimberRequest, ResolvePromotionRequest},
    },
    services::working_grade::PromotionOutcome,
    services::{ascents, climbers, working_grade},
};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use crate::error::WebError;
use crate::middleware::identity::ActingUser;

#[utoipa::path(
    get,
    path = "/api/climbers",
    responses(
        (status = 200, description = "List all climbers successfully", body = Vec<ClimberResponse>)
    ),
    tag = "climbers"
)]
pub async fn list_climbers(State(state): State<AppState>) -> Result<Response, WebError> {
    let climbers = state.store.list_climbers().await?;

    let response: Vec<ClimberResponse> = climbers.into_iter().map(ClimberResponse::from).collect();

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/climbers/{id}",
    params(
        ("id" = Uuid, Path, description = "Climber id")
    ),
    responses(
        (status = 200, description = "Climber found", body = ClimberResponse),
        (status = 404, description = "Climber not found")
    ),
    tag = "climbers"
)]
pub async fn get_climber(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let climber = state.store.get_climber(id).await?;

    Ok(Json(ClimberResponse::from(climber)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/climbers",
    request_body = CreateClimberRequest,
    responses(
        (status = 201, description = "Climber registered", body = ClimberResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Climber already registered")
    ),
    tag = "climbers"
)]
pub async fn create_climber(
    State(state): State<AppState>,
    Json(req): Json<CreateClimberRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let climber = climbers::register_climber(state.store.as_ref(), &req).await?;

    Ok((StatusCode::CREATED, Json(ClimberResponse::from(climber))).into_response())
}

#[utoipa::path(
    post,
    path = "/api/climbers/{id}/promotion/check",
    params(
        ("id" = Uuid, Path, description = "Climber id")
    ),
    responses(
        (status = 200, description = "Promotion checked", body = PromotionOutcome),
        (status = 404, description = "Climber not found"),
        (status = 409, description = "Climber changed concurrently, retry")
    ),
    tag = "climbers"
)]
pub async fn check_promotion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let outcome = working_grade::check_promotion(state.store.as_ref(), id).await?;

    Ok(Json(outcome).into_response())
}

#[utoipa::path(
    put,
    path = "/api/climbers/{id}/promotion",
    params(
        ("id" = Uuid, Path, description = "Climber id")
    ),
    request_body = ResolvePromotionRequest,
    responses(
        (status = 200, description = "Promotion reconciled", body = ClimberResponse),
        (status = 400, description = "No pending promotion or count out of range"),
        (status = 401, description = "Missing x-climber-id header"),
        (status = 403, description = "Not the climber's own record"),
        (status = 404, description = "Climber not found"),
        (status = 409, description = "Climber changed concurrently, retry")
    ),
    tag = "climbers"
)]
pub async fn resolve_promotion(
    State(state): State<AppState>,
    ActingUser(acting): ActingUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ResolvePromotionRequest>,
) -> Result<Response, WebError> {
    if acting != id {
        return Err(WebError::Forbidden);
    }

    let climber =
        working_grade::resolve_promotion(state.store.as_ref(), id, req.ascents_of_next_grade)
            .await?;

    Ok(Json(ClimberResponse::from(climber)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/climbers/{id}/score/recompute",
    params(
        ("id" = Uuid, Path, description = "Climber id")
    ),
    responses(
        (status = 200, description = "Running score rebuilt from the logbook", body = ClimberResponse),
        (status = 404, description = "Climber not found")
    ),
    tag = "climbers"
)]
pub async fn recompute_score(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let climber = climbers::recompute_running_score(state.store.as_ref(), id).await?;

    Ok(Json(ClimberResponse::from(climber)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/climbers/{id}/ascents",
    params(
        ("id" = Uuid, Path, description = "Climber id")
    ),
    responses(
        (status = 200, description = "Logbook, most recent send first", body = Vec<AscentResponse>),
        (status = 404, description = "Climber not found")
    ),
    tag = "climbers"
)]
pub async fn list_climber_ascents(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let logbook = ascents::logbook(state.store.as_ref(), id).await?;

    let response: Vec<AscentResponse> = logbook.into_iter().map(AscentResponse::from).collect();

    Ok(Json(response).into_response())
}
