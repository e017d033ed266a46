use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    dto::{
        ascent::{
            AscentResponse, LogAscentRequest, LoggedAscentResponse, PointsQuery, PointsResponse,
        },
        climber::MAX_GRADE,
    },
    services::{ascents, points::compute_points},
};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use crate::error::WebError;
use crate::middleware::identity::ActingUser;

#[utoipa::path(
    post,
    path = "/api/ascents",
    request_body = LogAscentRequest,
    responses(
        (status = 201, description = "Ascent logged and priced", body = LoggedAscentResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing x-climber-id header"),
        (status = 404, description = "Acting climber is not registered"),
        (status = 409, description = "Climber changed concurrently, retry")
    ),
    tag = "ascents"
)]
pub async fn log_ascent(
    State(state): State<AppState>,
    ActingUser(climber_id): ActingUser,
    Json(req): Json<LogAscentRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let logged = ascents::log_ascent(state.store.as_ref(), climber_id, &req).await?;

    let response = LoggedAscentResponse {
        ascent: AscentResponse::from(logged.ascent),
        running_score: logged.running_score,
        promotion: logged.promotion,
    };

    Ok((StatusCode::CREATED, Json(response)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/ascents/{id}",
    params(
        ("id" = Uuid, Path, description = "Ascent id")
    ),
    responses(
        (status = 204, description = "Ascent deleted and its points taken back"),
        (status = 403, description = "Not the owner of the ascent"),
        (status = 401, description = "Missing x-climber-id header"),
        (status = 404, description = "Ascent not found")
    ),
    tag = "ascents"
)]
pub async fn delete_ascent(
    State(state): State<AppState>,
    ActingUser(requester): ActingUser,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    ascents::remove_ascent(state.store.as_ref(), id, requester).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    get,
    path = "/api/points",
    params(PointsQuery),
    responses(
        (status = 200, description = "Points an ascent would earn", body = PointsResponse),
        (status = 400, description = "Grade out of range")
    ),
    tag = "ascents"
)]
pub async fn get_points(Query(query): Query<PointsQuery>) -> Result<Response, WebError> {
    for (field, grade) in [
        ("working_grade", query.working_grade),
        ("absolute_grade", query.absolute_grade),
    ] {
        if !(0..=MAX_GRADE).contains(&grade) {
            return Err(WebError::BadRequest(format!(
                "{} must be between 0 and {}",
                field, MAX_GRADE
            )));
        }
    }

    let points = compute_points(query.working_grade, query.absolute_grade, query.is_flash);

    Ok(Json(PointsResponse { points }).into_response())
}
