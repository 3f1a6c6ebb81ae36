use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        common::PaginatedResponse,
        submission::{
            CreateSubmissionRequest, NewSubmission, SubmissionFilter, UpdateSubmissionRequest,
        },
    },
    models::Submission,
};
use validator::Validate;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/competitions/{handle}/submissions",
    params(
        ("handle" = String, Path, description = "Competition handle"),
        SubmissionFilter
    ),
    responses(
        (status = 200, description = "Submissions retrieved successfully", body = PaginatedResponse<Submission>),
        (status = 400, description = "Invalid query parameters"),
        (status = 404, description = "Competition not found")
    ),
    tag = "submissions"
)]
pub async fn list_submissions(
    State(db): State<Database>,
    Path(handle): Path<String>,
    Query(filter): Query<SubmissionFilter>,
) -> Result<Response, WebError> {
    filter.pagination().validate().map_err(WebError::BadRequest)?;

    let (submissions, total_items) =
        services::list_submissions(db.pool(), &handle, &filter).await?;

    let response = PaginatedResponse::new(submissions, filter.pagination(), total_items);

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/competitions/{handle}/athletes",
    params(
        ("handle" = String, Path, description = "Competition handle")
    ),
    responses(
        (status = 200, description = "Distinct athlete names, sorted", body = Vec<String>),
        (status = 404, description = "Competition not found")
    ),
    tag = "submissions"
)]
pub async fn list_athletes(
    State(db): State<Database>,
    Path(handle): Path<String>,
) -> Result<Json<Vec<String>>, WebError> {
    let athletes = services::list_athletes(db.pool(), &handle).await?;

    Ok(Json(athletes))
}

#[utoipa::path(
    post,
    path = "/api/competitions/{handle}/submissions",
    params(
        ("handle" = String, Path, description = "Competition handle")
    ),
    request_body = CreateSubmissionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Submission recorded and leaderboard rebuilt", body = Submission),
        (status = 400, description = "Validation error or invalid score"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition not found"),
        (status = 409, description = "WOD or division outside the competition")
    ),
    tag = "submissions"
)]
pub async fn create_submission(
    State(db): State<Database>,
    Path(handle): Path<String>,
    Json(req): Json<CreateSubmissionRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let submission =
        services::create_submission(db.pool(), &handle, NewSubmission::from(req)).await?;

    Ok((StatusCode::CREATED, Json(submission)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/competitions/{handle}/submissions/{submission_id}",
    params(
        ("handle" = String, Path, description = "Competition handle"),
        ("submission_id" = i32, Path, description = "Submission id")
    ),
    request_body = UpdateSubmissionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Submission updated and leaderboard rebuilt", body = Submission),
        (status = 400, description = "Validation error or invalid score"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition or submission not found"),
        (status = 409, description = "WOD or division outside the competition")
    ),
    tag = "submissions"
)]
pub async fn update_submission(
    State(db): State<Database>,
    Path((handle, submission_id)): Path<(String, i32)>,
    Json(req): Json<UpdateSubmissionRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let submission = services::update_submission(db.pool(), &handle, submission_id, req).await?;

    Ok(Json(submission).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/competitions/{handle}/submissions/{submission_id}",
    params(
        ("handle" = String, Path, description = "Competition handle"),
        ("submission_id" = i32, Path, description = "Submission id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Submission deleted and leaderboard rebuilt"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition or submission not found")
    ),
    tag = "submissions"
)]
pub async fn delete_submission(
    State(db): State<Database>,
    Path((handle, submission_id)): Path<(String, i32)>,
) -> Result<Response, WebError> {
    services::delete_submission(db.pool(), &handle, submission_id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
