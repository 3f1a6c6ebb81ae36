use axum::{
    Json,
    extract::{Path, Query, State},
};
use storage::{
    Database,
    dto::leaderboard::{LeaderboardFilter, RebuildResponse},
    models::LeaderboardRow,
};

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/competitions/{handle}/leaderboard",
    params(
        ("handle" = String, Path, description = "Competition handle"),
        LeaderboardFilter
    ),
    responses(
        (status = 200, description = "Leaderboard rows by division order, then rank", body = Vec<LeaderboardRow>),
        (status = 404, description = "Competition not found")
    ),
    tag = "leaderboard"
)]
pub async fn get_leaderboard(
    State(db): State<Database>,
    Path(handle): Path<String>,
    Query(filter): Query<LeaderboardFilter>,
) -> Result<Json<Vec<LeaderboardRow>>, WebError> {
    let rows = services::get_leaderboard(db.pool(), &handle, filter.division_id).await?;

    Ok(Json(rows))
}

#[utoipa::path(
    post,
    path = "/api/competitions/{handle}/leaderboard/rebuild",
    params(
        ("handle" = String, Path, description = "Competition handle")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Leaderboard recomputed", body = RebuildResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition not found")
    ),
    tag = "leaderboard"
)]
pub async fn rebuild_leaderboard(
    State(db): State<Database>,
    Path(handle): Path<String>,
) -> Result<Json<RebuildResponse>, WebError> {
    let response = services::rebuild_leaderboard(db.pool(), &handle).await?;

    Ok(Json(response))
}
