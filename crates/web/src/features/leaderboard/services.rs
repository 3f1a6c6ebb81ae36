use sqlx::PgPool;
use storage::{
    dto::leaderboard::RebuildResponse, error::Result, models::LeaderboardRow,
    services::leaderboard,
};

pub async fn get_leaderboard(
    pool: &PgPool,
    handle: &str,
    division_id: Option<i32>,
) -> Result<Vec<LeaderboardRow>> {
    leaderboard::get_leaderboard(pool, handle, division_id).await
}

/// Recompute the leaderboard on demand
pub async fn rebuild_leaderboard(pool: &PgPool, handle: &str) -> Result<RebuildResponse> {
    let rows = leaderboard::rebuild(pool, handle).await?;

    Ok(RebuildResponse {
        competition_handle: handle.to_string(),
        rows,
    })
}
