use sqlx::PgPool;

use crate::error::Result;
use crate::models::LeaderboardRow;
use crate::repository::{CompetitionRepository, LeaderboardRepository, PgRankingStore};
use crate::services::ranking::rebuild_leaderboard;

/// Persisted leaderboard of a competition, optionally narrowed to one division
pub async fn get_leaderboard(
    pool: &PgPool,
    competition_handle: &str,
    division_id: Option<i32>,
) -> Result<Vec<LeaderboardRow>> {
    let competition = CompetitionRepository::new(pool)
        .find_by_handle(competition_handle)
        .await?;

    LeaderboardRepository::new(pool)
        .list_by_competition(competition.competition_id, division_id)
        .await
}

/// Recompute and persist the leaderboard from the current submissions
pub async fn rebuild(pool: &PgPool, competition_handle: &str) -> Result<usize> {
    rebuild_leaderboard(&PgRankingStore::new(pool), competition_handle).await
}
