use crate::error::Result;
use crate::models::LeaderboardRow;

use super::build_leaderboard;
use super::store::RankingStore;

/// Computes the leaderboard of a competition from the store's current state
/// without persisting anything.
pub async fn compute_leaderboard<S>(store: &S, competition_handle: &str) -> Result<Vec<LeaderboardRow>>
where
    S: RankingStore + ?Sized,
{
    let snapshot = store.load_snapshot(competition_handle).await?;
    Ok(build_leaderboard(&snapshot))
}

/// Recomputes the leaderboard of a competition and replaces the persisted
/// rows with the result. Returns the number of rows written.
///
/// Called after every submission write and by the manual rebuild action.
/// The snapshot is read under the competition's rebuild lock.
pub async fn rebuild_leaderboard<S>(store: &S, competition_handle: &str) -> Result<usize>
where
    S: RankingStore + ?Sized,
{
    let session = store.begin_rebuild(competition_handle).await?;
    let rows = build_leaderboard(session.snapshot());
    let submissions = session.snapshot().submissions.len();

    session.commit(&rows).await?;

    tracing::info!(
        competition = competition_handle,
        submissions,
        rows = rows.len(),
        "Leaderboard rebuilt"
    );

    Ok(rows.len())
}
