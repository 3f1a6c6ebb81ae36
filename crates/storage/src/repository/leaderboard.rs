use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::error::Result;
use crate::models::LeaderboardRow;
use crate::repository::competition::{fetch_divisions, fetch_wods};
use crate::repository::submission::fetch_by_competition;
use crate::repository::{CompetitionRepository, SubmissionRepository};
use crate::services::ranking::{CompetitionSnapshot, RankingStore, RebuildSession};

pub struct LeaderboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> LeaderboardRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persisted rows ordered by division display order, rank and athlete
    pub async fn list_by_competition(
        &self,
        competition_id: Uuid,
        division_id: Option<i32>,
    ) -> Result<Vec<LeaderboardRow>> {
        let mut query = QueryBuilder::new(
            r#"
            SELECT c.handle AS competition_handle, lr.athlete, lr.division_id,
                   lr.rank, lr.points, lr.submissions
            FROM leaderboard_rows lr
            INNER JOIN competitions c ON c.competition_id = lr.competition_id
            LEFT JOIN divisions d ON d.division_id = lr.division_id
            WHERE lr.competition_id =
            "#,
        );
        query.push_bind(competition_id);

        if let Some(division_id) = division_id {
            query.push(" AND lr.division_id = ");
            query.push_bind(division_id);
        }

        query.push(" ORDER BY d.display_order, lr.division_id, lr.rank, lr.athlete");

        let rows = query
            .build_query_as::<LeaderboardRow>()
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    /// Swap every row of the competition for `rows` inside the caller's
    /// transaction, which should already hold the competition row lock.
    pub async fn replace(
        &self,
        competition_id: Uuid,
        rows: &[LeaderboardRow],
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<()> {
        sqlx::query("DELETE FROM leaderboard_rows WHERE competition_id = $1")
            .bind(competition_id)
            .execute(&mut **tx)
            .await?;

        for chunk in rows.chunks(1000) {
            let mut query = QueryBuilder::new(
                "INSERT INTO leaderboard_rows (competition_id, division_id, athlete, rank, points, submissions) ",
            );
            query.push_values(chunk, |mut b, row| {
                b.push_bind(competition_id)
                    .push_bind(row.division_id)
                    .push_bind(&row.athlete)
                    .push_bind(row.rank)
                    .push_bind(row.points)
                    .push_bind(Json(&row.submissions));
            });

            query.build().execute(&mut **tx).await?;
        }

        Ok(())
    }
}

/// Postgres-backed ranking store used by the services and the importer.
pub struct PgRankingStore<'a> {
    pool: &'a PgPool,
}

impl<'a> PgRankingStore<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl<'a> RankingStore for PgRankingStore<'a> {
    async fn load_snapshot(&self, competition_handle: &str) -> Result<CompetitionSnapshot> {
        let competitions = CompetitionRepository::new(self.pool);
        let competition = competitions.find_by_handle(competition_handle).await?;
        let divisions = competitions.list_divisions(competition.competition_id).await?;
        let wods = competitions.list_wods(competition.competition_id).await?;
        let submissions = SubmissionRepository::new(self.pool)
            .list_by_competition(competition.competition_id)
            .await?;

        Ok(CompetitionSnapshot {
            competition,
            divisions,
            wods,
            submissions,
        })
    }

    async fn begin_rebuild(&self, competition_handle: &str) -> Result<Box<dyn RebuildSession>> {
        let mut tx = self.pool.begin().await?;

        // Snapshot reads must run after the lock is granted
        let competition = CompetitionRepository::new(self.pool)
            .lock_by_handle(competition_handle, &mut tx)
            .await?;
        let divisions = fetch_divisions(&mut *tx, competition.competition_id).await?;
        let wods = fetch_wods(&mut *tx, competition.competition_id).await?;
        let submissions = fetch_by_competition(&mut *tx, competition.competition_id).await?;

        Ok(Box::new(PgRebuildSession {
            pool: self.pool.clone(),
            tx,
            snapshot: CompetitionSnapshot {
                competition,
                divisions,
                wods,
                submissions,
            },
        }))
    }

    async fn load_leaderboard(&self, competition_handle: &str) -> Result<Vec<LeaderboardRow>> {
        let competition = CompetitionRepository::new(self.pool)
            .find_by_handle(competition_handle)
            .await?;

        LeaderboardRepository::new(self.pool)
            .list_by_competition(competition.competition_id, None)
            .await
    }
}

/// Rebuild held open as a transaction on the locked competition row.
struct PgRebuildSession {
    pool: PgPool,
    tx: Transaction<'static, Postgres>,
    snapshot: CompetitionSnapshot,
}

#[async_trait]
impl RebuildSession for PgRebuildSession {
    fn snapshot(&self) -> &CompetitionSnapshot {
        &self.snapshot
    }

    async fn commit(self: Box<Self>, rows: &[LeaderboardRow]) -> Result<()> {
        let Self {
            pool,
            mut tx,
            snapshot,
        } = *self;

        LeaderboardRepository::new(&pool)
            .replace(snapshot.competition.competition_id, rows, &mut tx)
            .await?;
        tx.commit().await?;

        Ok(())
    }
}
