use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{LeaderboardRow, Submission};

use super::CompetitionSnapshot;

/// Source of ranking inputs and sink of the materialized leaderboard.
#[async_trait]
pub trait RankingStore: Send + Sync {
    /// Reads the competition, its divisions, WODs and every submission.
    async fn load_snapshot(&self, competition_handle: &str) -> Result<CompetitionSnapshot>;

    /// Takes the competition's rebuild lock, then reads its snapshot.
    ///
    /// A second rebuild of the same competition waits until this session is
    /// committed or dropped, so it always reads at least what this one wrote
    /// over.
    async fn begin_rebuild(&self, competition_handle: &str) -> Result<Box<dyn RebuildSession>>;

    /// Persisted rows of the competition, by division then rank.
    async fn load_leaderboard(&self, competition_handle: &str) -> Result<Vec<LeaderboardRow>>;
}

/// Exclusive hold on one competition's leaderboard during a rebuild.
#[async_trait]
pub trait RebuildSession: Send {
    /// Inputs read after the lock was taken.
    fn snapshot(&self) -> &CompetitionSnapshot;

    /// Replaces every persisted row of the competition and releases the lock.
    ///
    /// On error, or when the session is dropped uncommitted, the previous
    /// rows stay in place.
    async fn commit(self: Box<Self>, rows: &[LeaderboardRow]) -> Result<()>;
}

#[derive(Debug, Default)]
struct InMemoryState {
    competitions: HashMap<String, CompetitionSnapshot>,
    leaderboards: HashMap<Uuid, Vec<LeaderboardRow>>,
}

/// In-memory implementation of RankingStore for development and testing.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRankingStore {
    state: Arc<RwLock<InMemoryState>>,
    // One lock for every competition
    rebuild_lock: Arc<Mutex<()>>,
}

impl InMemoryRankingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with competitions.
    pub fn with_competitions(snapshots: Vec<CompetitionSnapshot>) -> Self {
        let competitions = snapshots
            .into_iter()
            .map(|snapshot| (snapshot.competition.handle.clone(), snapshot))
            .collect();

        Self {
            state: Arc::new(RwLock::new(InMemoryState {
                competitions,
                leaderboards: HashMap::new(),
            })),
            rebuild_lock: Arc::default(),
        }
    }

    /// Inserts or replaces a submission (matched by id).
    pub async fn upsert_submission(
        &self,
        competition_handle: &str,
        submission: Submission,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        let snapshot = state
            .competitions
            .get_mut(competition_handle)
            .ok_or(StorageError::NotFound)?;

        match snapshot
            .submissions
            .iter_mut()
            .find(|s| s.submission_id == submission.submission_id)
        {
            Some(existing) => *existing = submission,
            None => snapshot.submissions.push(submission),
        }

        Ok(())
    }

    pub async fn remove_submission(&self, competition_handle: &str, submission_id: i32) -> Result<()> {
        let mut state = self.state.write().await;
        let snapshot = state
            .competitions
            .get_mut(competition_handle)
            .ok_or(StorageError::NotFound)?;

        let before = snapshot.submissions.len();
        snapshot
            .submissions
            .retain(|s| s.submission_id != submission_id);

        if snapshot.submissions.len() == before {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}

#[async_trait]
impl RankingStore for InMemoryRankingStore {
    async fn load_snapshot(&self, competition_handle: &str) -> Result<CompetitionSnapshot> {
        let state = self.state.read().await;
        state
            .competitions
            .get(competition_handle)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn begin_rebuild(&self, competition_handle: &str) -> Result<Box<dyn RebuildSession>> {
        let guard = self.rebuild_lock.clone().lock_owned().await;
        let snapshot = self.load_snapshot(competition_handle).await?;

        Ok(Box::new(InMemoryRebuildSession {
            state: self.state.clone(),
            snapshot,
            _guard: guard,
        }))
    }

    async fn load_leaderboard(&self, competition_handle: &str) -> Result<Vec<LeaderboardRow>> {
        let state = self.state.read().await;
        let snapshot = state
            .competitions
            .get(competition_handle)
            .ok_or(StorageError::NotFound)?;

        Ok(state
            .leaderboards
            .get(&snapshot.competition.competition_id)
            .cloned()
            .unwrap_or_default())
    }
}

struct InMemoryRebuildSession {
    state: Arc<RwLock<InMemoryState>>,
    snapshot: CompetitionSnapshot,
    _guard: OwnedMutexGuard<()>,
}

#[async_trait]
impl RebuildSession for InMemoryRebuildSession {
    fn snapshot(&self) -> &CompetitionSnapshot {
        &self.snapshot
    }

    async fn commit(self: Box<Self>, rows: &[LeaderboardRow]) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .leaderboards
            .insert(self.snapshot.competition.competition_id, rows.to_vec());
        Ok(())
    }
}
