//! Leaderboard computation.
//!
//! Raw submissions flow through [`selector`] (best per athlete, WOD and
//! division), [`event_ranker`] (rank inside each WOD and division) and
//! [`aggregator`] (sum of WOD ranks). [`materializer`] loads the inputs from
//! a [`store::RankingStore`] and replaces the persisted rows wholesale.

pub mod aggregator;
pub mod comparator;
pub mod event_ranker;
pub mod materializer;
pub mod selector;
pub mod store;

use std::collections::{HashMap, HashSet};

use crate::models::{Competition, Division, LeaderboardRow, Submission, Wod};

use aggregator::{EventStanding, aggregate_division};
use event_ranker::rank_event;
use selector::select_best_submissions;

pub use comparator::compare_scores;
pub use materializer::{compute_leaderboard, rebuild_leaderboard};
pub use store::{InMemoryRankingStore, RankingStore, RebuildSession};

/// Everything the leaderboard of one competition is derived from.
#[derive(Debug, Clone)]
pub struct CompetitionSnapshot {
    pub competition: Competition,
    pub divisions: Vec<Division>,
    pub wods: Vec<Wod>,
    pub submissions: Vec<Submission>,
}

/// Derives the full leaderboard of a competition from its current state.
///
/// Submissions pointing at a WOD or division outside the competition are
/// left out. Rows are grouped by division (in display order) and sorted by
/// rank inside each division.
pub fn build_leaderboard(snapshot: &CompetitionSnapshot) -> Vec<LeaderboardRow> {
    let mut divisions: Vec<&Division> = snapshot.divisions.iter().collect();
    divisions.sort_by_key(|d| (d.display_order, d.division_id));

    let mut wods: Vec<&Wod> = snapshot.wods.iter().collect();
    wods.sort_by_key(|w| (w.display_order, w.wod_id));

    let wods_by_id: HashMap<i32, &Wod> = wods.iter().map(|w| (w.wod_id, *w)).collect();
    let division_ids: HashSet<i32> = divisions.iter().map(|d| d.division_id).collect();

    let rankable = snapshot.submissions.iter().filter(|submission| {
        let known = wods_by_id.contains_key(&submission.wod_id)
            && division_ids.contains(&submission.division_id);
        if !known {
            tracing::warn!(
                submission_id = submission.submission_id,
                wod_id = submission.wod_id,
                division_id = submission.division_id,
                competition = %snapshot.competition.handle,
                "Skipping submission outside the competition's WODs or divisions"
            );
        }
        known
    });

    let best = select_best_submissions(rankable, &wods_by_id);

    let mut rows = Vec::new();
    for division in divisions {
        let standings: Vec<EventStanding<'_>> = wods
            .iter()
            .map(|wod| {
                let group: Vec<&Submission> = best
                    .iter()
                    .copied()
                    .filter(|s| s.division_id == division.division_id && s.wod_id == wod.wod_id)
                    .collect();

                EventStanding {
                    wod,
                    entries: rank_event(&group, &wod.metrics),
                }
            })
            .collect();

        let division_rows =
            aggregate_division(&snapshot.competition.handle, division.division_id, &standings);

        tracing::debug!(
            competition = %snapshot.competition.handle,
            division_id = division.division_id,
            athletes = division_rows.len(),
            "Division ranked"
        );

        rows.extend(division_rows);
    }

    rows
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use uuid::Uuid;

    use crate::models::{
        Competition, Division, MetricConfig, MetricKind, ScoreValue, Submission, Wod,
    };

    use super::CompetitionSnapshot;

    pub fn competition(handle: &str) -> Competition {
        Competition {
            competition_id: Uuid::from_u128(handle.len() as u128 + 1),
            name: handle.to_uppercase(),
            handle: handle.to_string(),
            created_at: NaiveDateTime::default(),
        }
    }

    pub fn division(id: i32, name: &str) -> Division {
        Division {
            division_id: id,
            competition_id: Uuid::nil(),
            name: name.to_string(),
            display_order: id,
        }
    }

    pub fn wod(id: i32, metrics: Vec<MetricConfig>) -> Wod {
        Wod {
            wod_id: id,
            competition_id: Uuid::nil(),
            name: format!("WOD {}", id),
            description: None,
            metrics,
            display_order: id,
        }
    }

    pub fn timed_wod(id: i32) -> Wod {
        wod(id, vec![MetricConfig::lower_is_better("Time", MetricKind::Time)])
    }

    pub fn submission(
        id: i32,
        athlete: &str,
        wod_id: i32,
        division_id: i32,
        scores: Vec<Option<ScoreValue>>,
    ) -> Submission {
        Submission {
            submission_id: id,
            athlete: athlete.to_string(),
            wod_id,
            division_id,
            scores,
            score_label: None,
            submitted_at: DateTime::<Utc>::default(),
        }
    }

    pub fn timed(id: i32, athlete: &str, wod_id: i32, division_id: i32, seconds: i64) -> Submission {
        submission(
            id,
            athlete,
            wod_id,
            division_id,
            vec![Some(ScoreValue::from(seconds))],
        )
    }

    /// Two divisions, two timed WODs.
    pub fn snapshot(submissions: Vec<Submission>) -> CompetitionSnapshot {
        CompetitionSnapshot {
            competition: competition("open"),
            divisions: vec![division(1, "RX"), division(2, "Scaled")],
            wods: vec![timed_wod(1), timed_wod(2)],
            submissions,
        }
    }
}
