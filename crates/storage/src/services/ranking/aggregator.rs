use std::collections::{BTreeSet, HashMap};

use crate::models::{EventResult, LeaderboardRow, Wod};

use super::event_ranker::{RankedEntry, competition_ranks};

/// Ranked results of one WOD inside one division.
#[derive(Debug, Clone)]
pub struct EventStanding<'a> {
    pub wod: &'a Wod,
    pub entries: Vec<RankedEntry<'a>>,
}

impl EventStanding<'_> {
    /// Rank given to athletes of the division who have no entry in this WOD.
    pub fn absence_rank(&self) -> i32 {
        self.entries.len() as i32 + 1
    }
}

/// Sums per-WOD ranks into the division leaderboard.
///
/// The roster is every athlete with at least one entry in any standing.
/// Missing WODs count as [`EventStanding::absence_rank`]. Rows are sorted by
/// points then athlete; equal points share a rank.
pub fn aggregate_division(
    competition_handle: &str,
    division_id: i32,
    standings: &[EventStanding<'_>],
) -> Vec<LeaderboardRow> {
    let by_athlete: Vec<HashMap<&str, &RankedEntry<'_>>> = standings
        .iter()
        .map(|standing| {
            standing
                .entries
                .iter()
                .map(|entry| (entry.submission.athlete.as_str(), entry))
                .collect()
        })
        .collect();

    let roster: BTreeSet<&str> = by_athlete
        .iter()
        .flat_map(|entries| entries.keys().copied())
        .collect();

    let mut rows: Vec<LeaderboardRow> = roster
        .into_iter()
        .map(|athlete| {
            let mut points = 0;
            let mut submissions = Vec::new();

            for (standing, entries) in standings.iter().zip(&by_athlete) {
                match entries.get(athlete) {
                    Some(entry) => {
                        points += entry.event_rank;
                        submissions.push(EventResult {
                            event_id: standing.wod.wod_id,
                            event_name: standing.wod.name.clone(),
                            event_rank: entry.event_rank,
                            submission_id: entry.submission.submission_id,
                            scores: entry.submission.scores.clone(),
                            score_label: entry.submission.score_label.clone(),
                        });
                    }
                    None => points += standing.absence_rank(),
                }
            }

            LeaderboardRow {
                competition_handle: competition_handle.to_string(),
                athlete: athlete.to_string(),
                division_id,
                rank: 0,
                points,
                submissions,
            }
        })
        .collect();

    rows.sort_by(|a, b| a.points.cmp(&b.points).then_with(|| a.athlete.cmp(&b.athlete)));

    let ranks = competition_ranks(&rows, |a, b| a.points == b.points);
    for (row, rank) in rows.iter_mut().zip(ranks) {
        row.rank = rank;
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MetricConfig, MetricKind, ScoreValue, Submission};
    use chrono::Utc;
    use uuid::Uuid;

    fn wod(wod_id: i32) -> Wod {
        Wod {
            wod_id,
            competition_id: Uuid::nil(),
            name: format!("24.{}", wod_id),
            description: None,
            metrics: vec![MetricConfig::lower_is_better("Time", MetricKind::Time)],
            display_order: wod_id,
        }
    }

    fn submission(id: i32, athlete: &str, wod_id: i32) -> Submission {
        Submission {
            submission_id: id,
            athlete: athlete.to_string(),
            wod_id,
            division_id: 1,
            scores: vec![Some(ScoreValue::from(id as i64))],
            score_label: Some(format!("label {}", id)),
            submitted_at: Utc::now(),
        }
    }

    fn standing<'a>(wod: &'a Wod, entries: &[(&'a Submission, i32)]) -> EventStanding<'a> {
        EventStanding {
            wod,
            entries: entries
                .iter()
                .map(|&(submission, event_rank)| RankedEntry {
                    submission,
                    event_rank,
                })
                .collect(),
        }
    }

    #[test]
    fn test_points_are_sum_of_event_ranks() {
        let (w1, w2, w3) = (wod(1), wod(2), wod(3));
        let a1 = submission(1, "Ana", 1);
        let a2 = submission(2, "Ana", 2);
        let a3 = submission(3, "Ana", 3);
        let b1 = submission(4, "Bia", 1);
        let b2 = submission(5, "Bia", 2);
        let b3 = submission(6, "Bia", 3);
        let c1 = submission(7, "Caio", 1);
        let c2 = submission(8, "Caio", 2);
        let c3 = submission(9, "Caio", 3);

        let standings = vec![
            standing(&w1, &[(&a1, 1), (&b1, 2), (&c1, 3)]),
            standing(&w2, &[(&b2, 1), (&c2, 2), (&a2, 3)]),
            standing(&w3, &[(&c3, 1), (&a3, 2), (&b3, 3)]),
        ];

        let rows = aggregate_division("open", 1, &standings);
        let ana = rows.iter().find(|r| r.athlete == "Ana").unwrap();

        assert_eq!(ana.points, 6);
        assert!(rows.iter().all(|r| r.points == 6 && r.rank == 1));
        assert_eq!(ana.submissions.len(), 3);
        assert_eq!(ana.submissions[1].event_rank, 3);
        assert_eq!(ana.submissions[1].event_name, "24.2");
    }

    #[test]
    fn test_absent_athlete_gets_pool_size_plus_one() {
        let (w1, w2) = (wod(1), wod(2));
        let a1 = submission(1, "Ana", 1);
        let b1 = submission(2, "Bia", 1);
        let c1 = submission(3, "Caio", 1);
        let d2 = submission(4, "Duda", 2);

        let standings = vec![
            standing(&w1, &[(&a1, 1), (&b1, 2), (&c1, 3)]),
            standing(&w2, &[(&d2, 1)]),
        ];

        let rows = aggregate_division("open", 1, &standings);
        let duda = rows.iter().find(|r| r.athlete == "Duda").unwrap();
        let ana = rows.iter().find(|r| r.athlete == "Ana").unwrap();

        // Duda: absent from WOD 1 (3 athletes) -> 4, first in WOD 2 -> 1.
        assert_eq!(duda.points, 5);
        assert_eq!(duda.submissions.len(), 1);
        // Ana: first in WOD 1, absent from WOD 2 (1 athlete) -> 2.
        assert_eq!(ana.points, 3);
    }

    #[test]
    fn test_empty_standing_penalizes_everyone_equally() {
        let (w1, w2) = (wod(1), wod(2));
        let a1 = submission(1, "Ana", 1);
        let b1 = submission(2, "Bia", 1);

        let standings = vec![standing(&w1, &[(&a1, 1), (&b1, 2)]), standing(&w2, &[])];

        let rows = aggregate_division("open", 1, &standings);
        let points: Vec<(&str, i32, i32)> = rows
            .iter()
            .map(|r| (r.athlete.as_str(), r.rank, r.points))
            .collect();

        assert_eq!(points, vec![("Ana", 1, 2), ("Bia", 2, 3)]);
    }

    #[test]
    fn test_equal_points_share_rank() {
        let (w1, w2) = (wod(1), wod(2));
        let a1 = submission(1, "Ana", 1);
        let b1 = submission(2, "Bia", 1);
        let c1 = submission(3, "Caio", 1);
        let a2 = submission(4, "Ana", 2);
        let b2 = submission(5, "Bia", 2);
        let c2 = submission(6, "Caio", 2);

        let standings = vec![
            standing(&w1, &[(&a1, 1), (&b1, 2), (&c1, 3)]),
            standing(&w2, &[(&b2, 1), (&a2, 2), (&c2, 3)]),
        ];

        let rows = aggregate_division("open", 1, &standings);
        let placements: Vec<(&str, i32, i32)> = rows
            .iter()
            .map(|r| (r.athlete.as_str(), r.rank, r.points))
            .collect();

        assert_eq!(
            placements,
            vec![("Ana", 1, 3), ("Bia", 1, 3), ("Caio", 3, 6)]
        );
    }

    #[test]
    fn test_no_standings_no_rows() {
        assert!(aggregate_division("open", 1, &[]).is_empty());
    }
}
