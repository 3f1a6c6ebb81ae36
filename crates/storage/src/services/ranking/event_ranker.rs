use std::cmp::Ordering;

use crate::models::{MetricConfig, Submission};

use super::comparator::compare_scores;

/// A selected submission with its placement inside its WOD and division.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry<'a> {
    pub submission: &'a Submission,
    pub event_rank: i32,
}

/// Ranks the best submissions of one (WOD, division) group.
///
/// Uses competition ranking: an entry's rank is one plus the number of
/// strictly better entries, so ties share a rank and leave a gap behind
/// them. Entries come back best first, tied entries ordered by athlete.
pub fn rank_event<'a>(group: &[&'a Submission], metrics: &[MetricConfig]) -> Vec<RankedEntry<'a>> {
    let mut sorted: Vec<&'a Submission> = group.to_vec();
    sorted.sort_by(|a, b| {
        compare_scores(&a.scores, &b.scores, metrics)
            .then_with(|| a.athlete.cmp(&b.athlete))
            .then_with(|| a.submission_id.cmp(&b.submission_id))
    });

    let ranks = competition_ranks(&sorted, |a, b| {
        compare_scores(&a.scores, &b.scores, metrics) == Ordering::Equal
    });

    sorted
        .into_iter()
        .zip(ranks)
        .map(|(submission, event_rank)| RankedEntry {
            submission,
            event_rank,
        })
        .collect()
}

/// Assigns 1-based competition ranks to an already sorted slice.
///
/// `tied` must agree with the ordering used to sort `items`.
pub(crate) fn competition_ranks<T>(items: &[T], tied: impl Fn(&T, &T) -> bool) -> Vec<i32> {
    let mut ranks: Vec<i32> = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let rank = match ranks.last() {
            Some(&previous) if tied(&items[index - 1], item) => previous,
            _ => index as i32 + 1,
        };
        ranks.push(rank);
    }

    ranks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MetricKind, ScoreValue};
    use chrono::Utc;

    fn submission(id: i32, athlete: &str, scores: Vec<Option<ScoreValue>>) -> Submission {
        Submission {
            submission_id: id,
            athlete: athlete.to_string(),
            wod_id: 1,
            division_id: 1,
            scores,
            score_label: None,
            submitted_at: Utc::now(),
        }
    }

    fn reps(id: i32, athlete: &str, value: i64) -> Submission {
        submission(id, athlete, vec![Some(ScoreValue::from(value))])
    }

    fn reps_desc() -> Vec<MetricConfig> {
        vec![MetricConfig::higher_is_better("Reps", MetricKind::Number)]
    }

    /// Reference definition: one plus the number of strictly better entries.
    fn pairwise_rank(target: &Submission, group: &[&Submission], metrics: &[MetricConfig]) -> i32 {
        1 + group
            .iter()
            .filter(|other| compare_scores(&other.scores, &target.scores, metrics) == Ordering::Less)
            .count() as i32
    }

    #[test]
    fn test_ties_share_rank_and_leave_gap() {
        let subs = [
            reps(1, "Ana", 100),
            reps(2, "Bia", 100),
            reps(3, "Caio", 100),
            reps(4, "Duda", 90),
        ];
        let group: Vec<&Submission> = subs.iter().collect();

        let ranked = rank_event(&group, &reps_desc());
        let ranks: Vec<(&str, i32)> = ranked
            .iter()
            .map(|e| (e.submission.athlete.as_str(), e.event_rank))
            .collect();

        assert_eq!(ranks, vec![("Ana", 1), ("Bia", 1), ("Caio", 1), ("Duda", 4)]);
    }

    #[test]
    fn test_matches_pairwise_definition() {
        let metrics = vec![
            MetricConfig::higher_is_better("Reps", MetricKind::Number),
            MetricConfig::lower_is_better("Time", MetricKind::Time),
        ];
        let n = |v: i64| Some(ScoreValue::from(v));
        let subs = [
            submission(1, "A", vec![n(100), n(200)]),
            submission(2, "B", vec![n(100), n(150)]),
            submission(3, "C", vec![n(120), None]),
            submission(4, "D", vec![None, n(10)]),
            submission(5, "E", vec![n(100), n(150)]),
            submission(6, "F", vec![n(80), n(100)]),
            submission(7, "G", vec![None, None]),
        ];
        let group: Vec<&Submission> = subs.iter().collect();

        for entry in rank_event(&group, &metrics) {
            assert_eq!(
                entry.event_rank,
                pairwise_rank(entry.submission, &group, &metrics),
                "athlete {}",
                entry.submission.athlete
            );
        }
    }

    #[test]
    fn test_lexicographic_tie_break() {
        let metrics = vec![
            MetricConfig::higher_is_better("Reps", MetricKind::Number),
            MetricConfig::lower_is_better("Time", MetricKind::Time),
        ];
        let n = |v: i64| Some(ScoreValue::from(v));
        let subs = [
            submission(1, "X", vec![n(100), n(200)]),
            submission(2, "Y", vec![n(100), n(150)]),
        ];
        let group: Vec<&Submission> = subs.iter().collect();

        let ranked = rank_event(&group, &metrics);

        assert_eq!(ranked[0].submission.athlete, "Y");
        assert_eq!(ranked[0].event_rank, 1);
        assert_eq!(ranked[1].submission.athlete, "X");
        assert_eq!(ranked[1].event_rank, 2);
    }

    #[test]
    fn test_empty_group() {
        assert!(rank_event(&[], &reps_desc()).is_empty());
    }

    #[test]
    fn test_competition_ranks_on_points() {
        let points = [3, 5, 5, 6, 6, 6, 10];
        let ranks = competition_ranks(&points, |a, b| a == b);
        assert_eq!(ranks, vec![1, 2, 2, 4, 4, 4, 7]);
    }
}
