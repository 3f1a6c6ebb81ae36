use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::models::{Submission, Wod};

use super::comparator::compare_scores;

/// (division, wod, athlete)
type SelectionKey<'a> = (i32, i32, &'a str);

/// Reduces submissions to the single best one per (athlete, WOD, division).
///
/// Equal scores keep the lowest submission id so repeated runs pick the same
/// representative. Submissions whose WOD is unknown are skipped. The result
/// is ordered by division, WOD, then athlete.
pub fn select_best_submissions<'a, I>(
    submissions: I,
    wods: &HashMap<i32, &Wod>,
) -> Vec<&'a Submission>
where
    I: IntoIterator<Item = &'a Submission>,
{
    let mut best: BTreeMap<SelectionKey<'a>, &'a Submission> = BTreeMap::new();

    for submission in submissions {
        let Some(wod) = wods.get(&submission.wod_id) else {
            continue;
        };

        let key = (
            submission.division_id,
            submission.wod_id,
            submission.athlete.as_str(),
        );

        best.entry(key)
            .and_modify(|current| {
                if is_better(submission, current, wod) {
                    *current = submission;
                }
            })
            .or_insert(submission);
    }

    best.into_values().collect()
}

fn is_better(candidate: &Submission, current: &Submission, wod: &Wod) -> bool {
    match compare_scores(&candidate.scores, &current.scores, &wod.metrics) {
        Ordering::Less => true,
        Ordering::Equal => candidate.submission_id < current.submission_id,
        Ordering::Greater => false,
    }
}
