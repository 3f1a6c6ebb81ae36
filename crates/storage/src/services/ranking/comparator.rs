use std::cmp::Ordering;

use crate::models::{MetricConfig, MetricKind, ScoreValue, SortOrder};

/// Compares two score vectors under a WOD's metric list.
///
/// `Ordering::Less` means `a` is the better score. Slots are visited in
/// metric order and the first slot that separates the two vectors decides;
/// later slots are never read. An absent value loses to any present value,
/// and a slot without a sort order never separates anything.
pub fn compare_scores(
    a: &[Option<ScoreValue>],
    b: &[Option<ScoreValue>],
    metrics: &[MetricConfig],
) -> Ordering {
    metrics
        .iter()
        .enumerate()
        .map(|(slot, metric)| compare_slot(slot_value(a, slot), slot_value(b, slot), metric))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn slot_value(scores: &[Option<ScoreValue>], slot: usize) -> Option<&ScoreValue> {
    scores.get(slot).and_then(Option::as_ref)
}

fn compare_slot(a: Option<&ScoreValue>, b: Option<&ScoreValue>, metric: &MetricConfig) -> Ordering {
    let Some(order) = metric.order else {
        return Ordering::Equal;
    };

    match metric.kind {
        // A value that cannot be read as a number counts as absent.
        MetricKind::Time | MetricKind::Number => compare_present(
            a.and_then(ScoreValue::as_number),
            b.and_then(ScoreValue::as_number),
            order,
        ),
        MetricKind::Text => compare_present(
            a.map(ScoreValue::as_text),
            b.map(ScoreValue::as_text),
            order,
        ),
    }
}

fn compare_present<T: Ord>(a: Option<T>, b: Option<T>, order: SortOrder) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (Some(a), Some(b)) => match order {
            SortOrder::Asc => a.cmp(&b),
            SortOrder::Desc => b.cmp(&a),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn time_asc() -> MetricConfig {
        MetricConfig::lower_is_better("Time", MetricKind::Time)
    }

    fn reps_desc() -> MetricConfig {
        MetricConfig::higher_is_better("Reps", MetricKind::Number)
    }

    fn n(value: i64) -> Option<ScoreValue> {
        Some(ScoreValue::from(value))
    }

    #[rstest]
    #[case(vec![n(280)], vec![n(300)], Ordering::Less)]
    #[case(vec![n(300)], vec![n(280)], Ordering::Greater)]
    #[case(vec![n(300)], vec![n(300)], Ordering::Equal)]
    #[case(vec![n(300)], vec![None], Ordering::Less)]
    #[case(vec![None], vec![n(300)], Ordering::Greater)]
    #[case(vec![None], vec![None], Ordering::Equal)]
    #[case(vec![n(300)], vec![], Ordering::Less)]
    fn test_single_ascending_slot(
        #[case] a: Vec<Option<ScoreValue>>,
        #[case] b: Vec<Option<ScoreValue>>,
        #[case] expected: Ordering,
    ) {
        assert_eq!(compare_scores(&a, &b, &[time_asc()]), expected);
    }

    #[rstest]
    #[case(n(120), n(100), Ordering::Less)]
    #[case(n(100), n(120), Ordering::Greater)]
    #[case(None, n(1), Ordering::Greater)]
    fn test_single_descending_slot(
        #[case] a: Option<ScoreValue>,
        #[case] b: Option<ScoreValue>,
        #[case] expected: Ordering,
    ) {
        assert_eq!(compare_scores(&[a], &[b], &[reps_desc()]), expected);
    }

    #[test]
    fn test_first_differing_slot_decides() {
        let metrics = [reps_desc(), time_asc()];
        let x = vec![n(100), n(200)];
        let y = vec![n(100), n(150)];

        assert_eq!(compare_scores(&y, &x, &metrics), Ordering::Less);
        assert_eq!(compare_scores(&x, &y, &metrics), Ordering::Greater);
    }

    #[test]
    fn test_later_slots_ignored_once_decided() {
        let metrics = [reps_desc(), time_asc()];
        let more_reps_slower = vec![n(101), n(999)];
        let fewer_reps_faster = vec![n(100), n(1)];

        assert_eq!(
            compare_scores(&more_reps_slower, &fewer_reps_faster, &metrics),
            Ordering::Less
        );
    }

    #[test]
    fn test_unspecified_order_is_a_tie() {
        let metrics = [
            MetricConfig {
                label: "Broken".to_string(),
                kind: MetricKind::Number,
                order: None,
            },
            time_asc(),
        ];

        assert_eq!(
            compare_scores(&[n(1), n(200)], &[n(50), n(150)], &metrics),
            Ordering::Greater
        );
        assert_eq!(
            compare_scores(&[None, n(150)], &[n(50), n(150)], &metrics),
            Ordering::Equal
        );
    }

    #[test]
    fn test_time_labels_compare_numerically() {
        let a = vec![Some(ScoreValue::from("4:05"))];
        let b = vec![n(250)];
        assert_eq!(compare_scores(&a, &b, &[time_asc()]), Ordering::Less);
    }

    #[test]
    fn test_unreadable_number_counts_as_absent() {
        let a = vec![Some(ScoreValue::from("DNF"))];
        let b = vec![n(900)];
        assert_eq!(compare_scores(&a, &b, &[time_asc()]), Ordering::Greater);
    }

    #[test]
    fn test_text_slot_is_lexicographic() {
        let metrics = [MetricConfig::lower_is_better("Grade", MetricKind::Text)];
        let a = vec![Some(ScoreValue::from("A"))];
        let b = vec![Some(ScoreValue::from("B"))];

        assert_eq!(compare_scores(&a, &b, &metrics), Ordering::Less);
        assert_eq!(compare_scores(&b, &a, &metrics), Ordering::Greater);
    }

    #[test]
    fn test_extra_values_beyond_metrics_are_ignored() {
        let a = vec![n(100), n(1)];
        let b = vec![n(100), n(2)];
        assert_eq!(compare_scores(&a, &b, &[time_asc()]), Ordering::Equal);
    }
}
