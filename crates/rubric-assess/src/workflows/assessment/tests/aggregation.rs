use super::common::*;
use crate::workflows::assessment::aggregation::{self, AggregateScore};
use crate::workflows::assessment::domain::{CategoryId, Classification};
use crate::workflows::assessment::rubric::Rubric;

fn approx(left: f64, right: f64) -> bool {
    (left - right).abs() < 1e-9
}

#[test]
fn unscored_categories_are_excluded_from_the_overall_mean() {
    let rubric = split_rubric();
    let records = vec![record("cat-1", "sub-1a", 4), record("cat-1", "sub-1b", 2)];

    let overall = aggregation::overall_score(&rubric, &records);

    // cat-2 has no scores, so it does not drag the mean towards zero (0.6 * 3.0 = 1.8).
    assert!(approx(overall, 3.0), "overall was {overall}");
    assert_eq!(aggregation::progress(&rubric, &records), 50);
}

#[test]
fn two_level_weighting_applies_category_weights() {
    let rubric = split_rubric();
    let records = vec![
        record("cat-1", "sub-1a", 5),
        record("cat-1", "sub-1b", 5),
        record("cat-2", "sub-2a", 1),
        record("cat-2", "sub-2b", 3),
    ];

    let overall = aggregation::overall_score(&rubric, &records);

    assert!(approx(overall, 0.6 * 5.0 + 0.4 * 2.0), "overall was {overall}");
    assert_eq!(aggregation::progress(&rubric, &records), 100);
}

#[test]
fn progress_grows_with_each_distinct_subcategory() {
    let rubric = Rubric::standard();
    let targets = [
        ("cat-security", "sub-sec-1"),
        ("cat-security", "sub-sec-2"),
        ("cat-performance", "sub-perf-1"),
        ("cat-compliance", "sub-comp-2"),
    ];
    let mut records = Vec::new();
    let mut last = 0;

    for (index, (category_id, subcategory_id)) in targets.into_iter().enumerate() {
        records.push(record(category_id, subcategory_id, 3));
        let progress = aggregation::progress(&rubric, &records);
        let expected = (100.0 * (index + 1) as f64 / 14.0).round() as u8;
        assert_eq!(progress, expected);
        assert!(progress > last);
        last = progress;
    }
}

#[test]
fn aggregation_is_a_pure_function_of_its_inputs() {
    let rubric = split_rubric();
    let records = vec![record("cat-1", "sub-1a", 3), record("cat-2", "sub-2b", 5)];

    let first = aggregation::aggregate(&rubric, &records);
    let second = aggregation::aggregate(&rubric, &records);

    assert_eq!(first, second);
}

#[test]
fn zero_weight_categories_stay_out_of_the_overall_mean() {
    let rubric = Rubric {
        categories: vec![
            category("cat-1", 50.0, vec![subcategory("sub-1a", 0.0)]),
            category("cat-2", 50.0, vec![subcategory("sub-2a", 100.0)]),
        ],
        ..split_rubric()
    };
    let before = vec![record("cat-2", "sub-2a", 4)];
    let after = vec![record("cat-2", "sub-2a", 4), record("cat-1", "sub-1a", 5)];

    let overall_before = aggregation::overall_score(&rubric, &before);
    let overall_after = aggregation::overall_score(&rubric, &after);

    assert!(approx(overall_before, 4.0), "overall was {overall_before}");
    assert!(approx(overall_after, 4.0), "overall was {overall_after}");
    assert_eq!(
        Classification::from_score(overall_after),
        Classification::Important
    );

    let categories = aggregation::category_scores(&rubric, &after);
    assert_eq!(categories[0].score, None);
    assert_eq!(categories[0].scored, 1);
    assert_eq!(aggregation::progress(&rubric, &after), 100);
}

#[test]
fn zero_category_weights_yield_zero_overall() {
    let rubric = Rubric {
        categories: vec![category("cat-1", 0.0, vec![subcategory("sub-1a", 10.0)])],
        ..split_rubric()
    };
    let records = vec![record("cat-1", "sub-1a", 5)];

    assert_eq!(aggregation::overall_score(&rubric, &records), 0.0);
}

#[test]
fn empty_rubric_and_empty_ledger_aggregate_to_zero() {
    let empty = Rubric {
        categories: Vec::new(),
        ..split_rubric()
    };
    assert_eq!(aggregation::progress(&empty, &[]), 0);
    assert_eq!(aggregation::overall_score(&empty, &[]), 0.0);

    let rubric = split_rubric();
    let summary = aggregation::aggregate(&rubric, &[]);
    assert_eq!(summary.progress, 0);
    assert_eq!(summary.overall_score, 0.0);
    assert_eq!(summary.total_subcategories, 4);
    assert!(summary.categories.iter().all(|category| category.score.is_none()));
    assert!(!AggregateScore::empty().is_complete());
}

#[test]
fn category_breakdown_reports_completion() {
    let rubric = split_rubric();
    let records = vec![
        record("cat-1", "sub-1a", 2),
        record("cat-1", "sub-1b", 4),
        record("cat-2", "sub-2a", 5),
    ];

    let summary = aggregation::aggregate(&rubric, &records);

    assert_eq!(summary.scored_subcategories, 3);
    assert_eq!(summary.progress, 75);
    let first = &summary.categories[0];
    assert_eq!(first.category_id, CategoryId("cat-1".to_string()));
    assert_eq!(first.completion, 100);
    assert_eq!(first.score, Some(3.0));
    let second = &summary.categories[1];
    assert_eq!((second.scored, second.total, second.completion), (1, 2, 50));
    assert_eq!(second.score, Some(5.0));
}

#[test]
fn scores_for_subcategories_outside_the_rubric_are_ignored() {
    let rubric = split_rubric();
    let records = vec![record("cat-1", "sub-1a", 4), record("cat-x", "sub-x", 1)];

    assert_eq!(aggregation::progress(&rubric, &records), 25);
    assert!(approx(aggregation::overall_score(&rubric, &records), 4.0));
}
