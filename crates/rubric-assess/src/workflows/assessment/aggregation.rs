//! Progress and weighted-score aggregation over a rubric and one assessment's score records.
//!
//! Everything here is a pure function of its inputs and is recomputed on every call.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::domain::{CategoryId, ScoreRecord, SubcategoryId};
use super::rubric::{Category, Rubric};

/// Per-category slice of an aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category_id: CategoryId,
    pub name: String,
    pub weight: f64,
    /// Weighted mean over scored subcategories; `None` until a subcategory with weight is scored.
    pub score: Option<f64>,
    pub scored: usize,
    pub total: usize,
    pub completion: u8,
}

/// Full aggregation of an assessment's ledger against its rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateScore {
    pub progress: u8,
    pub overall_score: f64,
    pub scored_subcategories: usize,
    pub total_subcategories: usize,
    pub categories: Vec<CategoryScore>,
}

impl AggregateScore {
    /// Zeroed aggregation used when no rubric is available.
    pub fn empty() -> Self {
        Self {
            progress: 0,
            overall_score: 0.0,
            scored_subcategories: 0,
            total_subcategories: 0,
            categories: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.progress == 100
    }
}

/// Percentage of rubric subcategories with a recorded score, rounded to the nearest integer.
pub fn progress(rubric: &Rubric, records: &[ScoreRecord]) -> u8 {
    let scores = index_scores(records);
    let scored = rubric
        .categories
        .iter()
        .map(|category| scored_in(category, &scores))
        .sum();
    percentage(scored, rubric.total_subcategories())
}

/// Two-level weighted mean over scored entries only. Unscored categories are left out of the
/// outer mean instead of counting as zero.
pub fn overall_score(rubric: &Rubric, records: &[ScoreRecord]) -> f64 {
    let scores = index_scores(records);
    let category_means = rubric.categories.iter().filter_map(|category| {
        category_mean(category, &scores).map(|mean| (mean, category.weight))
    });
    weighted_mean(category_means).unwrap_or(0.0)
}

pub fn category_scores(rubric: &Rubric, records: &[ScoreRecord]) -> Vec<CategoryScore> {
    let scores = index_scores(records);
    rubric
        .categories
        .iter()
        .map(|category| {
            let scored = scored_in(category, &scores);
            let total = category.subcategories.len();
            CategoryScore {
                category_id: category.id.clone(),
                name: category.name.clone(),
                weight: category.weight,
                score: category_mean(category, &scores),
                scored,
                total,
                completion: percentage(scored, total),
            }
        })
        .collect()
}

pub fn aggregate(rubric: &Rubric, records: &[ScoreRecord]) -> AggregateScore {
    let categories = category_scores(rubric, records);
    let scored_subcategories = categories.iter().map(|category| category.scored).sum();
    let total_subcategories = rubric.total_subcategories();

    AggregateScore {
        progress: percentage(scored_subcategories, total_subcategories),
        overall_score: overall_score(rubric, records),
        scored_subcategories,
        total_subcategories,
        categories,
    }
}

fn index_scores(records: &[ScoreRecord]) -> HashMap<&SubcategoryId, u8> {
    records
        .iter()
        .map(|record| (&record.subcategory_id, record.score))
        .collect()
}

fn scored_in(category: &Category, scores: &HashMap<&SubcategoryId, u8>) -> usize {
    category
        .subcategories
        .iter()
        .filter(|subcategory| scores.contains_key(&subcategory.id))
        .count()
}

/// `None` when nothing in the category is scored or every scored subcategory weighs zero, so the
/// category stays out of the overall mean.
fn category_mean(category: &Category, scores: &HashMap<&SubcategoryId, u8>) -> Option<f64> {
    let scored: Vec<(f64, f64)> = category
        .subcategories
        .iter()
        .filter_map(|subcategory| {
            scores
                .get(&subcategory.id)
                .map(|score| (f64::from(*score), subcategory.weight))
        })
        .collect();

    let weight: f64 = scored.iter().map(|(_, weight)| weight).sum();
    if weight.abs() <= f64::EPSILON {
        return None;
    }
    weighted_mean(scored)
}

/// `None` when there are no entries; `Some(0.0)` when entries exist but their weights sum to zero.
fn weighted_mean<I>(entries: I) -> Option<f64>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut seen = false;
    let mut numerator = 0.0;
    let mut denominator = 0.0;

    for (value, weight) in entries {
        seen = true;
        numerator += value * weight;
        denominator += weight;
    }

    if !seen {
        return None;
    }
    if denominator.abs() <= f64::EPSILON {
        return Some(0.0);
    }
    Some(numerator / denominator)
}

fn percentage(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (100.0 * part as f64 / total as f64).round() as u8
}
