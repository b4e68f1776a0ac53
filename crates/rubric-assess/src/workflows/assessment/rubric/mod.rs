//! Weighted rubric tree: categories, subcategories, and the discrete criteria an assessor picks
//! from. Rubrics are read-only once loaded; every lookup here is plain traversal.

mod loader;
mod standard;

pub use loader::RubricLoadError;

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{CategoryId, RubricId, SubcategoryId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rubric {
    pub id: RubricId,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry_type: Option<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub scoring_scale: ScoringScale,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Relative weight, typically 0-100. Missing weights count as zero.
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: SubcategoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Relative weight within the parent category.
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub scoring_criteria: Vec<ScoringCriterion>,
}

/// One selectable score option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringCriterion {
    pub score: u8,
    pub label: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringScale {
    pub min: u8,
    pub max: u8,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Default for ScoringScale {
    fn default() -> Self {
        Self {
            min: 1,
            max: 5,
            labels: ["Poor", "Fair", "Good", "Very Good", "Excellent"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

impl ScoringScale {
    pub fn contains(&self, score: u8) -> bool {
        (self.min..=self.max).contains(&score)
    }
}

impl Rubric {
    pub fn category(&self, category_id: &CategoryId) -> Option<&Category> {
        self.categories
            .iter()
            .find(|category| &category.id == category_id)
    }

    pub fn subcategory(
        &self,
        category_id: &CategoryId,
        subcategory_id: &SubcategoryId,
    ) -> Option<&Subcategory> {
        self.category(category_id)
            .and_then(|category| category.subcategory(subcategory_id))
    }

    /// Find a subcategory anywhere in the tree along with its owning category.
    pub fn locate(&self, subcategory_id: &SubcategoryId) -> Option<(&Category, &Subcategory)> {
        self.categories.iter().find_map(|category| {
            category
                .subcategory(subcategory_id)
                .map(|subcategory| (category, subcategory))
        })
    }

    pub fn total_subcategories(&self) -> usize {
        self.categories
            .iter()
            .map(|category| category.subcategories.len())
            .sum()
    }

    /// Structural problems worth surfacing to whoever authored the rubric. None of them stop the
    /// engine from scoring against it.
    pub fn validate(&self) -> Vec<RubricWarning> {
        let mut warnings = Vec::new();
        let mut categories = HashSet::new();
        let mut subcategories = HashSet::new();

        for category in &self.categories {
            if !categories.insert(&category.id) {
                warnings.push(RubricWarning::DuplicateCategory(category.id.clone()));
            }
            if category.weight < 0.0 {
                warnings.push(RubricWarning::NegativeCategoryWeight(category.id.clone()));
            }
            if category.subcategories.is_empty() {
                warnings.push(RubricWarning::EmptyCategory(category.id.clone()));
            }

            for subcategory in &category.subcategories {
                if !subcategories.insert(&subcategory.id) {
                    warnings.push(RubricWarning::DuplicateSubcategory(subcategory.id.clone()));
                }
                if subcategory.weight < 0.0 {
                    warnings.push(RubricWarning::NegativeSubcategoryWeight(
                        subcategory.id.clone(),
                    ));
                }
                if subcategory.scoring_criteria.is_empty() {
                    warnings.push(RubricWarning::NoCriteria(subcategory.id.clone()));
                }
                for criterion in &subcategory.scoring_criteria {
                    if !self.scoring_scale.contains(criterion.score) {
                        warnings.push(RubricWarning::CriterionOutsideScale {
                            subcategory_id: subcategory.id.clone(),
                            score: criterion.score,
                        });
                    }
                }
            }
        }

        warnings
    }
}

impl Category {
    pub fn subcategory(&self, subcategory_id: &SubcategoryId) -> Option<&Subcategory> {
        self.subcategories
            .iter()
            .find(|subcategory| &subcategory.id == subcategory_id)
    }
}

impl Subcategory {
    pub fn criterion(&self, score: u8) -> Option<&ScoringCriterion> {
        self.scoring_criteria
            .iter()
            .find(|criterion| criterion.score == score)
    }

    pub fn allowed_scores(&self) -> Vec<u8> {
        self.scoring_criteria
            .iter()
            .map(|criterion| criterion.score)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RubricWarning {
    DuplicateCategory(CategoryId),
    DuplicateSubcategory(SubcategoryId),
    EmptyCategory(CategoryId),
    NegativeCategoryWeight(CategoryId),
    NegativeSubcategoryWeight(SubcategoryId),
    NoCriteria(SubcategoryId),
    CriterionOutsideScale {
        subcategory_id: SubcategoryId,
        score: u8,
    },
}

impl fmt::Display for RubricWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RubricWarning::DuplicateCategory(id) => write!(f, "category '{id}' appears twice"),
            RubricWarning::DuplicateSubcategory(id) => {
                write!(f, "subcategory '{id}' appears twice")
            }
            RubricWarning::EmptyCategory(id) => write!(f, "category '{id}' has no subcategories"),
            RubricWarning::NegativeCategoryWeight(id) => {
                write!(f, "category '{id}' has a negative weight")
            }
            RubricWarning::NegativeSubcategoryWeight(id) => {
                write!(f, "subcategory '{id}' has a negative weight")
            }
            RubricWarning::NoCriteria(id) => {
                write!(f, "subcategory '{id}' defines no scoring criteria")
            }
            RubricWarning::CriterionOutsideScale {
                subcategory_id,
                score,
            } => write!(
                f,
                "subcategory '{subcategory_id}' offers score {score} outside the rubric scale"
            ),
        }
    }
}
