use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::assessment::domain::{
    ApplicationId, Assessment, AssessmentId, AssessmentRequest, CategoryId, ConfidenceLevel,
    RubricId, ScoreInput, ScoreRecord, SubcategoryId,
};
use crate::workflows::assessment::repository::{
    AssessmentRepository, RepositoryError, RubricCatalog,
};
use crate::workflows::assessment::rubric::{Category, Rubric, ScoringCriterion, Subcategory};
use crate::workflows::assessment::{assessment_router, AssessmentService};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn later(minutes: i64) -> DateTime<Utc> {
    now() + chrono::Duration::minutes(minutes)
}

pub(super) fn five_point_criteria() -> Vec<ScoringCriterion> {
    (1..=5)
        .map(|score| ScoringCriterion {
            score,
            label: format!("Level {score}"),
            description: String::new(),
        })
        .collect()
}

pub(super) fn subcategory(id: &str, weight: f64) -> Subcategory {
    Subcategory {
        id: SubcategoryId(id.to_string()),
        name: id.to_uppercase(),
        description: String::new(),
        weight,
        scoring_criteria: five_point_criteria(),
    }
}

pub(super) fn category(id: &str, weight: f64, subcategories: Vec<Subcategory>) -> Category {
    Category {
        id: CategoryId(id.to_string()),
        name: id.to_uppercase(),
        description: String::new(),
        weight,
        subcategories,
    }
}

/// Two categories weighted 60/40, each with two equally weighted subcategories.
pub(super) fn split_rubric() -> Rubric {
    Rubric {
        id: RubricId("rubric-split".to_string()),
        name: "Split".to_string(),
        version: "1.0".to_string(),
        description: String::new(),
        industry_type: None,
        categories: vec![
            category(
                "cat-1",
                60.0,
                vec![subcategory("sub-1a", 50.0), subcategory("sub-1b", 50.0)],
            ),
            category(
                "cat-2",
                40.0,
                vec![subcategory("sub-2a", 50.0), subcategory("sub-2b", 50.0)],
            ),
        ],
        scoring_scale: Default::default(),
    }
}

pub(super) fn assessment_id() -> AssessmentId {
    AssessmentId("assessment-test".to_string())
}

pub(super) fn input(category_id: &str, subcategory_id: &str, score: u8) -> ScoreInput {
    ScoreInput {
        category_id: CategoryId(category_id.to_string()),
        subcategory_id: SubcategoryId(subcategory_id.to_string()),
        score,
        comment: None,
        confidence_level: None,
    }
}

pub(super) fn record(category_id: &str, subcategory_id: &str, score: u8) -> ScoreRecord {
    ScoreRecord {
        assessment_id: assessment_id(),
        category_id: CategoryId(category_id.to_string()),
        subcategory_id: SubcategoryId(subcategory_id.to_string()),
        score,
        comment: None,
        confidence_level: ConfidenceLevel::DEFAULT,
        created_at: now(),
        updated_at: now(),
    }
}

pub(super) fn draft_assessment() -> Assessment {
    Assessment::draft(
        assessment_id(),
        AssessmentRequest {
            application_id: ApplicationId("app-crm".to_string()),
            rubric_id: split_rubric().id,
            assessor_id: "assessor-1".to_string(),
        },
        now(),
    )
}

pub(super) fn request_for(rubric_id: &RubricId) -> AssessmentRequest {
    AssessmentRequest {
        application_id: ApplicationId("app-crm".to_string()),
        rubric_id: rubric_id.clone(),
        assessor_id: "assessor-1".to_string(),
    }
}

pub(super) fn build_service() -> (
    AssessmentService<MemoryRepository, MemoryCatalog>,
    Arc<MemoryRepository>,
    Arc<MemoryCatalog>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let catalog = Arc::new(MemoryCatalog::with(vec![split_rubric(), Rubric::standard()]));
    let service = AssessmentService::new(repository.clone(), catalog.clone());
    (service, repository, catalog)
}

/// Score every subcategory of the split rubric with the given values (1a, 1b, 2a, 2b).
pub(super) fn score_all(
    service: &AssessmentService<MemoryRepository, MemoryCatalog>,
    id: &AssessmentId,
    scores: [u8; 4],
) {
    let targets = [
        ("cat-1", "sub-1a"),
        ("cat-1", "sub-1b"),
        ("cat-2", "sub-2a"),
        ("cat-2", "sub-2b"),
    ];
    for ((category_id, subcategory_id), score) in targets.into_iter().zip(scores) {
        service
            .record_score(id, input(category_id, subcategory_id, score))
            .expect("score recorded");
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) assessments: Arc<Mutex<HashMap<AssessmentId, Assessment>>>,
    pub(super) scores: Arc<Mutex<HashMap<(AssessmentId, SubcategoryId), ScoreRecord>>>,
    /// When set, every assessment header write fails before anything is stored.
    pub(super) fail_header_writes: Arc<AtomicBool>,
}

impl AssessmentRepository for MemoryRepository {
    fn insert(&self, assessment: Assessment) -> Result<Assessment, RepositoryError> {
        let mut guard = self.assessments.lock().expect("repository mutex poisoned");
        if guard.contains_key(&assessment.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(assessment.id.clone(), assessment.clone());
        Ok(assessment)
    }

    fn update(&self, assessment: Assessment) -> Result<(), RepositoryError> {
        self.check_header_writes()?;
        let mut guard = self.assessments.lock().expect("repository mutex poisoned");
        guard.insert(assessment.id.clone(), assessment);
        Ok(())
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<Assessment>, RepositoryError> {
        let guard = self.assessments.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Assessment>, RepositoryError> {
        let guard = self.assessments.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn save_score(
        &self,
        record: ScoreRecord,
        assessment: Assessment,
    ) -> Result<(), RepositoryError> {
        self.check_header_writes()?;
        let mut assessments = self.assessments.lock().expect("repository mutex poisoned");
        if !assessments.contains_key(&assessment.id) {
            return Err(RepositoryError::NotFound);
        }
        let mut scores = self.scores.lock().expect("score mutex poisoned");
        scores.insert(
            (record.assessment_id.clone(), record.subcategory_id.clone()),
            record,
        );
        assessments.insert(assessment.id.clone(), assessment);
        Ok(())
    }

    fn scores(&self, id: &AssessmentId) -> Result<Vec<ScoreRecord>, RepositoryError> {
        let guard = self.scores.lock().expect("score mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| &record.assessment_id == id)
            .cloned()
            .collect())
    }
}

impl MemoryRepository {
    pub(super) fn score_count(&self) -> usize {
        self.scores.lock().expect("score mutex poisoned").len()
    }

    pub(super) fn reject_header_writes(&self) {
        self.fail_header_writes.store(true, Ordering::SeqCst);
    }

    fn check_header_writes(&self) -> Result<(), RepositoryError> {
        if self.fail_header_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("header write rejected".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct MemoryCatalog {
    rubrics: Mutex<HashMap<RubricId, Rubric>>,
}

impl MemoryCatalog {
    pub(super) fn with(rubrics: Vec<Rubric>) -> Self {
        let rubrics = rubrics
            .into_iter()
            .map(|rubric| (rubric.id.clone(), rubric))
            .collect();
        Self {
            rubrics: Mutex::new(rubrics),
        }
    }

    pub(super) fn remove(&self, id: &RubricId) {
        self.rubrics.lock().expect("catalog mutex poisoned").remove(id);
    }
}

impl RubricCatalog for MemoryCatalog {
    fn fetch(&self, id: &RubricId) -> Result<Option<Rubric>, RepositoryError> {
        let guard = self.rubrics.lock().expect("catalog mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

pub(super) struct UnavailableRepository;

impl AssessmentRepository for UnavailableRepository {
    fn insert(&self, _assessment: Assessment) -> Result<Assessment, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _assessment: Assessment) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &AssessmentId) -> Result<Option<Assessment>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Assessment>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn save_score(
        &self,
        _record: ScoreRecord,
        _assessment: Assessment,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn scores(&self, _id: &AssessmentId) -> Result<Vec<ScoreRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(
    service: AssessmentService<MemoryRepository, MemoryCatalog>,
) -> axum::Router {
    assessment_router(Arc::new(service))
}
