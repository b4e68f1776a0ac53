use metrics_exporter_prometheus::PrometheusHandle;
use rubric_assess::error::AppError;
use rubric_assess::workflows::assessment::{
    Assessment, AssessmentId, AssessmentRepository, RepositoryError, Rubric, RubricCatalog,
    RubricId, ScoreRecord, SubcategoryId,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAssessmentRepository {
    assessments: Arc<Mutex<HashMap<AssessmentId, Assessment>>>,
    scores: Arc<Mutex<HashMap<(AssessmentId, SubcategoryId), ScoreRecord>>>,
}

impl AssessmentRepository for InMemoryAssessmentRepository {
    fn insert(&self, assessment: Assessment) -> Result<Assessment, RepositoryError> {
        let mut guard = self.assessments.lock().expect("repository mutex poisoned");
        if guard.contains_key(&assessment.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(assessment.id.clone(), assessment.clone());
        Ok(assessment)
    }

    fn update(&self, assessment: Assessment) -> Result<(), RepositoryError> {
        let mut guard = self.assessments.lock().expect("repository mutex poisoned");
        if guard.contains_key(&assessment.id) {
            guard.insert(assessment.id.clone(), assessment);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<Assessment>, RepositoryError> {
        let guard = self.assessments.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Assessment>, RepositoryError> {
        let guard = self.assessments.lock().expect("repository mutex poisoned");
        let mut assessments: Vec<_> = guard.values().cloned().collect();
        assessments.sort_by(|left, right| left.id.cmp(&right.id));
        Ok(assessments)
    }

    fn save_score(
        &self,
        record: ScoreRecord,
        assessment: Assessment,
    ) -> Result<(), RepositoryError> {
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

#[derive(Default, Clone)]
pub(crate) struct InMemoryRubricCatalog {
    rubrics: Arc<Mutex<HashMap<RubricId, Rubric>>>,
}

impl InMemoryRubricCatalog {
    pub(crate) fn with_rubric(rubric: Rubric) -> Self {
        let catalog = Self::default();
        catalog.register(rubric);
        catalog
    }

    pub(crate) fn register(&self, rubric: Rubric) {
        let mut guard = self.rubrics.lock().expect("catalog mutex poisoned");
        guard.insert(rubric.id.clone(), rubric);
    }
}

impl RubricCatalog for InMemoryRubricCatalog {
    fn fetch(&self, id: &RubricId) -> Result<Option<Rubric>, RepositoryError> {
        let guard = self.rubrics.lock().expect("catalog mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

/// Load the rubric at `path`, falling back to the built-in standard rubric.
pub(crate) fn load_rubric(path: Option<&Path>) -> Result<Rubric, AppError> {
    match path {
        Some(path) => {
            let rubric = Rubric::from_path(path)?;
            info!(rubric_id = %rubric.id, path = %path.display(), "rubric loaded");
            Ok(rubric)
        }
        None => Ok(Rubric::standard()),
    }
}
