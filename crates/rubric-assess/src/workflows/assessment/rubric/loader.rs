use std::io::Read;
use std::path::Path;

use tracing::warn;

use super::Rubric;

#[derive(Debug, thiserror::Error)]
pub enum RubricLoadError {
    #[error("failed to read rubric definition: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid rubric definition: {0}")]
    Json(#[from] serde_json::Error),
}

impl Rubric {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RubricLoadError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse a JSON rubric. Structural warnings are logged, not rejected.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RubricLoadError> {
        let rubric: Rubric = serde_json::from_reader(reader)?;
        for warning in rubric.validate() {
            warn!(rubric_id = %rubric.id, %warning, "rubric definition warning");
        }
        Ok(rubric)
    }
}
