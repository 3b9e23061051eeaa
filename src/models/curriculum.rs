//! Curriculum tree types and the embedded dataset.
//!
//! K_i: The curriculum is read-only. It is parsed once and shared for the
//! whole process; nothing in the crate mutates it.

use crate::models::{AhdafError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

const EMBEDDED_CURRICULUM: &str = include_str!("../../data/curriculum.json");

/// Full curriculum document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Curriculum {
    /// Descriptive header (country, subject, stage)
    pub curriculum_info: CurriculumInfo,

    /// Grades in display order
    pub curriculum_data: Vec<Grade>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurriculumInfo {
    pub country: String,
    pub subject: String,
    pub stage: String,
    pub structure_logic: String,
}

/// One school-year level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grade {
    /// Ordinal (1 = first year)
    pub grade: u32,

    /// Display name
    pub grade_name: String,

    /// Overall competence statement for the year
    pub overall_competence: String,

    /// Competence fields in display order
    pub fields: Vec<Field>,
}

/// A thematic competence area within a grade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    /// Name, unique within its grade
    pub field_name: String,

    /// Final competence statement
    pub final_competence: String,

    /// Selectable knowledge resources
    pub knowledge_resources: Vec<String>,

    /// Evaluation grid (not used for generation)
    #[serde(default)]
    pub evaluation_criteria: Vec<EvaluationCriterion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationCriterion {
    pub criterion: String,
    pub indicators: Vec<String>,
}

impl Curriculum {
    /// The dataset compiled into the binary.
    pub fn embedded() -> &'static Curriculum {
        static CURRICULUM: OnceLock<Curriculum> = OnceLock::new();
        CURRICULUM.get_or_init(|| {
            // The embedded file is covered by tests; a failure here is a build defect.
            Self::from_json(EMBEDDED_CURRICULUM).expect("embedded curriculum is valid JSON")
        })
    }

    /// Parse a curriculum document from JSON text.
    pub fn from_json(content: &str) -> Result<Self> {
        let curriculum: Curriculum = serde_json::from_str(content)
            .map_err(|e| AhdafError::Curriculum(format!("Failed to parse curriculum: {e}")))?;
        debug!(grades = curriculum.curriculum_data.len(), "Loaded curriculum");
        Ok(curriculum)
    }

    /// Load a curriculum document from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AhdafError::io(format!("reading curriculum {}", path.display()), e))?;
        Self::from_json(&content)
    }

    /// Grades in display order.
    pub fn grades(&self) -> &[Grade] {
        &self.curriculum_data
    }

    /// Grade at `index`, if any.
    pub fn grade(&self, index: usize) -> Option<&Grade> {
        self.curriculum_data.get(index)
    }
}

impl Grade {
    /// Look up a field by exact name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.field_name == name)
    }
}
