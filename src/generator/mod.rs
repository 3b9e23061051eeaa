//! Learning-objective generation.
//!
//! Epistemic foundation:
//! - B_i: The model honours the declared schema (might not) → empty result
//! - I^B: The transport may fail → error, surfaced to the caller

mod prompt;

pub use prompt::*;

use crate::client::StructuredModel;
use crate::models::{AhdafError, GeminiError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Number of objectives requested by default.
pub const DEFAULT_OBJECTIVE_COUNT: usize = 20;

/// Produces learning objectives for a resolved selection.
#[async_trait]
pub trait ObjectiveGenerator: Send + Sync {
    /// Generate objectives.
    ///
    /// `Ok(vec![])` means the model replied but produced nothing usable.
    /// `Err` means the model could not be reached.
    async fn generate(
        &self,
        grade_name: &str,
        final_competence: &str,
        knowledge_resource: &str,
        overall_competence: &str,
    ) -> Result<Vec<String>>;
}

#[derive(Debug, Deserialize)]
struct ObjectivesPayload {
    objectives: Option<Vec<String>>,
}

/// Parse a model reply into objectives.
///
/// Malformed or non-conforming text yields an empty list.
pub fn parse_objectives(text: &str) -> Vec<String> {
    match serde_json::from_str::<ObjectivesPayload>(text) {
        Ok(payload) => payload.objectives.unwrap_or_default(),
        Err(e) => {
            error!(error = %e, "Error parsing model response");
            Vec::new()
        }
    }
}

/// Objective generator backed by a structured-output model.
pub struct ModelObjectiveGenerator<M: ?Sized> {
    model: Arc<M>,
    objective_count: usize,
}

impl<M: StructuredModel + ?Sized> ModelObjectiveGenerator<M> {
    pub fn new(model: Arc<M>) -> Self {
        Self {
            model,
            objective_count: DEFAULT_OBJECTIVE_COUNT,
        }
    }

    /// Override the number of objectives requested (at least one).
    pub fn with_objective_count(mut self, count: usize) -> Self {
        self.objective_count = count.max(1);
        self
    }
}

#[async_trait]
impl<M: StructuredModel + ?Sized> ObjectiveGenerator for ModelObjectiveGenerator<M> {
    async fn generate(
        &self,
        grade_name: &str,
        final_competence: &str,
        knowledge_resource: &str,
        overall_competence: &str,
    ) -> Result<Vec<String>> {
        let ctx = PromptContext {
            grade_name,
            final_competence,
            knowledge_resource,
            overall_competence,
        };
        let prompt = build_prompt(&ctx, self.objective_count);
        let schema = objectives_schema(self.objective_count);

        let response = match self.model.complete_json(&prompt, &schema).await {
            Ok(response) => response,
            Err(AhdafError::Gemini(GeminiError::InvalidResponse(reason))) => {
                error!(reason = %reason, "Error parsing model response");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let objectives = parse_objectives(&response.content);
        if objectives.len() != self.objective_count {
            warn!(
                expected = self.objective_count,
                received = objectives.len(),
                "Objective count differs from request"
            );
        }
        debug!(
            model = %response.model,
            objectives = objectives.len(),
            tokens = response.total_tokens,
            "Generated objectives"
        );

        Ok(objectives)
    }
}
