//! Session controller driving selection and generation.
//!
//! Epistemic foundation:
//! - K_i: Only one generation runs at a time (`&mut self` across the await)
//! - B_i: Generation may fail → one localized message, detail only in logs

use crate::generator::ObjectiveGenerator;
use crate::models::{Curriculum, Field, Grade};
use crate::selection::{ResolvedSelection, Selection};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info};

/// Message shown when the model service cannot be reached.
pub const GENERATION_ERROR_MESSAGE: &str =
    "حدث خطأ أثناء الاتصال بالذكاء الاصطناعي. يرجى المحاولة لاحقاً.";

/// Outcome of a generate action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// Selection incomplete or already busy; nothing was sent
    Skipped,
    /// The model replied; carries the number of objectives produced
    Completed(usize),
    /// The model could not be reached; the error message is set
    Failed,
}

/// Competence statements shown before objectives exist.
#[derive(Debug, Clone, Copy)]
pub struct CompetenceContext<'c> {
    pub overall_competence: &'c str,
    pub final_competence: Option<&'c str>,
}

/// One user's session over the curriculum.
pub struct Session<'c> {
    selection: Selection<'c>,
    generator: Arc<dyn ObjectiveGenerator>,
    busy: Arc<AtomicBool>,
    error: Option<String>,
}

impl<'c> Session<'c> {
    pub fn new(curriculum: &'c Curriculum, generator: Arc<dyn ObjectiveGenerator>) -> Self {
        Self {
            selection: Selection::new(curriculum),
            generator,
            busy: Arc::new(AtomicBool::new(false)),
            error: None,
        }
    }

    pub fn selection(&self) -> &Selection<'c> {
        &self.selection
    }

    pub fn set_grade(&mut self, index: Option<usize>) {
        self.selection.set_grade(index);
    }

    pub fn set_field(&mut self, name: impl Into<String>) {
        self.selection.set_field(name);
    }

    pub fn set_resource(&mut self, value: impl Into<String>) {
        self.selection.set_resource(value);
    }

    pub fn current_grade(&self) -> Option<&'c Grade> {
        self.selection.current_grade()
    }

    pub fn current_field(&self) -> Option<&'c Field> {
        self.selection.current_field()
    }

    pub fn objectives(&self) -> &[String] {
        self.selection.objectives()
    }

    /// Localized error from the last generation, if it failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Shared handle to the busy flag, readable while a generation is in flight.
    pub fn busy_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.busy)
    }

    /// Whether the generate action is enabled.
    pub fn can_generate(&self) -> bool {
        self.selection.resolved().is_some() && !self.is_busy()
    }

    /// Competence panel for the current grade, hidden once objectives exist.
    pub fn context(&self) -> Option<CompetenceContext<'c>> {
        if !self.objectives().is_empty() || self.is_busy() {
            return None;
        }
        let grade = self.current_grade()?;
        Some(CompetenceContext {
            overall_competence: &grade.overall_competence,
            final_competence: self.current_field().map(|f| f.final_competence.as_str()),
        })
    }

    /// Run the generate action.
    pub async fn generate(&mut self) -> GenerateOutcome {
        if self.is_busy() {
            return GenerateOutcome::Skipped;
        }
        let Some(ResolvedSelection {
            grade,
            field,
            resource,
        }) = self.selection.resolved()
        else {
            return GenerateOutcome::Skipped;
        };
        let resource = resource.to_string();

        self.busy.store(true, Ordering::SeqCst);
        self.error = None;

        info!(grade = %grade.grade_name, field = %field.field_name, resource = %resource, "Generating objectives");

        let result = self
            .generator
            .generate(
                &grade.grade_name,
                &field.final_competence,
                &resource,
                &grade.overall_competence,
            )
            .await;

        let outcome = match result {
            Ok(objectives) => {
                let count = objectives.len();
                self.selection.set_objectives(objectives);
                GenerateOutcome::Completed(count)
            }
            Err(e) => {
                error!(error = %e, "Objective generation failed");
                self.error = Some(GENERATION_ERROR_MESSAGE.to_string());
                GenerateOutcome::Failed
            }
        };

        self.busy.store(false, Ordering::SeqCst);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeminiError, Result};
    use crate::selection::fixtures::{self, TEST_FIELD, TEST_RESOURCE};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    /// Generator fake that records the busy flag at call time.
    struct FakeGenerator {
        reply: Mutex<Option<Result<Vec<String>>>>,
        busy: Mutex<Option<Arc<AtomicBool>>>,
        busy_during_call: Mutex<Vec<bool>>,
        calls: AtomicUsize,
        inputs: Mutex<Vec<[String; 4]>>,
    }

    impl FakeGenerator {
        fn replying(reply: Result<Vec<String>>) -> Arc<Self> {
            Arc::new(Self {
                reply: Mutex::new(Some(reply)),
                busy: Mutex::new(None),
                busy_during_call: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
                inputs: Mutex::new(Vec::new()),
            })
        }

        fn watch(&self, busy: Arc<AtomicBool>) {
            *self.busy.lock().unwrap() = Some(busy);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ObjectiveGenerator for FakeGenerator {
        async fn generate(
            &self,
            grade_name: &str,
            final_competence: &str,
            knowledge_resource: &str,
            overall_competence: &str,
        ) -> Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inputs.lock().unwrap().push([
                grade_name.to_string(),
                final_competence.to_string(),
                knowledge_resource.to_string(),
                overall_competence.to_string(),
            ]);
            if let Some(busy) = self.busy.lock().unwrap().as_ref() {
                self.busy_during_call
                    .lock()
                    .unwrap()
                    .push(busy.load(Ordering::SeqCst));
            }
            tokio::task::yield_now().await;
            self.reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn objectives(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("أن ينجز المتعلم المهمة {i}")).collect()
    }

    #[tokio::test]
    async fn test_end_to_end_generation() {
        let curriculum = fixtures::curriculum();
        let fake = FakeGenerator::replying(Ok(objectives(17)));
        let mut session = Session::new(&curriculum, fake.clone());
        fake.watch(session.busy_flag());

        session.set_grade(Some(0));
        session.set_field(TEST_FIELD);
        session.set_resource(TEST_RESOURCE);
        assert!(session.can_generate());

        let outcome = session.generate().await;

        assert_eq!(outcome, GenerateOutcome::Completed(17));
        assert_eq!(*fake.busy_during_call.lock().unwrap(), vec![true]);
        assert!(!session.is_busy());
        assert_eq!(session.objectives().len(), 17);
        assert!(session.error().is_none());

        let inputs = fake.inputs.lock().unwrap();
        assert_eq!(
            inputs[0],
            [
                "السنة الأولى".to_string(),
                "كفاءة ختامية اختبارية".to_string(),
                TEST_RESOURCE.to_string(),
                "كفاءة شاملة أولى".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_generate_is_noop_until_fully_selected() {
        let curriculum = fixtures::curriculum();
        let fake = FakeGenerator::replying(Ok(objectives(20)));
        let mut session = Session::new(&curriculum, fake.clone());

        assert_eq!(session.generate().await, GenerateOutcome::Skipped);

        session.set_grade(Some(0));
        assert_eq!(session.generate().await, GenerateOutcome::Skipped);

        session.set_field(TEST_FIELD);
        assert!(!session.can_generate());
        assert_eq!(session.generate().await, GenerateOutcome::Skipped);

        session.set_field("ميدان غير موجود");
        session.set_resource(TEST_RESOURCE);
        assert_eq!(session.generate().await, GenerateOutcome::Skipped);

        assert_eq!(fake.calls(), 0);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_generate_skipped_while_busy() {
        let curriculum = fixtures::curriculum();
        let fake = FakeGenerator::replying(Ok(objectives(20)));
        let mut session = Session::new(&curriculum, fake.clone());

        session.set_grade(Some(0));
        session.set_field(TEST_FIELD);
        session.set_resource(TEST_RESOURCE);
        assert!(session.can_generate());

        let busy = session.busy_flag();
        busy.store(true, Ordering::SeqCst);

        assert!(!session.can_generate());
        assert_eq!(session.generate().await, GenerateOutcome::Skipped);
        assert_eq!(fake.calls(), 0);
        assert!(busy.load(Ordering::SeqCst));
        assert!(session.is_busy());
        assert!(session.objectives().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_sets_localized_error() {
        let curriculum = fixtures::curriculum();
        let fake = FakeGenerator::replying(Err(GeminiError::QuotaExhausted {
            message: "secret internal detail".to_string(),
        }
        .into()));
        let mut session = Session::new(&curriculum, fake.clone());
        fake.watch(session.busy_flag());

        session.set_grade(Some(0));
        session.set_field(TEST_FIELD);
        session.set_resource(TEST_RESOURCE);

        assert_eq!(session.generate().await, GenerateOutcome::Failed);
        assert_eq!(session.error(), Some(GENERATION_ERROR_MESSAGE));
        assert!(!session.error().unwrap().contains("secret"));
        assert!(!session.is_busy());
        assert!(session.objectives().is_empty());
        assert_eq!(*fake.busy_during_call.lock().unwrap(), vec![true]);
    }

    #[tokio::test]
    async fn test_empty_result_is_not_an_error() {
        let curriculum = fixtures::curriculum();
        let fake = FakeGenerator::replying(Ok(Vec::new()));
        let mut session = Session::new(&curriculum, fake);

        session.set_grade(Some(0));
        session.set_field(TEST_FIELD);
        session.set_resource(TEST_RESOURCE);

        assert_eq!(session.generate().await, GenerateOutcome::Completed(0));
        assert!(session.error().is_none());
        assert!(session.objectives().is_empty());
    }

    #[tokio::test]
    async fn test_new_generation_clears_previous_error() {
        let curriculum = fixtures::curriculum();
        let fake = FakeGenerator::replying(Err(GeminiError::AuthenticationFailed.into()));
        let mut session = Session::new(&curriculum, fake.clone());

        session.set_grade(Some(0));
        session.set_field(TEST_FIELD);
        session.set_resource(TEST_RESOURCE);
        session.generate().await;
        assert!(session.error().is_some());

        *fake.reply.lock().unwrap() = Some(Ok(objectives(20)));
        assert_eq!(session.generate().await, GenerateOutcome::Completed(20));
        assert!(session.error().is_none());
        assert_eq!(fake.calls(), 2);
    }

    #[tokio::test]
    async fn test_selection_changes_after_generation() {
        let curriculum = fixtures::curriculum();
        let fake = FakeGenerator::replying(Ok(objectives(20)));
        let mut session = Session::new(&curriculum, fake);

        session.set_grade(Some(0));
        session.set_field(TEST_FIELD);
        session.set_resource(TEST_RESOURCE);
        session.generate().await;
        assert_eq!(session.objectives().len(), 20);
        assert!(session.context().is_none());

        session.set_resource("مورد ثان");
        assert_eq!(session.objectives().len(), 20);

        session.set_field("ميدان آخر");
        assert!(session.objectives().is_empty());
        assert_eq!(session.selection().state().grade_index, Some(0));
    }

    #[test]
    fn test_context_panel() {
        let curriculum = fixtures::curriculum();
        let mut session = Session::new(&curriculum, FakeGenerator::replying(Ok(Vec::new())));
        assert!(session.context().is_none());

        session.set_grade(Some(0));
        let ctx = session.context().unwrap();
        assert_eq!(ctx.overall_competence, "كفاءة شاملة أولى");
        assert!(ctx.final_competence.is_none());

        session.set_field(TEST_FIELD);
        let ctx = session.context().unwrap();
        assert_eq!(ctx.final_competence, Some("كفاءة ختامية اختبارية"));
    }
}
