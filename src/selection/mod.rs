//! Cascading grade → field → resource selection.

mod state;

pub use state::*;

use crate::models::{Curriculum, Field, Grade};

/// Fully resolved selection, ready for generation.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedSelection<'c> {
    pub grade: &'c Grade,
    pub field: &'c Field,
    pub resource: &'c str,
}

/// Selection over a borrowed curriculum.
///
/// All operations are synchronous and total.
#[derive(Debug, Clone)]
pub struct Selection<'c> {
    curriculum: &'c Curriculum,
    state: SelectionState,
}

impl<'c> Selection<'c> {
    /// Create an empty selection.
    pub fn new(curriculum: &'c Curriculum) -> Self {
        Self {
            curriculum,
            state: SelectionState::default(),
        }
    }

    /// The curriculum being selected from.
    pub fn curriculum(&self) -> &'c Curriculum {
        self.curriculum
    }

    /// Current state snapshot.
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Apply one action through the reducer.
    pub fn dispatch(&mut self, action: SelectionAction) {
        let grade_count = self.curriculum.grades().len();
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action, grade_count);
    }

    pub fn set_grade(&mut self, index: Option<usize>) {
        self.dispatch(SelectionAction::SetGrade(index));
    }

    pub fn set_field(&mut self, name: impl Into<String>) {
        self.dispatch(SelectionAction::SetField(name.into()));
    }

    pub fn set_resource(&mut self, value: impl Into<String>) {
        self.dispatch(SelectionAction::SetResource(value.into()));
    }

    pub fn set_objectives(&mut self, objectives: Vec<String>) {
        self.dispatch(SelectionAction::SetObjectives(objectives));
    }

    pub fn objectives(&self) -> &[String] {
        &self.state.objectives
    }

    /// Selected resource, or `None` when unset.
    pub fn resource(&self) -> Option<&str> {
        Some(self.state.resource.as_str()).filter(|r| !r.is_empty())
    }

    pub fn current_grade(&self) -> Option<&'c Grade> {
        self.state
            .grade_index
            .and_then(|index| self.curriculum.grade(index))
    }

    /// Field matching the selected name under the selected grade.
    pub fn current_field(&self) -> Option<&'c Field> {
        self.current_grade()?.field(&self.state.field_name)
    }

    /// Grade, field and resource when all three are set.
    pub fn resolved(&self) -> Option<ResolvedSelection<'_>> {
        Some(ResolvedSelection {
            grade: self.current_grade()?,
            field: self.current_field()?,
            resource: self.resource()?,
        })
    }

    /// Options for the grade selector.
    pub fn grade_options(&self) -> Vec<&'c str> {
        self.curriculum
            .grades()
            .iter()
            .map(|g| g.grade_name.as_str())
            .collect()
    }

    /// Options for the field selector; empty until a grade is chosen.
    pub fn field_options(&self) -> Vec<&'c str> {
        self.current_grade()
            .map(|g| g.fields.iter().map(|f| f.field_name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Options for the resource selector; empty until a field resolves.
    pub fn resource_options(&self) -> Vec<&'c str> {
        self.current_field()
            .map(|f| f.knowledge_resources.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{self, TEST_FIELD, TEST_RESOURCE};
    use super::*;

    #[test]
    fn test_current_field_none_without_grade() {
        let curriculum = fixtures::curriculum();
        let mut selection = Selection::new(&curriculum);
        selection.set_field(TEST_FIELD);
        assert!(selection.current_grade().is_none());
        assert!(selection.current_field().is_none());
    }

    #[test]
    fn test_current_field_none_on_unknown_name() {
        let curriculum = fixtures::curriculum();
        let mut selection = Selection::new(&curriculum);
        selection.set_grade(Some(0));
        selection.set_field("ميدان غير موجود");
        assert!(selection.current_grade().is_some());
        assert!(selection.current_field().is_none());
        assert!(selection.resource_options().is_empty());
    }

    #[test]
    fn test_field_from_other_grade_does_not_resolve() {
        let curriculum = fixtures::curriculum();
        let mut selection = Selection::new(&curriculum);
        selection.set_grade(Some(1));
        selection.set_field(TEST_FIELD);
        assert!(selection.current_field().is_none());
    }

    #[test]
    fn test_resolved_requires_all_three() {
        let curriculum = fixtures::curriculum();
        let mut selection = Selection::new(&curriculum);
        assert!(selection.resolved().is_none());

        selection.set_grade(Some(0));
        assert!(selection.resolved().is_none());

        selection.set_field(TEST_FIELD);
        assert!(selection.resolved().is_none());

        selection.set_resource(TEST_RESOURCE);
        let resolved = selection.resolved().unwrap();
        assert_eq!(resolved.grade.grade_name, "السنة الأولى");
        assert_eq!(resolved.field.field_name, TEST_FIELD);
        assert_eq!(resolved.resource, TEST_RESOURCE);

        selection.set_resource("");
        assert!(selection.resolved().is_none());
    }

    #[test]
    fn test_options_cascade() {
        let curriculum = fixtures::curriculum();
        let mut selection = Selection::new(&curriculum);
        assert_eq!(selection.grade_options(), vec!["السنة الأولى", "السنة الثانية"]);
        assert!(selection.field_options().is_empty());

        selection.set_grade(Some(0));
        assert_eq!(selection.field_options(), vec![TEST_FIELD, "ميدان آخر"]);
        assert!(selection.resource_options().is_empty());

        selection.set_field(TEST_FIELD);
        assert_eq!(selection.resource_options(), vec![TEST_RESOURCE, "مورد ثان"]);
    }

    #[test]
    fn test_grade_change_clears_objectives() {
        let curriculum = fixtures::curriculum();
        let mut selection = Selection::new(&curriculum);
        selection.set_grade(Some(0));
        selection.set_field(TEST_FIELD);
        selection.set_resource(TEST_RESOURCE);
        selection.set_objectives(vec!["هدف".to_string()]);

        selection.set_resource("مورد ثان");
        assert_eq!(selection.objectives().len(), 1);

        selection.set_grade(Some(0));
        assert!(selection.objectives().is_empty());
        assert!(selection.resource().is_none());
    }

    #[test]
    fn test_out_of_range_grade_clears_selection() {
        let curriculum = fixtures::curriculum();
        let mut selection = Selection::new(&curriculum);
        selection.set_grade(Some(0));
        selection.set_grade(Some(99));
        assert!(selection.current_grade().is_none());
        assert_eq!(selection.state().grade_index, None);
    }
}
