//! Selection state and its transition function.
//!
//! K_i: Upstream changes always invalidate everything below them.
//! The reducer is the only place that enforces this, so every mutation
//! goes through [`reduce`].

/// One user action on the cascading selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionAction {
    /// Choose a grade by index, or clear it with `None`
    SetGrade(Option<usize>),
    /// Choose a field by name (empty = unset)
    SetField(String),
    /// Choose a knowledge resource (empty = unset)
    SetResource(String),
    /// Replace the generated objectives
    SetObjectives(Vec<String>),
}

/// Session-owned selection snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    /// Index into the curriculum grade list
    pub grade_index: Option<usize>,
    /// Selected field name, empty when unset
    pub field_name: String,
    /// Selected knowledge resource, empty when unset
    pub resource: String,
    /// Objectives from the last successful generation
    pub objectives: Vec<String>,
}

/// Apply `action` to `state`.
///
/// `grade_count` bounds grade indices; an out-of-range index selects no grade.
pub fn reduce(state: SelectionState, action: SelectionAction, grade_count: usize) -> SelectionState {
    match action {
        SelectionAction::SetGrade(index) => SelectionState {
            grade_index: index.filter(|&i| i < grade_count),
            ..SelectionState::default()
        },
        SelectionAction::SetField(field_name) => SelectionState {
            grade_index: state.grade_index,
            field_name,
            ..SelectionState::default()
        },
        SelectionAction::SetResource(resource) => SelectionState { resource, ..state },
        SelectionAction::SetObjectives(objectives) => SelectionState { objectives, ..state },
    }
}
