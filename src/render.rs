//! Printable objectives card.

use crate::selection::Selection;
use std::fmt::Write;

/// Card title.
pub const DOCUMENT_TITLE: &str = "بطاقة الأهداف التعلمية - التربية البدنية والرياضية";

/// Signature line at the foot of the card.
pub const SIGNATURE_LINE: &str = "توقيع الأستاذ: ....................................";

/// Render the current objectives as a Markdown document.
///
/// Returns `None` when there is nothing to print.
pub fn render_document(selection: &Selection<'_>) -> Option<String> {
    let objectives = selection.objectives();
    if objectives.is_empty() {
        return None;
    }

    let grade = selection.current_grade().map(|g| g.grade_name.as_str());
    let final_competence = selection
        .current_field()
        .map(|f| f.final_competence.as_str());

    let mut doc = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(doc, "# {DOCUMENT_TITLE}\n");
    let _ = writeln!(doc, "**المستوى:** {}  ", grade.unwrap_or_default());
    let _ = writeln!(doc, "**الميدان:** {}  ", selection.state().field_name);
    let _ = writeln!(doc, "**المورد المعرفي:** {}  ", selection.state().resource);
    let _ = writeln!(doc, "**الكفاءة الختامية:** {}\n", final_competence.unwrap_or_default());
    let _ = writeln!(doc, "---\n");

    for (index, objective) in objectives.iter().enumerate() {
        let _ = writeln!(doc, "{}. {objective}", index + 1);
    }

    let _ = writeln!(doc, "\n{SIGNATURE_LINE}");
    Some(doc)
}
