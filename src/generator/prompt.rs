//! Prompt and response schema for objective generation.

use serde_json::{Value, json};

/// Vague verbs the model must not use.
pub const FORBIDDEN_VERBS: [&str; 3] = ["يفهم", "يعرف", "يدرك"];

/// Concrete motor action verbs the model should draw from.
pub const ACTION_VERBS: [&str; 7] = ["يؤدي", "ينجز", "يرمي", "يربط", "يحافظ", "يقفز", "ينسق"];

/// Context embedded verbatim in the prompt.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub grade_name: &'a str,
    pub final_competence: &'a str,
    pub knowledge_resource: &'a str,
    pub overall_competence: &'a str,
}

/// Build the generation prompt.
pub fn build_prompt(ctx: &PromptContext<'_>, count: usize) -> String {
    let forbidden = FORBIDDEN_VERBS.join("، ");
    let actions = ACTION_VERBS.join("، ");

    format!(
        r#"أنت خبير في المناهج التربوية الجزائرية (2023) لمادة التربية البدنية والرياضية للطور الابتدائي.
بناءً على المعطيات التالية:
- المستوى: {grade}
- الكفاءة الختامية: {final_competence}
- المورد المعرفي: {resource}
- الكفاءة الشاملة للمستوى: {overall_competence}

المطلوب: توليد {count} هدفاً تعلمياً تتبع قاعدة (SMART) وتصاغ وفق الهيكل التالي بالضبط:
(أن + فعل إجرائي قابل للقياس + المتعلم + المورد + معيار الأداء أو شرطه).

شروط هامة:
1. تجنب الأفعال الغامضة مثل ({forbidden}).
2. استخدم أفعال حركية إجرائية مثل ({actions}).
3. يجب أن تكون الأهداف ملائمة جداً للمستوى العمري والبدني لتلاميذ {grade}.
4. يجب أن تغطي الأهداف جوانب تقنية، تنظيمية، وأخلاقية مرتبطة بالمورد.
5. الالتزام بصيغة: أن + فعل + المتعلم + المورد + المعيار."#,
        grade = ctx.grade_name,
        final_competence = ctx.final_competence,
        resource = ctx.knowledge_resource,
        overall_competence = ctx.overall_competence,
    )
}

/// Output contract: an object with one required string array, `objectives`.
pub fn objectives_schema(count: usize) -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "objectives": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": format!("قائمة تضم {count} هدفاً تعلمياً")
            }
        },
        "required": ["objectives"]
    })
}
