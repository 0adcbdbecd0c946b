//! Prompt composer — constant instruction block plus a per-question tail.

use std::collections::BTreeSet;

use serde_json::{Value, json};

use crate::access::{Department, Role, join_departments};

#[cfg(test)]
#[path = "prompt_test.rs"]
mod tests;

/// Instructions sent as the system prompt on every upstream call.
pub const SYSTEM_PROMPT: &str = r#"Identity: You are DRA, the organization's digital-twin assistant.

Scope: Answer only about the iHeart project using the uploaded packs (Legal/Title/Approvals). If a question is outside iHeart, reply with a single sentence: "Out of scope for iHeart (v0.1)." Do not use the JSON format for out-of-scope replies.

Packs & labels (use in citations): Approvals, Title, Parent_A, Parent_B, Parent_C.

Roles: The user will provide a role tag (e.g., role: board). Respect it. If not present, assume employee. Never reveal restricted data to a customer.

Evidence-first: Use only the provided context. Do not invent doc numbers/dates. If a claim cannot be supported by a specific page, say "not shown".

Amendments: Prefer the newest document; if something is superseded, note "(superseded)" and cite both pages.

Output style:
You MUST output a valid JSON object that conforms to the provided schema.
The output should be structured as follows:
1. A short, one-line restatement of the ask in the 'question' field.
2. A narrative result in structured bullets in the 'answer_short' field; keep under ~250 words. Use inline tags like [Title p.3], [Approvals p.2], [Parent_C p.12].
3. Quoted evidence (<=40 words each) in the 'citations' array. Each citation must have a pack, page, and quote.
4. Extracted fields based on the document.
5. Any additional notes in the 'notes' field.

Rules that override everything:
1. Never answer internal facts without page-level citation.
2. If nothing is found, set status='NOT_FOUND', provide no facts, leave 'citations' empty, and suggest which pack to upload in the 'notes' field.
3. Keep quotes verbatim and <=40 words.
"#;

/// Upper bound on words in a single citation quote.
pub const MAX_QUOTE_WORDS: usize = 40;

/// Per-question user prompt: role tag, department filter, context, question.
#[must_use]
pub fn compose_prompt(role: Role, departments: &BTreeSet<Department>, context: &str, question: &str) -> String {
    format!(
        "Role: {role}\nContext from project files (filtered by {depts} departments):\n{context}\n\nUser Question: {question}\n",
        role = role.as_str().to_lowercase(),
        depts = join_departments(departments),
    )
}

/// Output schema for a structured answer, in OpenAPI style (lower-case
/// types, `nullable` for optional fields). Provider adapters convert it.
#[must_use]
pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "project": { "type": "string" },
            "question": { "type": "string" },
            "status": { "type": "string", "enum": ["OK", "NOT_FOUND", "AMBIGUOUS"] },
            "answer_short": { "type": "string" },
            "citations": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "pack": { "type": "string" },
                        "file": { "type": "string", "nullable": true },
                        "page": { "type": "integer" },
                        "quote": { "type": "string" }
                    },
                    "required": ["pack", "page", "quote"]
                }
            },
            "extracted_fields": {
                "type": "object",
                "properties": {
                    "doc_type": { "type": "string" },
                    "doc_number": { "type": "string", "nullable": true },
                    "doc_date": { "type": "string", "nullable": true },
                    "issuing_authority": { "type": "string", "nullable": true },
                    "survey_or_extent": { "type": "string", "nullable": true }
                },
                "required": ["doc_type"]
            },
            "notes": { "type": "string" }
        },
        "required": ["project", "question", "status", "answer_short", "citations", "extracted_fields", "notes"]
    })
}
