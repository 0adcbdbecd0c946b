//! Answer service — question → guarded retrieval → LLM → typed answer.
//!
//! DESIGN
//! ======
//! Two input guards short-circuit before any upstream call: an empty
//! department selection and a question that does not name the project. Past
//! the guards, context from the `Retriever` and the fixed instruction block go
//! to the LLM with a JSON output schema. A reply that does not parse (or breaks
//! the record contract) degrades to a fixed advisory string; transport and
//! retrieval failures surface as `ServiceError`.

use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};

use tracing::{info, warn};

use crate::access::{Department, Project, Role, visible_departments};
use crate::answer::{Answer, AnswerRecord};
use crate::llm::LlmChat;
use crate::llm::types::{ChatRequest, LlmError, Message};
use crate::prompt::{SYSTEM_PROMPT, compose_prompt, response_schema};
use crate::retrieval::{RetrievalError, Retriever};

pub const SELECT_DEPARTMENT_MESSAGE: &str = "Please select at least one department to search for information.";
pub const MALFORMED_RESPONSE_MESSAGE: &str =
    "An error occurred while processing the response. It might be out of scope or malformed.";

/// Sampling temperature biased toward deterministic answers.
pub const ANSWER_TEMPERATURE: f32 = 0.2;

/// Gemini 2.5 counts thinking tokens against the output cap; this leaves room
/// for a reasoning pass plus the full record.
const DEFAULT_ANSWER_MAX_TOKENS: u32 = 16_384;

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn answer_max_tokens() -> u32 {
    static VALUE: OnceLock<u32> = OnceLock::new();
    *VALUE.get_or_init(|| env_parse("DRA_MAX_TOKENS", DEFAULT_ANSWER_MAX_TOKENS))
}

/// Fixed refusal for questions outside `project`.
#[must_use]
pub fn out_of_scope_message(project: Project) -> String {
    format!("Out of scope for {project} (v0.1).")
}

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error("retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),
}

impl crate::error::ErrorCode for ServiceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Llm(_) => "E_LLM_ERROR",
            Self::Retrieval(_) => "E_RETRIEVAL_ERROR",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Llm(e) => e.retryable(),
            Self::Retrieval(e) => e.retryable(),
        }
    }
}

pub struct AnswerService {
    llm: Arc<dyn LlmChat>,
    retriever: Arc<dyn Retriever>,
    project: Project,
    max_tokens: u32,
}

impl AnswerService {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmChat>, retriever: Arc<dyn Retriever>) -> Self {
        Self { llm, retriever, project: Project::default(), max_tokens: answer_max_tokens() }
    }

    #[must_use]
    pub fn with_project(mut self, project: Project) -> Self {
        self.project = project;
        self
    }

    #[must_use]
    pub fn project(&self) -> Project {
        self.project
    }

    // =========================================================================
    // MAIN ENTRY POINT
    // =========================================================================

    /// Answer `question` for `role`, searching only those `departments` the
    /// role can see.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] if retrieval or the upstream call fails.
    pub async fn get_answer(
        &self,
        question: &str,
        role: Role,
        departments: &BTreeSet<Department>,
    ) -> Result<Answer, ServiceError> {
        let departments: BTreeSet<Department> =
            departments.intersection(&visible_departments(role)).copied().collect();
        if departments.is_empty() {
            info!(%role, "answer: no visible departments selected");
            return Ok(Answer::Text(SELECT_DEPARTMENT_MESSAGE.to_string()));
        }
        if !self.project.is_mentioned_in(question) {
            info!(%role, project = %self.project, "answer: question out of scope");
            return Ok(Answer::Text(out_of_scope_message(self.project)));
        }

        info!(%role, departments = departments.len(), question_len = question.len(), "answer: question received");

        let context = self
            .retriever
            .retrieve(question, role, &departments)
            .await?;
        let prompt = compose_prompt(role, &departments, &context, question);
        let schema = response_schema();
        let messages = [Message::user(prompt)];
        let request = ChatRequest {
            system: SYSTEM_PROMPT,
            messages: &messages,
            max_tokens: self.max_tokens,
            temperature: Some(ANSWER_TEMPERATURE),
            response_schema: Some(&schema),
        };

        let response = self.llm.chat(&request).await?;
        info!(
            model = %response.model,
            stop_reason = %response.stop_reason,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "answer: llm replied"
        );

        Ok(interpret_reply(&response.text))
    }
}

// =============================================================================
// REPLY HANDLING
// =============================================================================

/// Turn raw model text into an [`Answer`]. Never fails: anything that is not a
/// contract-abiding record becomes [`MALFORMED_RESPONSE_MESSAGE`].
pub(crate) fn interpret_reply(text: &str) -> Answer {
    let body = strip_code_fence(text.trim());
    let record: AnswerRecord = match serde_json::from_str(body) {
        Ok(record) => record,
        Err(e) => {
            warn!(error = %e, reply_len = text.len(), "answer: reply is not a valid record");
            return Answer::Text(MALFORMED_RESPONSE_MESSAGE.to_string());
        }
    };
    if let Err(violation) = record.validate() {
        warn!(%violation, "answer: reply breaks record contract");
        return Answer::Text(MALFORMED_RESPONSE_MESSAGE.to_string());
    }
    for citation in record.overlong_quotes() {
        warn!(pack = %citation.pack, page = citation.page, words = citation.quote_words(), "answer: quote over word limit");
    }
    info!(status = record.status.as_str(), citations = record.citations.len(), "answer: structured reply");
    Answer::Structured(record)
}

/// Drop a surrounding Markdown code fence (```json ... ```), if any.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(rest) = rest.strip_suffix("```") else {
        return text;
    };
    // Skip the info string (`json`) on the opening line.
    match rest.find('\n') {
        Some(idx) => rest[idx + 1..].trim(),
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()).trim(),
    }
}

#[cfg(test)]
#[path = "answer_test.rs"]
mod tests;
