//! Test doubles shared by the service tests.

use std::collections::BTreeSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Value, json};

use crate::access::{Department, Role};
use crate::llm::LlmChat;
use crate::llm::types::{ChatRequest, ChatResponse, LlmError};
use crate::retrieval::{RetrievalError, Retriever};

// =========================================================================
// MockLlm
// =========================================================================

/// What the mock saw on one call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: String,
    pub prompt: String,
    pub temperature: Option<f32>,
    pub max_tokens: u32,
    pub schema: Option<Value>,
}

/// Replays queued replies in order and records every request.
pub struct MockLlm {
    replies: Mutex<Vec<Result<String, LlmError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockLlm {
    pub fn new(replies: Vec<Result<String, LlmError>>) -> Self {
        Self { replies: Mutex::new(replies), calls: Mutex::new(Vec::new()) }
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(vec![Ok(text.into())])
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmChat for MockLlm {
    async fn chat(&self, request: &ChatRequest<'_>) -> Result<ChatResponse, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            system: request.system.to_string(),
            prompt: request
                .messages
                .iter()
                .map(|m| m.content.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            schema: request.response_schema.cloned(),
        });
        let mut replies = self.replies.lock().unwrap();
        let reply = if replies.is_empty() { Ok("done".to_string()) } else { replies.remove(0) };
        reply.map(|text| ChatResponse {
            text,
            model: "mock".into(),
            stop_reason: "end_turn".into(),
            input_tokens: 0,
            output_tokens: 0,
        })
    }
}

// =========================================================================
// Retrievers
// =========================================================================

/// Fails readiness a fixed number of times, then succeeds.
pub struct FlakyRetriever {
    failures_left: AtomicUsize,
    pub probes: AtomicUsize,
}

impl FlakyRetriever {
    pub fn failing(times: usize) -> Self {
        Self { failures_left: AtomicUsize::new(times), probes: AtomicUsize::new(0) }
    }
}

#[async_trait::async_trait]
impl Retriever for FlakyRetriever {
    async fn retrieve(
        &self,
        _question: &str,
        _role: Role,
        _departments: &BTreeSet<Department>,
    ) -> Result<String, RetrievalError> {
        Err(RetrievalError::Backend("index offline".into()))
    }

    async fn check_ready(&self) -> Result<(), RetrievalError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        let left = self.failures_left.load(Ordering::SeqCst);
        if left == 0 {
            return Ok(());
        }
        self.failures_left.store(left - 1, Ordering::SeqCst);
        Err(RetrievalError::Unavailable("warming up".into()))
    }
}

// =========================================================================
// Fixtures
// =========================================================================

/// Upstream reply for the Customer / Approvals scenario.
pub fn approvals_fixture() -> Value {
    json!({
        "project": "iHeart",
        "question": "What is the iHeart approval status?",
        "status": "OK",
        "answer_short": "- Phase 1 was approved by the City Planning Commission on 2023-11-05 [Approvals p.2]",
        "citations": [{
            "pack": "Approvals",
            "file": "ApprovalsPack.pdf",
            "page": 2,
            "quote": "Final approval for phase 1 was granted by the 'City Planning Commission' on 2023-11-05."
        }],
        "extracted_fields": {
            "doc_type": "Approval",
            "doc_number": null,
            "doc_date": "2023-11-05",
            "issuing_authority": "City Planning Commission",
            "survey_or_extent": null
        },
        "notes": ""
    })
}

pub fn not_found_fixture() -> Value {
    json!({
        "project": "iHeart",
        "question": "iHeart survey extent",
        "status": "NOT_FOUND",
        "answer_short": "not shown",
        "citations": [],
        "extracted_fields": { "doc_type": "unknown" },
        "notes": "Upload the Title pack with the survey plan."
    })
}
