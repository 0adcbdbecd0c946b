//! Structured answer record returned by the generation service.
//!
//! Field names match the upstream JSON exactly so a reply deserializes and
//! re-serializes without loss.

use serde::{Deserialize, Serialize};

use crate::prompt::MAX_QUOTE_WORDS;

#[cfg(test)]
#[path = "answer_test.rs"]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnswerStatus {
    Ok,
    NotFound,
    Ambiguous,
}

impl AnswerStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::NotFound => "NOT_FOUND",
            Self::Ambiguous => "AMBIGUOUS",
        }
    }
}

/// A verbatim quote with pack/page provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub pack: String,
    #[serde(default)]
    pub file: Option<String>,
    pub page: u32,
    pub quote: String,
}

impl Citation {
    #[must_use]
    pub fn quote_words(&self) -> usize {
        self.quote.split_whitespace().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub doc_type: String,
    #[serde(default)]
    pub doc_number: Option<String>,
    #[serde(default)]
    pub doc_date: Option<String>,
    #[serde(default)]
    pub issuing_authority: Option<String>,
    #[serde(default)]
    pub survey_or_extent: Option<String>,
}

impl ExtractedFields {
    /// Labelled optional fields that carry a value, in schema order.
    #[must_use]
    pub fn present(&self) -> Vec<(&'static str, &str)> {
        [
            ("Doc number", &self.doc_number),
            ("Doc date", &self.doc_date),
            ("Issuing authority", &self.issuing_authority),
            ("Survey or extent", &self.survey_or_extent),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.as_deref().map(|v| (label, v)))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub project: String,
    pub question: String,
    pub status: AnswerStatus,
    pub answer_short: String,
    pub citations: Vec<Citation>,
    pub extracted_fields: ExtractedFields,
    pub notes: String,
}

/// Why a parsed record was refused on receipt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordViolation {
    #[error("NOT_FOUND answer carries {0} citation(s)")]
    CitationsOnNotFound(usize),
}

impl AnswerRecord {
    /// Check the invariants the output contract promises.
    ///
    /// # Errors
    ///
    /// Returns a [`RecordViolation`] if a `NOT_FOUND` answer has citations.
    pub fn validate(&self) -> Result<(), RecordViolation> {
        if self.status == AnswerStatus::NotFound && !self.citations.is_empty() {
            return Err(RecordViolation::CitationsOnNotFound(self.citations.len()));
        }
        Ok(())
    }

    /// Citations whose quote exceeds the word limit.
    #[must_use]
    pub fn overlong_quotes(&self) -> Vec<&Citation> {
        self.citations
            .iter()
            .filter(|c| c.quote_words() > MAX_QUOTE_WORDS)
            .collect()
    }
}

/// What the answer service hands back for a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Structured(AnswerRecord),
    /// Advisory, out-of-scope or degraded reply.
    Text(String),
}
