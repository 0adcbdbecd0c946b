//! Plain-text rendering of chat messages for the terminal.

use std::fmt::Write;
use std::str::FromStr;

use crate::answer::AnswerRecord;
use crate::services::session::{ChatMessage, MessageBody};

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;

/// How structured answers are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Narrative,
    Json,
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "narrative" => Ok(Self::Narrative),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown view: {other} (expected 'narrative' or 'json')")),
        }
    }
}

#[must_use]
pub fn render_message(message: &ChatMessage, view: View) -> String {
    match &message.body {
        MessageBody::UserText(text) => format!("You: {text}"),
        MessageBody::Pending => "DRA: ...".to_string(),
        MessageBody::AssistantText(text) => format!("DRA: {text}"),
        MessageBody::Answer(record) => match view {
            View::Narrative => render_narrative(record),
            View::Json => render_json(record),
        },
    }
}

#[must_use]
pub fn render_json(record: &AnswerRecord) -> String {
    serde_json::to_string_pretty(record).unwrap_or_else(|e| format!("<unrenderable answer: {e}>"))
}

#[must_use]
pub fn render_narrative(record: &AnswerRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{}] {}", record.status.as_str(), record.question);
    let _ = writeln!(out, "Answer:");
    for line in record.answer_short.lines() {
        let _ = writeln!(out, "  {line}");
    }

    if !record.citations.is_empty() {
        let _ = writeln!(out, "Citations:");
        for (idx, citation) in record.citations.iter().enumerate() {
            let _ = writeln!(out, "  {}. \"{}\" [{}, Page {}]", idx + 1, citation.quote, citation.pack, citation.page);
        }
    }

    let fields = &record.extracted_fields;
    let _ = writeln!(out, "Extracted fields:");
    let _ = writeln!(out, "  Doc type: {}", fields.doc_type);
    for (label, value) in fields.present() {
        let _ = writeln!(out, "  {label}: {value}");
    }

    if !record.notes.is_empty() {
        let _ = writeln!(out, "Notes:");
        let _ = writeln!(out, "  {}", record.notes);
    }
    out
}
