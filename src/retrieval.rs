//! Retrieval — evidence lookup behind a polymorphic seam.
//!
//! DESIGN
//! ======
//! The answer service only needs `retrieve(question, allowed) -> text`. The
//! pilot ships two implementations: `MockRetriever`, which assembles canned
//! pack snippets filtered by the access policy, and `StaticRetriever`, which
//! returns fixed fixture text. An index-backed retriever plugs in behind the
//! same trait.

use std::collections::BTreeSet;
use std::fmt::Write;

use tracing::debug;

use crate::access::{Department, Project, Role, can_see_financials, join_departments, visible_departments};

#[cfg(test)]
#[path = "retrieval_test.rs"]
mod tests;

/// Order in which department snippets appear in assembled context.
pub const CONTEXT_PRIORITY: [Department; 4] =
    [Department::Approvals, Department::Title, Department::Legal, Department::Finance];

const CONTEXT_HEADER: &str = "--- MOCK DOCUMENT CONTEXT ---";
const CONTEXT_FOOTER: &str = "--- END MOCK DOCUMENT CONTEXT ---";

const APPROVALS_SNIPPET: &str = "Document: ApprovalsPack.pdf
Page 2: Final approval for phase 1 was granted by the 'City Planning Commission' on 2023-11-05.";
const APPROVALS_BUDGET_LINE: &str = "Page 7: The preliminary budget approval is noted as $5,000,000.";
const TITLE_SNIPPET: &str = "Document: TitlePack.pdf
Page 3: The primary agreement for iHeart project was signed on 2023-10-15. The document number is IH-TP-001.";
const LEGAL_SNIPPET: &str = "Document: Parent_C.pdf
Page 12: Section 4.2 states that all subsidiaries must adhere to the primary agreement clauses. This document supersedes Parent_B.pdf.";
const FINANCE_SNIPPET: &str = "Document: FinancePack.pdf
Page 5: Q4 2023 Financial report indicates a total project spend of $1,200,000 against the allocated budget.
Page 6: Projected Q1 2024 spend is estimated to be $850,000.";

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    /// The backend could not be reached or is not ready yet.
    #[error("retrieval backend unavailable: {0}")]
    Unavailable(String),

    /// The backend answered but the lookup failed.
    #[error("retrieval failed: {0}")]
    Backend(String),
}

impl crate::error::ErrorCode for RetrievalError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "E_RETRIEVAL_UNAVAILABLE",
            Self::Backend(_) => "E_RETRIEVAL_BACKEND",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

// =============================================================================
// TRAIT
// =============================================================================

/// Evidence source for a question, scoped by role and department selection.
#[async_trait::async_trait]
pub trait Retriever: Send + Sync {
    /// Return the context text the model may answer from.
    ///
    /// # Errors
    ///
    /// Returns a [`RetrievalError`] if the backend cannot serve the lookup.
    async fn retrieve(
        &self,
        question: &str,
        role: Role,
        departments: &BTreeSet<Department>,
    ) -> Result<String, RetrievalError>;

    /// Readiness probe used when a session connects.
    ///
    /// # Errors
    ///
    /// Returns a [`RetrievalError`] if the backend is not ready.
    async fn check_ready(&self) -> Result<(), RetrievalError> {
        Ok(())
    }
}

// =============================================================================
// MOCK
// =============================================================================

/// Canned pack snippets for the pilot project.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockRetriever {
    project: Project,
}

impl MockRetriever {
    #[must_use]
    pub fn new(project: Project) -> Self {
        Self { project }
    }

    /// Build the context block for `question`. Only departments that are both
    /// selected and visible to `role` contribute, in [`CONTEXT_PRIORITY`] order.
    #[must_use]
    pub fn assemble_context(&self, question: &str, role: Role, departments: &BTreeSet<Department>) -> String {
        let visible = visible_departments(role);
        let allowed: BTreeSet<Department> = departments.intersection(&visible).copied().collect();
        let financials = can_see_financials(role);

        let parts: Vec<String> = CONTEXT_PRIORITY
            .into_iter()
            .filter(|dept| allowed.contains(dept))
            .filter_map(|dept| snippet(dept, financials))
            .collect();

        let mut out = String::new();
        let _ = writeln!(out, "{CONTEXT_HEADER}");
        let _ = writeln!(
            out,
            "This is a mock context for the {} project, filtered by selected departments. \
             A production deployment retrieves it from a document index for the query: \"{question}\" \
             and filters it for: {}.",
            self.project,
            join_departments(&allowed),
        );
        out.push('\n');
        for part in &parts {
            let _ = writeln!(out, "{part}");
        }
        out.push_str(CONTEXT_FOOTER);
        out
    }
}

fn snippet(dept: Department, financials: bool) -> Option<String> {
    match dept {
        Department::Approvals if financials => Some(format!("{APPROVALS_SNIPPET}\n{APPROVALS_BUDGET_LINE}")),
        Department::Approvals => Some(APPROVALS_SNIPPET.to_string()),
        Department::Title => Some(TITLE_SNIPPET.to_string()),
        Department::Legal => Some(LEGAL_SNIPPET.to_string()),
        Department::Finance if financials => Some(FINANCE_SNIPPET.to_string()),
        Department::Finance => None,
    }
}

#[async_trait::async_trait]
impl Retriever for MockRetriever {
    async fn retrieve(
        &self,
        question: &str,
        role: Role,
        departments: &BTreeSet<Department>,
    ) -> Result<String, RetrievalError> {
        let context = self.assemble_context(question, role, departments);
        debug!(%role, context_len = context.len(), "retrieval: mock context assembled");
        Ok(context)
    }
}

// =============================================================================
// FIXTURE
// =============================================================================

/// Returns the same text for every lookup.
#[derive(Debug, Clone)]
pub struct StaticRetriever {
    text: String,
}

impl StaticRetriever {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait::async_trait]
impl Retriever for StaticRetriever {
    async fn retrieve(
        &self,
        _question: &str,
        _role: Role,
        _departments: &BTreeSet<Department>,
    ) -> Result<String, RetrievalError> {
        Ok(self.text.clone())
    }
}
