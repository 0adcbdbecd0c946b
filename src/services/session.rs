//! Chat session — the owned conversation state for one user.
//!
//! DESIGN
//! ======
//! A session holds the append-only message log, the id of the one in-flight
//! placeholder, the active role and department selection, and the readiness
//! of the retrieval backend. Each submission moves Idle → Pending → Resolved:
//! the user entry and a `Pending` placeholder are appended together, and the
//! placeholder is later replaced in place by exactly one final body.

use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use crate::access::{Department, DepartmentSelection, Role, visible_departments};
use crate::answer::{Answer, AnswerRecord};
use crate::error::ErrorCode;
use crate::retrieval::{RetrievalError, Retriever};

use super::answer::{AnswerService, ServiceError};

pub const APOLOGY_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting...",
            Self::Connected => "Connected",
        }
    }
}

/// Readiness-check retry policy used by [`ChatSession::connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for ConnectPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, backoff: Duration::from_millis(500) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    UserText(String),
    /// Placeholder while the answer is in flight.
    Pending,
    AssistantText(String),
    Answer(AnswerRecord),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender: Sender,
    pub body: MessageBody,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("not connected")]
    NotConnected,
    #[error("message is blank")]
    BlankInput,
    #[error("a request is already pending")]
    RequestPending,
}

impl ErrorCode for SubmitError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotConnected => "E_NOT_CONNECTED",
            Self::BlankInput => "E_BLANK_INPUT",
            Self::RequestPending => "E_REQUEST_PENDING",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("{dept} is not available to the {role} role")]
    DepartmentNotVisible { dept: Department, role: Role },
    #[error("connect failed: {0}")]
    Connect(#[source] RetrievalError),
    #[error("no pending message with id {0}")]
    NotPending(Uuid),
}

impl ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::DepartmentNotVisible { .. } => "E_DEPARTMENT_NOT_VISIBLE",
            Self::Connect(_) => "E_CONNECT",
            Self::NotPending(_) => "E_NOT_PENDING",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Connect(e) if e.retryable())
    }
}

// =============================================================================
// SESSION
// =============================================================================

#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    pending: Option<Uuid>,
    role: Role,
    selection: DepartmentSelection,
    connection: ConnectionStatus,
}

impl ChatSession {
    #[must_use]
    pub fn new(role: Role, selection: DepartmentSelection) -> Self {
        let mut session = Self { role, selection, ..Self::default() };
        session.selection.migrate_to(role);
        session
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn selection(&self) -> &DepartmentSelection {
        &self.selection
    }

    #[must_use]
    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Switch role and drop selected departments the new role cannot see.
    pub fn set_role(&mut self, role: Role) {
        let dropped = self.selection.migrate_to(role);
        if !dropped.is_empty() {
            info!(%role, ?dropped, "session: departments dropped on role change");
        }
        self.role = role;
    }

    /// Toggle `dept` in the selection. Returns whether it is now selected.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::DepartmentNotVisible`] if the role cannot see `dept`.
    pub fn toggle_department(&mut self, dept: Department) -> Result<bool, SessionError> {
        if !visible_departments(self.role).contains(&dept) {
            return Err(SessionError::DepartmentNotVisible { dept, role: self.role });
        }
        Ok(self.selection.toggle(dept))
    }

    /// Probe the retrieval backend until it reports ready or the policy's
    /// attempts run out. Already-connected sessions return immediately.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Connect`] with the last readiness error.
    pub async fn connect(&mut self, retriever: &dyn Retriever, policy: ConnectPolicy) -> Result<(), SessionError> {
        if self.connection == ConnectionStatus::Connected {
            return Ok(());
        }
        self.connection = ConnectionStatus::Connecting;
        let mut attempt = 0;
        loop {
            attempt += 1;
            match retriever.check_ready().await {
                Ok(()) => {
                    info!(attempt, "session: connected");
                    self.connection = ConnectionStatus::Connected;
                    return Ok(());
                }
                Err(e) if e.retryable() && attempt < policy.max_attempts => {
                    warn!(attempt, error = %e, code = e.error_code(), "session: backend not ready, retrying");
                    tokio::time::sleep(policy.backoff).await;
                }
                Err(e) => {
                    warn!(attempt, error = %e, code = e.error_code(), "session: connect failed");
                    self.connection = ConnectionStatus::Disconnected;
                    return Err(SessionError::Connect(e));
                }
            }
        }
    }

    /// Append the user entry and a pending placeholder. Returns the
    /// placeholder id. Rejected submissions leave the session untouched.
    ///
    /// # Errors
    ///
    /// Returns a [`SubmitError`] when not connected, the text is blank, or a
    /// request is already in flight.
    pub fn begin_submit(&mut self, text: &str) -> Result<Uuid, SubmitError> {
        if self.connection != ConnectionStatus::Connected {
            return Err(SubmitError::NotConnected);
        }
        if text.trim().is_empty() {
            return Err(SubmitError::BlankInput);
        }
        if self.pending.is_some() {
            return Err(SubmitError::RequestPending);
        }

        self.messages.push(ChatMessage {
            id: Uuid::new_v4(),
            sender: Sender::User,
            body: MessageBody::UserText(text.to_string()),
        });
        let pending_id = Uuid::new_v4();
        self.messages.push(ChatMessage { id: pending_id, sender: Sender::Assistant, body: MessageBody::Pending });
        self.pending = Some(pending_id);
        Ok(pending_id)
    }

    /// Replace the pending placeholder `id` with the final body for `result`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotPending`] if `id` is not the in-flight placeholder.
    pub fn resolve(&mut self, id: Uuid, result: Result<Answer, ServiceError>) -> Result<(), SessionError> {
        if self.pending != Some(id) {
            return Err(SessionError::NotPending(id));
        }
        let Some(message) = self
            .messages
            .iter_mut()
            .find(|m| m.id == id && m.body == MessageBody::Pending)
        else {
            return Err(SessionError::NotPending(id));
        };

        message.body = match result {
            Ok(Answer::Structured(record)) => MessageBody::Answer(record),
            Ok(Answer::Text(text)) => MessageBody::AssistantText(text),
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "session: answer failed");
                MessageBody::AssistantText(APOLOGY_MESSAGE.to_string())
            }
        };
        self.pending = None;
        Ok(())
    }

    /// Submit `text`, await the answer, and resolve the placeholder.
    ///
    /// # Errors
    ///
    /// Returns a [`SubmitError`] if the submission is rejected up front.
    pub async fn submit(&mut self, service: &AnswerService, text: &str) -> Result<Uuid, SubmitError> {
        let id = self.begin_submit(text)?;
        let result = service
            .get_answer(text, self.role, self.selection.departments())
            .await;
        if let Err(e) = self.resolve(id, result) {
            warn!(error = %e, "session: placeholder vanished before resolve");
        }
        Ok(id)
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
