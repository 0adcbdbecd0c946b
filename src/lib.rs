//! DRA — role-scoped project assistant.
//!
//! DESIGN
//! ======
//! Questions about the supported project are answered from department packs
//! the current role may see. The access policy, retrieval seam and prompt are
//! pure; `services::answer` performs the single upstream LLM call and
//! `services::session` owns the conversation state for one user.

pub mod access;
pub mod answer;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod render;
pub mod retrieval;
pub mod services;
