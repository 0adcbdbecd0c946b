//! Services — answer generation and the chat session that drives it.

pub mod answer;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;
