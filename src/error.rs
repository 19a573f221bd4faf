//! Error type for the strategy façade.
//!
//! The allocate/reallocate/deallocate path keeps malloc's raw-pointer
//! contract (null means failure) because that's the interface the spec
//! itself defines. Strategy selection is the one operation the spec gives
//! a real textual error taxonomy to, so it gets a real Rust error type
//! instead of a sentinel.

use std::fmt;

/// Which engine is backing the façade, or which one a successful
/// `select_strategy` call just committed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyId {
  FirstFit = 1,
  Buddy = 2,
}

/// Failure modes of [`select_strategy`](crate::select_strategy).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectError {
  /// A strategy was already committed (by an explicit select or by the
  /// first lazily-dispatched call); selection can't happen twice.
  AlreadySelected,
  /// `name` matched neither `"firstfit"` nor `"buddy"` (case-insensitive).
  InvalidName,
}

impl fmt::Display for SelectError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SelectError::AlreadySelected => {
        write!(f, "allocation strategy was already selected")
      }
      SelectError::InvalidName => {
        write!(f, "unknown allocation strategy name")
      }
    }
  }
}

impl std::error::Error for SelectError {}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display_messages_are_distinct() {
    assert_ne!(
      SelectError::AlreadySelected.to_string(),
      SelectError::InvalidName.to_string()
    );
  }
}
