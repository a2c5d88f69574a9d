//! Domain errors for the Mango goal tree.

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors that can occur in the goal store and its collaborators.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Goal not found: {0}")]
    GoalNotFound(Uuid),

    #[error("Top-level goal index {index} out of range ({count} top-level goals)")]
    TopLevelIndexOutOfRange { index: usize, count: u64 },

    #[error("Completion of goal {0} is derived from its sub-goals and cannot be set directly")]
    CompletionIsDerived(Uuid),

    #[error("Goal {0} still has sub-goals")]
    HasChildren(Uuid),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl DomainError {
    /// True for errors meaning "the id or index does not resolve to a goal".
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::GoalNotFound(_) | Self::TopLevelIndexOutOfRange { .. }
        )
    }

    /// True for errors raised by operations the goal's current shape forbids.
    pub const fn is_invalid_state(&self) -> bool {
        matches!(self, Self::CompletionIsDerived(_) | Self::HasChildren(_))
    }

    /// Short machine-readable category, used in JSON error output.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::GoalNotFound(_) | Self::TopLevelIndexOutOfRange { .. } => "not_found",
            Self::CompletionIsDerived(_) | Self::HasChildren(_) => "invalid_state",
            Self::ValidationFailed(_) => "validation",
            Self::ParseError(_) => "parse",
            Self::Io(_) | Self::DatabaseError(_) => "io",
            Self::SerializationError(_) => "serialization",
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Io(err.to_string())
    }
}

impl From<quick_xml::Error> for DomainError {
    fn from(err: quick_xml::Error) -> Self {
        DomainError::ParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let id = Uuid::new_v4();
        assert!(DomainError::GoalNotFound(id).is_not_found());
        assert!(DomainError::TopLevelIndexOutOfRange { index: 3, count: 1 }.is_not_found());
        assert!(!DomainError::CompletionIsDerived(id).is_not_found());
        assert!(DomainError::CompletionIsDerived(id).is_invalid_state());
        assert!(!DomainError::Io("disk".to_string()).is_invalid_state());
        assert_eq!(DomainError::HasChildren(id).kind(), "invalid_state");
        assert_eq!(DomainError::ParseError("bad".to_string()).kind(), "parse");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: DomainError = io.into();
        assert!(matches!(err, DomainError::Io(msg) if msg.contains("missing")));
    }
}
