use crate::collaborator::CollaboratorId;

/// Construction-time validation failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("{0} must be defined")]
    MissingField(&'static str),
    #[error("text surfaces must have a numeric line height")]
    NonNumericLineHeight,
    #[error("invalid color: {0:?} (expected #rgb or #rrggbb)")]
    InvalidColor(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("a collaborator with the specified id already exists: {0}")]
    Duplicate(CollaboratorId),
    #[error("unknown collaborator: {0}")]
    Unknown(CollaboratorId),
}
