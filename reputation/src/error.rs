use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReputationError {
    #[error("participant {0} has no reputation record")]
    UnknownParticipant(String),
}
