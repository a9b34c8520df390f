use splitledger_domain::{ParticipantId, SplitError};
use thiserror::Error;

/// Classification used to pick a log level for a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// The caller handed in something invalid; report it back, log at info.
    UserInput,
    /// An invariant the engine relies on was violated; log at error.
    InternalBug,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid expense draft: {0}")]
    Split(#[from] SplitError),
    #[error("payer {payer} is not a group member")]
    UnknownPayer { payer: ParticipantId },
}

impl EngineError {
    pub fn kind(&self) -> FailureKind {
        match self {
            EngineError::Split(_) | EngineError::UnknownPayer { .. } => FailureKind::UserInput,
        }
    }
}
