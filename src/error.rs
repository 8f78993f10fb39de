use thiserror::Error;

use crate::types::AreaId;

/// Errors raised by the area-planning core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid area estimate: {message}")]
    InvalidEstimate { message: String },

    #[error("solver failed: {}", messages.join("; "))]
    SolverFailure { messages: Vec<String> },

    #[error("no neighbor of area {area} can absorb it within the configured bounds")]
    NoCompliantMerge { area: AreaId },

    #[error("area {area} has no adjacent areas")]
    EmptyNeighborhood { area: AreaId },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl Error {
    pub(crate) fn solver(messages: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Error::SolverFailure { messages: messages.into_iter().map(Into::into).collect() }
    }

    /// Native diagnostic text carried by a solver failure.
    pub fn solver_messages(&self) -> &[String] {
        match self {
            Error::SolverFailure { messages } => messages,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
