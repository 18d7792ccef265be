//! Error type shared by the geometry kernel and the planning pipeline.

use std::fmt;

use crate::pipeline::{ActionKind, Prerequisite, SequencerState};

pub type PlanResult<T> = Result<T, PlanError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    /// Zero-length, zero-area, parallel or non-finite input to a derivation.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),
    #[error("{action} requires {missing}, which is not available yet")]
    PrerequisiteMissing {
        action: ActionKind,
        missing: Prerequisite,
    },
    #[error("landmark index {index} is outside 0..{max}")]
    IndexOutOfRange { index: usize, max: usize },
    #[error("{action} is not available in state {state}")]
    ActionUnavailable {
        action: ActionKind,
        state: SequencerState,
    },
    #[error("invalid planner configuration: {0}")]
    InvalidConfig(String),
    #[error("artifact dependency table contains a cycle: {0}")]
    Topology(String),
}

impl PlanError {
    pub(crate) fn degenerate(message: impl Into<String>) -> Self {
        Self::DegenerateInput(message.into())
    }

    /// Prefix a degenerate-input message with what was being derived.
    #[must_use]
    pub(crate) fn context(self, subject: impl fmt::Display) -> Self {
        match self {
            Self::DegenerateInput(message) => Self::DegenerateInput(format!("{subject}: {message}")),
            other => other,
        }
    }
}
