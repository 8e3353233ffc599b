use crate::domain::channel::ChannelId;
use std::fmt;

/// Conditions the engine recovers from locally. None of these reach callers as a
/// failure; they are surfaced through `tracing` when a fallback is taken.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    UnknownChannel { id: String },
    EmptyCandidateSet { focus: ChannelId },
    DivisionGuard { what: &'static str },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownChannel { id } => write!(f, "unknown channel id: {id}"),
            Self::EmptyCandidateSet { focus } => {
                write!(f, "no insight template is relevant to channel {focus}")
            }
            Self::DivisionGuard { what } => write!(f, "zero denominator while computing {what}"),
        }
    }
}

impl std::error::Error for EngineError {}
