//! Engine errors - every failure the narrative engine reports to its caller

use crate::engine::gate::BlockReason;
use crate::engine::SessionStatus;
use crate::storage::PersistenceError;
use crate::types::{ChoiceId, PassageId, StoryId};
use thiserror::Error;

/// Failures of the narrative controller operations
///
/// None of these leave the session half-updated: an operation either
/// commits fully or fails before touching the player state.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("story '{id}' not found")]
    StoryNotFound { id: StoryId },

    #[error("choice '{id}' is not offered by the current passage")]
    ChoiceNotFound { id: ChoiceId },

    #[error("choice is locked: {reason}")]
    ChoiceLocked { reason: BlockReason },

    #[error("choice '{id}' is critical and must be confirmed first")]
    ConfirmationRequired { id: ChoiceId },

    #[error("no active session (session is {status})")]
    SessionNotActive { status: SessionStatus },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl EngineError {
    /// Stable reason code for the presentation layer
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::StoryNotFound { .. } => "STORY_NOT_FOUND",
            EngineError::ChoiceNotFound { .. } => "CHOICE_NOT_FOUND",
            EngineError::ChoiceLocked { reason } => reason.code(),
            EngineError::ConfirmationRequired { .. } => "CONFIRMATION_REQUIRED",
            EngineError::SessionNotActive { .. } => "SESSION_NOT_ACTIVE",
            EngineError::Persistence(_) => "PERSISTENCE_FAILURE",
        }
    }
}

/// Structural problems found while loading a story
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoryValidationError {
    #[error("story has an empty identifier")]
    EmptyStoryId,

    #[error("story '{story}' contains a passage or choice with an empty identifier")]
    EmptyIdentifier { story: StoryId },

    #[error("story '{story}' starts at unknown passage '{passage}'")]
    MissingStartPassage { story: StoryId, passage: PassageId },

    #[error("passage '{passage}' is defined more than once")]
    DuplicatePassage { passage: PassageId },

    #[error("passage '{passage}' defines choice '{choice}' more than once")]
    DuplicateChoice { passage: PassageId, choice: ChoiceId },

    #[error("choice '{choice}' in passage '{passage}' targets unknown passage '{target}'")]
    DanglingChoice {
        passage: PassageId,
        choice: ChoiceId,
        target: PassageId,
    },

    #[error("ending '{passage}' is not a passage of the story")]
    UnknownEnding { passage: PassageId },

    #[error("choice '{choice}' in passage '{passage}' has an invalid sanity gate: {detail}")]
    InvalidSanityGate {
        passage: PassageId,
        choice: ChoiceId,
        detail: String,
    },

    #[error("story initial sanity {value} is outside 0..=100")]
    InvalidInitialSanity { value: i64 },
}

/// Failures while loading an authored story
#[derive(Debug, Error)]
pub enum StoryLoadError {
    #[error("malformed story data: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] StoryValidationError),
}

impl StoryLoadError {
    pub fn code(&self) -> &'static str {
        match self {
            StoryLoadError::Malformed(_) => "MALFORMED_STORY",
            StoryLoadError::Invalid(_) => "STORY_VALIDATION_ERROR",
        }
    }
}
