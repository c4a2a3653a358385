//! Events and read-only snapshots handed to the presentation layer

use crate::engine::gate::GateResult;
use crate::types::ids::{PassageId, SoundCue, StoryId};
use crate::types::state::{PlayerState, Sanity};
use crate::types::story::{Choice, Passage};
use serde::{Deserialize, Serialize};

/// Lifecycle of a narrative session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Uninitialized,
    Active,
    Ended,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionStatus::Uninitialized => "uninitialized",
            SessionStatus::Active => "active",
            SessionStatus::Ended => "ended",
        };
        f.write_str(name)
    }
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// An ending passage was reached
    Ending,
    Quit,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossingDirection {
    Falling,
    Rising,
}

/// A configured sanity level crossed by a transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdCrossing {
    pub level: u8,
    pub direction: CrossingDirection,
    pub cue: Option<SoundCue>,
}

/// A choice as the presentation layer should render it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceView {
    pub choice: Choice,
    pub gate: GateResult,
}

/// Read-only copy of a session after a transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub story_id: StoryId,
    pub state: PlayerState,
    pub passage: Passage,
    pub choices: Vec<ChoiceView>,
}

/// Outcome of a committed choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub from: PassageId,
    pub to: PassageId,
    /// Cues in the order they were forwarded to the audio collaborator
    pub sounds: Vec<SoundCue>,
    pub crossed: Vec<ThresholdCrossing>,
    pub ended: bool,
}

/// Notifications emitted by the narrative controller, in commit order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NarrativeEvent {
    StateChanged(Box<SessionSnapshot>),
    SanityThresholdCrossed {
        level: u8,
        direction: CrossingDirection,
        sanity: Sanity,
    },
    SessionEnded {
        story_id: StoryId,
        passage_id: PassageId,
        reason: EndReason,
    },
    PersistenceFailed {
        message: String,
    },
}
