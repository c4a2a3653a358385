//! Core types of the narrative engine
//!
//! - ids: string identifiers and variable values
//! - story: the immutable passage/choice graph
//! - state: the player state and the clamped sanity value
//! - settings: player preferences persisted with the state
//! - event: notifications and snapshots for the presentation layer

pub mod event;
pub mod ids;
pub mod settings;
pub mod state;
pub mod story;

pub use event::{
    ChoiceView, CrossingDirection, EndReason, NarrativeEvent, SessionSnapshot, SessionStatus,
    ThresholdCrossing, Transition,
};
pub use ids::{ChoiceId, FlagName, ItemId, PassageId, SessionKey, SoundCue, StoryId, StoryValue, VarName};
pub use settings::{GameSettings, SettingUpdate, TextSpeed};
pub use state::{PlayerState, Sanity};
pub use story::{Choice, Effect, Passage, Phase, PresentationHints, Story, StoryDefinition};
