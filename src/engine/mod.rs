//! Narrative engine
//!
//! - effects: pure effect processor
//! - gate: pure choice gate evaluator
//! - controller: the session state machine tying both together

pub mod controller;
pub mod effects;
pub mod gate;


pub use crate::types::SessionStatus;
pub use controller::{AudioSink, Confirmation, NarrativeController};
pub use effects::{EffectOutcome, apply_effects};
pub use gate::{BlockReason, GateResult, evaluate};
