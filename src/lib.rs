//! # edens-hollow
//!
//! Narrative engine for branching horror fiction. A [`Story`] is an
//! immutable graph of passages connected by choices; a
//! [`NarrativeController`] drives one player through it, applying choice
//! effects to a [`PlayerState`] (sanity, inventory, flags, variables),
//! gating choices on that state and keeping a navigation history.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use edens_hollow::{ChoiceId, NarrativeController, StoryId, StoryLibrary};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let library = Arc::new(StoryLibrary::bundled()?);
//! let mut controller = NarrativeController::new(library);
//!
//! controller.on_state_change(|snapshot| {
//!     println!("now at {}", snapshot.passage.id);
//! });
//!
//! controller.start_new_game(&StoryId::from("edens-hollow"))?;
//! controller.make_choice(&ChoiceId::from("enter"))?;
//!
//! let snapshot = controller.snapshot().expect("session is active");
//! for view in &snapshot.choices {
//!     match &view.gate.block_reason {
//!         None => println!("- {}", view.choice.text),
//!         Some(reason) => println!("- {} (locked: {})", view.choice.text, reason),
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Persistence
//!
//! Attach any [`SaveStore`] with
//! [`NarrativeController::with_persistence`]. Saves are queued after every
//! committed change and written in order by a background task; the
//! in-memory transition never waits for them.
//!
//! ```rust
//! use std::sync::Arc;
//! use edens_hollow::{MemoryStore, NarrativeController, StoryId, StoryLibrary};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let library = Arc::new(StoryLibrary::bundled()?);
//! let store = Arc::new(MemoryStore::new());
//!
//! let mut controller = NarrativeController::new(library.clone()).with_persistence(store.clone())?;
//! controller.start_new_game(&StoryId::from("edens-hollow"))?;
//! controller.flush_saves().await;
//!
//! let mut resumed = NarrativeController::new(library).with_persistence(store)?;
//! assert!(resumed.restore().await?);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod library;
pub mod lint;
pub mod storage;
pub mod types;

pub use config::{EngineConfig, SanityThreshold};
pub use engine::{
    AudioSink, BlockReason, Confirmation, GateResult, NarrativeController, apply_effects, evaluate,
};
pub use errors::{EngineError, StoryLoadError, StoryValidationError};
pub use library::StoryLibrary;
pub use storage::{FileStore, MemoryStore, PersistenceError, SaveGame, SaveStore};
pub use types::{
    Choice, ChoiceId, Effect, GameSettings, NarrativeEvent, Passage, PassageId, PlayerState,
    Sanity, SessionSnapshot, SessionStatus, SettingUpdate, Story, StoryDefinition, StoryId,
    Transition,
};
