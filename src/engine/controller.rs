//! Narrative controller: the session state machine
//!
//! `Uninitialized → Active` on [`NarrativeController::start_new_game`],
//! `Active → Active` on choices and back-navigation, `Active → Ended` when
//! an ending passage is reached or the player quits. Only a new game (or
//! restoring a save) leaves `Ended`.
//!
//! Every operation validates first and commits by replacing the player
//! state wholesale, so a failed call leaves the state untouched.

use crate::config::EngineConfig;
use crate::engine::effects::apply_effects;
use crate::engine::gate::evaluate;
use crate::errors::EngineError;
use crate::library::StoryLibrary;
use crate::storage::{PersistenceError, SAVE_VERSION, SaveGame, SaveStore, SaveWorker};
use crate::types::{
    ChoiceId, ChoiceView, EndReason, GameSettings, NarrativeEvent, Passage, PassageId,
    PlayerState, SessionSnapshot, SessionStatus, SettingUpdate, SoundCue, Story, StoryId,
    Transition,
};
use std::sync::Arc;

/// Receives sound cues, fire-and-forget
pub trait AudioSink {
    /// `volume` is the effective effect volume in `0.0..=1.0`
    fn play(&mut self, cue: &SoundCue, volume: f32);
}

/// Whether the player confirmed a critical choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Unconfirmed,
    Confirmed,
}

type Listener = Box<dyn FnMut(&NarrativeEvent)>;

#[derive(Debug)]
struct SessionData {
    story: Arc<Story>,
    state: PlayerState,
}

#[derive(Debug)]
enum Session {
    Uninitialized,
    Active(SessionData),
    Ended(SessionData),
}

impl Session {
    fn status(&self) -> SessionStatus {
        match self {
            Session::Uninitialized => SessionStatus::Uninitialized,
            Session::Active(_) => SessionStatus::Active,
            Session::Ended(_) => SessionStatus::Ended,
        }
    }

    fn data(&self) -> Option<&SessionData> {
        match self {
            Session::Uninitialized => None,
            Session::Active(data) | Session::Ended(data) => Some(data),
        }
    }

    fn data_mut(&mut self) -> Option<&mut SessionData> {
        match self {
            Session::Uninitialized => None,
            Session::Active(data) | Session::Ended(data) => Some(data),
        }
    }
}

struct Persistence {
    store: Arc<dyn SaveStore>,
    worker: SaveWorker,
}

/// Owns one game session and drives it through its lifecycle
pub struct NarrativeController {
    library: Arc<StoryLibrary>,
    config: EngineConfig,
    session: Session,
    settings: GameSettings,
    listeners: Vec<Listener>,
    audio: Option<Box<dyn AudioSink>>,
    persistence: Option<Persistence>,
}

impl NarrativeController {
    pub fn new(library: Arc<StoryLibrary>) -> Self {
        Self::with_config(library, EngineConfig::default())
    }

    pub fn with_config(library: Arc<StoryLibrary>, config: EngineConfig) -> Self {
        Self {
            library,
            config,
            session: Session::Uninitialized,
            settings: GameSettings::default(),
            listeners: Vec::new(),
            audio: None,
            persistence: None,
        }
    }

    /// Attach a save store; must be called inside a tokio runtime
    pub fn with_persistence(mut self, store: Arc<dyn SaveStore>) -> Result<Self, PersistenceError> {
        let worker = SaveWorker::spawn(Arc::clone(&store))?;
        self.persistence = Some(Persistence { store, worker });
        Ok(self)
    }

    pub fn with_audio(mut self, audio: Box<dyn AudioSink>) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Receive every event the controller emits
    pub fn subscribe(&mut self, listener: impl FnMut(&NarrativeEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Receive a snapshot after every committed state change
    pub fn on_state_change(&mut self, mut callback: impl FnMut(&SessionSnapshot) + 'static) {
        self.subscribe(move |event| {
            if let NarrativeEvent::StateChanged(snapshot) = event {
                callback(&**snapshot);
            }
        });
    }

    /// Receive the ending passage and reason when a session ends
    pub fn on_session_ended(
        &mut self,
        mut callback: impl FnMut(&StoryId, &PassageId, EndReason) + 'static,
    ) {
        self.subscribe(move |event| {
            if let NarrativeEvent::SessionEnded {
                story_id,
                passage_id,
                reason,
            } = event
            {
                callback(story_id, passage_id, *reason);
            }
        });
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn library(&self) -> &StoryLibrary {
        &self.library
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    pub fn story(&self) -> Option<&Story> {
        self.session.data().map(|data| data.story.as_ref())
    }

    pub fn state(&self) -> Option<&PlayerState> {
        self.session.data().map(|data| &data.state)
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn current_passage(&self) -> Option<&Passage> {
        let data = self.session.data()?;
        data.story.passage(&data.state.current_passage_id)
    }

    /// Read-only copy of the session with its choices evaluated
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        let data = self.session.data()?;
        let passage = data.story.passage(&data.state.current_passage_id)?;
        let choices = passage
            .choices
            .iter()
            .map(|choice| ChoiceView {
                choice: choice.clone(),
                gate: evaluate(choice, &data.state),
            })
            .collect();

        Some(SessionSnapshot {
            status: self.session.status(),
            story_id: data.story.id().clone(),
            state: data.state.clone(),
            passage: passage.clone(),
            choices,
        })
    }

    /// Start `story_id` from its first passage, replacing any session
    pub fn start_new_game(&mut self, story_id: &StoryId) -> Result<(), EngineError> {
        self.report_persistence_failures();

        let story = self
            .library
            .get(story_id)
            .ok_or_else(|| EngineError::StoryNotFound {
                id: story_id.clone(),
            })?;

        let mut state = PlayerState::new(story.start_passage_id().clone(), story.initial_sanity());
        state.settings = self.settings.clone();
        let starts_at_ending = story.is_ending(&state.current_passage_id);
        self.abandon_active_session();

        log::info!("[Session] new game '{}' at '{}'", story.id(), state.current_passage_id);
        let data = SessionData { story, state };
        self.session = if starts_at_ending {
            Session::Ended(data)
        } else {
            Session::Active(data)
        };

        self.emit_state_changed();
        if starts_at_ending {
            self.emit_session_ended(EndReason::Ending);
        }
        self.checkpoint();
        Ok(())
    }

    /// Select a choice of the current passage without confirmation
    pub fn make_choice(&mut self, choice_id: &ChoiceId) -> Result<Transition, EngineError> {
        self.select(choice_id, Confirmation::Unconfirmed)
    }

    /// Select a choice the player has explicitly confirmed
    pub fn confirm_choice(&mut self, choice_id: &ChoiceId) -> Result<Transition, EngineError> {
        self.select(choice_id, Confirmation::Confirmed)
    }

    /// Validate and commit a choice
    ///
    /// Lookup, gating and confirmation are all checked before anything is
    /// written; on success history, effects and the passage pointer are
    /// committed together.
    pub fn select(
        &mut self,
        choice_id: &ChoiceId,
        confirmation: Confirmation,
    ) -> Result<Transition, EngineError> {
        self.report_persistence_failures();

        let status = self.session.status();
        let Session::Active(data) = &mut self.session else {
            return Err(EngineError::SessionNotActive { status });
        };

        let story = Arc::clone(&data.story);
        let from = data.state.current_passage_id.clone();
        let choice = story
            .passage(&from)
            .and_then(|passage| passage.find_choice(choice_id))
            .ok_or_else(|| EngineError::ChoiceNotFound {
                id: choice_id.clone(),
            })?;

        let gate = evaluate(choice, &data.state);
        if let Some(reason) = gate.block_reason {
            log::debug!("[Choice] '{}' locked: {}", choice_id, reason);
            return Err(EngineError::ChoiceLocked { reason });
        }
        if choice.critical && confirmation != Confirmation::Confirmed {
            return Err(EngineError::ConfirmationRequired {
                id: choice_id.clone(),
            });
        }

        let before = data.state.sanity;
        let mut outcome = apply_effects(&data.state, &choice.effects);
        outcome.state.history.push(from.clone());
        trim_history(&mut outcome.state.history, self.config.history_limit);
        outcome.state.current_passage_id = choice.next_passage_id.clone();
        let after = outcome.state.sanity;

        data.state = outcome.state;
        let ended = story.is_ending(&choice.next_passage_id);
        if ended {
            self.finish_session();
        }

        let crossed = self.config.crossings(before, after);
        let mut sounds = outcome.sounds;
        sounds.extend(crossed.iter().filter_map(|c| c.cue.clone()));

        log::debug!(
            "[Choice] '{}': '{}' -> '{}' (sanity {} -> {})",
            choice_id,
            from,
            choice.next_passage_id,
            before,
            after
        );

        self.emit_state_changed();
        for crossing in &crossed {
            self.emit(NarrativeEvent::SanityThresholdCrossed {
                level: crossing.level,
                direction: crossing.direction,
                sanity: after,
            });
        }
        let volume = self.settings.effective_sfx_volume();
        if !self.settings.muted
            && let Some(audio) = self.audio.as_mut()
        {
            for cue in &sounds {
                audio.play(cue, volume);
            }
        }
        if ended {
            self.emit_session_ended(EndReason::Ending);
        }
        self.checkpoint();

        Ok(Transition {
            from,
            to: choice.next_passage_id.clone(),
            sounds,
            crossed,
            ended,
        })
    }

    /// Return to the previous passage
    ///
    /// Only navigation is undone: sanity, inventory, flags and variables
    /// keep every change made since. With empty history this is a no-op
    /// returning `Ok(None)`.
    pub fn go_back(&mut self) -> Result<Option<PassageId>, EngineError> {
        self.report_persistence_failures();

        let status = self.session.status();
        let Session::Active(data) = &mut self.session else {
            return Err(EngineError::SessionNotActive { status });
        };

        let Some(previous) = data.state.history.pop() else {
            return Ok(None);
        };
        log::debug!(
            "[Back] '{}' -> '{}'",
            data.state.current_passage_id,
            previous
        );
        data.state.current_passage_id = previous.clone();

        self.emit_state_changed();
        self.checkpoint();
        Ok(Some(previous))
    }

    /// End the active session without reaching an ending
    pub fn quit(&mut self) -> Result<(), EngineError> {
        self.report_persistence_failures();

        let status = self.session.status();
        if status != SessionStatus::Active {
            return Err(EngineError::SessionNotActive { status });
        }
        self.finish_session();
        self.emit_state_changed();
        self.emit_session_ended(EndReason::Quit);
        self.checkpoint();
        Ok(())
    }

    /// Discard the session and its save, returning to `Uninitialized`
    pub fn reset_game(&mut self) {
        self.report_persistence_failures();

        self.abandon_active_session();
        if let Some(data) = self.session.data() {
            log::info!("[Session] reset '{}'", data.story.id());
        }
        self.session = Session::Uninitialized;

        let key = self.config.session_key.clone();
        let queued = self
            .persistence
            .as_ref()
            .map(|persistence| persistence.worker.enqueue_delete(key));
        if let Some(Err(error)) = queued {
            self.persistence_failed(error);
        }
    }

    /// Change a player preference; never affects narrative logic
    pub fn update_setting(&mut self, update: SettingUpdate) {
        self.report_persistence_failures();

        self.settings.apply(update);
        if let Some(data) = self.session.data_mut() {
            data.state.settings = self.settings.clone();
            self.emit_state_changed();
            self.checkpoint();
        }
    }

    /// Write the current session to the store and wait for the result
    ///
    /// Queued background saves are flushed first so this write is the last.
    /// A failure is reported but leaves the session untouched.
    pub async fn save_now(&mut self) -> Result<(), EngineError> {
        let Some(persistence) = &self.persistence else {
            return Err(PersistenceError::unavailable("no save store configured").into());
        };
        let Some(data) = self.session.data() else {
            return Err(EngineError::SessionNotActive {
                status: self.session.status(),
            });
        };

        let save = SaveGame::new(data.story.id().clone(), data.state.clone());
        persistence.worker.flush().await;
        let result = persistence
            .store
            .save(&self.config.session_key, &save)
            .await;

        self.report_persistence_failures();
        if let Err(error) = result {
            self.persistence_failed(error.clone());
            return Err(error.into());
        }
        Ok(())
    }

    /// Resume the session stored under the configured key
    ///
    /// Returns `Ok(false)` and stays `Uninitialized` when there is no save.
    pub async fn restore(&mut self) -> Result<bool, EngineError> {
        let Some(persistence) = &self.persistence else {
            return Err(PersistenceError::unavailable("no save store configured").into());
        };

        persistence.worker.flush().await;
        let loaded = persistence.store.load(&self.config.session_key).await;
        self.report_persistence_failures();

        let save = match loaded {
            Ok(Some(save)) => save,
            Ok(None) => {
                log::info!("[Session] no save under '{}'", self.config.session_key);
                return Ok(false);
            }
            Err(error) => {
                self.persistence_failed(error.clone());
                return Err(error.into());
            }
        };

        let story = self.check_save(&save)?;
        let mut state = save.state;
        trim_history(&mut state.history, self.config.history_limit);
        state.settings = state.settings.normalized();

        let ended = story.is_ending(&state.current_passage_id);
        self.abandon_active_session();
        self.settings = state.settings.clone();
        log::info!(
            "[Session] restored '{}' at '{}'",
            story.id(),
            state.current_passage_id
        );

        let data = SessionData { story, state };
        self.session = if ended {
            Session::Ended(data)
        } else {
            Session::Active(data)
        };
        self.emit_state_changed();
        Ok(true)
    }

    /// Wait until every queued background save has been written
    pub async fn flush_saves(&mut self) {
        if let Some(persistence) = &self.persistence {
            persistence.worker.flush().await;
        }
        self.report_persistence_failures();
    }

    fn check_save(&self, save: &SaveGame) -> Result<Arc<Story>, PersistenceError> {
        if save.version != SAVE_VERSION {
            return Err(PersistenceError::incompatible(format!(
                "unsupported save version {}",
                save.version
            )));
        }
        let story = self.library.get(&save.story_id).ok_or_else(|| {
            PersistenceError::incompatible(format!("unknown story '{}'", save.story_id))
        })?;

        let state = &save.state;
        if let Some(unknown) = std::iter::once(&state.current_passage_id)
            .chain(&state.history)
            .find(|id| story.passage(id).is_none())
        {
            return Err(PersistenceError::incompatible(format!(
                "story '{}' has no passage '{}'",
                save.story_id, unknown
            )));
        }
        Ok(story)
    }

    /// Report an active session that is about to be replaced
    fn abandon_active_session(&mut self) {
        if self.session.status() == SessionStatus::Active {
            self.emit_session_ended(EndReason::Reset);
        }
    }

    fn finish_session(&mut self) {
        self.session = match std::mem::replace(&mut self.session, Session::Uninitialized) {
            Session::Active(data) => Session::Ended(data),
            other => other,
        };
    }

    fn checkpoint(&mut self) {
        if !self.config.autosave {
            return;
        }
        let (Some(persistence), Some(data)) = (&self.persistence, self.session.data()) else {
            return;
        };

        let save = SaveGame::new(data.story.id().clone(), data.state.clone());
        let queued = persistence
            .worker
            .enqueue_save(self.config.session_key.clone(), save);
        if let Err(error) = queued {
            self.persistence_failed(error);
        }
    }

    fn report_persistence_failures(&mut self) {
        let failures = match self.persistence.as_mut() {
            Some(persistence) => persistence.worker.take_failures(),
            None => return,
        };
        for error in failures {
            self.emit(NarrativeEvent::PersistenceFailed {
                message: error.to_string(),
            });
        }
    }

    fn persistence_failed(&mut self, error: PersistenceError) {
        log::warn!("[Save] {}", error);
        self.emit(NarrativeEvent::PersistenceFailed {
            message: error.to_string(),
        });
    }

    fn emit_state_changed(&mut self) {
        if let Some(snapshot) = self.snapshot() {
            self.emit(NarrativeEvent::StateChanged(Box::new(snapshot)));
        }
    }

    fn emit_session_ended(&mut self, reason: EndReason) {
        let Some(data) = self.session.data() else {
            return;
        };
        let event = NarrativeEvent::SessionEnded {
            story_id: data.story.id().clone(),
            passage_id: data.state.current_passage_id.clone(),
            reason,
        };
        log::info!("[Session] ended: {:?}", reason);
        self.emit(event);
    }

    fn emit(&mut self, event: NarrativeEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}

fn trim_history(history: &mut Vec<PassageId>, limit: usize) {
    if history.len() > limit {
        let excess = history.len() - limit;
        history.drain(..excess);
    }
}
