//! Persistence contract tests
//! Round-trips, ordering of background saves and non-fatal failures

use async_trait::async_trait;
use edens_hollow::storage::SAVE_VERSION;
use edens_hollow::{
    ChoiceId, EngineConfig, FileStore, MemoryStore, NarrativeController, NarrativeEvent, PassageId,
    PersistenceError, SaveGame, SaveStore, SessionStatus, SettingUpdate, StoryId, StoryLibrary,
};
use edens_hollow::types::{EndReason, SessionKey};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn hollow() -> Arc<StoryLibrary> {
    Arc::new(StoryLibrary::bundled().expect("bundled story loads"))
}

fn key() -> SessionKey {
    SessionKey::from("edens-hollow")
}

/// Store whose writes take a while, recording the order they land in
#[derive(Default)]
struct SlowStore {
    inner: MemoryStore,
    written: Mutex<Vec<PassageId>>,
}

#[async_trait]
impl SaveStore for SlowStore {
    async fn save(&self, key: &SessionKey, save: &SaveGame) -> Result<(), PersistenceError> {
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.written
            .lock()
            .unwrap()
            .push(save.state.current_passage_id.clone());
        self.inner.save(key, save).await
    }

    async fn load(&self, key: &SessionKey) -> Result<Option<SaveGame>, PersistenceError> {
        self.inner.load(key).await
    }

    async fn delete(&self, key: &SessionKey) -> Result<(), PersistenceError> {
        self.inner.delete(key).await
    }
}

/// Store that refuses every write
struct FailingStore;

#[async_trait]
impl SaveStore for FailingStore {
    async fn save(&self, _: &SessionKey, _: &SaveGame) -> Result<(), PersistenceError> {
        Err(PersistenceError::io("disk full"))
    }

    async fn load(&self, _: &SessionKey) -> Result<Option<SaveGame>, PersistenceError> {
        Err(PersistenceError::io("disk unreadable"))
    }

    async fn delete(&self, _: &SessionKey) -> Result<(), PersistenceError> {
        Ok(())
    }
}

#[tokio::test]
async fn save_then_restore_reproduces_state() {
    let store = Arc::new(MemoryStore::new());
    let mut controller = NarrativeController::new(hollow())
        .with_persistence(store.clone())
        .unwrap();
    controller.start_new_game(&StoryId::from("edens-hollow")).unwrap();
    controller.make_choice(&ChoiceId::from("enter")).unwrap();
    controller.make_choice(&ChoiceId::from("well")).unwrap();
    controller.make_choice(&ChoiceId::from("take_key")).unwrap();
    controller.update_setting(SettingUpdate::MusicVolume(20));
    controller.save_now().await.unwrap();
    let original = controller.state().cloned().unwrap();

    let mut resumed = NarrativeController::new(hollow())
        .with_persistence(store)
        .unwrap();
    assert!(resumed.restore().await.unwrap());
    assert_eq!(resumed.status(), SessionStatus::Active);
    assert_eq!(resumed.state().unwrap(), &original);
    assert_eq!(resumed.settings().music_volume, 20);
}

#[tokio::test]
async fn restore_without_save_stays_uninitialized() {
    let mut controller = NarrativeController::new(hollow())
        .with_persistence(Arc::new(MemoryStore::new()))
        .unwrap();
    assert!(!controller.restore().await.unwrap());
    assert_eq!(controller.status(), SessionStatus::Uninitialized);
}

#[tokio::test]
async fn choices_during_slow_saves_are_not_lost() {
    let store = Arc::new(SlowStore::default());
    let mut controller = NarrativeController::new(hollow())
        .with_persistence(store.clone())
        .unwrap();

    controller.start_new_game(&StoryId::from("edens-hollow")).unwrap();
    // Transitions complete immediately while earlier saves are still pending
    controller.make_choice(&ChoiceId::from("enter")).unwrap();
    controller.make_choice(&ChoiceId::from("chapel")).unwrap();
    assert_eq!(
        controller.state().unwrap().current_passage_id,
        PassageId::from("chapel")
    );

    controller.flush_saves().await;
    let written = store.written.lock().unwrap().clone();
    assert_eq!(
        written,
        vec![
            PassageId::from("gate"),
            PassageId::from("courtyard"),
            PassageId::from("chapel")
        ]
    );

    let saved = store.load(&key()).await.unwrap().unwrap();
    assert_eq!(saved.state.current_passage_id, PassageId::from("chapel"));
}

#[tokio::test]
async fn failing_store_does_not_end_the_session() {
    let mut controller = NarrativeController::new(hollow())
        .with_persistence(Arc::new(FailingStore))
        .unwrap();
    let failures = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&failures);
    controller.subscribe(move |event| {
        if let NarrativeEvent::PersistenceFailed { message } = event {
            sink.borrow_mut().push(message.clone());
        }
    });

    controller.start_new_game(&StoryId::from("edens-hollow")).unwrap();
    controller.make_choice(&ChoiceId::from("enter")).unwrap();
    controller.flush_saves().await;

    assert_eq!(failures.borrow().len(), 2);
    assert!(failures.borrow()[0].contains("disk full"));
    assert_eq!(controller.status(), SessionStatus::Active);

    let err = controller.save_now().await.unwrap_err();
    assert_eq!(err.code(), "PERSISTENCE_FAILURE");
    assert_eq!(controller.status(), SessionStatus::Active);
    controller.make_choice(&ChoiceId::from("chapel")).unwrap();

    assert!(controller.restore().await.is_err());
    assert_eq!(
        controller.state().unwrap().current_passage_id,
        PassageId::from("chapel")
    );
}

#[tokio::test]
async fn reset_deletes_the_save() {
    let store = Arc::new(MemoryStore::new());
    let mut controller = NarrativeController::new(hollow())
        .with_persistence(store.clone())
        .unwrap();
    controller.start_new_game(&StoryId::from("edens-hollow")).unwrap();
    controller.flush_saves().await;
    assert!(store.contains(&key()));

    controller.reset_game();
    controller.flush_saves().await;
    assert!(!store.contains(&key()));
}

#[tokio::test]
async fn restore_normalizes_loaded_state_and_reports_replaced_session() {
    let store = Arc::new(MemoryStore::new());
    let mut saved = edens_hollow::PlayerState::new(PassageId::from("chapel"), edens_hollow::Sanity::full());
    saved.history = ["gate", "courtyard", "well", "courtyard"]
        .into_iter()
        .map(PassageId::from)
        .collect();
    saved.settings.master_volume = 240;
    saved.settings.sfx_volume = 101;
    store
        .save(&key(), &SaveGame::new(StoryId::from("edens-hollow"), saved))
        .await
        .unwrap();

    let config = EngineConfig {
        history_limit: 2,
        autosave: false,
        ..EngineConfig::default()
    };
    let mut controller = NarrativeController::with_config(hollow(), config)
        .with_persistence(store)
        .unwrap();
    let reasons = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&reasons);
    controller.on_session_ended(move |_, _, reason| sink.borrow_mut().push(reason));

    controller.start_new_game(&StoryId::from("edens-hollow")).unwrap();
    assert!(controller.restore().await.unwrap());

    assert_eq!(*reasons.borrow(), vec![EndReason::Reset]);
    let state = controller.state().unwrap();
    assert_eq!(
        state.history,
        vec![PassageId::from("well"), PassageId::from("courtyard")]
    );
    assert_eq!(state.settings.master_volume, 100);
    assert_eq!(state.settings.sfx_volume, 100);
    assert_eq!(controller.settings(), &state.settings);
}

#[tokio::test]
async fn incompatible_saves_are_rejected() {
    let store = Arc::new(MemoryStore::new());
    let mut state = edens_hollow::PlayerState::new(PassageId::from("gate"), edens_hollow::Sanity::full());

    let unknown_story = SaveGame::new(StoryId::from("other"), state.clone());
    store.save(&key(), &unknown_story).await.unwrap();
    let mut controller = NarrativeController::new(hollow())
        .with_persistence(store.clone())
        .unwrap();
    assert!(controller.restore().await.is_err());
    assert_eq!(controller.status(), SessionStatus::Uninitialized);

    state.current_passage_id = PassageId::from("attic");
    store
        .save(&key(), &SaveGame::new(StoryId::from("edens-hollow"), state.clone()))
        .await
        .unwrap();
    assert!(controller.restore().await.is_err());

    state.current_passage_id = PassageId::from("gate");
    let mut future = SaveGame::new(StoryId::from("edens-hollow"), state);
    future.version = SAVE_VERSION + 1;
    store.save(&key(), &future).await.unwrap();
    assert!(controller.restore().await.is_err());
    assert_eq!(controller.status(), SessionStatus::Uninitialized);
}

#[tokio::test]
async fn file_store_round_trip() {
    let dir = std::env::temp_dir().join(format!("edens-hollow-test-{}", std::process::id()));
    let store = Arc::new(FileStore::new(&dir));

    let mut controller = NarrativeController::new(hollow())
        .with_persistence(store.clone())
        .unwrap();
    controller.start_new_game(&StoryId::from("edens-hollow")).unwrap();
    controller.make_choice(&ChoiceId::from("enter")).unwrap();
    controller.flush_saves().await;

    assert!(store.save_path(&key()).exists());
    let loaded = store.load(&key()).await.unwrap().unwrap();
    assert_eq!(&loaded.state, controller.state().unwrap());

    store.delete(&key()).await.unwrap();
    assert_eq!(store.load(&key()).await.unwrap(), None);
    let _ = std::fs::remove_dir_all(&dir);
}
