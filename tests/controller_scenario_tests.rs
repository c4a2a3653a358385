//! Controller scenario tests
//! End-to-end checks of the session state machine through the public API

use edens_hollow::{
    BlockReason, Choice, ChoiceId, Effect, EngineError, NarrativeController, Passage, PassageId,
    SessionStatus, StoryDefinition, StoryId, StoryLibrary, evaluate,
};
use std::sync::Arc;

fn library(definition: StoryDefinition) -> Arc<StoryLibrary> {
    let mut library = StoryLibrary::new();
    library.insert(definition.build().expect("story should validate"));
    Arc::new(library)
}

fn sanity_story() -> StoryDefinition {
    StoryDefinition::new("asylum", "Asylum", "start")
        .passage(
            Passage::new("start", "A padded cell.")
                .choice(Choice::new("A", "Scream", "ward").effect(Effect::SanityChange { delta: -60 }))
                .choice(
                    Choice::new("spiral", "Spiral", "ward")
                        .effect(Effect::SanityChange { delta: -110 })
                        .effect(Effect::SanityChange { delta: 5 }),
                ),
        )
        .passage(
            Passage::new("ward", "The ward is silent.")
                .choice(Choice::new("lucid", "Think clearly", "office").min_sanity(50))
                .choice(Choice::new("wander", "Wander", "start"))
                .choice(Choice::new("leave", "Leave", "ending")),
        )
        .passage(Passage::new("office", "The doctor's office.").choice(Choice::new("sit", "Sit", "ward")))
        .passage(Passage::new("ending", "Outside, finally."))
        .ending("ending")
}

fn started(definition: StoryDefinition) -> NarrativeController {
    let id = definition.id.clone();
    let mut controller = NarrativeController::new(library(definition));
    controller.start_new_game(&id).expect("story exists");
    controller
}

/// Scenario 1: a -60 sanity choice from 100 leaves 40
#[test]
fn scenario_sanity_change_applies() {
    let mut controller = started(sanity_story());
    controller.make_choice(&ChoiceId::from("A")).unwrap();
    assert_eq!(controller.state().unwrap().sanity.value(), 40);
}

/// Scenario 2: a minSanity 50 choice at sanity 40 is locked and changes nothing
#[test]
fn scenario_low_sanity_locks_choice() {
    let mut controller = started(sanity_story());
    controller.make_choice(&ChoiceId::from("A")).unwrap();

    let passage = controller.current_passage().unwrap().clone();
    let lucid = passage.find_choice(&ChoiceId::from("lucid")).unwrap();
    let gate = evaluate(lucid, controller.state().unwrap());
    assert!(gate.visible);
    assert!(!gate.selectable);
    assert_eq!(gate.block_reason.as_ref().map(BlockReason::code), Some("SANITY_TOO_LOW"));

    let before = serde_json::to_vec(controller.state().unwrap()).unwrap();
    match controller.make_choice(&ChoiceId::from("lucid")) {
        Err(EngineError::ChoiceLocked { reason }) => assert_eq!(reason.code(), "SANITY_TOO_LOW"),
        other => panic!("expected ChoiceLocked, got {other:?}"),
    }
    let after = serde_json::to_vec(controller.state().unwrap()).unwrap();
    assert_eq!(before, after);
}

/// Scenario 3: an unknown story is reported and the controller stays uninitialized
#[test]
fn scenario_missing_story() {
    let mut controller = NarrativeController::new(library(sanity_story()));
    let err = controller
        .start_new_game(&StoryId::from("missing-id"))
        .unwrap_err();
    assert!(matches!(err, EngineError::StoryNotFound { .. }));
    assert_eq!(err.code(), "STORY_NOT_FOUND");
    assert_eq!(controller.status(), SessionStatus::Uninitialized);
    assert!(controller.snapshot().is_none());
}

/// Scenario 4: reaching an ending ends the session
#[test]
fn scenario_reaching_ending() {
    let mut controller = started(sanity_story());
    controller.make_choice(&ChoiceId::from("A")).unwrap();
    let transition = controller.make_choice(&ChoiceId::from("leave")).unwrap();

    assert!(transition.ended);
    assert_eq!(controller.status(), SessionStatus::Ended);
    assert!(matches!(
        controller.make_choice(&ChoiceId::from("leave")),
        Err(EngineError::SessionNotActive { .. })
    ));
}

/// Scenario 5: sanity clamps after each delta (-110 then +5 from 100 gives 5, not 0)
#[test]
fn scenario_intermediate_clamping() {
    let mut controller = started(sanity_story());
    controller.make_choice(&ChoiceId::from("spiral")).unwrap();
    assert_eq!(controller.state().unwrap().sanity.value(), 5);
}

#[test]
fn failed_choices_leave_state_unchanged() {
    let mut controller = started(sanity_story());
    let before = controller.state().cloned().unwrap();

    assert!(matches!(
        controller.make_choice(&ChoiceId::from("nonexistent")),
        Err(EngineError::ChoiceNotFound { .. })
    ));
    assert!(matches!(
        controller.make_choice(&ChoiceId::from("lucid")),
        Err(EngineError::ChoiceNotFound { .. })
    ));
    assert_eq!(controller.state().unwrap(), &before);
}

#[test]
fn go_back_restores_passage_but_not_effects() {
    let mut controller = started(sanity_story());
    let start = controller.state().unwrap().current_passage_id.clone();

    controller.make_choice(&ChoiceId::from("A")).unwrap();
    assert_eq!(controller.go_back().unwrap(), Some(start.clone()));

    let state = controller.state().unwrap();
    assert_eq!(state.current_passage_id, start);
    assert_eq!(state.sanity.value(), 40);
}

#[test]
fn back_and_forth_builds_and_unwinds_history() {
    let mut controller = started(sanity_story());
    controller.make_choice(&ChoiceId::from("A")).unwrap();
    controller.make_choice(&ChoiceId::from("wander")).unwrap();
    controller.make_choice(&ChoiceId::from("A")).unwrap();

    let history = &controller.state().unwrap().history;
    assert_eq!(
        history,
        &vec![
            PassageId::from("start"),
            PassageId::from("ward"),
            PassageId::from("start")
        ]
    );

    for expected in ["start", "ward", "start"] {
        assert_eq!(controller.go_back().unwrap(), Some(PassageId::from(expected)));
    }
    assert_eq!(controller.go_back().unwrap(), None);
    assert_eq!(controller.state().unwrap().sanity.value(), 0);
}

#[test]
fn stale_choice_after_scene_change_is_rejected() {
    let mut controller = started(sanity_story());
    let offered = controller.snapshot().unwrap();
    controller.make_choice(&offered.choices[0].choice.id).unwrap();

    // The UI still shows the old passage's second choice
    let stale = &offered.choices[1].choice.id;
    assert!(matches!(
        controller.make_choice(stale),
        Err(EngineError::ChoiceNotFound { .. })
    ));
}
