//! Effect processor: folds a choice's effects over a player state

use crate::types::{Effect, PlayerState, SoundCue};

/// New state plus the sound cues collected on the side
#[derive(Debug, Clone, PartialEq)]
pub struct EffectOutcome {
    pub state: PlayerState,
    pub sounds: Vec<SoundCue>,
}

/// Apply `effects` in order to a copy of `state`
///
/// Sanity is clamped after every single delta, so `-110` followed by `+5`
/// from 100 ends at 5, not at `clamp(-5) = 0`.
pub fn apply_effects(state: &PlayerState, effects: &[Effect]) -> EffectOutcome {
    let mut next = state.clone();
    let mut sounds = Vec::new();

    for effect in effects {
        log::trace!("[Effect] applying {:?}", effect);
        match effect {
            Effect::SanityChange { delta } => {
                next.sanity = next.sanity.shifted(*delta);
            }
            Effect::InventoryAdd { item } => {
                next.inventory.insert(item.clone());
            }
            Effect::InventoryRemove { item } => {
                next.inventory.remove(item);
            }
            Effect::SetFlag { name, value } => {
                next.flags.insert(name.clone(), *value);
            }
            Effect::SetVariable { name, value } => {
                next.variables.insert(name.clone(), value.clone());
            }
            Effect::PlaySound { cue } => sounds.push(cue.clone()),
        }
    }

    EffectOutcome {
        state: next,
        sounds,
    }
}
