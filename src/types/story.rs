//! Story graph: passages connected by choices
//!
//! A [`Story`] can only be obtained through validation (either
//! [`StoryDefinition::build`] or deserialization), so every value of the type
//! has a valid start passage, no dangling choice targets and well-formed
//! sanity gates.

use crate::errors::StoryValidationError;
use crate::types::ids::{ChoiceId, FlagName, ItemId, PassageId, SoundCue, StoryId, StoryValue, VarName};
use crate::types::state::Sanity;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Declarative state mutation attached to a choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    SanityChange { delta: i32 },
    InventoryAdd { item: ItemId },
    InventoryRemove { item: ItemId },
    SetFlag { name: FlagName, value: bool },
    SetVariable { name: VarName, value: StoryValue },
    PlaySound { cue: SoundCue },
}

/// Narrative progress tag, used for theming only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Intro,
    Early,
    Mid,
    Late,
    Ending,
}

/// Opaque presentation data passed through to the UI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresentationHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music: Option<String>,
}

/// Player-selectable edge between two passages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub id: ChoiceId,
    pub text: String,
    pub next_passage_id: PassageId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<Effect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_sanity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_sanity: Option<i64>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub requires_items: BTreeSet<ItemId>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub requires_flags: BTreeMap<FlagName, bool>,
    /// Must be confirmed by the player before it is applied
    #[serde(default)]
    pub critical: bool,
}

impl Choice {
    pub fn new(
        id: impl Into<ChoiceId>,
        text: impl Into<String>,
        next_passage_id: impl Into<PassageId>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            next_passage_id: next_passage_id.into(),
            effects: Vec::new(),
            min_sanity: None,
            max_sanity: None,
            requires_items: BTreeSet::new(),
            requires_flags: BTreeMap::new(),
            critical: false,
        }
    }

    pub fn effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn min_sanity(mut self, value: i64) -> Self {
        self.min_sanity = Some(value);
        self
    }

    pub fn max_sanity(mut self, value: i64) -> Self {
        self.max_sanity = Some(value);
        self
    }

    pub fn requires_item(mut self, item: impl Into<ItemId>) -> Self {
        self.requires_items.insert(item.into());
        self
    }

    pub fn requires_flag(mut self, name: impl Into<FlagName>, expected: bool) -> Self {
        self.requires_flags.insert(name.into(), expected);
        self
    }

    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }

    fn validate_gate(&self, passage: &PassageId) -> Result<(), StoryValidationError> {
        let invalid = |detail: String| StoryValidationError::InvalidSanityGate {
            passage: passage.clone(),
            choice: self.id.clone(),
            detail,
        };

        for bound in [self.min_sanity, self.max_sanity].into_iter().flatten() {
            if !(Sanity::MIN as i64..=Sanity::MAX as i64).contains(&bound) {
                return Err(invalid(format!("bound {bound} is outside 0..=100")));
            }
        }
        if let (Some(min), Some(max)) = (self.min_sanity, self.max_sanity)
            && min > max
        {
            return Err(invalid(format!("minimum {min} exceeds maximum {max}")));
        }
        Ok(())
    }
}

/// A node of story text and its outgoing choices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub id: PassageId,
    /// Display text; newlines separate paragraphs
    pub text: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
    #[serde(flatten)]
    pub hints: PresentationHints,
}

impl Passage {
    pub fn new(id: impl Into<PassageId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            choices: Vec::new(),
            phase: None,
            hints: PresentationHints::default(),
        }
    }

    pub fn choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    pub fn phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn background(mut self, background: impl Into<String>) -> Self {
        self.hints.background = Some(background.into());
        self
    }

    pub fn music(mut self, music: impl Into<String>) -> Self {
        self.hints.music = Some(music.into());
        self
    }

    /// Find one of this passage's choices by id
    pub fn find_choice(&self, id: &ChoiceId) -> Option<&Choice> {
        self.choices.iter().find(|choice| &choice.id == id)
    }

    /// Paragraphs of the passage text, without blank lines
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.text
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
    }
}

fn default_initial_sanity() -> i64 {
    Sanity::MAX as i64
}

/// Authoring shape of a story, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryDefinition {
    pub id: StoryId,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_passage_id: PassageId,
    #[serde(default = "default_initial_sanity")]
    pub initial_sanity: i64,
    #[serde(default)]
    pub endings: BTreeSet<PassageId>,
    pub passages: Vec<Passage>,
}

impl StoryDefinition {
    pub fn new(
        id: impl Into<StoryId>,
        title: impl Into<String>,
        start_passage_id: impl Into<PassageId>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: String::new(),
            description: None,
            start_passage_id: start_passage_id.into(),
            initial_sanity: default_initial_sanity(),
            endings: BTreeSet::new(),
            passages: Vec::new(),
        }
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn initial_sanity(mut self, value: i64) -> Self {
        self.initial_sanity = value;
        self
    }

    pub fn passage(mut self, passage: Passage) -> Self {
        self.passages.push(passage);
        self
    }

    pub fn ending(mut self, passage: impl Into<PassageId>) -> Self {
        self.endings.insert(passage.into());
        self
    }

    /// Validate the definition and turn it into an immutable story
    pub fn build(self) -> Result<Story, StoryValidationError> {
        Story::try_from(self)
    }
}

/// Immutable, validated story graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoryDefinition", into = "StoryDefinition")]
pub struct Story {
    id: StoryId,
    title: String,
    author: String,
    description: Option<String>,
    start_passage_id: PassageId,
    initial_sanity: Sanity,
    endings: BTreeSet<PassageId>,
    passages: BTreeMap<PassageId, Passage>,
}

impl Story {
    pub fn id(&self) -> &StoryId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn start_passage_id(&self) -> &PassageId {
        &self.start_passage_id
    }

    pub fn initial_sanity(&self) -> Sanity {
        self.initial_sanity
    }

    pub fn endings(&self) -> &BTreeSet<PassageId> {
        &self.endings
    }

    pub fn is_ending(&self, passage: &PassageId) -> bool {
        self.endings.contains(passage)
    }

    pub fn passage(&self, id: &PassageId) -> Option<&Passage> {
        self.passages.get(id)
    }

    pub fn passages(&self) -> impl Iterator<Item = &Passage> {
        self.passages.values()
    }

    pub fn passage_count(&self) -> usize {
        self.passages.len()
    }
}

impl TryFrom<StoryDefinition> for Story {
    type Error = StoryValidationError;

    fn try_from(def: StoryDefinition) -> Result<Self, Self::Error> {
        if def.id.is_empty() {
            return Err(StoryValidationError::EmptyStoryId);
        }
        if !(Sanity::MIN as i64..=Sanity::MAX as i64).contains(&def.initial_sanity) {
            return Err(StoryValidationError::InvalidInitialSanity {
                value: def.initial_sanity,
            });
        }

        let mut passages = BTreeMap::new();
        for passage in def.passages {
            if passage.id.is_empty() || passage.choices.iter().any(|c| c.id.is_empty()) {
                return Err(StoryValidationError::EmptyIdentifier { story: def.id });
            }
            let mut seen = BTreeSet::new();
            for choice in &passage.choices {
                if !seen.insert(&choice.id) {
                    return Err(StoryValidationError::DuplicateChoice {
                        passage: passage.id.clone(),
                        choice: choice.id.clone(),
                    });
                }
                choice.validate_gate(&passage.id)?;
            }
            if passages.contains_key(&passage.id) {
                return Err(StoryValidationError::DuplicatePassage {
                    passage: passage.id,
                });
            }
            passages.insert(passage.id.clone(), passage);
        }

        if !passages.contains_key(&def.start_passage_id) {
            return Err(StoryValidationError::MissingStartPassage {
                story: def.id,
                passage: def.start_passage_id,
            });
        }
        for passage in passages.values() {
            for choice in &passage.choices {
                if !passages.contains_key(&choice.next_passage_id) {
                    return Err(StoryValidationError::DanglingChoice {
                        passage: passage.id.clone(),
                        choice: choice.id.clone(),
                        target: choice.next_passage_id.clone(),
                    });
                }
            }
        }
        if let Some(unknown) = def.endings.iter().find(|id| !passages.contains_key(*id)) {
            return Err(StoryValidationError::UnknownEnding {
                passage: unknown.clone(),
            });
        }

        Ok(Story {
            id: def.id,
            title: def.title,
            author: def.author,
            description: def.description,
            start_passage_id: def.start_passage_id,
            initial_sanity: Sanity::clamped(def.initial_sanity),
            endings: def.endings,
            passages,
        })
    }
}

impl From<Story> for StoryDefinition {
    fn from(story: Story) -> Self {
        Self {
            id: story.id,
            title: story.title,
            author: story.author,
            description: story.description,
            start_passage_id: story.start_passage_id,
            initial_sanity: i64::from(story.initial_sanity.value()),
            endings: story.endings,
            passages: story.passages.into_values().collect(),
        }
    }
}
