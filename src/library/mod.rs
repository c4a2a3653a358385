//! Story repository
//!
//! Holds the validated stories a controller can start. Stories are shared
//! read-only between sessions.

use crate::errors::StoryLoadError;
use crate::types::{Story, StoryDefinition, StoryId};
use std::collections::BTreeMap;
use std::sync::Arc;

const EDENS_HOLLOW: &str = include_str!("edens_hollow.json");

#[derive(Debug, Clone, Default)]
pub struct StoryLibrary {
    stories: BTreeMap<StoryId, Arc<Story>>,
}

impl StoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library containing the stories shipped with the crate
    pub fn bundled() -> Result<Self, StoryLoadError> {
        let mut library = Self::new();
        library.load_json(EDENS_HOLLOW)?;
        Ok(library)
    }

    /// Add a story, replacing any story with the same id
    pub fn insert(&mut self, story: Story) -> Option<Arc<Story>> {
        log::debug!(
            "[Library] registering story '{}' ({} passages)",
            story.id(),
            story.passage_count()
        );
        self.stories.insert(story.id().clone(), Arc::new(story))
    }

    /// Parse, validate and register a story authored as JSON
    pub fn load_json(&mut self, json: &str) -> Result<StoryId, StoryLoadError> {
        let definition: StoryDefinition = serde_json::from_str(json)?;
        let story = definition.build()?;
        let id = story.id().clone();
        self.insert(story);
        Ok(id)
    }

    pub fn get(&self, id: &StoryId) -> Option<Arc<Story>> {
        self.stories.get(id).cloned()
    }

    pub fn contains(&self, id: &StoryId) -> bool {
        self.stories.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &StoryId> {
        self.stories.keys()
    }

    pub fn stories(&self) -> impl Iterator<Item = &Story> {
        self.stories.values().map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }
}
