//! `check` command: validate and lint a story file

use crate::library::StoryLibrary;
use crate::lint::{self, LintLevel};
use std::path::Path;

/// Validate and lint the story at `path`; returns `false` on any error
pub fn run_check(path: &Path) -> anyhow::Result<bool> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read '{}': {}", path.display(), e))?;

    let mut library = StoryLibrary::new();
    let id = match library.load_json(&json) {
        Ok(id) => id,
        Err(err) => {
            println!("error [{}]: {err}", err.code());
            return Ok(false);
        }
    };
    let Some(story) = library.get(&id) else {
        anyhow::bail!("story '{}' vanished after loading", id);
    };

    println!(
        "{} ({}): {} passages, {} endings",
        story.title(),
        story.id(),
        story.passage_count(),
        story.endings().len()
    );

    let result = lint::check(&story);
    for issue in &result.issues {
        let level = match issue.level {
            LintLevel::Error => "error",
            LintLevel::Warning => "warning",
            LintLevel::Info => "info",
        };
        match &issue.choice {
            Some(choice) => println!("{level}: [{}/{}] {}", issue.passage, choice, issue.message),
            None => println!("{level}: [{}] {}", issue.passage, issue.message),
        }
    }
    if result.is_clean() {
        println!("ok");
    }

    Ok(!result.has_errors())
}
