//! CUI player mode for running stories
//!
//! This module provides an interactive player where users can experience
//! a story in the terminal.

use crate::config::EngineConfig;
use crate::engine::{AudioSink, NarrativeController};
use crate::errors::EngineError;
use crate::library::StoryLibrary;
use crate::storage::FileStore;
use crate::types::{
    CrossingDirection, NarrativeEvent, PlayerState, SessionSnapshot, SessionStatus, SettingUpdate,
    SoundCue, StoryId, StoryValue,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

pub struct PlayOptions {
    pub story_id: StoryId,
    /// Directory for save files; `None` plays without saving
    pub save_dir: Option<PathBuf>,
    /// Ignore any existing save
    pub new_game: bool,
    pub debug: bool,
}

struct TerminalAudio;

impl AudioSink for TerminalAudio {
    fn play(&mut self, cue: &SoundCue, volume: f32) {
        println!("  ~ {cue} ~ ({:.0}%)", volume * 100.0);
    }
}

/// Run the player mode
pub async fn run_play(library: StoryLibrary, options: PlayOptions) -> anyhow::Result<()> {
    let mut controller =
        NarrativeController::with_config(Arc::new(library), EngineConfig::from_env())
            .with_audio(Box::new(TerminalAudio));
    if let Some(dir) = &options.save_dir {
        controller = controller.with_persistence(Arc::new(FileStore::new(dir)))?;
    }

    controller.subscribe(|event| match event {
        NarrativeEvent::SanityThresholdCrossed {
            direction: CrossingDirection::Falling,
            level,
            ..
        } => println!("  (Your grip on the world loosens... sanity below {level})"),
        NarrativeEvent::SanityThresholdCrossed {
            direction: CrossingDirection::Rising,
            level,
            ..
        } => println!("  (You steady yourself... sanity back above {level})"),
        NarrativeEvent::PersistenceFailed { message } => println!("  [save failed: {message}]"),
        _ => {}
    });

    println!("=== Eden's Hollow ===");
    println!();
    println!("Controls:");
    println!("  1-9: select choice");
    println!("  b:   back");
    println!("  s:   save");
    println!("  m:   toggle sound");
    println!("  q:   quit");
    println!();

    let resumed = if options.save_dir.is_some() && !options.new_game {
        match controller.restore().await {
            Ok(resumed) => resumed,
            Err(err) => {
                println!("[Could not resume: {err}]");
                false
            }
        }
    } else {
        false
    };
    if resumed {
        println!("(Resuming your last session)");
    } else {
        controller.start_new_game(&options.story_id)?;
    }

    loop {
        let Some(snapshot) = controller.snapshot() else {
            break;
        };
        show_snapshot(&snapshot);
        if options.debug {
            display_debug_info(&snapshot.state);
        }

        if snapshot.status == SessionStatus::Ended {
            println!("== THE END ==");
            break;
        }

        let input = get_input("Select:")?;
        match input.as_str() {
            "q" => {
                println!("Goodbye!");
                break;
            }
            "b" => match controller.go_back()? {
                Some(_) => println!("(back)"),
                None => println!("[Cannot go back]"),
            },
            "s" => match controller.save_now().await {
                Ok(()) => println!("(saved)"),
                Err(err) => println!("[{}] {}", err.code(), err),
            },
            "m" => {
                let muted = !controller.settings().muted;
                controller.update_setting(SettingUpdate::Muted(muted));
                println!("(sound {})", if muted { "off" } else { "on" });
            }
            other => match other.parse::<usize>() {
                Ok(n) if (1..=snapshot.choices.len()).contains(&n) => {
                    let id = snapshot.choices[n - 1].choice.id.clone();
                    choose(&mut controller, &id)?;
                }
                _ => println!("Invalid input. Enter a choice number, 'b', 's', 'm' or 'q'."),
            },
        }
        println!();
    }

    controller.flush_saves().await;
    Ok(())
}

fn choose(controller: &mut NarrativeController, id: &crate::types::ChoiceId) -> io::Result<()> {
    match controller.make_choice(id) {
        Ok(_) => {}
        Err(EngineError::ConfirmationRequired { .. }) => {
            let answer = get_input("There is no going back from this. Are you sure? (y/n)")?;
            if answer.eq_ignore_ascii_case("y")
                && let Err(err) = controller.confirm_choice(id)
            {
                println!("[{}] {}", err.code(), err);
            }
        }
        Err(err) => println!("[{}] {}", err.code(), err),
    }
    Ok(())
}

fn show_snapshot(snapshot: &SessionSnapshot) {
    println!();
    for paragraph in snapshot.passage.paragraphs() {
        println!("{paragraph}");
        println!();
    }
    println!("[sanity {}]", snapshot.state.sanity);

    for (i, view) in snapshot.choices.iter().enumerate() {
        match &view.gate.block_reason {
            None => println!("{}. {}", i + 1, view.choice.text),
            Some(reason) => println!("{}. {} (locked: {})", i + 1, view.choice.text, reason),
        }
    }
}

/// Display debug information (only when --debug is set)
fn display_debug_info(state: &PlayerState) {
    println!("[debug]");
    println!("passage={}", state.current_passage_id);
    println!("history={}", state.history.len());
    let items: Vec<&str> = state.inventory.iter().map(|i| i.as_str()).collect();
    println!("inventory=[{}]", items.join(", "));
    for (name, value) in &state.flags {
        println!("flag {name}={value}");
    }
    for (name, value) in &state.variables {
        println!("var {name}={}", describe_value(value));
    }
}

fn describe_value(value: &StoryValue) -> String {
    match value {
        StoryValue::Boolean(b) => format!("{b} (bool)"),
        StoryValue::Integer(i) => format!("{i} (int)"),
        StoryValue::Text(s) => format!("{s:?} (text)"),
    }
}

/// Get user input with an optional prompt
fn get_input(prompt: &str) -> io::Result<String> {
    if !prompt.is_empty() {
        print!("{} ", prompt);
        io::stdout().flush()?;
    }

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        // End of input quits
        return Ok("q".to_string());
    }
    Ok(input.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variables_render_with_their_type() {
        assert_eq!(describe_value(&StoryValue::from(3_i64)), "3 (int)");
        assert_eq!(describe_value(&StoryValue::from(true)), "true (bool)");
        assert_eq!(describe_value(&StoryValue::from("Eve")), "\"Eve\" (text)");
    }
}
