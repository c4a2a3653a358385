//! CLI entry point for edens-hollow
//!
//! Plays bundled stories in the terminal and checks authored story files.

use edens_hollow::cli::{check::run_check, logger, play::PlayOptions, play::run_play};
use edens_hollow::library::StoryLibrary;
use edens_hollow::types::StoryId;
use std::path::PathBuf;
use std::process;

const DEFAULT_STORY: &str = "edens-hollow";

fn main() {
    logger::init();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "play" => run_play_command(&args[2..]),
        "list" => run_list(),
        "check" => match args.get(2) {
            Some(path) => match run_check(&PathBuf::from(path)) {
                Ok(true) => Ok(()),
                Ok(false) => process::exit(2),
                Err(err) => Err(err),
            },
            None => {
                eprintln!("Error: Missing story file path");
                eprintln!();
                print_usage();
                process::exit(1);
            }
        },
        "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        command => {
            eprintln!("Error: Unknown command '{}'", command);
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    if let Err(err) = result {
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}

fn print_usage() {
    println!("edens-hollow - Interactive horror fiction engine");
    println!();
    println!("USAGE:");
    println!("    edens-hollow play [story-id] [--save-dir <dir>] [--new] [--debug]");
    println!("    edens-hollow list");
    println!("    edens-hollow check <story.json>");
    println!();
    println!("COMMANDS:");
    println!("    play     Play a bundled story in the terminal");
    println!("    list     List bundled stories");
    println!("    check    Validate and lint a story file");
    println!();
    println!("OPTIONS:");
    println!("    --save-dir <dir>   Save and resume sessions in <dir>");
    println!("    --new              Start over even if a save exists");
    println!("    --debug            Show player state after every passage");
    println!();
    println!("ENVIRONMENT:");
    println!("    HOLLOW_LOG            log filter, e.g. debug or edens_hollow::engine=trace");
    println!("    HOLLOW_AUTOSAVE       0 to disable automatic saves");
    println!("    HOLLOW_SESSION_KEY    save slot name");
    println!("    HOLLOW_HISTORY_LIMIT  passages remembered for going back");
}

fn run_play_command(args: &[String]) -> anyhow::Result<()> {
    let mut options = PlayOptions {
        story_id: StoryId::from(DEFAULT_STORY),
        save_dir: None,
        new_game: false,
        debug: false,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--save-dir" => match iter.next() {
                Some(dir) => options.save_dir = Some(PathBuf::from(dir)),
                None => anyhow::bail!("--save-dir needs a directory"),
            },
            "--new" => options.new_game = true,
            "--debug" => options.debug = true,
            flag if flag.starts_with("--") => anyhow::bail!("unknown option '{}'", flag),
            id => options.story_id = StoryId::from(id),
        }
    }

    let library = StoryLibrary::bundled()?;
    if !library.contains(&options.story_id) {
        let known: Vec<&str> = library.ids().map(StoryId::as_str).collect();
        anyhow::bail!(
            "unknown story '{}' (available: {})",
            options.story_id,
            known.join(", ")
        );
    }
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_play(library, options))
}

fn run_list() -> anyhow::Result<()> {
    let library = StoryLibrary::bundled()?;
    for story in library.stories() {
        println!("{:<16} {} by {}", story.id().as_str(), story.title(), story.author());
        if let Some(description) = story.description() {
            println!("{:<16} {}", "", description);
        }
    }
    Ok(())
}
