use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use thumbkey::{parse_script, Keyboard, WordList, WordListSpellChecker};
use thumbkey_core::Config;

/// Replay thumb-key gestures against an in-memory text field.
///
/// Reads one command per line: `tap R C`, `swipe R C DIR`, `drag R C DX DY`,
/// `pick N`, `cursor START END`, `tick MS` or `show`. Each `show` prints the
/// field, keyboard mode and suggestions as a JSON line.
#[derive(Parser, Debug)]
#[command(name = "thumbkey", version, about)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Word list, `word<TAB>frequency` per line, instead of the built-in one
    #[arg(short, long)]
    words: Option<PathBuf>,

    /// Gesture script; stdin when omitted
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Run with the spell checker turned off
    #[arg(long)]
    no_spell_checker: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("thumbkey=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_toml(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };

    let checker = if args.no_spell_checker {
        WordListSpellChecker::disabled()
    } else {
        let words = match &args.words {
            Some(path) => WordList::load(path)?,
            None => WordList::builtin()?,
        };
        tracing::info!(words = words.len(), "word list loaded");
        WordListSpellChecker::new(words)
    };

    let script = match &args.script {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?,
        None => {
            let mut s = String::new();
            io::stdin().read_to_string(&mut s)?;
            s
        }
    };

    let commands = parse_script(&script)?;
    let mut keyboard = Keyboard::new(config, checker)?;
    for command in &commands {
        if let Some(snapshot) = keyboard.run(command)? {
            println!("{}", serde_json::to_string(&snapshot)?);
        }
    }
    Ok(())
}
