//! `vocab` command-line front end.
//!
//! # Responsibility
//! - Drive the same core services the mobile UI uses, one command per use-case.
//! - Honor the undo window on deletes with an interactive prompt.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::debug;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use vocab_core::config::ENV_DATA_DIR;
use vocab_core::db::open_db;
use vocab_core::{
    bootstrap, init_logging, AppConfig, CommitOutcome, DeletionScheduler, ExportService, FontSize,
    LogLevel, PreferencesStore, SqliteVocabularyRepository, SqliteWordRepository, Vocabulary,
    VocabularyService, WordRepository, WordService,
};

#[derive(Parser)]
#[command(name = "vocab")]
#[command(about = "Personal vocabulary manager", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Data directory (database, exports, logs, preferences)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List vocabularies in creation order
    List,
    /// Create a vocabulary
    Create { name: String },
    /// Rename a vocabulary (its words are kept)
    Rename { id: i64, new_name: String },
    /// Delete a vocabulary and all of its words
    Delete(DeleteArgs),
    /// List the words of a vocabulary by headword
    Words { vocabulary: i64 },
    /// Add a word; meanings are comma separated
    Add(WordArgs),
    /// Replace the headword and meanings of a word
    Edit {
        vocabulary: i64,
        word: i64,
        #[command(flatten)]
        content: WordArgsContent,
    },
    /// Delete one word
    #[command(name = "remove-word")]
    RemoveWord {
        vocabulary: i64,
        word: i64,
        /// Skip the undo prompt
        #[arg(long)]
        yes: bool,
    },
    /// Export a vocabulary to `<name>.csv`
    Export {
        vocabulary: i64,
        /// Export root (defaults to `<data dir>/exports`)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Show the font size, or set it to LEVEL (1-5)
    #[command(name = "font-size")]
    FontSize { level: Option<u8> },
    /// Restore default settings
    #[command(name = "reset-settings")]
    ResetSettings,
}

#[derive(Args)]
struct DeleteArgs {
    id: i64,
    /// Skip the undo prompt
    #[arg(long)]
    yes: bool,
}

#[derive(Args)]
struct WordArgs {
    vocabulary: i64,
    #[command(flatten)]
    content: WordArgsContent,
}

#[derive(Args)]
struct WordArgsContent {
    headword: String,
    /// Comma separated meanings, e.g. "to run, to jog"
    #[arg(default_value = "")]
    meanings: String,
}

fn main() {
    if let Err(err) = run(Cli::parse()) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;
    start_logging(&config, cli.verbose);

    let store = PreferencesStore::new(&config.preferences_path);
    match cli.command {
        Command::FontSize { level } => return font_size(&store, level),
        Command::ResetSettings => {
            let preferences = store.restore_defaults()?;
            println!("Settings restored. Font size {} pt.", preferences.font_size.points());
            return Ok(());
        }
        _ => {}
    }

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open `{}`", config.db_path.display()))?;
    let report = bootstrap(&conn, &store, config.seed_on_first_run)?;
    if report.first_run && report.seeded_vocabularies > 0 {
        println!(
            "Created {} sample vocabularies with {} words.",
            report.seeded_vocabularies, report.seeded_words
        );
    }

    let vocabularies = VocabularyService::new(SqliteVocabularyRepository::try_new(&conn)?);
    let words = WordService::new(SqliteWordRepository::try_new(&conn)?);

    match cli.command {
        Command::List => {
            for vocabulary in vocabularies.list_vocabularies()? {
                let count = words.count_words(&vocabulary.table)?;
                println!(
                    "{}\t{}\t{}\t{count} words",
                    vocabulary.id, vocabulary.name, vocabulary.table
                );
            }
        }
        Command::Create { name } => {
            let created = vocabularies.create_vocabulary(&name)?;
            println!("Created {} (table {}).", created.name, created.table);
        }
        Command::Rename { id, new_name } => {
            let renamed = vocabularies.rename_vocabulary(id, &new_name)?;
            println!("Renamed to {}.", renamed.name);
        }
        Command::Delete(args) => {
            let vocabulary = vocabularies.require_vocabulary(args.id)?;
            let label = vocabulary.name.clone();
            delete_with_undo(vocabulary, &label, config.undo_window, args.yes, |item| {
                vocabularies.delete_vocabulary(&item.table)
            })?;
        }
        Command::Words { vocabulary } => {
            let vocabulary = vocabularies.require_vocabulary(vocabulary)?;
            for word in words.list_words(&vocabulary.table)? {
                let meanings = word.meaning_list().unwrap_or_default().join(", ");
                println!("{}\t{}\t{meanings}", word.id, word.headword);
            }
        }
        Command::Add(args) => {
            let vocabulary = vocabularies.require_vocabulary(args.vocabulary)?;
            let word = words.add_word(
                &vocabulary.table,
                &args.content.headword,
                &args.content.meanings,
            )?;
            println!("Added {} ({}).", word.headword, word.id);
        }
        Command::Edit {
            vocabulary,
            word,
            content,
        } => {
            let vocabulary = vocabularies.require_vocabulary(vocabulary)?;
            let updated =
                words.update_word(&vocabulary.table, word, &content.headword, &content.meanings)?;
            println!("Updated {} ({}).", updated.headword, updated.id);
        }
        Command::RemoveWord {
            vocabulary,
            word,
            yes,
        } => {
            let vocabulary = vocabularies.require_vocabulary(vocabulary)?;
            let word = words
                .get_word(&vocabulary.table, word)?
                .ok_or_else(|| anyhow!("word {word} not found in {}", vocabulary.name))?;
            let label = word.headword.clone();
            delete_with_undo(word, &label, config.undo_window, yes, |item| {
                words.delete_word(&vocabulary.table, item.id)
            })?;
        }
        Command::Export { vocabulary, dir } => {
            let vocabulary = vocabularies.require_vocabulary(vocabulary)?;
            let exporter = ExportService::new(
                SqliteWordRepository::try_new(&conn)?,
                dir.unwrap_or(config.export_dir),
            );
            export(&exporter, &vocabulary)?;
        }
        Command::FontSize { .. } | Command::ResetSettings => {}
    }
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let data_dir = match &cli.data_dir {
        Some(dir) if dir.is_relative() => Some(
            std::env::current_dir()
                .context("failed to resolve current directory")?
                .join(dir),
        ),
        other => other.clone(),
    };
    Ok(AppConfig::from_lookup(|key| match (&data_dir, key) {
        (Some(dir), ENV_DATA_DIR) => Some(dir.display().to_string()),
        _ => std::env::var(key).ok(),
    }))
}

fn start_logging(config: &AppConfig, verbose: bool) {
    let level = if verbose {
        LogLevel::Debug
    } else {
        config.log_level
    };
    if let Err(err) = init_logging(level, &config.log_dir) {
        eprintln!("warning: file logging disabled: {err}");
    }
}

/// Hides `item` for the undo window, then commits `commit` unless the user
/// types `u`. Closed stdin commits at once.
fn delete_with_undo<T, E: std::fmt::Display>(
    item: T,
    label: &str,
    window: Duration,
    skip_prompt: bool,
    commit: impl FnMut(&T) -> Result<(), E>,
) -> Result<()> {
    let mut scheduler = DeletionScheduler::new(window);
    let ticket = scheduler.schedule(item, 0);
    println!("{label} was removed.");

    if !skip_prompt {
        println!("Type u and press Enter within {} ms to undo.", window.as_millis());
        match wait_for_undo(window) {
            UndoAnswer::Undo => match scheduler.undo(ticket) {
                Ok(_) => {
                    println!("{label} was restored.");
                    return Ok(());
                }
                Err(err) => println!("Too late to undo: {err}."),
            },
            UndoAnswer::TimedOut => {}
            UndoAnswer::NoInput => debug!("event=undo_prompt module=cli status=ok input=closed"),
        }
    }

    let outcomes = scheduler.commit_all(commit);
    for outcome in outcomes {
        if let CommitOutcome::Failed { error, .. } = outcome {
            bail!("failed to delete {label}: {error}");
        }
    }
    Ok(())
}

enum UndoAnswer {
    Undo,
    TimedOut,
    NoInput,
}

fn wait_for_undo(window: Duration) -> UndoAnswer {
    let deadline = Instant::now() + window;
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(line) if line.trim().eq_ignore_ascii_case("u") => return UndoAnswer::Undo,
            Ok(_) => continue,
            Err(RecvTimeoutError::Timeout) => return UndoAnswer::TimedOut,
            Err(RecvTimeoutError::Disconnected) => return UndoAnswer::NoInput,
        }
    }
}

fn export<R: WordRepository>(exporter: &ExportService<R>, vocabulary: &Vocabulary) -> Result<()> {
    match exporter.export(vocabulary) {
        Ok(export) => {
            println!("File has been saved. {}", export.path.display());
            Ok(())
        }
        Err(err) => bail!("File wasn't saved. {err}"),
    }
}

fn font_size(store: &PreferencesStore, level: Option<u8>) -> Result<()> {
    let size = match level {
        Some(level) => store.set_font_size(level)?,
        None => store.font_size()?,
    };
    print_font_size(size);
    Ok(())
}

fn print_font_size(size: FontSize) {
    println!("Font size level {} ({} pt).", size.level(), size.points());
}
