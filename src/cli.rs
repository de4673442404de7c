//! Command-line interface.

use crate::repl;
use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::debug;
use zcalc::calculator::{Key, Operator, copy_to_clipboard};
use zcalc::config::Config;
use zcalc::error::HistoryError;
use zcalc::history::export_file_name;
use zcalc::preferences::Toggle;
use zcalc::storage::{FileStorage, Storage};
use zcalc::{App, Notice};

#[derive(Parser)]
#[command(name = "zcalc", version)]
#[command(about = "Arithmetic calculator with history, memory and preferences")]
pub struct Args {
    /// Directory holding saved history, preferences and memory
    #[arg(long, env = "ZCALC_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Config file (defaults to <config dir>/zcalc/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the interactive calculator (default)
    Repl,

    /// Evaluate one binary operation, e.g. `zcalc eval 5 + 3`
    #[command(allow_negative_numbers = true)]
    Eval {
        lhs: String,
        /// One of + - × ÷ (or * and /)
        #[arg(allow_hyphen_values = true)]
        op: Operator,
        rhs: String,
    },

    /// Divide a number by 100
    #[command(allow_negative_numbers = true)]
    Percent { value: String },

    /// Square a number
    #[command(allow_negative_numbers = true)]
    Square { value: String },

    /// Square root of a number
    #[command(allow_negative_numbers = true)]
    Sqrt { value: String },

    /// Inspect or edit the calculation history
    #[command(subcommand)]
    History(HistoryCommand),

    /// Inspect or edit the memory register
    #[command(subcommand)]
    Memory(MemoryCommand),

    /// Inspect or edit preferences
    #[command(subcommand)]
    Prefs(PrefsCommand),

    /// Show or switch the color theme
    #[command(subcommand)]
    Theme(ThemeCommand),
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// List all entries, newest first
    List,
    /// List entries whose expression or result contains TERM
    Search { term: String },
    /// Delete the entry at POSITION (as numbered by `list`)
    Delete { position: usize },
    /// Remove every entry
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Write the history as a text report
    Export {
        /// Output file (defaults to calculator-history-<date>.txt)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Copy the report to the clipboard instead of writing a file
        #[arg(long)]
        copy: bool,
    },
    /// Show how many calculations were made in total and today
    Stats,
}

#[derive(Subcommand)]
pub enum MemoryCommand {
    Show,
    /// Add a number to memory
    #[command(allow_negative_numbers = true)]
    Add { value: String },
    Clear,
}

#[derive(Subcommand)]
pub enum PrefsCommand {
    Show,
    /// Set a preference by its key, e.g. `decimalPlaces 2`
    Set { key: String, value: String },
    /// Flip a boolean preference
    Toggle { key: String },
    /// Restore the default colors
    ResetColors,
}

#[derive(Subcommand)]
pub enum ThemeCommand {
    Show,
    Toggle,
}

pub async fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let data_dir = config.resolve_data_dir(args.data_dir);
    debug!(path = %data_dir.display(), "using data directory");

    let mut app = App::load(FileStorage::new(data_dir), config.error_reset())
        .context("Failed to load saved state")?;

    match args.command.unwrap_or(Command::Repl) {
        Command::Repl => repl::run(&mut app).await?,
        Command::Eval { lhs, op, rhs } => {
            enter(&mut app, &lhs)?;
            press(&mut app, Key::Operator(op))?;
            enter(&mut app, &rhs)?;
            press(&mut app, Key::Evaluate)?;
            println!("{}", app.display().current);
        }
        Command::Percent { value } => unary(&mut app, &value, Key::Percent)?,
        Command::Square { value } => unary(&mut app, &value, Key::Square)?,
        Command::Sqrt { value } => unary(&mut app, &value, Key::SquareRoot)?,
        Command::History(command) => history(&mut app, command)?,
        Command::Memory(command) => memory(&mut app, command)?,
        Command::Prefs(command) => prefs(&mut app, command)?,
        Command::Theme(command) => theme(&mut app, command),
    }

    app.save().context("Failed to save state")
}

fn enter<S: Storage>(app: &mut App<S>, operand: &str) -> Result<()> {
    if !app.enter(operand) {
        bail!("'{}' is not a number", operand);
    }
    Ok(())
}

/// Press a key, turning an error notice into a command failure.
fn press<S: Storage>(app: &mut App<S>, key: Key) -> Result<()> {
    match app.press(key) {
        Some(notice) if notice.is_error() => bail!(notice.message),
        Some(notice) => print_notice(&notice),
        None => {}
    }
    Ok(())
}

fn unary<S: Storage>(app: &mut App<S>, value: &str, key: Key) -> Result<()> {
    enter(app, value)?;
    press(app, key)?;
    println!("{}", app.display().current);
    Ok(())
}

fn history<S: Storage>(app: &mut App<S>, command: HistoryCommand) -> Result<()> {
    match command {
        HistoryCommand::List => print_history(app, ""),
        HistoryCommand::Search { term } => print_history(app, &term),
        HistoryCommand::Delete { position } => {
            let index = position
                .checked_sub(1)
                .ok_or(HistoryError::NoSuchEntry(position))?;
            let notice = app.delete_history(index)?;
            print_notice(&notice);
        }
        HistoryCommand::Clear { yes } => {
            if app.history().is_empty() {
                println!("History is already empty");
                return Ok(());
            }
            let notice =
                app.clear_history(|title, message| yes || confirm_on_stdin(title, message));
            if let Some(notice) = notice {
                print_notice(&notice);
            }
        }
        HistoryCommand::Export { output, copy } => {
            let report = app.export_history()?;
            if copy {
                copy_to_clipboard(&report)?;
                println!("History copied to clipboard");
            } else {
                let path = write_export(&report, output)?;
                println!("History exported to {}", path.display());
            }
        }
        HistoryCommand::Stats => {
            let stats = app.history_stats();
            println!("Total: {}", stats.total);
            println!("Today: {}", stats.today);
        }
    }
    Ok(())
}

fn memory<S: Storage>(app: &mut App<S>, command: MemoryCommand) -> Result<()> {
    match command {
        MemoryCommand::Show => match app.display().memory {
            Some(indicator) => println!("{}", indicator),
            None => println!("Memory is empty"),
        },
        MemoryCommand::Add { value } => {
            enter(app, &value)?;
            press(app, Key::MemoryAdd)?;
        }
        MemoryCommand::Clear => press(app, Key::MemoryClear)?,
    }
    Ok(())
}

fn prefs<S: Storage>(app: &mut App<S>, command: PrefsCommand) -> Result<()> {
    match command {
        PrefsCommand::Show => {
            let json = serde_json::to_string_pretty(app.preferences())?;
            println!("{}", json);
        }
        PrefsCommand::Set { key, value } => app.set_preference(&key, &value)?,
        PrefsCommand::Toggle { key } => {
            let toggle: Toggle = key.parse()?;
            if let Some(notice) = app.toggle(toggle) {
                print_notice(&notice);
            }
        }
        PrefsCommand::ResetColors => print_notice(&app.reset_colors()),
    }
    Ok(())
}

fn theme<S: Storage>(app: &mut App<S>, command: ThemeCommand) {
    if let ThemeCommand::Toggle = command {
        app.toggle_theme();
    }
    print_theme(app);
}

pub fn print_theme<S: Storage>(app: &App<S>) {
    let theme = app.theme();
    println!("Theme: {}", theme.label());
    match app.preferences().palette(theme) {
        Some(palette) => {
            println!("Accent: {}", palette.accent_gradient());
            println!("Background: {}", palette.background_gradient());
        }
        None => println!("Using the built-in light colors"),
    }
    println!("Animation speed: {}", app.preferences().animation_speed());
}

/// Print entries matching `term`, numbered by their position in the full history.
pub fn print_history<S: Storage>(app: &App<S>, term: &str) {
    let fmt = app.preferences().formatting();
    let matches = app.search_history(term);
    if matches.is_empty() {
        println!("No calculations found");
        return;
    }
    for (index, entry) in matches {
        println!(
            "{:>3}. {} = {}    {}",
            index + 1,
            entry.expression,
            fmt.display(&entry.result_text()),
            entry.display_time()
        );
    }
}

/// Write an export report, returning where it went.
pub fn write_export(report: &str, output: Option<PathBuf>) -> Result<PathBuf> {
    let path =
        output.unwrap_or_else(|| PathBuf::from(export_file_name(Local::now().date_naive())));
    std::fs::write(&path, report)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

pub fn print_notice(notice: &Notice) {
    if notice.is_error() {
        eprintln!("{}", notice.message);
    } else {
        println!("{}", notice.message);
    }
}

fn confirm_on_stdin(title: &str, message: &str) -> bool {
    print!("{}: {} [y/N] ", title, message);

    let mut answer = String::new();
    let read = std::io::stdout()
        .flush()
        .and_then(|()| std::io::stdin().lock().read_line(&mut answer));
    read.is_ok() && is_yes(&answer)
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use zcalc::storage::MemoryStorage;

    #[test]
    fn test_eval_args_parse() {
        let args = Args::try_parse_from(["zcalc", "eval", "-4", "-", "2.5"]).unwrap();
        match args.command {
            Some(Command::Eval { lhs, op, rhs }) => {
                assert_eq!(lhs, "-4");
                assert_eq!(op, Operator::Subtract);
                assert_eq!(rhs, "2.5");
            }
            _ => panic!("expected eval"),
        }
    }

    #[test]
    fn test_default_command_is_repl() {
        let args = Args::try_parse_from(["zcalc", "--data-dir", "/tmp/x"]).unwrap();
        assert!(args.command.is_none());
        assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/x")));
    }

    #[test]
    fn test_history_clear_flag() {
        let args = Args::try_parse_from(["zcalc", "history", "clear", "--yes"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Command::History(HistoryCommand::Clear { yes: true }))
        ));
    }

    #[test]
    fn test_delete_position_is_one_based() {
        let storage = MemoryStorage::default();
        let mut app = App::load(storage, Duration::from_millis(10)).unwrap();
        assert!(app.enter("4"));
        press(&mut app, Key::Square).unwrap();

        let err = history(&mut app, HistoryCommand::Delete { position: 0 }).unwrap_err();
        assert_eq!(err.to_string(), "No history entry at position 0");
        assert_eq!(app.history().len(), 1);

        let err = history(&mut app, HistoryCommand::Delete { position: 2 }).unwrap_err();
        assert_eq!(err.to_string(), "No history entry at position 2");

        history(&mut app, HistoryCommand::Delete { position: 1 }).unwrap();
        assert!(app.history().is_empty());
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("nope"));
    }

    #[test]
    fn test_write_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let written = write_export("report", Some(path.clone())).unwrap();
        assert_eq!(written, path);
        assert_eq!(std::fs::read_to_string(path).unwrap(), "report");
    }
}
