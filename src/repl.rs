//! Interactive calculator loop.
//!
//! Reads lines from stdin. Keypad input (`12+7=`, `sqrt`, `m+`, ...) is fed to
//! the calculator key by key; anything else is treated as a command. While
//! the display shows an error the loop also waits on the reset deadline so
//! the error clears without further input.

use crate::cli::{is_yes, print_history, print_notice, print_theme, write_export};
use anyhow::{Context, Result};
use std::io::Write;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;
use zcalc::app::{CLEAR_HISTORY_MESSAGE, CLEAR_HISTORY_TITLE};
use zcalc::calculator::{copy_to_clipboard, looks_like_keys, parse_keys};
use zcalc::storage::Storage;
use zcalc::{App, Notice};

type Input = Lines<BufReader<Stdin>>;

const HELP: &str = "\
Keys:      0-9 .  + - * /  =  %  sq  sqrt  c (clear)  del (backspace)
Memory:    mr  m+  mc
History:   history  search <term>  reuse <n>  delete <n>  clear-history  export [file]  stats
Settings:  prefs  set <key> <value>  toggle <key>  reset-colors  theme
Other:     copy  help  quit";

enum Flow {
    Continue,
    Quit,
}

pub async fn run<S: Storage>(app: &mut App<S>) -> Result<()> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    println!("zcalc. Type 'help' for commands, 'quit' to leave.");
    render(app);

    loop {
        let deadline = app.error_deadline();
        let line = tokio::select! {
            line = input.next_line() => line.context("Failed to read input")?,
            _ = wait_until(deadline) => {
                if app.tick(Instant::now()) {
                    render(app);
                }
                continue;
            }
        };

        let Some(line) = line else {
            break;
        };

        let flow = handle_line(app, line.trim(), &mut input).await?;
        app.save().context("Failed to save state")?;

        if let Flow::Quit = flow {
            break;
        }
    }

    Ok(())
}

/// Resolve at `deadline`, or never if there is none.
async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
        None => std::future::pending().await,
    }
}

async fn handle_line<S: Storage>(
    app: &mut App<S>,
    line: &str,
    input: &mut Input,
) -> Result<Flow> {
    if line.is_empty() {
        render(app);
        return Ok(Flow::Continue);
    }

    if looks_like_keys(line) {
        for key in line.split_whitespace().filter_map(parse_keys).flatten() {
            if let Some(notice) = app.press(key) {
                if notice.is_error() && app.preferences().sound_enabled {
                    print!("\x07");
                }
                print_notice(&notice);
            }
        }
        render(app);
        return Ok(Flow::Continue);
    }

    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    debug!(command, "repl command");

    match command {
        "quit" | "exit" | "q" => return Ok(Flow::Quit),
        "help" | "?" => println!("{}", HELP),
        "history" => print_history(app, ""),
        "search" => print_history(app, rest),
        "stats" => {
            let stats = app.history_stats();
            println!("Total: {}  Today: {}", stats.total, stats.today);
        }
        "reuse" => match parse_position(rest) {
            Some(index) => {
                report(app.reuse(index).map_err(|e| Notice::error(e.to_string())));
                render(app);
            }
            None => print_notice(&Notice::error("Usage: reuse <n>")),
        },
        "delete" => match parse_position(rest) {
            Some(index) => {
                report(app.delete_history(index).map_err(|e| Notice::error(e.to_string())))
            }
            None => print_notice(&Notice::error("Usage: delete <n>")),
        },
        "clear-history" => {
            if app.history().is_empty() {
                print_notice(&Notice::info("History is already empty"));
            } else {
                let accepted = ask(input, CLEAR_HISTORY_TITLE, CLEAR_HISTORY_MESSAGE).await?;
                if let Some(notice) = app.clear_history(|_, _| accepted) {
                    print_notice(&notice);
                }
            }
        }
        "export" => match app.export_history() {
            Ok(text) => {
                let output = (!rest.is_empty()).then(|| rest.into());
                let path = write_export(&text, output)?;
                print_notice(&Notice::success(format!(
                    "History exported to {}",
                    path.display()
                )));
            }
            Err(e) => print_notice(&Notice::error(e.to_string())),
        },
        "copy" => {
            let value = app.calculator().state().current_operand.clone();
            match copy_to_clipboard(&value) {
                Ok(()) => print_notice(&Notice::success(format!("Copied {}", value))),
                Err(e) => print_notice(&Notice::error(e.to_string())),
            }
        }
        "prefs" => println!("{}", serde_json::to_string_pretty(app.preferences())?),
        "set" => {
            let (key, value) = rest.split_once(' ').unwrap_or((rest, ""));
            match app.set_preference(key, value) {
                Ok(()) => render(app),
                Err(e) => print_notice(&Notice::error(e.to_string())),
            }
        }
        "toggle" => match rest.parse() {
            Ok(toggle) => {
                if let Some(notice) = app.toggle(toggle) {
                    print_notice(&notice);
                }
                render(app);
            }
            Err(e) => print_notice(&Notice::error(format!("{}", e))),
        },
        "reset-colors" => print_notice(&app.reset_colors()),
        "theme" => {
            app.toggle_theme();
            print_theme(app);
        }
        _ => print_notice(&Notice::error(format!(
            "Unknown input '{}'. Type 'help' for commands.",
            line
        ))),
    }

    Ok(Flow::Continue)
}

/// Parse a 1-based position as shown by `history`.
fn parse_position(text: &str) -> Option<usize> {
    text.parse::<usize>().ok()?.checked_sub(1)
}

fn report(outcome: Result<Notice, Notice>) {
    match outcome {
        Ok(notice) | Err(notice) => print_notice(&notice),
    }
}

async fn ask(input: &mut Input, title: &str, message: &str) -> Result<bool> {
    print!("{}: {} [y/N] ", title, message);
    std::io::stdout().flush()?;
    let answer = input.next_line().await.context("Failed to read input")?;
    Ok(answer.as_deref().is_some_and(is_yes))
}

fn render<S: Storage>(app: &App<S>) {
    let display = app.display();
    let width = display.current.chars().count().max(display.previous.chars().count());

    if !display.previous.is_empty() {
        println!("  {:>width$}", display.previous, width = width);
    }
    println!("= {:>width$}", display.current, width = width);
    if let Some(memory) = display.memory {
        println!("  {}", memory);
    }

    if app.preferences().show_history
        && let Some(last) = app.history().get(0)
    {
        let fmt = app.preferences().formatting();
        println!(
            "  last: {} = {}",
            last.expression,
            fmt.display(&last.result_text())
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("1"), Some(0));
        assert_eq!(parse_position("12"), Some(11));
        assert_eq!(parse_position("0"), None);
        assert_eq!(parse_position("x"), None);
    }
}
