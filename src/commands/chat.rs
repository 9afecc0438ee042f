use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use chatcal_core::dispatch::Dispatcher;
use chatcal_core::ics;
use chrono::Local;
use owo_colors::OwoColorize;

use crate::render;

/// Interactive loop. The calendar lives as long as the session; `export`
/// writes it out as ICS before it is gone.
pub fn run() -> Result<()> {
    let mut dispatcher = Dispatcher::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("{}", "chatcal".bold());
    println!("Type a message, 'export [path]' to save an ICS file, or 'quit' to leave.");

    loop {
        print!("{} ", ">".cyan());
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            break;
        }
        if let Some(rest) = strip_export(input) {
            export(dispatcher.store(), rest)?;
            continue;
        }

        let today = Local::now().date_naive();
        match dispatcher.handle_message(input, today) {
            Ok(reply) => println!("{}", render::reply(&reply)),
            Err(e) => println!("{}", e.to_string().red()),
        }
    }

    Ok(())
}

fn strip_export(input: &str) -> Option<&str> {
    let rest = input.strip_prefix("export")?;
    if rest.is_empty() || rest.starts_with(' ') {
        Some(rest.trim())
    } else {
        None
    }
}

fn export(store: &chatcal_core::store::EventStore, path: &str) -> Result<()> {
    let path = if path.is_empty() { "calendar.ics" } else { path };
    let ics = ics::export_calendar(store)?;
    std::fs::write(path, ics).with_context(|| format!("Failed to write {path}"))?;
    println!("Exported {} events to {}", store.len(), path.green());
    Ok(())
}
