use std::io::{self, BufRead, Write};

use anyhow::Result;
use chatcal_core::dispatch::Dispatcher;
use chatcal_core::protocol::{ToolRequest, ToolResponse};
use chrono::Local;
use tracing::debug;

/// JSON-lines tool server. Each stdin line is a `{"tool": ..., "input": ...}`
/// request; each stdout line is the matching `{"result": ...}` or
/// `{"error": ...}`. The store lives for the lifetime of the process, so a
/// client can add events in one call and export them in a later one.
pub fn run() -> Result<()> {
    let mut dispatcher = Dispatcher::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        debug!(line = %line, "tool request");

        let response = match serde_json::from_str::<ToolRequest>(&line) {
            Ok(request) => dispatcher.handle(&request, Local::now().date_naive()),
            Err(e) => ToolResponse::error(format!("Invalid request: {e}")),
        };

        writeln!(stdout, "{}", response.to_json())?;
        stdout.flush()?;
    }

    Ok(())
}
