use anyhow::Result;
use chatcal_core::dispatch::Dispatcher;
use chrono::Local;

use crate::render;

/// One-shot: interpret a single message against a fresh calendar.
pub fn run(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        anyhow::bail!("No message given.\n\nExample:\n  chatcal message \"Add Birthday on 2026-02-01\"");
    }

    let mut dispatcher = Dispatcher::new();
    let reply = dispatcher.handle_message(text, Local::now().date_naive())?;
    println!("{}", render::reply(&reply));
    Ok(())
}
