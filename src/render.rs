//! Terminal rendering for chat replies.

use owo_colors::OwoColorize;

/// Colorize a dispatcher reply for the terminal. Replies are line-oriented:
/// a header line ending in ':' gets emphasis, event bullets keep their date
/// dimmed, everything else passes through.
pub fn reply(text: &str) -> String {
    let mut out = Vec::new();
    for line in text.lines() {
        if line.ends_with(':') && !line.starts_with('-') {
            out.push(line.bold().to_string());
        } else if let Some(rest) = line.strip_prefix("- ") {
            out.push(render_bullet(rest));
        } else {
            out.push(line.to_string());
        }
    }
    out.join("\n")
}

fn render_bullet(rest: &str) -> String {
    // "2026-02-01 14:30: Title - desc" -> dim the date/time prefix
    match rest.split_once(": ") {
        Some((when, what)) => format!("- {} {}", when.dimmed(), what),
        None => format!("- {rest}"),
    }
}
