//! Message classifier: maps chat text to exactly one [`ParsedCommand`].
//!
//! Two parallel grammars are supported: pipe-delimited shorthand
//! (`add:Title|YYYY-MM-DD|Desc`, `delete:Title`) and natural-language
//! keyword phrases. Classification is an ordered list of pure matcher
//! rules, tried in priority order with first-match-wins; shorthand comes
//! first, and a malformed shorthand falls through to the natural-language
//! rules rather than failing. No rule matching at all yields
//! [`ParsedCommand::Unrecognized`] so callers can render help text.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::event::Frequency;
use crate::grammar::{self, find_date_time};
use crate::plan::Plan;

/// A chat message resolved to a typed command.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedCommand {
    List {
        date_filter: Option<NaiveDate>,
    },
    Summarize,
    Add {
        title: String,
        date: NaiveDate,
        time: Option<NaiveTime>,
        end_time: Option<NaiveTime>,
        description: Option<String>,
    },
    Delete {
        title: String,
    },
    SetRecurrence {
        title: String,
        frequency: Frequency,
        interval: u32,
    },
    ResearchAndBreakdown {
        goal: String,
        deadline: NaiveDate,
    },
    CreateTasks {
        plan: Plan,
    },
    Unrecognized {
        original: String,
    },
}

type Rule = fn(&str, NaiveDate) -> Option<ParsedCommand>;

/// Matcher rules in priority order; first match wins.
const RULES: [Rule; 6] = [
    shorthand_add,
    shorthand_delete,
    list_rule,
    summarize_rule,
    natural_add,
    natural_delete,
];

/// Classify a message. Pure function of (text, today); never fails.
pub fn classify(text: &str, today: NaiveDate) -> ParsedCommand {
    let trimmed = text.trim();
    for rule in RULES {
        if let Some(cmd) = rule(trimmed, today) {
            return cmd;
        }
    }
    ParsedCommand::Unrecognized {
        original: trimmed.to_string(),
    }
}

static LIST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\blist\b|\bwhat'?s on\b").unwrap());

static ADD_VERB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:add|create|schedule)\b[:\s]*(.*)$").unwrap());

static TRAILING_PREP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:on|for|at|from)\s*$").unwrap());

static DESC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:about|with|desc:|description:)\s*(.+)$").unwrap());

static DELETE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:delete|remove|cancel)\s+(?:the\s+)?(?:event\s+)?(.+)$").unwrap()
});

/// `add:Title|YYYY-MM-DD[ HH:MM]|Description` (also `create:`/`schedule:`).
fn shorthand_add(text: &str, _today: NaiveDate) -> Option<ParsedCommand> {
    let low = text.to_lowercase();
    let rest = ["add:", "create:", "schedule:"]
        .iter()
        .find_map(|prefix| low.starts_with(prefix).then(|| &text[prefix.len()..]))?;

    let mut parts = rest.splitn(3, '|');
    let title = parts.next()?.trim();
    let date_part = parts.next()?.trim();
    let description = parts.next().map(str::trim).unwrap_or("");

    let (date, time) = parse_shorthand_date(date_part)?;

    Some(ParsedCommand::Add {
        title: title.to_string(),
        date,
        time,
        end_time: None,
        description: (!description.is_empty()).then(|| description.to_string()),
    })
}

fn parse_shorthand_date(s: &str) -> Option<(NaiveDate, Option<NaiveTime>)> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
        return Some((dt.date(), Some(dt.time())));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| (d, None))
}

fn shorthand_delete(text: &str, _today: NaiveDate) -> Option<ParsedCommand> {
    let rest = text
        .to_lowercase()
        .starts_with("delete:")
        .then(|| &text["delete:".len()..])?;
    Some(ParsedCommand::Delete {
        title: rest.trim().to_string(),
    })
}

fn list_rule(text: &str, today: NaiveDate) -> Option<ParsedCommand> {
    if !LIST_RE.is_match(text) {
        return None;
    }
    Some(ParsedCommand::List {
        date_filter: find_date_time(text, today).map(|m| m.date),
    })
}

fn summarize_rule(text: &str, _today: NaiveDate) -> Option<ParsedCommand> {
    let low = text.to_lowercase();
    ["summarize", "summary", "coming up", "upcoming", "brief"]
        .iter()
        .any(|k| low.contains(k))
        .then_some(ParsedCommand::Summarize)
}

/// "Add Meeting on 2026-02-01 at 14:30 about planning" and friends.
///
/// The title is the text between the verb and the date token, with time
/// tokens and trailing prepositions removed; the description is whatever
/// follows `about`/`with` after the date. A verb with no recognizable date
/// does not match, so the help text (which names the date forms) is shown.
fn natural_add(text: &str, today: NaiveDate) -> Option<ParsedCommand> {
    let caps = ADD_VERB_RE.captures(text)?;
    let rest = caps.get(1).map_or("", |m| m.as_str());

    let m = find_date_time(rest, today)?;

    let mut title = grammar::strip_time_tokens(&rest[..m.span.0])
        .trim()
        .to_string();
    while let Some(found) = TRAILING_PREP_RE.find(&title) {
        title.truncate(found.start());
        title = title.trim_end().to_string();
    }

    let after = &rest[m.span.1..];
    let description = DESC_RE
        .captures(after)
        .map(|c| c[1].trim().to_string())
        .filter(|d| !d.is_empty());

    Some(ParsedCommand::Add {
        title,
        date: m.date,
        time: m.time,
        end_time: m.end_time,
        description,
    })
}

fn natural_delete(text: &str, _today: NaiveDate) -> Option<ParsedCommand> {
    let caps = DELETE_RE.captures(text)?;
    Some(ParsedCommand::Delete {
        title: caps[1].trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_shorthand_add() {
        let cmd = classify("add:Board Game Night|2026-02-01|Bring snacks", today());
        assert_eq!(
            cmd,
            ParsedCommand::Add {
                title: "Board Game Night".to_string(),
                date: date(2026, 2, 1),
                time: None,
                end_time: None,
                description: Some("Bring snacks".to_string()),
            }
        );
    }

    #[test]
    fn test_shorthand_add_with_time_and_trimming() {
        let cmd = classify("add: Dinner | 2026-02-01 18:30 | ", today());
        assert_eq!(
            cmd,
            ParsedCommand::Add {
                title: "Dinner".to_string(),
                date: date(2026, 2, 1),
                time: Some(time(18, 30)),
                end_time: None,
                description: None,
            }
        );
    }

    #[test]
    fn test_malformed_shorthand_falls_through() {
        // bad date in shorthand, but a usable natural-language date follows
        let cmd = classify("add:Party|someday tomorrow", today());
        assert!(matches!(cmd, ParsedCommand::Add { ref title, .. } if title == "Party|someday"));

        // no pipe at all: this is just a natural add
        let cmd = classify("add:Party", today());
        assert_eq!(
            cmd,
            ParsedCommand::Unrecognized {
                original: "add:Party".to_string()
            }
        );
    }

    #[test]
    fn test_shorthand_delete() {
        let cmd = classify("delete:Board Game Night", today());
        assert_eq!(
            cmd,
            ParsedCommand::Delete {
                title: "Board Game Night".to_string()
            }
        );
    }

    #[test]
    fn test_list_variants() {
        assert_eq!(
            classify("list", today()),
            ParsedCommand::List { date_filter: None }
        );
        assert_eq!(
            classify("list events", today()),
            ParsedCommand::List { date_filter: None }
        );
        assert_eq!(
            classify("What's on 2026-01-01?", today()),
            ParsedCommand::List {
                date_filter: Some(date(2026, 1, 1))
            }
        );
    }

    #[test]
    fn test_summarize_variants() {
        for msg in ["summarize", "summary please", "what's coming up?", "anything upcoming?"] {
            assert_eq!(classify(msg, today()), ParsedCommand::Summarize, "{msg}");
        }
    }

    #[test]
    fn test_natural_add_with_time() {
        let cmd = classify("Add Meeting on 2026-02-01 at 14:30", today());
        assert_eq!(
            cmd,
            ParsedCommand::Add {
                title: "Meeting".to_string(),
                date: date(2026, 2, 1),
                time: Some(time(14, 30)),
                end_time: None,
                description: None,
            }
        );
    }

    #[test]
    fn test_natural_add_with_range() {
        let cmd = classify("Add Meeting on 2026-02-01 from 3pm to 5pm", today());
        assert_eq!(
            cmd,
            ParsedCommand::Add {
                title: "Meeting".to_string(),
                date: date(2026, 2, 1),
                time: Some(time(15, 0)),
                end_time: Some(time(17, 0)),
                description: None,
            }
        );
    }

    #[test]
    fn test_natural_add_with_description() {
        let cmd = classify("Create Birthday on March 5 about cake and candles", today());
        assert_eq!(
            cmd,
            ParsedCommand::Add {
                title: "Birthday".to_string(),
                date: date(2026, 3, 5),
                time: None,
                end_time: None,
                description: Some("cake and candles".to_string()),
            }
        );
    }

    #[test]
    fn test_natural_add_tomorrow() {
        let cmd = classify("Add Lunch tomorrow", today());
        assert_eq!(
            cmd,
            ParsedCommand::Add {
                title: "Lunch".to_string(),
                date: date(2026, 1, 16),
                time: None,
                end_time: None,
                description: None,
            }
        );
    }

    #[test]
    fn test_natural_delete() {
        assert_eq!(
            classify("delete Meeting", today()),
            ParsedCommand::Delete {
                title: "Meeting".to_string()
            }
        );
        assert_eq!(
            classify("remove the event Board Game Night", today()),
            ParsedCommand::Delete {
                title: "Board Game Night".to_string()
            }
        );
    }

    #[test]
    fn test_add_without_date_is_unrecognized() {
        assert_eq!(
            classify("Add Meeting", today()),
            ParsedCommand::Unrecognized {
                original: "Add Meeting".to_string()
            }
        );
    }

    #[test]
    fn test_unrecognized_carries_original_text() {
        assert_eq!(
            classify("  blah blah  ", today()),
            ParsedCommand::Unrecognized {
                original: "blah blah".to_string()
            }
        );
    }

    #[test]
    fn test_list_keyword_requires_word_boundary() {
        // "Listening" must not trigger the list rule
        let cmd = classify("Add Listening party on 2026-02-01", today());
        assert!(matches!(cmd, ParsedCommand::Add { ref title, .. } if title == "Listening party"));
    }
}
