//! Date/time grammar for free-form text.
//!
//! Finds at most one date token in a message (plus an optional time or time
//! range near it) and resolves it against a caller-supplied "today". Date
//! forms are tried most-specific first so an ISO date inside a longer phrase
//! is never shadowed by a looser month-name match:
//!
//! 1. ISO `YYYY-MM-DD`, optionally with an attached `HH:MM` / `THH:MM`
//! 2. `today` / `tomorrow`
//! 3. `MM/DD[/YYYY]` slash dates
//! 4. `March 5`, `Mar 5th`, `March 5, 2026` month-name dates
//!
//! This module never errors: out-of-range components (month 13, hour 25)
//! reject the candidate and garbled input yields `None`.

use std::sync::LazyLock;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use regex::Regex;

static ISO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})(?:[T ](\d{2}):(\d{2}))?\b").unwrap()
});

static RELATIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(today|tomorrow)\b").unwrap());

static SLASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{2,4}))?\b").unwrap());

static MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|jun(?:e)?|jul(?:y)?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\s+(\d{1,2})(?:st|nd|rd|th)?(?:,?\s+(\d{4}))?\b",
    )
    .unwrap()
});

// "3pm-5pm", "3:30pm to 5pm", "from 3 to 5pm" (a bare left side inherits the
// right side's meridiem)
static RANGE_12H_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:from\s+)?(\d{1,2})(?::(\d{2}))?\s*(am|pm)?\s*(?:-|to)\s*(\d{1,2})(?::(\d{2}))?\s*(am|pm)\b",
    )
    .unwrap()
});

// "15:00-17:00", "15:00 to 17:00"
static RANGE_24H_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2}):(\d{2})\s*(?:-|to)\s*(\d{1,2}):(\d{2})\b").unwrap()
});

static SINGLE_12H_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})(?::(\d{2}))?\s*(am|pm)\b").unwrap());

static SINGLE_24H_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2}):(\d{2})\b").unwrap());

// A range continuation directly after an inline date-time, e.g. the
// "-15:30" in "2026-02-01 14:30-15:30"
static RANGE_END_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:-|to\s)\s*(\d{1,2})(?::(\d{2}))?\s*(am|pm)?").unwrap()
});

/// A date (and optional time or time range) located in a message.
#[derive(Debug, Clone, PartialEq)]
pub struct DateTimeMatch {
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    /// Byte span of the matched date token within the input.
    pub span: (usize, usize),
}

/// Find one date token (and any time tokens near it) in `text`.
pub fn find_date_time(text: &str, today: NaiveDate) -> Option<DateTimeMatch> {
    let (date, inline_time, span) = find_iso(text)
        .or_else(|| find_relative(text, today))
        .or_else(|| find_slash(text, today))
        .or_else(|| find_month_name(text, today))?;

    let (time, end_time) = match inline_time {
        // An inline time can still start a range whose end follows the
        // matched span ("2026-02-01 14:30-15:30")
        Some(t) => (Some(t), range_end(&text[span.1..])),
        None => {
            // Prefer time tokens after the date ("... on 2026-02-01 at 3pm"),
            // falling back to before it ("... from 3pm to 5pm on March 5").
            let found = extract_times(&text[span.1..]).or_else(|| extract_times(&text[..span.0]));
            match found {
                Some((t, e)) => (Some(t), e),
                None => (None, None),
            }
        }
    };

    Some(DateTimeMatch {
        date,
        time,
        end_time,
        span,
    })
}

/// Remove any time or time-range tokens from `text`.
///
/// Used by the classifier to keep "Meeting at 3pm" out of event titles.
pub fn strip_time_tokens(text: &str) -> String {
    let mut out = text.to_string();
    for re in [
        &*RANGE_12H_RE,
        &*RANGE_24H_RE,
        &*SINGLE_12H_RE,
        &*SINGLE_24H_RE,
    ] {
        out = re.replace_all(&out, "").into_owned();
    }
    out
}

type Candidate = (NaiveDate, Option<NaiveTime>, (usize, usize));

fn find_iso(text: &str) -> Option<Candidate> {
    for caps in ISO_RE.captures_iter(text) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            continue;
        };
        let time = match (caps.get(4), caps.get(5)) {
            (Some(h), Some(m)) => to_time(h.as_str().parse().ok()?, m.as_str().parse().ok()?, None),
            _ => None,
        };
        let whole = caps.get(0).expect("capture 0 always present");
        return Some((date, time, (whole.start(), whole.end())));
    }
    None
}

fn find_relative(text: &str, today: NaiveDate) -> Option<Candidate> {
    let m = RELATIVE_RE.find(text)?;
    let date = if m.as_str().eq_ignore_ascii_case("today") {
        today
    } else {
        today + Duration::days(1)
    };
    Some((date, None, (m.start(), m.end())))
}

fn find_slash(text: &str, today: NaiveDate) -> Option<Candidate> {
    for caps in SLASH_RE.captures_iter(text) {
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        let date = match caps.get(3) {
            Some(y) => {
                let year: i32 = match y.as_str().len() {
                    2 => 2000 + y.as_str().parse::<i32>().ok()?,
                    4 => y.as_str().parse().ok()?,
                    _ => continue,
                };
                NaiveDate::from_ymd_opt(year, month, day)
            }
            None => resolve_yearless(month, day, today),
        };
        if let Some(date) = date {
            let whole = caps.get(0).expect("capture 0 always present");
            return Some((date, None, (whole.start(), whole.end())));
        }
    }
    None
}

fn find_month_name(text: &str, today: NaiveDate) -> Option<Candidate> {
    for caps in MONTH_RE.captures_iter(text) {
        let month = month_number(&caps[1]);
        let day: u32 = caps[2].parse().ok()?;
        let date = match caps.get(3) {
            Some(y) => NaiveDate::from_ymd_opt(y.as_str().parse().ok()?, month, day),
            None => resolve_yearless(month, day, today),
        };
        if let Some(date) = date {
            let whole = caps.get(0).expect("capture 0 always present");
            return Some((date, None, (whole.start(), whole.end())));
        }
    }
    None
}

/// A month/day with no year resolves to the current year, rolling forward
/// one year when the date has already passed.
fn resolve_yearless(month: u32, day: u32, today: NaiveDate) -> Option<NaiveDate> {
    match NaiveDate::from_ymd_opt(today.year(), month, day) {
        Some(date) if date >= today => Some(date),
        _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
    }
}

fn month_number(name: &str) -> u32 {
    match name[..3].to_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        _ => 12,
    }
}

/// Find a time range or single time in `s`.
fn extract_times(s: &str) -> Option<(NaiveTime, Option<NaiveTime>)> {
    if let Some(caps) = RANGE_12H_RE.captures(s) {
        let end_meridiem = caps.get(6).map(|m| m.as_str());
        // "3-5pm" reads as 3pm-5pm
        let start_meridiem = caps.get(3).map(|m| m.as_str()).or(end_meridiem);
        let start = to_time(
            caps[1].parse().ok()?,
            parse_minutes(caps.get(2))?,
            start_meridiem,
        );
        let end = to_time(
            caps[4].parse().ok()?,
            parse_minutes(caps.get(5))?,
            end_meridiem,
        );
        if let (Some(start), Some(end)) = (start, end) {
            return Some((start, Some(end)));
        }
    }

    if let Some(caps) = RANGE_24H_RE.captures(s) {
        let start = to_time(caps[1].parse().ok()?, caps[2].parse().ok()?, None);
        let end = to_time(caps[3].parse().ok()?, caps[4].parse().ok()?, None);
        if let (Some(start), Some(end)) = (start, end) {
            return Some((start, Some(end)));
        }
    }

    if let Some(caps) = SINGLE_12H_RE.captures(s) {
        let meridiem = caps.get(3).map(|m| m.as_str());
        if let Some(t) = to_time(caps[1].parse().ok()?, parse_minutes(caps.get(2))?, meridiem) {
            return Some((t, None));
        }
    }

    if let Some(caps) = SINGLE_24H_RE.captures(s) {
        if let Some(t) = to_time(caps[1].parse().ok()?, caps[2].parse().ok()?, None) {
            return Some((t, None));
        }
    }

    None
}

/// Parse a range end that trails the date's own inline time.
///
/// A bare number ("14:30 - 5 people") is not a time; the end needs minutes
/// or a meridiem to count.
fn range_end(s: &str) -> Option<NaiveTime> {
    let caps = RANGE_END_RE.captures(s)?;
    if caps.get(2).is_none() && caps.get(3).is_none() {
        return None;
    }
    to_time(
        caps[1].parse().ok()?,
        parse_minutes(caps.get(2))?,
        caps.get(3).map(|m| m.as_str()),
    )
}

fn parse_minutes(group: Option<regex::Match<'_>>) -> Option<u32> {
    match group {
        Some(m) => m.as_str().parse().ok(),
        None => Some(0),
    }
}

/// Normalize to 24-hour, rejecting out-of-range components.
fn to_time(hour: u32, minute: u32, meridiem: Option<&str>) -> Option<NaiveTime> {
    let hour24 = match meridiem.map(str::to_lowercase).as_deref() {
        Some("am") if (1..=12).contains(&hour) => hour % 12,
        Some("pm") if (1..=12).contains(&hour) => hour % 12 + 12,
        Some(_) => return None,
        None => hour,
    };
    NaiveTime::from_hms_opt(hour24, minute, 0)
}
