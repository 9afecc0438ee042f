//! Calendar event model types.
//!
//! An `Event` is keyed by its title (case-insensitive); the store treats a
//! second add with the same title as an overwrite.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// A calendar event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Non-empty title, used as the lookup key.
    pub title: String,
    /// Calendar date the event takes place on.
    pub date: NaiveDate,
    /// Optional start time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    /// Optional end time; only meaningful together with `time` and must be
    /// after it on the same date (ranges do not cross midnight).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
}

impl Event {
    /// A date-only event with no description.
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Self {
        Event {
            title: title.into(),
            date,
            time: None,
            end_time: None,
            description: None,
            recurrence: None,
        }
    }
}

/// Recurrence attached to an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recurrence {
    pub frequency: Frequency,
    /// Day-of-month for `monthly_on_day`, day-count step for `custom`,
    /// ignored otherwise.
    pub interval: u32,
    /// Next occurrence on/after the "today" the recurrence was computed with.
    pub next_due: NaiveDate,
}

/// How often a recurring event repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    None,
    Daily,
    EveryOtherDay,
    Weekly,
    Biweekly,
    Weekdays,
    Monthly,
    MonthlyOnDay,
    Custom,
}

impl Frequency {
    /// Parse a user-supplied frequency name, case-insensitively.
    pub fn parse(s: &str) -> Option<Frequency> {
        match s.trim().to_lowercase().as_str() {
            "none" => Some(Frequency::None),
            "daily" => Some(Frequency::Daily),
            "every_other_day" => Some(Frequency::EveryOtherDay),
            "weekly" => Some(Frequency::Weekly),
            "biweekly" => Some(Frequency::Biweekly),
            "weekdays" => Some(Frequency::Weekdays),
            "monthly" => Some(Frequency::Monthly),
            "monthly_on_day" => Some(Frequency::MonthlyOnDay),
            "custom" => Some(Frequency::Custom),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::None => "none",
            Frequency::Daily => "daily",
            Frequency::EveryOtherDay => "every_other_day",
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Weekdays => "weekdays",
            Frequency::Monthly => "monthly",
            Frequency::MonthlyOnDay => "monthly_on_day",
            Frequency::Custom => "custom",
        }
    }
}
