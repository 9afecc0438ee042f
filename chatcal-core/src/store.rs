//! In-memory event store.
//!
//! An owned, `&mut`-threaded collection keyed by lowercased title, so event
//! identity is case-insensitive and a second add with the same title
//! overwrites the first (upsert). The store is process-local and volatile:
//! callers must treat it as a cache, not durable storage.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{ChatCalError, ChatCalResult};
use crate::event::{Event, Frequency, Recurrence};
use crate::recurrence;

#[derive(Debug, Default, Clone)]
pub struct EventStore {
    /// Keyed by lowercased title.
    events: BTreeMap<String, Event>,
}

impl EventStore {
    pub fn new() -> Self {
        EventStore::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, title: &str) -> Option<&Event> {
        self.events.get(&store_key(title))
    }

    /// Insert or overwrite by title. Validates what the classifier cannot:
    /// a non-empty title and a well-formed time range.
    pub fn add(&mut self, mut event: Event) -> ChatCalResult<&Event> {
        event.title = event.title.trim().to_string();
        if event.title.is_empty() {
            return Err(ChatCalError::Validation(
                "Event title must not be empty".to_string(),
            ));
        }
        match (event.time, event.end_time) {
            (None, Some(_)) => {
                return Err(ChatCalError::Validation(
                    "An end time requires a start time".to_string(),
                ));
            }
            (Some(start), Some(end)) if end <= start => {
                return Err(ChatCalError::Validation(format!(
                    "End time {} must be after start time {}",
                    end.format("%H:%M"),
                    start.format("%H:%M"),
                )));
            }
            _ => {}
        }

        let key = store_key(&event.title);
        debug!(title = %event.title, date = %event.date, "storing event");
        self.events.insert(key.clone(), event);
        Ok(self.events.get(&key).expect("just inserted"))
    }

    /// Events ordered by date then title, optionally filtered to one date.
    /// Each call returns a fresh iterator over the current contents.
    pub fn list(&self, filter: Option<NaiveDate>) -> impl Iterator<Item = &Event> {
        let mut events: Vec<&Event> = self
            .events
            .values()
            .filter(move |e| filter.map_or(true, |d| e.date == d))
            .collect();
        events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.title.cmp(&b.title)));
        events.into_iter()
    }

    /// Human-readable digest of all events dated on/after `today`.
    pub fn summarize(&self, today: NaiveDate) -> String {
        let upcoming: Vec<&Event> = self.list(None).filter(|e| e.date >= today).collect();
        if upcoming.is_empty() {
            return "No events scheduled.".to_string();
        }
        let mut summary = String::from("Upcoming Events Summary:\n");
        for event in upcoming {
            summary.push_str(&format!("- {}: {}", event.date, event.title));
            if let Some(ref desc) = event.description {
                summary.push_str(&format!(" ({desc})"));
            }
            summary.push('\n');
        }
        summary
    }

    /// Remove the event whose title matches case-insensitively (exact match,
    /// not substring).
    pub fn delete(&mut self, title: &str) -> ChatCalResult<Event> {
        let removed = self
            .events
            .remove(&store_key(title))
            .ok_or_else(|| ChatCalError::NotFound(title.trim().to_string()))?;
        debug!(title = %removed.title, "deleted event");
        Ok(removed)
    }

    /// Attach, replace, or clear (`frequency = none`) the recurrence of an
    /// existing event, computing `next_due` from the event's own date.
    pub fn set_recurrence(
        &mut self,
        title: &str,
        frequency: Frequency,
        interval: u32,
        today: NaiveDate,
    ) -> ChatCalResult<&Event> {
        let event = self
            .events
            .get_mut(&store_key(title))
            .ok_or_else(|| ChatCalError::NotFound(title.trim().to_string()))?;

        if frequency == Frequency::None {
            event.recurrence = None;
            return Ok(&*event);
        }

        let next_due = recurrence::next_occurrence(frequency, interval, event.date, today)?;
        event.recurrence = Some(Recurrence {
            frequency,
            interval,
            next_due,
        });
        Ok(&*event)
    }
}

fn store_key(title: &str) -> String {
    title.trim().to_lowercase()
}
