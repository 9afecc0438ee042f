//! iCalendar export for the event store.
//!
//! Serializes the whole store into one VCALENDAR with a VEVENT per event.
//! Date-only events become all-day entries (`DTSTART;VALUE=DATE`), timed
//! events use floating local datetimes (no timezone suffix), and recurring
//! events carry an RRULE derived from their frequency. UID and DTSTAMP are
//! derived from the event itself so an unchanged store exports
//! byte-identically.

use icalendar::{Calendar, Component, Property, ValueType};
use uuid::Uuid;

use crate::error::ChatCalResult;
use crate::event::{Event, Frequency, Recurrence};
use crate::store::EventStore;

/// Generate the .ics document for the full event set.
pub fn export_calendar(store: &EventStore) -> ChatCalResult<String> {
    let mut cal = Calendar::new();

    for event in store.list(None) {
        cal.push(build_vevent(event));
    }
    let cal = cal.done();

    // Post-process to pin PRODID and drop defaults the icalendar crate emits
    Ok(strip_ics_bloat(&cal.to_string()))
}

fn build_vevent(event: &Event) -> icalendar::Event {
    let mut vevent = icalendar::Event::new();
    vevent.uid(&event_uid(event));
    vevent.summary(&event.title);

    // DTSTAMP is required by RFC 5545; derive it from the event date instead
    // of the wall clock so repeated exports are byte-identical
    vevent.add_property(
        "DTSTAMP",
        format!("{}T000000Z", event.date.format("%Y%m%d")),
    );

    match event.time {
        None => {
            let mut prop = Property::new("DTSTART", event.date.format("%Y%m%d").to_string());
            prop.append_parameter(ValueType::Date);
            vevent.append_property(prop);
        }
        Some(start) => {
            vevent.add_property(
                "DTSTART",
                event.date.and_time(start).format("%Y%m%dT%H%M%S").to_string(),
            );
            if let Some(end) = event.end_time {
                vevent.add_property(
                    "DTEND",
                    event.date.and_time(end).format("%Y%m%dT%H%M%S").to_string(),
                );
            }
        }
    }

    if let Some(ref desc) = event.description {
        vevent.description(desc);
    }

    if let Some(ref recurrence) = event.recurrence {
        if let Some(rrule) = rrule_for(recurrence) {
            vevent.add_property("RRULE", rrule);
        }
    }

    vevent.done()
}

/// Deterministic UID: a v5 UUID of the title+date under the OID namespace.
fn event_uid(event: &Event) -> String {
    let name = format!("{}|{}", event.title.to_lowercase(), event.date);
    let uuid = Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes());
    format!("{uuid}@chatcal")
}

fn rrule_for(recurrence: &Recurrence) -> Option<String> {
    match recurrence.frequency {
        Frequency::None => None,
        Frequency::Daily => Some("FREQ=DAILY".to_string()),
        Frequency::EveryOtherDay => Some("FREQ=DAILY;INTERVAL=2".to_string()),
        Frequency::Weekly => Some("FREQ=WEEKLY".to_string()),
        Frequency::Biweekly => Some("FREQ=WEEKLY;INTERVAL=2".to_string()),
        Frequency::Weekdays => Some("FREQ=WEEKLY;BYDAY=MO,TU,WE,TH,FR".to_string()),
        Frequency::Monthly => Some("FREQ=MONTHLY".to_string()),
        Frequency::MonthlyOnDay => {
            Some(format!("FREQ=MONTHLY;BYMONTHDAY={}", recurrence.interval))
        }
        Frequency::Custom => Some(format!("FREQ=DAILY;INTERVAL={}", recurrence.interval)),
    }
}

/// Clean up the icalendar crate's output:
/// - pin PRODID (we post-process, so the crate's own id would be misleading)
/// - drop CALSCALE:GREGORIAN (it's the default)
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:CHATCAL\r\n");
            continue;
        }
        if line == "CALSCALE:GREGORIAN" {
            continue;
        }
        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}
