//! Tool dispatcher: routes protocol requests to the calendar components.
//!
//! Owns the (volatile, process-local) event store and exposes one entry
//! point per tool plus `handle_message`, the conversational path that runs
//! the classifier. Unrecognized chat input produces help text as a normal
//! result; errors are folded into `{"error": ...}` responses and never
//! propagate past this boundary.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::classifier::{self, ParsedCommand};
use crate::error::{ChatCalError, ChatCalResult};
use crate::event::{Event, Frequency};
use crate::grammar;
use crate::ics;
use crate::plan::{self, Plan};
use crate::protocol::{ToolRequest, ToolResponse};
use crate::store::EventStore;

/// Help text shown for messages the classifier cannot interpret.
pub const HELP_TEXT: &str = "Sorry, I didn't understand. Try commands like:\n\
    - \"Add Birthday on 2026-02-01\"\n\
    - \"Create Meeting on March 3 from 3pm to 5pm about planning\"\n\
    - \"List events on 2026-03-03\" or \"What's on 2026-03-03?\"\n\
    - \"Summarize upcoming\"\n\
    - \"delete Meeting\"\n\
    You can also use the shorthand: add:Title|YYYY-MM-DD|Desc, delete:Title, list, summarize.";

#[derive(Debug, Default)]
pub struct Dispatcher {
    store: EventStore,
}

#[derive(serde::Deserialize)]
struct ListParams {
    #[serde(default)]
    date: Option<String>,
}

#[derive(serde::Deserialize)]
struct AddEventParams {
    title: String,
    date: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(serde::Deserialize)]
struct TitleParams {
    title: String,
}

#[derive(serde::Deserialize)]
struct MessageParams {
    message: String,
}

#[derive(serde::Deserialize)]
struct RecurrenceParams {
    title: String,
    frequency: String,
    #[serde(default = "default_interval")]
    interval: u32,
}

fn default_interval() -> u32 {
    1
}

#[derive(serde::Deserialize)]
struct BreakdownParams {
    goal: String,
    deadline: String,
}

#[derive(serde::Deserialize)]
struct CreateTasksParams {
    plan: Plan,
}

impl Dispatcher {
    pub fn new() -> Self {
        Dispatcher::default()
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    /// Handle one tool request. `today` anchors every relative-date and
    /// recurrence computation in the request.
    pub fn handle(&mut self, request: &ToolRequest, today: NaiveDate) -> ToolResponse {
        debug!(tool = %request.tool, "dispatching tool call");
        let outcome = match request.tool.as_str() {
            "list" => self.list_tool(&request.input, today),
            "summarize" => Ok(ToolResponse::text(self.store.summarize(today))),
            "add_event" => self.add_event_tool(&request.input, today),
            "delete_event" => self.delete_event_tool(&request.input),
            "handle_message" => self.handle_message_tool(&request.input, today),
            "set_recurrence" => self.set_recurrence_tool(&request.input, today),
            "research_and_breakdown" => self.breakdown_tool(&request.input, today),
            "create_tasks" => self.create_tasks_tool(&request.input),
            "export_ics" => ics::export_calendar(&self.store).map(ToolResponse::text),
            other => Err(ChatCalError::Validation(format!("Unknown tool '{other}'"))),
        };

        outcome.unwrap_or_else(|e| {
            warn!(tool = %request.tool, error = %e, "tool call failed");
            ToolResponse::error(e.to_string())
        })
    }

    /// The conversational entry point: classify and execute one message.
    pub fn handle_message(&mut self, message: &str, today: NaiveDate) -> ChatCalResult<String> {
        let command = classifier::classify(message, today);
        self.execute(command, today)
    }

    fn execute(&mut self, command: ParsedCommand, today: NaiveDate) -> ChatCalResult<String> {
        match command {
            ParsedCommand::List { date_filter } => Ok(self.format_events(date_filter)),
            ParsedCommand::Summarize => Ok(self.store.summarize(today)),
            ParsedCommand::Add {
                title,
                date,
                time,
                end_time,
                description,
            } => {
                let event = Event {
                    title,
                    date,
                    time,
                    end_time,
                    description,
                    recurrence: None,
                };
                let stored = self.store.add(event)?;
                Ok(added_message(stored))
            }
            ParsedCommand::Delete { title } => {
                let removed = self.store.delete(&title)?;
                Ok(format!("Event '{}' deleted.", removed.title))
            }
            ParsedCommand::SetRecurrence {
                title,
                frequency,
                interval,
            } => {
                let event = self
                    .store
                    .set_recurrence(&title, frequency, interval, today)?;
                Ok(recurrence_message(event, frequency))
            }
            ParsedCommand::ResearchAndBreakdown { goal, deadline } => {
                let plan = plan::build_plan(&goal, deadline, today)?;
                Ok(render_plan(&plan))
            }
            ParsedCommand::CreateTasks { plan } => {
                let count = plan::create_tasks(&mut self.store, &plan)?;
                Ok(format!("Created {count} events from plan '{}'.", plan.goal))
            }
            ParsedCommand::Unrecognized { .. } => Ok(HELP_TEXT.to_string()),
        }
    }

    fn list_tool(&self, input: &Value, today: NaiveDate) -> ChatCalResult<ToolResponse> {
        let p: ListParams = params(input)?;
        let filter = p.date.as_deref().map(|s| parse_date_arg(s, today)).transpose()?;
        let events: Vec<&Event> = self.store.list(filter).collect();
        Ok(ToolResponse::result(events))
    }

    fn add_event_tool(&mut self, input: &Value, today: NaiveDate) -> ChatCalResult<ToolResponse> {
        let p: AddEventParams = params(input)?;
        let m = grammar::find_date_time(&p.date, today).ok_or_else(|| {
            ChatCalError::Validation(format!(
                "Invalid date '{}'. Use YYYY-MM-DD, 'today'/'tomorrow', or a month name like 'March 5'",
                p.date
            ))
        })?;
        let event = Event {
            title: p.title,
            date: m.date,
            time: m.time,
            end_time: m.end_time,
            description: p.description.filter(|d| !d.trim().is_empty()),
            recurrence: None,
        };
        let stored = self.store.add(event)?;
        Ok(ToolResponse::text(added_message(stored)))
    }

    fn delete_event_tool(&mut self, input: &Value) -> ChatCalResult<ToolResponse> {
        let p: TitleParams = params(input)?;
        let removed = self.store.delete(&p.title)?;
        Ok(ToolResponse::text(format!(
            "Event '{}' deleted.",
            removed.title
        )))
    }

    fn handle_message_tool(&mut self, input: &Value, today: NaiveDate) -> ChatCalResult<ToolResponse> {
        let p: MessageParams = params(input)?;
        self.handle_message(&p.message, today).map(ToolResponse::text)
    }

    fn set_recurrence_tool(&mut self, input: &Value, today: NaiveDate) -> ChatCalResult<ToolResponse> {
        let p: RecurrenceParams = params(input)?;
        let frequency = Frequency::parse(&p.frequency).ok_or_else(|| {
            ChatCalError::Validation(format!(
                "Unknown frequency '{}'. Use one of: none, daily, every_other_day, weekly, \
                 biweekly, weekdays, monthly, monthly_on_day, custom",
                p.frequency
            ))
        })?;
        let event = self
            .store
            .set_recurrence(&p.title, frequency, p.interval, today)?;
        Ok(ToolResponse::text(recurrence_message(event, frequency)))
    }

    fn breakdown_tool(&self, input: &Value, today: NaiveDate) -> ChatCalResult<ToolResponse> {
        let p: BreakdownParams = params(input)?;
        let deadline = parse_date_arg(&p.deadline, today)?;
        let plan = plan::build_plan(&p.goal, deadline, today)?;
        Ok(ToolResponse::result(plan))
    }

    fn create_tasks_tool(&mut self, input: &Value) -> ChatCalResult<ToolResponse> {
        let p: CreateTasksParams = params(input)?;
        let count = plan::create_tasks(&mut self.store, &p.plan)?;
        Ok(ToolResponse::text(format!(
            "Created {count} events from plan '{}'.",
            p.plan.goal
        )))
    }

    fn format_events(&self, filter: Option<NaiveDate>) -> String {
        let events: Vec<&Event> = self.store.list(filter).collect();
        if events.is_empty() {
            return match filter {
                Some(d) => format!("No events found for {d}."),
                None => "No events scheduled.".to_string(),
            };
        }

        let mut out = match filter {
            Some(d) => format!("Events on {d}:\n"),
            None => "Calendar Events:\n".to_string(),
        };
        for event in events {
            out.push_str(&format!("- {}", event.date));
            if let Some(t) = event.time {
                out.push_str(&format!(" {}", t.format("%H:%M")));
                if let Some(end) = event.end_time {
                    out.push_str(&format!("-{}", end.format("%H:%M")));
                }
            }
            out.push_str(&format!(": {}", event.title));
            if let Some(ref desc) = event.description {
                out.push_str(&format!(" - {desc}"));
            }
            out.push('\n');
        }
        out
    }
}

fn added_message(event: &Event) -> String {
    let mut msg = format!("Event '{}' added for {}", event.title, event.date);
    if let Some(t) = event.time {
        msg.push_str(&format!(" at {}", t.format("%H:%M")));
        if let Some(end) = event.end_time {
            msg.push_str(&format!("-{}", end.format("%H:%M")));
        }
    }
    msg.push('.');
    msg
}

fn recurrence_message(event: &Event, frequency: Frequency) -> String {
    match &event.recurrence {
        Some(rec) => format!(
            "Recurrence for '{}' set to {}; next due {}.",
            event.title,
            rec.frequency.as_str(),
            rec.next_due
        ),
        None => {
            debug_assert_eq!(frequency, Frequency::None);
            format!("Recurrence cleared for '{}'.", event.title)
        }
    }
}

fn render_plan(plan: &Plan) -> String {
    let mut out = format!("Plan for '{}' by {}:\n", plan.goal, plan.deadline);
    for milestone in &plan.milestones {
        out.push_str(&format!("- {}: {}\n", milestone.due, milestone.title));
        for step in &milestone.steps {
            out.push_str(&format!("    - {step}\n"));
        }
    }
    out.push_str(&format!(
        "Suggested reminder cadences: {}.",
        plan.cadence_suggestions.join(", ")
    ));
    out
}

/// Accept an ISO date or anything the grammar recognizes ("tomorrow").
fn parse_date_arg(s: &str, today: NaiveDate) -> ChatCalResult<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d") {
        return Ok(date);
    }
    grammar::find_date_time(s, today)
        .map(|m| m.date)
        .ok_or_else(|| {
            ChatCalError::Validation(format!("Invalid date format '{s}'. Expected YYYY-MM-DD"))
        })
}

fn params<T: DeserializeOwned>(input: &Value) -> ChatCalResult<T> {
    let input = if input.is_null() {
        Value::Object(Default::default())
    } else {
        input.clone()
    };
    serde_json::from_value(input)
        .map_err(|e| ChatCalError::Validation(format!("Invalid tool input: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
    }

    fn call(dispatcher: &mut Dispatcher, tool: &str, input: Value) -> ToolResponse {
        dispatcher.handle(
            &ToolRequest {
                tool: tool.to_string(),
                input,
            },
            today(),
        )
    }

    fn result_text(response: &ToolResponse) -> &str {
        match response {
            ToolResponse::Result(Value::String(s)) => s,
            other => panic!("expected text result, got {other:?}"),
        }
    }

    #[test]
    fn test_shorthand_message_adds_event() {
        let mut d = Dispatcher::new();
        let resp = call(
            &mut d,
            "handle_message",
            json!({"message": "add:Board Game Night|2026-02-01|Bring snacks"}),
        );
        assert_eq!(
            result_text(&resp),
            "Event 'Board Game Night' added for 2026-02-01."
        );

        let event = d.store().get("Board Game Night").unwrap();
        assert_eq!(event.date, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert_eq!(event.description.as_deref(), Some("Bring snacks"));
    }

    #[test]
    fn test_add_event_tool_with_time_range() {
        let mut d = Dispatcher::new();
        let resp = call(
            &mut d,
            "add_event",
            json!({"title": "Meeting", "date": "2026-02-01 from 3pm to 5pm"}),
        );
        assert_eq!(
            result_text(&resp),
            "Event 'Meeting' added for 2026-02-01 at 15:00-17:00."
        );
    }

    #[test]
    fn test_add_event_tool_rejects_bad_date() {
        let mut d = Dispatcher::new();
        let resp = call(&mut d, "add_event", json!({"title": "X", "date": "not a date"}));
        assert!(matches!(resp, ToolResponse::Error(_)));
        assert!(d.store().is_empty());
    }

    #[test]
    fn test_unrecognized_message_is_help_not_error() {
        let mut d = Dispatcher::new();
        let resp = call(&mut d, "handle_message", json!({"message": "blah blah"}));
        assert_eq!(result_text(&resp), HELP_TEXT);
    }

    #[test]
    fn test_delete_unknown_is_error() {
        let mut d = Dispatcher::new();
        let resp = call(&mut d, "delete_event", json!({"title": "Ghost"}));
        match resp {
            ToolResponse::Error(msg) => assert!(msg.contains("Ghost"), "{msg}"),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn test_list_tool_returns_structured_events() {
        let mut d = Dispatcher::new();
        call(&mut d, "add_event", json!({"title": "A", "date": "2026-02-01"}));
        call(&mut d, "add_event", json!({"title": "B", "date": "2026-02-02"}));

        let resp = call(&mut d, "list", json!({"date": "2026-02-02"}));
        match resp {
            ToolResponse::Result(Value::Array(events)) => {
                assert_eq!(events.len(), 1);
                assert_eq!(events[0]["title"], "B");
            }
            other => panic!("expected array result, got {other:?}"),
        }
    }

    #[test]
    fn test_message_list_and_summarize_render_text() {
        let mut d = Dispatcher::new();
        call(
            &mut d,
            "handle_message",
            json!({"message": "Add Meeting on 2026-02-01 at 14:30"}),
        );

        let resp = call(&mut d, "handle_message", json!({"message": "list"}));
        assert_eq!(
            result_text(&resp),
            "Calendar Events:\n- 2026-02-01 14:30: Meeting\n"
        );

        let resp = call(&mut d, "summarize", Value::Null);
        assert!(result_text(&resp).contains("2026-02-01: Meeting"));
    }

    #[test]
    fn test_set_recurrence_flow() {
        let mut d = Dispatcher::new();
        call(
            &mut d,
            "handle_message",
            json!({"message": "add:Board Game Night|2026-02-01|"}),
        );

        let resp = call(
            &mut d,
            "set_recurrence",
            json!({"title": "Board Game Night", "frequency": "weekly", "interval": 1}),
        );
        assert_eq!(
            result_text(&resp),
            "Recurrence for 'Board Game Night' set to weekly; next due 2026-02-01."
        );
    }

    #[test]
    fn test_set_recurrence_unknown_frequency() {
        let mut d = Dispatcher::new();
        call(&mut d, "add_event", json!({"title": "X", "date": "2026-02-01"}));
        let resp = call(
            &mut d,
            "set_recurrence",
            json!({"title": "X", "frequency": "fortnightly"}),
        );
        assert!(matches!(resp, ToolResponse::Error(_)));
    }

    #[test]
    fn test_breakdown_and_create_tasks_roundtrip() {
        let mut d = Dispatcher::new();
        let resp = call(
            &mut d,
            "research_and_breakdown",
            json!({"goal": "build an iOS app", "deadline": "2026-03-05"}),
        );
        let plan_value = match resp {
            ToolResponse::Result(v) => v,
            other => panic!("expected plan result, got {other:?}"),
        };
        assert_eq!(plan_value["goal"], "build an iOS app");
        assert_eq!(plan_value["milestones"].as_array().unwrap().len(), 4);

        let resp = call(&mut d, "create_tasks", json!({"plan": plan_value}));
        assert_eq!(
            result_text(&resp),
            "Created 4 events from plan 'build an iOS app'."
        );
        assert_eq!(d.store().len(), 4);
    }

    #[test]
    fn test_create_tasks_malformed_plan() {
        let mut d = Dispatcher::new();
        let resp = call(&mut d, "create_tasks", json!({"plan": {"goal": "g"}}));
        assert!(matches!(resp, ToolResponse::Error(_)));
        assert!(d.store().is_empty());
    }

    #[test]
    fn test_unknown_tool() {
        let mut d = Dispatcher::new();
        let resp = call(&mut d, "frobnicate", Value::Null);
        match resp {
            ToolResponse::Error(msg) => assert!(msg.contains("frobnicate")),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn test_export_tool_produces_ics() {
        let mut d = Dispatcher::new();
        call(&mut d, "add_event", json!({"title": "Holiday", "date": "2026-02-01"}));
        let resp = call(&mut d, "export_ics", Value::Null);
        let ics = result_text(&resp);
        assert!(ics.starts_with("BEGIN:VCALENDAR"));
        assert!(ics.contains("DTSTART;VALUE=DATE:20260201"));
    }
}
