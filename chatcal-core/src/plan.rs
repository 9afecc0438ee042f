//! Goal → milestone plan builder.
//!
//! Breaks a goal with a deadline into a small, deterministic sequence of
//! dated milestones, and can materialize a confirmed plan as events. The
//! breakdown policy is a fixed phase template: due dates are spaced evenly
//! across the horizon and are monotonically non-decreasing, with the final
//! milestone landing exactly on the deadline.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{ChatCalError, ChatCalResult};
use crate::event::Event;
use crate::store::EventStore;

/// A milestone breakdown for a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub goal: String,
    pub deadline: NaiveDate,
    pub milestones: Vec<Milestone>,
    pub cadence_suggestions: Vec<String>,
}

/// A dated sub-goal with its actionable steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub title: String,
    pub due: NaiveDate,
    pub steps: Vec<String>,
}

/// The phase templates a plan is built from, in order.
const PHASES: [(&str, &[&str]); 4] = [
    (
        "Research",
        &[
            "Collect resources and prior art",
            "Write down constraints and success criteria",
        ],
    ),
    (
        "Outline",
        &[
            "Break the goal into concrete work items",
            "Decide what to cut if time runs short",
        ],
    ),
    (
        "Core work",
        &[
            "Work through the outlined items",
            "Track progress against the deadline",
        ],
    ),
    (
        "Review and finish",
        &[
            "Check the result against the success criteria",
            "Fix gaps and wrap up",
        ],
    ),
];

/// Build a deterministic plan for `goal` due by `deadline`.
pub fn build_plan(goal: &str, deadline: NaiveDate, today: NaiveDate) -> ChatCalResult<Plan> {
    let goal = goal.trim();
    if goal.is_empty() {
        return Err(ChatCalError::Validation(
            "A plan needs a non-empty goal".to_string(),
        ));
    }
    let horizon = (deadline - today).num_days();
    if horizon < 1 {
        return Err(ChatCalError::Validation(format!(
            "Deadline {deadline} must be after today ({today})"
        )));
    }

    // With fewer days than phases, later phases are dropped rather than
    // stacking several milestones on one day
    let count = PHASES.len().min(horizon as usize);
    let milestones = PHASES[..count]
        .iter()
        .enumerate()
        .map(|(i, (phase, steps))| Milestone {
            title: format!("{phase}: {goal}"),
            due: today + Duration::days(horizon * (i as i64 + 1) / count as i64),
            steps: steps.iter().map(|s| s.to_string()).collect(),
        })
        .collect();

    Ok(Plan {
        goal: goal.to_string(),
        deadline,
        milestones,
        cadence_suggestions: cadences_for(horizon),
    })
}

fn cadences_for(horizon: i64) -> Vec<String> {
    let cadences: &[&str] = if horizon <= 14 {
        &["daily", "weekly"]
    } else if horizon <= 60 {
        &["weekly", "biweekly"]
    } else {
        &["weekly", "biweekly", "monthly"]
    };
    cadences.iter().map(|s| s.to_string()).collect()
}

/// Materialize a confirmed plan: one event per milestone, description
/// synthesized from the steps. All-or-nothing: a malformed plan creates no
/// events at all. Returns the number of created/updated events.
pub fn create_tasks(store: &mut EventStore, plan: &Plan) -> ChatCalResult<usize> {
    if plan.milestones.is_empty() {
        return Err(ChatCalError::Validation(
            "Plan has no milestones to create".to_string(),
        ));
    }
    for milestone in &plan.milestones {
        if milestone.title.trim().is_empty() {
            return Err(ChatCalError::Validation(
                "Every milestone needs a title".to_string(),
            ));
        }
    }

    for milestone in &plan.milestones {
        let mut event = Event::new(milestone.title.clone(), milestone.due);
        if !milestone.steps.is_empty() {
            event.description = Some(milestone.steps.join("; "));
        }
        store.add(event)?;
    }
    Ok(plan.milestones.len())
}
