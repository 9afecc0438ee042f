//! Core engine for the chatcal conversational calendar.
//!
//! This crate holds everything below the user interface:
//! - `grammar` and `classifier` for turning chat messages into commands
//! - `store` and `recurrence` for the in-memory calendar itself
//! - `plan` for goal breakdowns, `ics` for calendar export
//! - `protocol` and `dispatch` for the JSON tool-call surface

pub mod classifier;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod grammar;
pub mod ics;
pub mod plan;
pub mod protocol;
pub mod recurrence;
pub mod store;

// Re-export the types nearly every caller needs
pub use error::{ChatCalError, ChatCalResult};
pub use event::{Event, Frequency, Recurrence};
