//! Domain events
//!
//! Aggregate mutations return enums describing what happened instead of
//! publishing events through a bus. Use cases log them and derive the
//! status trail a turn reports from them.

pub mod session_events;

pub use session_events::{FinishReason, RoundOutcome, SessionUpdate};
