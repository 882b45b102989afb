//! Aggregate roots - domain objects that own their related data
//!
//! Each aggregate:
//! - Has a unique identity
//! - Exposes behavior through methods, not public fields
//! - Returns mutation outcomes (`SessionUpdate`) instead of publishing events
//!
//! | Concern | Rustic Equivalent |
//! |---------|-------------------|
//! | Aggregate root guards | Private fields + transition methods |
//! | State machine | `SessionStatus::can_transition_to` |
//! | Domain events | Return enums from mutations |

pub mod quiz_session;

pub use quiz_session::{QuizSession, SessionSettings, SessionStatus, SessionSummary};
