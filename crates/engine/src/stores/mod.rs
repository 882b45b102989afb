//! In-memory state storage modules.
//!
//! Stores manage runtime state that lives only for the process:
//! - `SessionStore` - live quiz sessions and archived summaries

pub mod session;

pub use session::{SessionRecord, SessionStore};
