//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - The text generator (could swap Ollama -> any OpenAI-compatible service)
//! - Media search for hint illustrations
//! - Clock/Random (for testing)

mod error;
mod external;
mod testing;

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{
    ChatMessage, FinishReason, LlmPort, LlmRequest, LlmResponse, MediaRef, MediaSearchPort,
    MessageRole, TokenUsage, ToolCall, ToolDefinition,
};

#[cfg(test)]
pub use external::MockMediaSearchPort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::{ClockPort, RandomPort};

#[cfg(test)]
pub use testing::MockClockPort;

// =============================================================================
// Error Types
// =============================================================================
pub use error::{LlmError, MediaError};
