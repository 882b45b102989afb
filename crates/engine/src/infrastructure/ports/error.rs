//! Error types for port operations.

#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    #[error("LLM request timed out after {0}s")]
    Timeout(u64),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Whether a caller should treat this as the generator being unavailable
    /// (as opposed to the generator answering with garbage).
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::RequestFailed(_) | Self::Timeout(_))
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum MediaError {
    #[error("Media search failed: {0}")]
    RequestFailed(String),
    #[error("Media search unavailable")]
    Unavailable,
}
