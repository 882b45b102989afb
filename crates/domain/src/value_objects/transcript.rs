//! Conversation transcript sent to the generator, and its compaction.
//!
//! The transcript only carries conversational context. Score, round and the
//! used-item history live on the `QuizSession` aggregate, so compaction can
//! drop entries freely without losing game-critical state.
//!
//! # Usage
//!
//! ```rust,ignore
//! let compactor = HistoryCompactor::new(3);
//! let result = compactor.compact(&transcript, 2, "Round 2: Koala (answered)");
//! transcript = result.into_transcript();
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptRole {
    Player,
    Generator,
    /// Text the engine produced itself (fallback questions, hints)
    Engine,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TranscriptEntryKind {
    Message { role: TranscriptRole, text: String },
    ToolCall { name: String, arguments: String },
    ToolResult { name: String, content: String },
    /// Collapsed stand-in for a resolved round
    RoundMarker { summary: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    round: u32,
    kind: TranscriptEntryKind,
}

impl TranscriptEntry {
    pub fn new(round: u32, kind: TranscriptEntryKind) -> Self {
        Self { round, kind }
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn kind(&self) -> &TranscriptEntryKind {
        &self.kind
    }

    pub fn is_marker(&self) -> bool {
        matches!(self.kind, TranscriptEntryKind::RoundMarker { .. })
    }
}

/// Ordered list of transcript entries for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    pub fn push_message(&mut self, round: u32, role: TranscriptRole, text: impl Into<String>) {
        self.push(TranscriptEntry::new(
            round,
            TranscriptEntryKind::Message {
                role,
                text: text.into(),
            },
        ));
    }

    pub fn push_tool_call(&mut self, round: u32, name: impl Into<String>, arguments: impl Into<String>) {
        self.push(TranscriptEntry::new(
            round,
            TranscriptEntryKind::ToolCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        ));
    }

    pub fn push_tool_result(&mut self, round: u32, name: impl Into<String>, content: impl Into<String>) {
        self.push(TranscriptEntry::new(
            round,
            TranscriptEntryKind::ToolResult {
                name: name.into(),
                content: content.into(),
            },
        ));
    }

    /// Entries belonging to `round`, in order.
    pub fn entries_for_round(&self, round: u32) -> impl Iterator<Item = &TranscriptEntry> {
        self.entries.iter().filter(move |e| e.round == round)
    }
}

// ============================================================================
// Compaction
// ============================================================================

/// Result of compacting a transcript after a round resolved
#[derive(Debug, Clone)]
pub struct CompactionResult {
    transcript: Transcript,
    /// Number of entries removed (markers inserted are not counted)
    removed_entries: usize,
    /// Number of old markers dropped to stay within the marker window
    dropped_markers: usize,
}

impl CompactionResult {
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn removed_entries(&self) -> usize {
        self.removed_entries
    }

    pub fn dropped_markers(&self) -> usize {
        self.dropped_markers
    }

    pub fn into_transcript(self) -> Transcript {
        self.transcript
    }
}

/// Collapses resolved rounds into single-line markers.
///
/// After a round reaches `round_complete`, every entry of that round
/// (messages and tool exchanges alike) is replaced by one `RoundMarker`
/// at the position of the round's first entry. Only the newest
/// `keep_markers` markers are retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryCompactor {
    keep_markers: usize,
}

impl Default for HistoryCompactor {
    fn default() -> Self {
        Self::new(3)
    }
}

impl HistoryCompactor {
    pub fn new(keep_markers: usize) -> Self {
        Self { keep_markers }
    }

    pub fn keep_markers(&self) -> usize {
        self.keep_markers
    }

    pub fn compact(
        &self,
        transcript: &Transcript,
        resolved_round: u32,
        marker_summary: impl Into<String>,
    ) -> CompactionResult {
        let already_marked = transcript
            .entries
            .iter()
            .any(|e| e.round == resolved_round && e.is_marker());

        let mut entries = Vec::with_capacity(transcript.entries.len());
        let mut removed_entries = 0;
        let mut marker = Some(marker_summary.into());

        for entry in &transcript.entries {
            if entry.round != resolved_round || entry.is_marker() {
                entries.push(entry.clone());
                continue;
            }
            removed_entries += 1;
            if !already_marked {
                if let Some(summary) = marker.take() {
                    entries.push(TranscriptEntry::new(
                        resolved_round,
                        TranscriptEntryKind::RoundMarker { summary },
                    ));
                }
            }
        }

        let marker_count = entries.iter().filter(|e| e.is_marker()).count();
        let mut excess = marker_count.saturating_sub(self.keep_markers);
        let dropped_markers = excess;
        entries.retain(|e| {
            if excess > 0 && e.is_marker() {
                excess -= 1;
                false
            } else {
                true
            }
        });

        CompactionResult {
            transcript: Transcript { entries },
            removed_entries,
            dropped_markers,
        }
    }
}
