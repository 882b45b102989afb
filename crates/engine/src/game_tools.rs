//! The `quiz_turn` tool the generator reports every turn through.
//!
//! The generator's structured output is untrusted. Parsing here only checks
//! shape; the use cases re-check the claims (answer correctness, option
//! lists) against the catalog before anything touches session state.

use serde_json::{json, Value};

use crate::infrastructure::ports::{LlmResponse, ToolDefinition};

pub const QUIZ_TURN_TOOL: &str = "quiz_turn";

/// Tool definition sent with every generator request.
pub fn quiz_turn_tool() -> ToolDefinition {
    ToolDefinition {
        name: QUIZ_TURN_TOOL.to_string(),
        description: "Report how the player's last message was understood and what to say next."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "signal": {
                    "type": "string",
                    "enum": ["answer", "dont_know", "skip", "continue", "unclear"],
                    "description": "What the player's last message meant"
                },
                "correct": {
                    "type": "boolean",
                    "description": "For an answer: whether it names the current item"
                },
                "message": {
                    "type": "string",
                    "description": "What the host says to the player"
                },
                "options": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Multiple-choice options for the question being asked"
                },
                "explanation": {
                    "type": "string",
                    "description": "Optional short fact explaining the answer"
                }
            },
            "required": ["signal", "message"]
        }),
    }
}

/// Player intent as classified by the generator (or locally).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifiedSignal {
    Answer { correct: bool },
    DontKnow,
    Skip,
    Continue,
    Unclear,
}

impl ClassifiedSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Answer { correct: true } => "answer_correct",
            Self::Answer { correct: false } => "answer_incorrect",
            Self::DontKnow => "dont_know",
            Self::Skip => "skip",
            Self::Continue => "continue",
            Self::Unclear => "unclear",
        }
    }
}

/// One parsed `quiz_turn` call.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizTurn {
    pub signal: ClassifiedSignal,
    pub message: String,
    pub options: Vec<String>,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedToolOutput {
    #[error("No quiz_turn call in generator output")]
    MissingToolCall,
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Invalid value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Extract the `quiz_turn` call from a generator response.
///
/// Models that ignore tool calling sometimes put the arguments object in
/// the message body instead; that is accepted too.
pub fn parse_quiz_turn(response: &LlmResponse) -> Result<QuizTurn, MalformedToolOutput> {
    let arguments = response
        .tool_calls
        .iter()
        .find(|call| call.name == QUIZ_TURN_TOOL)
        .map(|call| call.arguments.clone())
        .or_else(|| arguments_from_content(&response.content))
        .ok_or(MalformedToolOutput::MissingToolCall)?;

    parse_arguments(&arguments)
}

fn arguments_from_content(content: &str) -> Option<Value> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }
    let value: Value = serde_json::from_str(&content[start..=end]).ok()?;
    value.get("signal").is_some().then_some(value)
}

fn parse_arguments(arguments: &Value) -> Result<QuizTurn, MalformedToolOutput> {
    let signal_name = arguments
        .get("signal")
        .and_then(Value::as_str)
        .ok_or(MalformedToolOutput::MissingField("signal"))?;

    let signal = match signal_name.trim().to_ascii_lowercase().as_str() {
        "answer" => {
            let correct = arguments
                .get("correct")
                .and_then(Value::as_bool)
                .ok_or(MalformedToolOutput::MissingField("correct"))?;
            ClassifiedSignal::Answer { correct }
        }
        "dont_know" | "dont-know" => ClassifiedSignal::DontKnow,
        "skip" => ClassifiedSignal::Skip,
        "continue" => ClassifiedSignal::Continue,
        "unclear" => ClassifiedSignal::Unclear,
        other => {
            return Err(MalformedToolOutput::InvalidField {
                field: "signal",
                value: other.to_string(),
            })
        }
    };

    let message = arguments
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or(MalformedToolOutput::MissingField("message"))?
        .to_string();

    let options = match arguments.get("options") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Some(other) => {
            return Err(MalformedToolOutput::InvalidField {
                field: "options",
                value: other.to_string(),
            })
        }
    };

    let explanation = arguments
        .get("explanation")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string);

    Ok(QuizTurn {
        signal,
        message,
        options,
        explanation,
    })
}
