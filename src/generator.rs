use crate::quiz::{Question, QuizConfig, SourceKind, OPTIONS_PER_QUESTION};
use serde_json::{json, Value};
use std::time::Duration;

pub const GEMINI_MODEL: &str = "gemini-3-pro-preview";
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Failure while producing a question set. Every variant is recoverable: the
/// message is surfaced once and the user lands back on the configuration
/// form with prior input intact.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("no API key: set the {API_KEY_VAR} environment variable")]
    MissingApiKey,
    #[error("could not reach the generation backend: {0}")]
    Http(#[from] reqwest::Error),
    #[error("generation backend returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("malformed generation response: {0}")]
    Malformed(String),
    #[error("generated quiz failed validation: {0}")]
    Invalid(String),
}

/// Builds certification-quiz prompts and turns Gemini's structured JSON
/// response back into questions. Blocking by design; the caller runs it on a
/// worker thread and feeds the outcome into the event loop.
#[derive(Debug)]
pub struct QuizGenerator {
    client: reqwest::blocking::Client,
    api_key: String,
}

impl QuizGenerator {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_key,
        }
    }

    pub fn from_env() -> Result<Self, GenerationError> {
        match std::env::var(API_KEY_VAR) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key)),
            _ => Err(GenerationError::MissingApiKey),
        }
    }

    pub fn generate(&self, config: &QuizConfig) -> Result<Vec<Question>, GenerationError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            GEMINI_MODEL
        );

        log::info!(
            "requesting {} questions on {:?} difficulty ({} source files)",
            config.question_count,
            config.difficulty,
            config.sources.len()
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(config))
            .timeout(REQUEST_TIMEOUT)
            .send()?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(GenerationError::Api { status, body });
        }

        let envelope: Value = response.json()?;
        parse_payload(&envelope, config.question_count)
    }
}

/// Assembles the text prompt. Text sources are folded in directly; PDF
/// sources travel as inline data parts alongside it.
pub fn build_prompt(config: &QuizConfig) -> String {
    let mut prompt = format!(
        "Create a professional certification-style multiple choice quiz with EXACTLY {} questions. This is a strict requirement.",
        config.question_count
    );

    if !config.topic.trim().is_empty() {
        prompt.push_str(&format!(" The topic is: \"{}\".", config.topic.trim()));
    }

    if !config.sources.is_empty() {
        prompt.push_str(
            " Use the attached source material as the primary basis for the questions. \
             Analyze it deeply to create high-quality, relevant questions.",
        );
    }

    prompt.push_str(&format!(
        "\nTarget an overall {} difficulty level.\n\
         Cover different aspects of the subject.\n\
         Each question must have exactly {} options.\n\
         Provide a clear, educational explanation for the correct answer.\n\
         Return strictly JSON.",
        config.difficulty.to_string().to_lowercase(),
        OPTIONS_PER_QUESTION
    ));

    for source in &config.sources {
        if source.kind == SourceKind::Text {
            prompt.push_str(&format!(
                "\n\nSource material from \"{}\":\n{}",
                source.name, source.content
            ));
        }
    }

    prompt
}

/// Full `generateContent` request: prompt part, one inline-data part per PDF
/// source, and a response schema that forces the question shape.
pub fn request_body(config: &QuizConfig) -> Value {
    let mut parts = vec![json!({ "text": build_prompt(config) })];

    for source in &config.sources {
        if source.kind == SourceKind::Pdf {
            parts.push(json!({
                "inline_data": {
                    "mime_type": "application/pdf",
                    "data": source.content,
                }
            }));
        }
    }

    json!({
        "contents": [{ "parts": parts }],
        "generationConfig": {
            "response_mime_type": "application/json",
            "response_schema": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "question": { "type": "STRING" },
                        "options": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" },
                            "description": "Must contain exactly 4 options",
                        },
                        "correctIndex": {
                            "type": "INTEGER",
                            "description": "0-based index of the correct option",
                        },
                        "explanation": { "type": "STRING" },
                    },
                    "required": ["question", "options", "correctIndex", "explanation"],
                },
            },
        },
    })
}

/// Extracts and validates the question list from a `generateContent`
/// response envelope. A count mismatch against the request is a soft
/// condition: logged, and whatever came back is used.
pub fn parse_payload(envelope: &Value, requested: u32) -> Result<Vec<Question>, GenerationError> {
    let text = envelope
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(|t| t.as_str())
        .ok_or_else(|| GenerationError::Malformed("no response text".into()))?;

    let questions: Vec<Question> =
        serde_json::from_str(text).map_err(|e| GenerationError::Malformed(e.to_string()))?;

    if questions.is_empty() {
        return Err(GenerationError::Invalid("empty question list".into()));
    }

    for (i, q) in questions.iter().enumerate() {
        if !q.is_well_formed() {
            return Err(GenerationError::Invalid(format!(
                "question {} has {} options with correct index {}",
                i + 1,
                q.options.len(),
                q.correct_index
            )));
        }
    }

    if questions.len() != requested as usize {
        log::warn!(
            "requested {} questions but the backend returned {}",
            requested,
            questions.len()
        );
    }

    Ok(questions)
}
