use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How correctness feedback is delivered during a session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum QuizMode {
    /// Reveals the correct answer and explanation after every question
    Guided,
    /// Defers all feedback until the session ends
    Exam,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A single generated multiple-choice question. Immutable once generated;
/// owned by the session for its lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    pub text: String,
    pub options: Vec<String>,
    #[serde(rename = "correctIndex")]
    pub correct_index: usize,
    pub explanation: String,
}

pub const OPTIONS_PER_QUESTION: usize = 4;

impl Question {
    /// A question is usable when it has exactly four options, a correct
    /// index pointing at one of them, and non-empty text.
    pub fn is_well_formed(&self) -> bool {
        !self.text.trim().is_empty()
            && self.options.len() == OPTIONS_PER_QUESTION
            && self.correct_index < self.options.len()
    }
}

/// What kind of payload a source file contributes to the generation request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// Base64-encoded bytes sent as inline data
    Pdf,
    /// Plain text folded into the prompt
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub name: String,
    pub content: String,
    pub kind: SourceKind,
}

pub const MAX_DURATION_MINUTES: u32 = 180;
pub const MAX_QUESTION_COUNT: u32 = 100;

/// User-supplied quiz parameters. Constructed once from the configuration
/// form and read-only afterward.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizConfig {
    pub topic: String,
    pub sources: Vec<SourceFile>,
    pub duration_minutes: u32,
    pub question_count: u32,
    pub mode: QuizMode,
    pub difficulty: Difficulty,
}

impl QuizConfig {
    /// A request needs at least a topic or one source document.
    pub fn has_material(&self) -> bool {
        !self.topic.trim().is_empty() || !self.sources.is_empty()
    }
}

/// Question index -> selected option index. Re-answering overwrites, so at
/// most one entry exists per question.
pub type AnswerSheet = BTreeMap<usize, usize>;

/// Derived once per session at finish time.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizResult {
    pub score: usize,
    pub total: usize,
    pub answers: AnswerSheet,
    pub time_spent_seconds: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: usize) -> Question {
        Question {
            text: "Which layer handles routing?".into(),
            options: vec![
                "Physical".into(),
                "Data link".into(),
                "Network".into(),
                "Transport".into(),
            ],
            correct_index: correct,
            explanation: "Routing is a network-layer concern.".into(),
        }
    }

    #[test]
    fn well_formed_question_passes_validation() {
        assert!(question(2).is_well_formed());
    }

    #[test]
    fn out_of_range_correct_index_fails_validation() {
        assert!(!question(4).is_well_formed());
    }

    #[test]
    fn wrong_option_count_fails_validation() {
        let mut q = question(0);
        q.options.pop();
        assert!(!q.is_well_formed());

        q.options.push("Session".into());
        q.options.push("Presentation".into());
        assert!(!q.is_well_formed());
    }

    #[test]
    fn blank_text_fails_validation() {
        let mut q = question(1);
        q.text = "   ".into();
        assert!(!q.is_well_formed());
    }

    #[test]
    fn question_deserializes_wire_names() {
        let json = r#"{
            "question": "2 + 2?",
            "options": ["3", "4", "5", "22"],
            "correctIndex": 1,
            "explanation": "Basic arithmetic."
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.text, "2 + 2?");
        assert_eq!(q.correct_index, 1);
        assert!(q.is_well_formed());
    }

    #[test]
    fn question_rejects_missing_fields() {
        let json = r#"{ "question": "incomplete", "options": ["a","b","c","d"] }"#;
        assert!(serde_json::from_str::<Question>(json).is_err());
    }

    #[test]
    fn config_material_check() {
        let mut config = QuizConfig {
            topic: String::new(),
            sources: vec![],
            duration_minutes: 90,
            question_count: 10,
            mode: QuizMode::Exam,
            difficulty: Difficulty::Medium,
        };
        assert!(!config.has_material());

        config.topic = "  ".into();
        assert!(!config.has_material());

        config.topic = "TCP/IP".into();
        assert!(config.has_material());

        config.topic.clear();
        config.sources.push(SourceFile {
            name: "guide.txt".into(),
            content: "networking notes".into(),
            kind: SourceKind::Text,
        });
        assert!(config.has_material());
    }

    #[test]
    fn mode_and_difficulty_display() {
        assert_eq!(QuizMode::Guided.to_string(), "Guided");
        assert_eq!(QuizMode::Exam.to_string(), "Exam");
        assert_eq!(Difficulty::Hard.to_string(), "Hard");
    }
}
