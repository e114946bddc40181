//! Content generators: explain, quiz, summarize.
//!
//! Each generator delegates to the configured [`GenerativeBackend`] when one
//! is available and falls back to a deterministic local computation when the
//! backend is absent or its invocation fails. Fallback never errors.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{GenerativeBackend, QuizQuestion};

/// Defaults applied when a request leaves the knobs unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorDefaults {
    /// Difficulty register used by explain fallback output.
    #[serde(default = "GeneratorDefaults::default_explain_level")]
    pub explain_level: String,
    /// Number of questions per quiz.
    #[serde(default = "GeneratorDefaults::default_quiz_count")]
    pub quiz_count: usize,
    /// Number of sentences per summary.
    #[serde(default = "GeneratorDefaults::default_summary_sentences")]
    pub summary_sentences: usize,
}

impl GeneratorDefaults {
    fn default_explain_level() -> String {
        "basic".to_string()
    }

    const fn default_quiz_count() -> usize {
        3
    }

    const fn default_summary_sentences() -> usize {
        2
    }
}

impl Default for GeneratorDefaults {
    fn default() -> Self {
        Self {
            explain_level: Self::default_explain_level(),
            quiz_count: Self::default_quiz_count(),
            summary_sentences: Self::default_summary_sentences(),
        }
    }
}

/// Explain a topic at the given level.
///
/// `reference` is optional best-effort encyclopedia text folded into the
/// backend prompt; it plays no part in the fallback.
pub async fn explain<B>(
    backend: Option<&B>,
    topic: &str,
    level: &str,
    reference: Option<&str>,
) -> String
where
    B: GenerativeBackend + ?Sized,
{
    let topic = normalized(topic, "a topic");

    if let Some(backend) = backend {
        match backend.generate(&explain_prompt(&topic, reference)).await {
            Ok(text) => return text,
            Err(e) => warn!("Explain generation failed, using fallback: {e}"),
        }
    }

    format!(
        "{} is a concept explained at a {level} level.",
        capitalize(&topic)
    )
}

/// Result of the quiz parsing pipeline: structured questions, or a visible
/// degradation marker wrapping output that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizResult {
    Generated(Vec<QuizQuestion>),
    Degraded(QuizQuestion),
}

impl QuizResult {
    /// Parse raw backend output into structured questions. Output that is
    /// not a JSON question list becomes a single marker question carrying
    /// the raw text, with no choices and answer index 0.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<Vec<QuizQuestion>>(raw.trim()) {
            Ok(questions) => Self::Generated(questions),
            Err(e) => {
                warn!("Quiz output failed to parse, degrading: {e}");
                Self::Degraded(QuizQuestion {
                    question: raw.to_string(),
                    choices: Vec::new(),
                    answer: 0,
                })
            }
        }
    }

    /// Flatten into the question list handed to callers.
    #[must_use]
    pub fn into_questions(self) -> Vec<QuizQuestion> {
        match self {
            Self::Generated(questions) => questions,
            Self::Degraded(marker) => vec![marker],
        }
    }
}

/// Generate `count` multiple-choice questions about a topic.
pub async fn quiz<B>(backend: Option<&B>, topic: &str, count: usize) -> Vec<QuizQuestion>
where
    B: GenerativeBackend + ?Sized,
{
    let topic = normalized(topic, "general");

    if let Some(backend) = backend {
        match backend.generate(&quiz_prompt(&topic, count)).await {
            Ok(raw) => return QuizResult::parse(&raw).into_questions(),
            Err(e) => warn!("Quiz generation failed, using fallback: {e}"),
        }
    }

    (0..count)
        .map(|i| QuizQuestion {
            question: format!("What is a concept about {topic}? ({})", i + 1),
            choices: (1..=4).map(|j| format!("Choice {j}")).collect(),
            answer: 0,
        })
        .collect()
}

/// Summarize text in roughly `sentences` sentences.
///
/// Empty or whitespace-only input short-circuits without touching the
/// backend.
pub async fn summarize<B>(backend: Option<&B>, text: &str, sentences: usize) -> String
where
    B: GenerativeBackend + ?Sized,
{
    let text = text.trim();
    if text.is_empty() {
        return "No text provided.".to_string();
    }

    if let Some(backend) = backend {
        match backend.generate(&summary_prompt(text, sentences)).await {
            Ok(summary) => return summary,
            Err(e) => warn!("Summary generation failed, using fallback: {e}"),
        }
    }

    let parts: Vec<&str> = text
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .take(sentences)
        .collect();

    format!("{}.", parts.join(". "))
}

fn explain_prompt(topic: &str, reference: Option<&str>) -> String {
    let base = format!("Give a concise definition of {topic}.");
    match reference {
        Some(context) if !context.trim().is_empty() => {
            format!("{base}\n\nReference material:\n{context}")
        }
        _ => base,
    }
}

fn quiz_prompt(topic: &str, count: usize) -> String {
    format!(
        "Create {count} multiple-choice questions about {topic}. \
         Return JSON only with: question, choices (4), answer index."
    )
}

fn summary_prompt(text: &str, sentences: usize) -> String {
    format!("Summarize this in {sentences} sentences:\n{text}")
}

fn normalized(value: &str, placeholder: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        placeholder.to_string()
    } else {
        trimmed.to_string()
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str().to_lowercase().as_str()
    })
}
