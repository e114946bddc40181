//! Intent classification for incoming chat messages.
//!
//! An explicit intent field always wins; otherwise the message text is
//! sniffed against an ordered prefix table. Unrecognized explicit intents
//! normalize to [`Intent::Explain`] rather than erroring.

use serde::{Deserialize, Serialize};

/// The requested content operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Explain,
    Quiz,
    Summarize,
}

/// Prefix rules, evaluated first-match-wins. Order is part of the contract:
/// `quiz` beats `explain` beats `summarize`.
const PREFIX_RULES: &[(&str, Intent)] = &[
    ("quiz:", Intent::Quiz),
    ("explain:", Intent::Explain),
    ("summarize:", Intent::Summarize),
];

impl Intent {
    /// Parse an explicit intent token, case-insensitively.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "explain" => Some(Self::Explain),
            "quiz" => Some(Self::Quiz),
            "summarize" => Some(Self::Summarize),
            _ => None,
        }
    }

    /// The `type` tag this intent reports in chat responses.
    #[must_use]
    pub const fn response_kind(self) -> &'static str {
        match self {
            Self::Explain => "explain",
            Self::Quiz => "quiz",
            Self::Summarize => "summary",
        }
    }
}

/// Outcome of intent resolution: the chosen intent and the text forwarded to
/// the generator (prefix stripped when it was sniffed from the message).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub intent: Intent,
    pub payload: String,
}

/// Resolve the intent for one request.
#[must_use]
pub fn resolve(explicit: Option<&str>, message: &str) -> Resolution {
    if let Some(token) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
        return Resolution {
            intent: Intent::parse(token).unwrap_or(Intent::Explain),
            payload: message.to_string(),
        };
    }

    let lowered = message.to_ascii_lowercase();
    for (prefix, intent) in PREFIX_RULES {
        if lowered.starts_with(prefix) {
            return Resolution {
                intent: *intent,
                payload: message[prefix.len()..].trim().to_string(),
            };
        }
    }

    Resolution {
        intent: Intent::Explain,
        payload: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_intent_wins_over_prefix() {
        let resolution = resolve(Some("summarize"), "quiz: calculus");
        assert_eq!(resolution.intent, Intent::Summarize);
        // The prefix is left in place when the intent was explicit.
        assert_eq!(resolution.payload, "quiz: calculus");
    }

    #[test]
    fn explicit_intent_is_case_insensitive() {
        assert_eq!(resolve(Some("QUIZ"), "x").intent, Intent::Quiz);
        assert_eq!(resolve(Some("Explain"), "x").intent, Intent::Explain);
    }

    #[test]
    fn unrecognized_explicit_intent_normalizes_to_explain() {
        let resolution = resolve(Some("banter"), "hello");
        assert_eq!(resolution.intent, Intent::Explain);
        assert_eq!(resolution.payload, "hello");
    }

    #[test]
    fn blank_explicit_intent_falls_through_to_sniffing() {
        let resolution = resolve(Some("  "), "quiz: rust");
        assert_eq!(resolution.intent, Intent::Quiz);
        assert_eq!(resolution.payload, "rust");
    }

    #[test]
    fn prefix_sniffing_strips_prefix_and_whitespace() {
        let resolution = resolve(None, "explain:   photosynthesis");
        assert_eq!(resolution.intent, Intent::Explain);
        assert_eq!(resolution.payload, "photosynthesis");
    }

    #[test]
    fn prefix_sniffing_is_case_insensitive() {
        assert_eq!(resolve(None, "Quiz: algebra").intent, Intent::Quiz);
        assert_eq!(resolve(None, "SUMMARIZE: text").intent, Intent::Summarize);
    }

    #[test]
    fn no_intent_defaults_to_explain() {
        let resolution = resolve(None, "photosynthesis");
        assert_eq!(resolution.intent, Intent::Explain);
        assert_eq!(resolution.payload, "photosynthesis");
    }

    #[test]
    fn response_kind_normalizes_summarize() {
        assert_eq!(Intent::Summarize.response_kind(), "summary");
        assert_eq!(Intent::Quiz.response_kind(), "quiz");
        assert_eq!(Intent::Explain.response_kind(), "explain");
    }
}
