//! Prompt complexity scoring.
//!
//! A cheap, pure heuristic over the prompt text. Each signal found adds its
//! weight to the score, and the score maps onto a [`Complexity`] level:
//!
//! | score | level |
//! |-------|-------|
//! | < 2 | `simple` |
//! | 2..=4 | `moderate` |
//! | 5..=7 | `complex` |
//! | >= 8 | `multi_faceted` |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Words above which a prompt counts as carrying long context
const LONG_CONTEXT_WORDS: usize = 300;

/// Keyword signals: name, weight, and the lowercase phrases that trigger it
const KEYWORD_SIGNALS: [(&str, u32, &[&str]); 4] = [
    (
        "legal_keywords",
        2,
        &["lawsuit", "legal", "case", "law firm", "attorney", "contract", "litigation"],
    ),
    (
        "analysis_request",
        1,
        &["analyze", "review", "examine", "assess", "evaluate", "identify", "determine"],
    ),
    (
        "multiple_parts",
        2,
        &["then", "also", "additionally", "furthermore", "based on", "after that"],
    ),
    (
        "file_references",
        3,
        &["uploaded", "attached", "file", "document", "summary", "case files"],
    ),
];

/// How demanding a prompt looks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
    MultiFaceted,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Moderate => "moderate",
            Complexity::Complex => "complex",
            Complexity::MultiFaceted => "multi_faceted",
        }
    }

    pub fn from_score(score: u32) -> Self {
        match score {
            8.. => Complexity::MultiFaceted,
            5.. => Complexity::Complex,
            2.. => Complexity::Moderate,
            _ => Complexity::Simple,
        }
    }

    pub fn all() -> [Complexity; 4] {
        [
            Complexity::Simple,
            Complexity::Moderate,
            Complexity::Complex,
            Complexity::MultiFaceted,
        ]
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of scoring one prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexityReport {
    pub level: Complexity,
    pub score: u32,
    pub word_count: usize,
    /// Names of the signals that fired
    pub signals: Vec<&'static str>,
}

impl ComplexityReport {
    /// Score a prompt
    pub fn assess(text: &str) -> Self {
        let lower = text.to_lowercase();
        let word_count = text.split_whitespace().count();

        let mut score = 0;
        let mut signals = Vec::new();
        let mut fire = |name: &'static str, weight: u32, hit: bool| {
            if hit {
                score += weight;
                signals.push(name);
            }
        };

        fire("multiple_questions", 2, text.matches('?').count() > 1);
        fire("numbered_list", 2, has_numbered_list(text));
        fire("long_context", 3, word_count > LONG_CONTEXT_WORDS);
        for (name, weight, phrases) in KEYWORD_SIGNALS {
            fire(name, weight, phrases.iter().any(|p| lower.contains(p)));
        }

        Self {
            level: Complexity::from_score(score),
            score,
            word_count,
            signals,
        }
    }
}

/// `1)` .. `9)` or `1.` .. `9.` anywhere in the text
fn has_numbered_list(text: &str) -> bool {
    text.as_bytes()
        .windows(2)
        .any(|w| matches!(w[0], b'1'..=b'9') && matches!(w[1], b')' | b'.'))
}
