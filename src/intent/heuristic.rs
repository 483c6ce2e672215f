//! Regex-based intent classification.
//!
//! Each category carries a set of patterns; the score for a category is the
//! fraction of its patterns that match, boosted for short messages where the
//! intent tends to be unambiguous.

use regex::Regex;

use crate::intent::{Intent, IntentClassification};

/// Score below which the classifier falls back to [`Intent::Query`].
const MIN_SCORE: f64 = 0.1;

/// A pattern set for one intent category.
struct PatternSet {
    intent: Intent,
    patterns: Vec<Regex>,
}

/// Heuristic intent classifier backed by per-category regex sets.
pub struct HeuristicClassifier {
    sets: Vec<PatternSet>,
}

impl HeuristicClassifier {
    /// Build the classifier with its built-in pattern sets.
    ///
    /// # Errors
    /// Returns an error if any regex pattern is invalid.
    pub fn new() -> Result<Self, regex::Error> {
        let greetings = compile(&[
            r"(?i)\b(hi|hello|hey|good morning|good afternoon|good evening|greetings)\b",
            r"(?i)\b(how are you|how do you do|what's up|sup)\b",
            r"(?i)\b(nice to meet you|pleased to meet you)\b",
            r"(?i)\b(good day|good night)\b",
            r"(?i)^!*(hello|hi|hey)!*$",
        ])?;

        let query = compile(&[
            r"(?i)\b(what|how|why|when|where|who|which)\b",
            r"(?i)\b(explain|describe|tell me|show me|help me)\b",
            r"(?i)\b(how to|how do|how can|how does)\b",
            r"(?i)\b(what is|what are|what does|what do)\b",
            r"(?i)\b(can you|could you|would you|will you)\b",
            r"(?i)\b(please|help|assist|support)\b",
            r"\?",
        ])?;

        let information = compile(&[
            r"(?i)\b(here is|here are|let me tell you|i want to tell you)\b",
            r"(?i)\b(i have|i know|i think|i believe|i feel)\b",
            r"(?i)\b(in my opinion|according to|based on)\b",
            r"(?i)\b(i want to share|i'd like to share|let me share)\b",
            r"(?i)\b(i found|i discovered|i learned)\b",
            r"(?i)\b(update|news|information|data|fact)\b",
        ])?;

        let feedback = compile(&[
            r"(?i)\b(thank you|thanks|thx|thank)\b",
            r"(?i)\b(great|awesome|excellent|amazing|wonderful|fantastic)\b",
            r"(?i)\b(good|nice|cool|perfect|brilliant)\b",
            r"(?i)\b(bad|terrible|awful|horrible|disappointing)\b",
            r"(?i)\b(wrong|incorrect|not right|not correct)\b",
            r"(?i)\b(helpful|useful|useless|not helpful)\b",
            r"(?i)\b(agree|disagree)\b",
            r"(?i)\b(rate|rating|score|review|feedback)\b",
        ])?;

        Ok(Self {
            sets: vec![
                PatternSet {
                    intent: Intent::Greetings,
                    patterns: greetings,
                },
                PatternSet {
                    intent: Intent::Query,
                    patterns: query,
                },
                PatternSet {
                    intent: Intent::Information,
                    patterns: information,
                },
                PatternSet {
                    intent: Intent::Feedback,
                    patterns: feedback,
                },
            ],
        })
    }

    /// Classify a message into an intent category with a confidence score.
    ///
    /// Empty input yields (`query`, 0.0); input matching nothing clearly
    /// yields (`query`, 0.1).
    #[must_use]
    pub fn classify(&self, message: &str) -> IntentClassification {
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return IntentClassification {
                intent: Intent::Query,
                confidence: 0.0,
            };
        }

        let mut best = IntentClassification {
            intent: Intent::Query,
            confidence: 0.0,
        };
        for set in &self.sets {
            let score = score(trimmed, &set.patterns);
            if score > best.confidence {
                best = IntentClassification {
                    intent: set.intent,
                    confidence: score,
                };
            }
        }

        if best.confidence < MIN_SCORE {
            return IntentClassification {
                intent: Intent::Query,
                confidence: MIN_SCORE,
            };
        }

        best
    }
}

fn compile(sources: &[&str]) -> Result<Vec<Regex>, regex::Error> {
    sources.iter().map(|s| Regex::new(s)).collect()
}

/// Fraction of matching patterns, boosted for short messages.
fn score(message: &str, patterns: &[Regex]) -> f64 {
    if patterns.is_empty() {
        return 0.0;
    }

    let matches = patterns.iter().filter(|p| p.is_match(message)).count();
    #[allow(clippy::cast_precision_loss)]
    let base = matches as f64 / patterns.len() as f64;

    // Short messages carry clearer intent; long ones dilute pattern hits.
    #[allow(clippy::cast_precision_loss)]
    let length_factor = (1.0 - message.len() as f64 / 200.0).max(0.5);

    (base * length_factor).min(1.0)
}
