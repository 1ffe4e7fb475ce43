//! Comment-driven score adjustment.
//!
//! Scans a lead's free-text comments for intent vocabulary and punctuation
//! and shifts the classifier's initial score accordingly. Matching is by
//! substring presence over the lower-cased text: each phrase contributes its
//! weight at most once, and overlapping phrases ("not interested", "risk")
//! match independently. A positive phrase counts only when at least one of
//! its occurrences is not directly negated ("not sure", "don't want",
//! "no money").
//!
//! Only `comments` is ever scanned; structured lead fields such as `loan`
//! never reach this module.

use serde::Serialize;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

/// Points added per `!`.
pub const EXCLAMATION_WEIGHT: i32 = 2;
/// Points removed per `?`.
pub const QUESTION_WEIGHT: i32 = 1;

/// Prefixes that cancel a directly following positive phrase.
pub const NEGATORS: &[&str] = &["not ", "n't ", "no "];

pub const POSITIVE_KEYWORDS: &[(&str, i32)] = &[
    ("urgent", 15),
    ("interested", 10),
    ("ready", 10),
    ("immediately", 12),
    ("asap", 15),
    ("need", 8),
    ("want", 8),
    ("looking", 5),
    ("considering", 5),
    ("planning", 5),
    ("definitely", 10),
    ("sure", 8),
    ("yes", 5),
    ("positive", 8),
    ("good", 5),
    ("great", 8),
    ("excellent", 10),
    ("perfect", 12),
    ("investment", 8),
    ("financial", 5),
    ("money", 5),
    ("savings", 5),
    ("future", 5),
    ("family", 5),
    ("children", 5),
    ("retirement", 8),
    ("buy", 10),
    ("purchase", 10),
    ("apply", 10),
    ("sign", 10),
    ("proceed", 10),
];

pub const NEGATIVE_KEYWORDS: &[(&str, i32)] = &[
    ("not interested", -20),
    ("no interest", -15),
    ("not ready", -10),
    ("later", -8),
    ("maybe", -5),
    ("unsure", -8),
    ("uncertain", -8),
    ("doubt", -10),
    ("expensive", -8),
    ("costly", -8),
    ("too much", -10),
    ("cannot afford", -15),
    ("no money", -15),
    ("poor", -8),
    ("bad", -8),
    ("terrible", -10),
    ("worried", -8),
    ("concerned", -5),
    ("risk", -5),
    ("scared", -10),
    ("fear", -8),
    ("anxious", -5),
    ("stress", -5),
    ("debt", -10),
    ("owe", -10),
    ("loan", -5),
    ("credit", -5),
    ("bankrupt", -20),
    ("struggling", -10),
    ("difficult", -5),
    ("hard", -5),
    ("impossible", -15),
    ("never", -15),
    ("no way", -15),
    ("forget", -10),
    ("ignore", -10),
    ("delete", -10),
    ("unsubscribe", -15),
    ("stop", -10),
    ("quit", -10),
    ("leave", -8),
    ("exit", -8),
];

/// How a comment moved the score.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RerankBreakdown {
    pub positive_matches: Vec<(&'static str, i32)>,
    pub negative_matches: Vec<(&'static str, i32)>,
    pub exclamations: usize,
    pub questions: usize,
    pub adjustment: i32,
}

fn is_negated(text: &str, start: usize) -> bool {
    let before = &text[..start];
    NEGATORS.iter().any(|negator| before.ends_with(negator))
}

fn saturating_count(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

fn has_unnegated_occurrence(text: &str, phrase: &str) -> bool {
    text.match_indices(phrase)
        .any(|(start, _)| !is_negated(text, start))
}

/// Computes the signed adjustment for `comments` without applying it.
pub fn analyze(comments: &str) -> RerankBreakdown {
    if comments.is_empty() {
        return RerankBreakdown::default();
    }

    let lowered = comments.to_lowercase();

    let positive_matches: Vec<(&'static str, i32)> = POSITIVE_KEYWORDS
        .iter()
        .filter(|(phrase, _)| has_unnegated_occurrence(&lowered, phrase))
        .copied()
        .collect();

    let negative_matches: Vec<(&'static str, i32)> = NEGATIVE_KEYWORDS
        .iter()
        .filter(|(phrase, _)| lowered.contains(phrase))
        .copied()
        .collect();

    let exclamations = comments.matches('!').count();
    let questions = comments.matches('?').count();

    let keyword_total: i32 = positive_matches
        .iter()
        .chain(negative_matches.iter())
        .map(|(_, weight)| weight)
        .sum();

    let adjustment = keyword_total
        .saturating_add(EXCLAMATION_WEIGHT.saturating_mul(saturating_count(exclamations)))
        .saturating_sub(QUESTION_WEIGHT.saturating_mul(saturating_count(questions)));

    RerankBreakdown {
        positive_matches,
        negative_matches,
        exclamations,
        questions,
        adjustment,
    }
}

/// Applies the comment adjustment to `initial_score`, clamped to [0, 100].
pub fn rerank(initial_score: f64, comments: &str) -> f64 {
    if comments.is_empty() {
        return initial_score;
    }

    let breakdown = analyze(comments);

    for (phrase, weight) in &breakdown.positive_matches {
        tracing::debug!("Positive keyword '{}' found: +{}", phrase, weight);
    }
    for (phrase, weight) in &breakdown.negative_matches {
        tracing::debug!("Negative keyword '{}' found: {}", phrase, weight);
    }
    if breakdown.exclamations > 0 || breakdown.questions > 0 {
        tracing::debug!(
            "Punctuation found: {} exclamation(s), {} question(s)",
            breakdown.exclamations,
            breakdown.questions
        );
    }

    (initial_score + f64::from(breakdown.adjustment)).clamp(MIN_SCORE, MAX_SCORE)
}
