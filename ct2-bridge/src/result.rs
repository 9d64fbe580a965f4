//! Result objects returned by batch translation

use crate::error::{BridgeError, BridgeResult};

/// One candidate output for an input sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Hypothesis {
    pub tokens: Vec<String>,
    /// Model score, present when the engine was asked to return scores
    pub score: Option<f32>,
}

impl Hypothesis {
    pub fn new(tokens: Vec<String>) -> Self {
        Self {
            tokens,
            score: None,
        }
    }

    pub fn with_score(tokens: Vec<String>, score: f32) -> Self {
        Self {
            tokens,
            score: Some(score),
        }
    }
}

/// Ranked hypotheses for one input sequence, best first
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TranslationResult {
    pub hypotheses: Vec<Hypothesis>,
}

impl TranslationResult {
    pub fn new(hypotheses: Vec<Hypothesis>) -> Self {
        Self { hypotheses }
    }

    /// Build from the engine's parallel `hypotheses` and `scores` lists.
    /// Scores are attached only when one exists for every hypothesis.
    pub fn from_parts(hypotheses: Vec<Vec<String>>, scores: Vec<f32>) -> Self {
        let attach = scores.len() == hypotheses.len();
        let hypotheses = hypotheses
            .into_iter()
            .enumerate()
            .map(|(i, tokens)| Hypothesis {
                tokens,
                score: if attach { Some(scores[i]) } else { None },
            })
            .collect();
        Self { hypotheses }
    }

    pub fn best(&self) -> Option<&Hypothesis> {
        self.hypotheses.first()
    }

    pub fn into_best(self) -> Option<Hypothesis> {
        self.hypotheses.into_iter().next()
    }
}

/// Top-ranked hypothesis of every result, in input order
pub fn top_hypotheses(results: &[TranslationResult]) -> BridgeResult<Vec<Vec<String>>> {
    results
        .iter()
        .enumerate()
        .map(|(index, result)| {
            result
                .best()
                .map(|h| h.tokens.clone())
                .ok_or(BridgeError::MissingHypothesis { index })
        })
        .collect()
}

/// Owning variant of [`top_hypotheses`]
pub fn into_top_hypotheses(results: Vec<TranslationResult>) -> BridgeResult<Vec<Vec<String>>> {
    results
        .into_iter()
        .enumerate()
        .map(|(index, result)| {
            result
                .into_best()
                .map(|h| h.tokens)
                .ok_or(BridgeError::MissingHypothesis { index })
        })
        .collect()
}
