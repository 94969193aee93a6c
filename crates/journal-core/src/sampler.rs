//! Token selection.

use crate::provider::Token;

/// Sampling knobs accepted at the public surface.
///
/// Only greedy selection is implemented; `temperature` and `top_p` are
/// carried through for API compatibility and do not affect the output.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SamplingParams {
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

fn default_top_p() -> f32 {
    1.0
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            top_p: default_top_p(),
        }
    }
}

/// Index of the highest score. Ties go to the lowest id: a later score
/// must be strictly greater to win. `None` for an empty distribution.
pub fn greedy(logits: &[f32]) -> Option<Token> {
    let (first, rest) = logits.split_first()?;
    let mut best_token = 0usize;
    let mut best_score = *first;
    for (i, &score) in rest.iter().enumerate() {
        if score > best_score {
            best_score = score;
            best_token = i + 1;
        }
    }
    Some(best_token as Token)
}
