//! Greedy autoregressive generation.

use serde::Serialize;
use tracing::{debug, warn};

use crate::batch::Batch;
use crate::error::{BridgeError, Result};
use crate::provider::{Decoder, Token, Vocabulary};
use crate::sampler::{SamplingParams, greedy};

/// Parameters for a generation request.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    /// Upper bound on generated fragments.
    pub max_tokens: u32,
    /// Accepted but inert; selection is always greedy.
    pub sampling_params: SamplingParams,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens,
            sampling_params: SamplingParams::default(),
        }
    }
}

/// Why the generation loop stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// End-of-sequence token selected.
    Stop,
    /// Reached `max_tokens`.
    Length,
    /// A feed-back decode step failed; the text is partial.
    DecodeFailed(i32),
    /// The selected token had no text fragment; the text is partial.
    Unresolvable(Token),
    /// The context produced no output distribution.
    MissingLogits,
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stop => write!(f, "stop"),
            Self::Length => write!(f, "length"),
            Self::DecodeFailed(code) => write!(f, "decode_failed:{code}"),
            Self::Unresolvable(tok) => write!(f, "unresolvable:{tok}"),
            Self::MissingLogits => write!(f, "missing_logits"),
        }
    }
}

/// Result of one generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Generation {
    pub text: String,
    pub finish_reason: FinishReason,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Run a synchronous (blocking) generation loop against `ctx`.
///
/// The context is cleared first so every call primes from position 0.
/// Tokenization that yields nothing and a failed priming pass are errors;
/// anything that goes wrong after priming ends the loop and returns the
/// text accumulated so far with the matching [`FinishReason`].
pub fn generate_blocking<D: Decoder>(ctx: &mut D, request: &GenerateRequest) -> Result<Generation> {
    let mut tokens = ctx.vocab().tokenize(&request.prompt, true)?;
    if tokens.is_empty() {
        return Err(BridgeError::EmptyPrompt);
    }
    let eos = ctx.vocab().eos();
    let prompt_tokens = tokens.len() as u32;

    //  Priming pass
    ctx.reset();
    ctx.decode(&Batch::prompt(&tokens))?;
    debug!(prompt_tokens, max_tokens = request.max_tokens, "Prompt primed");

    let mut text = String::new();
    let mut completion_tokens = 0u32;

    //  Token generation loop
    let finish_reason = loop {
        if completion_tokens >= request.max_tokens {
            break FinishReason::Length;
        }

        let Some(next) = ctx.logits().and_then(greedy) else {
            warn!("No output distribution after decode");
            break FinishReason::MissingLogits;
        };

        if next == eos {
            break FinishReason::Stop;
        }

        let Some(piece) = ctx.vocab().token_piece(next) else {
            warn!(token = next, "Token has no text fragment");
            break FinishReason::Unresolvable(next);
        };
        text.push_str(&piece);
        completion_tokens += 1;

        // Feed back at the next sequential position.
        if let Err(e) = ctx.decode(&Batch::single(next, tokens.len() as i32)) {
            warn!(error = %e, completion_tokens, "Decode step failed, returning partial output");
            let code = match e {
                BridgeError::DecodeFailed(code) => code,
                _ => -1,
            };
            break FinishReason::DecodeFailed(code);
        }
        tokens.push(next);
    };

    debug!(%finish_reason, completion_tokens, "Generation finished");
    Ok(Generation {
        text,
        finish_reason,
        prompt_tokens,
        completion_tokens,
    })
}
