//! Backend-neutral token batch.

use crate::provider::Token;

/// Sequence id used for every token; the engine serves one stream per call.
pub const SEQ_ID: i32 = 0;

/// One position submitted to the evaluation context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchEntry {
    pub token: Token,
    pub pos: i32,
    pub seq_id: i32,
    /// Request the output distribution for this position.
    pub logits: bool,
}

/// Tokens to feed into [`Decoder::decode`](crate::provider::Decoder::decode).
///
/// Native decoders translate this into their own batch structure; the
/// ordering of entries is the submission order.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    entries: Vec<BatchEntry>,
}

impl Batch {
    pub fn with_capacity(n_tokens_max: usize) -> Self {
        Self {
            entries: Vec::with_capacity(n_tokens_max),
        }
    }

    /// The priming batch: positions `0..N-1` in order, output requested
    /// only for the final token.
    pub fn prompt(tokens: &[Token]) -> Self {
        let mut batch = Self::with_capacity(tokens.len());
        let last = tokens.len().saturating_sub(1);
        for (i, &tok) in tokens.iter().enumerate() {
            batch.add(tok, i as i32, SEQ_ID, i == last);
        }
        batch
    }

    /// A single fed-back token at `pos`, requesting its distribution.
    pub fn single(token: Token, pos: i32) -> Self {
        let mut batch = Self::with_capacity(1);
        batch.add(token, pos, SEQ_ID, true);
        batch
    }

    pub fn add(&mut self, token: Token, pos: i32, seq_id: i32, logits: bool) {
        self.entries.push(BatchEntry {
            token,
            pos,
            seq_id,
            logits,
        });
    }

    pub fn n_tokens(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }
}
