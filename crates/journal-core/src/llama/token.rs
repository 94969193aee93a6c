//! Tokenization helpers over the raw vocabulary pointer.

use std::ffi::{CString, c_char};

use crate::error::{BridgeError, Result};
use crate::provider::Token;

/// Tokenize `text` using the model's vocabulary.
///
/// llama.cpp reports a too-small buffer as the negated required length, so
/// the first call sizes the buffer and the second fills it.
pub fn tokenize(
    vocab: *const llama_sys::llama_vocab,
    text: &str,
    add_special: bool,
    parse_special: bool,
) -> Result<Vec<Token>> {
    let c_text = CString::new(text)
        .map_err(|_| BridgeError::TokenizationFailed("text contains null byte".into()))?;
    let fill = |buf: &mut [Token]| unsafe {
        llama_sys::llama_tokenize(
            vocab,
            c_text.as_ptr(),
            text.len() as i32,
            buf.as_mut_ptr(),
            buf.len() as i32,
            add_special,
            parse_special,
        )
    };

    let needed = match fill(&mut []) {
        n if n < 0 => n.unsigned_abs() as usize,
        _ => return Ok(Vec::new()),
    };

    let mut tokens = vec![0 as Token; needed];
    let written = fill(&mut tokens);
    if written < 0 {
        return Err(BridgeError::TokenizationFailed(format!(
            "llama_tokenize returned {written}"
        )));
    }
    tokens.truncate(written as usize);
    Ok(tokens)
}

/// Text piece for a single token, `None` if llama.cpp cannot render it.
pub fn token_to_piece(vocab: *const llama_sys::llama_vocab, token: Token) -> Option<String> {
    let mut buf = vec![0u8; 128];
    let mut len = piece_into(vocab, token, &mut buf);
    if len < 0 {
        buf.resize(len.unsigned_abs() as usize, 0);
        len = piece_into(vocab, token, &mut buf);
    }
    let len = usize::try_from(len).ok()?;
    buf.truncate(len);
    Some(String::from_utf8_lossy(&buf).into_owned())
}

fn piece_into(vocab: *const llama_sys::llama_vocab, token: Token, buf: &mut [u8]) -> i32 {
    unsafe {
        llama_sys::llama_token_to_piece(
            vocab,
            token,
            buf.as_mut_ptr().cast::<c_char>(),
            buf.len() as i32,
            0,
            false,
        )
    }
}
