//! Journal-entry helpers built on the text engine.

use crate::engine::TextEngine;
use crate::handle::Handle;
use crate::provider::TextBackend;

pub const SUMMARY_MAX_TOKENS: i32 = 64;
pub const MOOD_MAX_TOKENS: i32 = 8;

/// Two-sentence summary of `entry`, trimmed. Empty on failure.
pub fn summarize<B: TextBackend>(engine: &TextEngine<B>, handle: Handle, entry: &str) -> String {
    let prompt = format!(
        "Summarize the following journal entry in 2 sentences:\n\n{}\n\nSummary:",
        entry.trim()
    );
    engine
        .generate(handle, &prompt, SUMMARY_MAX_TOKENS, 0.0, 1.0)
        .trim()
        .to_owned()
}

/// Mood labels the model is asked to choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Calm,
    Happy,
    Anxious,
    Sad,
    Angry,
    Stressed,
    Grateful,
    Tired,
}

impl Mood {
    pub const ALL: [Mood; 8] = [
        Mood::Calm,
        Mood::Happy,
        Mood::Anxious,
        Mood::Sad,
        Mood::Angry,
        Mood::Stressed,
        Mood::Grateful,
        Mood::Tired,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Calm => "calm",
            Mood::Happy => "happy",
            Mood::Anxious => "anxious",
            Mood::Sad => "sad",
            Mood::Angry => "angry",
            Mood::Stressed => "stressed",
            Mood::Grateful => "grateful",
            Mood::Tired => "tired",
        }
    }

    /// First word of `text` that names a mood, ignoring case and punctuation.
    pub fn from_generated(text: &str) -> Option<Mood> {
        text.split(|c: char| !c.is_alphabetic())
            .filter(|w| !w.is_empty())
            .find_map(|word| {
                let word = word.to_lowercase();
                Mood::ALL.into_iter().find(|m| m.as_str() == word)
            })
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify `entry` into one [`Mood`]. `None` if the model's answer names
/// none of them.
pub fn mood<B: TextBackend>(engine: &TextEngine<B>, handle: Handle, entry: &str) -> Option<Mood> {
    let labels = Mood::ALL.map(Mood::as_str).join(",");
    let prompt = format!(
        "Choose ONE mood word from [{labels}] for this journal entry. \
         Output ONLY the word. Entry: {}\nMood:",
        entry.trim()
    );
    let answer = engine.generate(handle, &prompt, MOOD_MAX_TOKENS, 0.0, 1.0);
    Mood::from_generated(&answer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_mood_word() {
        assert_eq!(Mood::from_generated(" Grateful."), Some(Mood::Grateful));
        assert_eq!(Mood::from_generated("I'd say TIRED, maybe sad"), Some(Mood::Tired));
    }

    #[test]
    fn unknown_answer_is_none() {
        assert_eq!(Mood::from_generated("elated"), None);
        assert_eq!(Mood::from_generated(""), None);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Mood::Anxious).unwrap(), "\"anxious\"");
    }
}
