//! Word sequencing for RSVP playback.
//!
//! Converts normalized text into the ordered token stream the playback
//! engine consumes: real words interleaved with paragraph-boundary markers,
//! plus the optical recognition point (ORP) math used to pick each word's
//! focal character.

use crate::patterns::PARAGRAPH_SPLIT;

/// One entry in a word sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A real word to display.
    Word(String),
    /// A paragraph boundary, rendered as a pause rather than a word.
    ParagraphBreak,
}

impl Token {
    /// The word text, or `None` for a paragraph marker.
    #[must_use]
    pub fn as_word(&self) -> Option<&str> {
        match self {
            Token::Word(w) => Some(w),
            Token::ParagraphBreak => None,
        }
    }

    /// Whether this token is a real word.
    #[must_use]
    pub fn is_word(&self) -> bool {
        matches!(self, Token::Word(_))
    }
}

/// Splits text into the playback token sequence.
///
/// Paragraphs are separated by blank lines; words within a paragraph split on
/// whitespace. One marker is placed between the words of adjacent non-empty
/// paragraphs; empty paragraphs are dropped without emitting a marker. A
/// marker therefore never appears first, last, or next to another marker.
#[must_use]
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();

    for paragraph in PARAGRAPH_SPLIT.split(text) {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }
        if !tokens.is_empty() {
            tokens.push(Token::ParagraphBreak);
        }
        tokens.extend(words.into_iter().map(|w| Token::Word(w.to_string())));
    }

    tokens
}

/// Counts the real (non-marker) words in a sequence.
#[must_use]
pub fn real_word_count(tokens: &[Token]) -> usize {
    tokens.iter().filter(|t| t.is_word()).count()
}

/// Optical recognition point for a word of the given display length.
///
/// Short words anchor on the first character, medium words on the second,
/// long words at roughly 35% in.
#[must_use]
pub fn orp_index(word: &str) -> usize {
    let len = word.chars().count();
    if len <= 3 {
        0
    } else if len <= 7 {
        1
    } else {
        (len as f64 * 0.35).floor() as usize
    }
}

/// Splits a word into the substrings before, at, and after its ORP.
///
/// The split is by character, so multi-byte words are handled correctly. An
/// empty word yields three empty slices.
#[must_use]
pub fn split_at_orp(word: &str) -> (&str, &str, &str) {
    if word.is_empty() {
        return ("", "", "");
    }

    let orp = orp_index(word);
    let mut indices = word.char_indices().skip(orp);
    let Some((start, ch)) = indices.next() else {
        return (word, "", "");
    };
    let end = start + ch.len_utf8();
    (&word[..start], &word[start..end], &word[end..])
}
