//! Error types for extraction and playback.
//!
//! Three failure domains with different propagation rules: transport errors
//! are retried across the fallback chain before escalating, extraction errors
//! are terminal and carry a remediation hint for the user, and engine errors
//! only fail the requested operation while the engine keeps its prior state.

/// Transient failure of a single fetch attempt.
///
/// Recovered inside [`crate::fetch::fetch_article_html`] by moving on to the
/// next transport in the chain; only escalated to [`ExtractError`] once every
/// transport has been exhausted.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The attempt exceeded its deadline (10 s direct, 15 s fallback).
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The server answered with a non-success status.
    #[error("request failed with HTTP status {0}")]
    Status(u16),

    /// Connection-level failure (DNS, TLS, reset).
    #[error("network error: {0}")]
    Network(String),

    /// The payload came back but does not look like an HTML document.
    #[error("response payload is not HTML")]
    NotHtml,
}

/// Terminal extraction failure.
///
/// Every variant renders as a human-readable message that suggests a concrete
/// remediation, since the caller surfaces these directly.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Every transport in the chain failed or returned a non-HTML payload.
    #[error(
        "Could not fetch this URL. The site may be blocking access or require login. \
         Try copying the text and saving it as a .txt file instead."
    )]
    UnreachableUrl,

    /// The page fetched but no readable article subtree was found.
    #[error(
        "Could not find the main article content. This page may require login, \
         or it might be mostly images/video."
    )]
    NoArticleContent,

    /// Cleaned article text came in under the minimum usable length.
    #[error(
        "Not enough readable text found on this page. Try a different article \
         or paste the text into a .txt file."
    )]
    ArticleTooShort {
        /// Characters of cleaned text actually found.
        got: usize,
    },

    /// Uploaded or pasted text was empty or trivially short.
    #[error(
        "This file appears to be empty or too short. Make sure the file \
         contains readable text."
    )]
    TextTooShort {
        /// Characters of text actually found.
        got: usize,
    },

    /// File extension is not supported and the content is not plain text.
    #[error(
        "Could not read this file. Supported formats: .txt, .pdf. Try saving \
         your content as a text file."
    )]
    UnsupportedFile,

    /// The PDF could not be opened at all.
    #[error(
        "Could not open this PDF. It may be corrupted, password-protected, or \
         an unsupported format."
    )]
    PdfUnreadable,

    /// The PDF opened but contains no pages.
    #[error("This PDF has no pages.")]
    PdfEmpty,

    /// Page text reconstruction produced almost nothing (scanned/image-only).
    #[error(
        "No readable text found in this PDF. It may be a scanned document or \
         image-only file. Try using OCR software first."
    )]
    PdfNoText,
}

/// Invalid playback operation for the engine's current state.
///
/// Never fatal: the engine stays in its prior state and the caller should
/// treat the error as a signal to disable the corresponding control.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The word sequence is below the minimum viable length for a session.
    #[error("sequence has {got} words, need at least {min} to start playback")]
    SequenceTooShort {
        /// Real (non-marker) words available.
        got: usize,
        /// Minimum required by the engine configuration.
        min: usize,
    },

    /// A chapter index outside the document's chapter list.
    #[error("chapter index {index} out of range (document has {count} chapters)")]
    ChapterOutOfRange {
        /// Requested chapter index.
        index: usize,
        /// Number of chapters available.
        count: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_messages_carry_remediation() {
        // Every user-facing message must point at a concrete next step.
        let msg = ExtractError::UnreachableUrl.to_string();
        assert!(msg.contains(".txt"));

        let msg = ExtractError::ArticleTooShort { got: 12 }.to_string();
        assert!(msg.contains("paste"));

        let msg = ExtractError::PdfNoText.to_string();
        assert!(msg.contains("OCR"));
    }

    #[test]
    fn engine_errors_report_bounds() {
        let err = EngineError::SequenceTooShort { got: 2, min: 5 };
        assert!(err.to_string().contains('2'));
        assert!(err.to_string().contains('5'));
    }
}
