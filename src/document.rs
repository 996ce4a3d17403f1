//! Core data model: extraction sources and extracted documents.

use serde::{Deserialize, Serialize};

/// Minimum cleaned text length for a URL-sourced document.
pub const MIN_URL_TEXT_LEN: usize = 50;

/// Minimum cleaned text length for a file-sourced or pasted document.
pub const MIN_FILE_TEXT_LEN: usize = 20;

/// Minimum cleaned text length for a PDF-sourced document. Anything under
/// this after page reconstruction implies a scanned/image-only file.
pub const MIN_PDF_TEXT_LEN: usize = 30;

/// Maximum length of a chapter title label.
pub const MAX_CHAPTER_TITLE_LEN: usize = 80;

/// Where the text to read comes from. Dispatched once at the entry point to
/// select an extractor.
#[derive(Debug, Clone)]
pub enum Source {
    /// A web page to fetch and run through article extraction.
    Url(String),
    /// An uploaded file: original name (used for format dispatch) plus raw bytes.
    File {
        /// File name including extension.
        name: String,
        /// Raw file content.
        bytes: Vec<u8>,
    },
    /// Text pasted directly by the user.
    Paste(String),
}

/// A contiguous labeled slice of a document, used for navigation and as an
/// independent playback restart point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Short label, at most [`MAX_CHAPTER_TITLE_LEN`] characters.
    pub title: String,
    /// The chapter's slice of the source text.
    pub text: String,
}

impl Chapter {
    /// Builds a chapter, truncating the title to the label limit on a
    /// character boundary.
    #[must_use]
    pub fn new(title: &str, text: String) -> Self {
        let title = title
            .chars()
            .take(MAX_CHAPTER_TITLE_LEN)
            .collect::<String>()
            .trim()
            .to_string();
        Self { title, text }
    }
}

/// The result of extraction: normalized text plus optional structure.
///
/// `text` holds the full normalized document with paragraphs separated by
/// blank lines. `chapters`, when present, partitions the source in original
/// order with at least two entries. Produced once by an extractor and
/// immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Normalized full text.
    pub text: String,
    /// Page count, PDF sources only.
    pub page_count: Option<usize>,
    /// Detected chapters, if at least two were found.
    pub chapters: Option<Vec<Chapter>>,
}

impl Document {
    /// A single-chapter document with no page information.
    #[must_use]
    pub fn plain(text: String) -> Self {
        Self {
            text,
            page_count: None,
            chapters: None,
        }
    }

    /// Number of whitespace-separated words in the full text.
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}
